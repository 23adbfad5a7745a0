//! The reasoner: fact base, relation cache, and pipeline execution.
//!
//! A [`Reasoner`] owns the object arena (the single source of truth), a
//! map-representation mirror used by expression evaluation, a global data
//! map written by `calc`, the per-session relation cache, and the chain of
//! executed [`Stage`]s.  `load` seeds the fact base, `run` executes a
//! pipe-delimited pipeline, `result` returns the objects selected by the
//! final stage.
//!
//! Execution is a sequential fold: each stage consumes the previous stage's
//! output indices (the full range for the first stage) and halts the
//! pipeline on the first failure.  The reasoner never panics or throws
//! across `run`; failures are recorded on the failing stage.
//!
//! # Example
//!
//! ```
//! use spacia_geometry::{SpatialObject, Vec3};
//! use spacia_pipeline::Reasoner;
//!
//! let mut reasoner = Reasoner::new();
//! reasoner.load(vec![
//!     SpatialObject::new("table").with_dimensions(2.0, 0.5, 1.0),
//!     SpatialObject::new("box")
//!         .with_position(Vec3::new(0.0, 0.5, 0.0))
//!         .with_dimensions(0.4, 0.4, 0.4),
//! ]);
//! assert!(reasoner.run("filter(volume > 0.5) | pick(ontop)"));
//! let ids: Vec<&str> = reasoner.result().iter().map(|o| o.id.as_str()).collect();
//! assert_eq!(ids, ["box"]);
//! ```

use crate::expression::{Aggregate, Expr, MapScope, Scope};
use crate::stage::{PipelineOp, Quantifier, SortKey, Stage};
use crate::taxonomy::{is_a, TaxonomyLookup};
use spacia_geometry::{
    BBoxSector, DeductionCategories, NearbySchema, SectorSchema, SpatialAdjustment,
    SpatialObject, Vec3,
};
use spacia_inference::{
    deduce_comparability, deduce_sectoriality, deduce_similarity, deduce_topology,
    deduce_visibility, Predicate, PredicateCategory, SpatialRelation,
};
use spacia_types::{AttrValue, ObjectCause, ObjectExistence, SpatialError};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

// ────────────────────────────────────────────────────────────────────────────
// Reasoner
// ────────────────────────────────────────────────────────────────────────────

pub struct Reasoner {
    objects: Vec<SpatialObject>,
    /// Map mirror of each object, consulted first by expression evaluation;
    /// `map` writes land here and `reload` folds them back into the arena.
    base: Vec<BTreeMap<String, AttrValue>>,
    /// Global data map written by `calc`.
    data: BTreeMap<String, AttrValue>,
    /// Relations memoized per reference index within one session.
    relations: HashMap<usize, Vec<SpatialRelation>>,
    /// Unordered pairs that already emitted a connection predicate.
    connections: HashSet<(usize, usize)>,
    chain: Vec<Stage>,
    adjustment: SpatialAdjustment,
    deduction: DeductionCategories,
    observer: Option<usize>,
    taxonomy: Option<Box<dyn TaxonomyLookup>>,
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new()
    }
}

impl Reasoner {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            base: Vec::new(),
            data: BTreeMap::new(),
            relations: HashMap::new(),
            connections: HashSet::new(),
            chain: Vec::new(),
            adjustment: SpatialAdjustment::default(),
            deduction: DeductionCategories::default(),
            observer: None,
            taxonomy: None,
        }
    }

    pub fn with_adjustment(mut self, adjustment: SpatialAdjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: impl TaxonomyLookup + 'static) -> Self {
        self.taxonomy = Some(Box::new(taxonomy));
        self
    }

    // ── fact base ───────────────────────────────────────────────────────────

    /// Replace the fact base.  Resets caches, the chain, and the observer
    /// (the first self-tracked object, if any).
    pub fn load(&mut self, objects: Vec<SpatialObject>) {
        self.base = objects.iter().map(|o| o.to_attributes()).collect();
        self.observer = objects
            .iter()
            .position(|o| o.cause == ObjectCause::SelfTracked);
        self.objects = objects;
        self.relations.clear();
        self.connections.clear();
        self.chain.clear();
        self.data.clear();
        debug!(count = self.objects.len(), observer = ?self.observer, "fact base loaded");
    }

    pub fn objects(&self) -> &[SpatialObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&SpatialObject> {
        self.objects.get(index)
    }

    pub fn adjustment(&self) -> &SpatialAdjustment {
        &self.adjustment
    }

    pub fn deduction(&self) -> &DeductionCategories {
        &self.deduction
    }

    pub fn chain(&self) -> &[Stage] {
        &self.chain
    }

    pub fn data(&self) -> &BTreeMap<String, AttrValue> {
        &self.data
    }

    pub fn observer(&self) -> Option<usize> {
        self.observer
    }

    /// Objects selected by the final stage (the whole base before any run).
    pub fn result(&self) -> Vec<&SpatialObject> {
        match self.chain.last() {
            Some(stage) => stage
                .output
                .iter()
                .filter_map(|&i| self.objects.get(i))
                .collect(),
            None => self.objects.iter().collect(),
        }
    }

    // ── relations ───────────────────────────────────────────────────────────

    /// All relations where `index` is the reference object, memoized per
    /// session and honoring the active deduction categories.
    pub fn relations_of(&mut self, index: usize) -> Result<Vec<SpatialRelation>, SpatialError> {
        if index >= self.objects.len() {
            return Err(SpatialError::IndexOutOfRange {
                index,
                len: self.objects.len(),
            });
        }
        Ok(self.compute_relations(index))
    }

    /// Does `subject` hold `predicate` with reference `object`?
    pub fn does_relate(&mut self, subject: usize, predicate: Predicate, object: usize) -> bool {
        if subject >= self.objects.len() || object >= self.objects.len() {
            return false;
        }
        self.compute_relations(object)
            .iter()
            .any(|r| r.subject == subject && r.predicate == predicate)
    }

    fn compute_relations(&mut self, reference: usize) -> Vec<SpatialRelation> {
        if let Some(cached) = self.relations.get(&reference) {
            return cached.clone();
        }
        let cats = self.deduction;
        let mut out = Vec::new();
        let object = &self.objects[reference];
        for (j, subject) in self.objects.iter().enumerate() {
            if j == reference {
                continue;
            }
            if cats.topology || cats.connectivity {
                let mut rels = deduce_topology(
                    subject,
                    j,
                    object,
                    reference,
                    &self.adjustment,
                    cats.connectivity,
                    &mut self.connections,
                );
                if !cats.topology {
                    rels.retain(|r| r.predicate.category() == PredicateCategory::Connectivity);
                }
                out.append(&mut rels);
            }
            if cats.similarity {
                out.extend(deduce_similarity(subject, j, object, reference, &self.adjustment));
            }
            if cats.comparability {
                out.extend(deduce_comparability(
                    subject,
                    j,
                    object,
                    reference,
                    &self.adjustment,
                ));
            }
            if cats.sectoriality {
                out.extend(deduce_sectoriality(
                    subject,
                    j,
                    object,
                    reference,
                    &self.adjustment,
                ));
            }
            if cats.visibility {
                out.extend(deduce_visibility(subject, j, object, reference));
            }
            // geography is reserved: nothing populates it yet
        }
        self.relations.insert(reference, out.clone());
        out
    }

    fn invalidate_relations(&mut self) {
        self.relations.clear();
        self.connections.clear();
    }

    // ── pipeline execution ──────────────────────────────────────────────────

    /// Execute a pipe-delimited pipeline against the fact base.  Returns
    /// overall success; the chain records every stage, including the first
    /// failing one.
    pub fn run(&mut self, pipeline: &str) -> bool {
        self.chain.clear();
        let mut current: Vec<usize> = (0..self.objects.len()).collect();
        for token in split_pipeline(pipeline) {
            let op = match PipelineOp::parse(&token) {
                Ok(op) => op,
                Err(err) => {
                    let mut stage = Stage::invalid(token, err.to_string());
                    stage.input = current.clone();
                    self.chain.push(stage);
                    return false;
                }
            };
            let mut stage = Stage::new(token.clone(), op.clone());
            stage.input = current.clone();
            match self.execute(&op, &current) {
                Ok(output) => {
                    if op.is_manipulating() && output.is_empty() {
                        stage.fail("no match");
                    }
                    stage.output = output;
                }
                Err(err) => stage.fail(err.to_string()),
            }
            let halt = !stage.succeeded;
            current = stage.output.clone();
            info!(
                operation = %stage.operation,
                input = stage.input.len(),
                output = stage.output.len(),
                succeeded = stage.succeeded,
                "stage executed"
            );
            self.chain.push(stage);
            if halt {
                return false;
            }
        }
        true
    }

    fn execute(&mut self, op: &PipelineOp, input: &[usize]) -> Result<Vec<usize>, SpatialError> {
        match op {
            PipelineOp::Filter(expr) => Ok(self.filter(expr, input)),
            PipelineOp::Isa(alternatives) => Ok(self.isa(alternatives, input)),
            PipelineOp::Pick(expr) => Ok(self.pick(expr, input)),
            PipelineOp::Select {
                quantifier,
                relations,
                condition,
            } => Ok(self.select(*quantifier, relations, condition.as_ref(), input)),
            PipelineOp::Sort(key) => self.sort(key, input),
            PipelineOp::Slice { lower, upper } => Ok(slice(input, *lower, *upper)),
            PipelineOp::Produce { rule, assignments } => {
                self.produce(rule, assignments, input)
            }
            PipelineOp::Calc(assignments) => {
                self.calc(assignments)?;
                Ok(input.to_vec())
            }
            PipelineOp::Map(assignments) => {
                self.map_assign(assignments, input)?;
                Ok(input.to_vec())
            }
            PipelineOp::Backtrace(steps) => self.backtrace(*steps),
            PipelineOp::Reload => self.reload(),
            PipelineOp::Log(args) => {
                self.log(args);
                Ok(input.to_vec())
            }
            PipelineOp::Adjust(args) => {
                self.adjust(args)?;
                Ok(input.to_vec())
            }
            PipelineOp::Deduce(args) => {
                self.deduction = DeductionCategories::parse(args);
                self.invalidate_relations();
                Ok(input.to_vec())
            }
        }
    }

    // ── index-set operations ────────────────────────────────────────────────

    fn filter(&self, expr: &Expr, input: &[usize]) -> Vec<usize> {
        input
            .iter()
            .copied()
            .filter(|&i| expr.truthy(&ObjectScope { reasoner: self, index: i }))
            .collect()
    }

    fn isa(&self, alternatives: &[String], input: &[usize]) -> Vec<usize> {
        input
            .iter()
            .copied()
            .filter(|&i| {
                let object = &self.objects[i];
                let key = if object.kind.is_empty() {
                    &object.label
                } else {
                    &object.kind
                };
                alternatives
                    .iter()
                    .any(|alt| is_a(self.taxonomy.as_deref(), key, alt, false))
            })
            .collect()
    }

    fn pick(&mut self, expr: &Expr, input: &[usize]) -> Vec<usize> {
        let mut out = Vec::new();
        for &i in input {
            let relations = self.compute_relations(i);
            for j in 0..self.objects.len() {
                if j == i || out.contains(&j) {
                    continue;
                }
                let scope = RelationScope {
                    reasoner: self,
                    candidate: j,
                    relations: &relations,
                };
                if expr.truthy(&scope) {
                    out.push(j);
                }
            }
        }
        out
    }

    fn select(
        &mut self,
        quantifier: Quantifier,
        relations: &Expr,
        condition: Option<&Expr>,
        input: &[usize],
    ) -> Vec<usize> {
        let mut out = Vec::new();
        for &i in input {
            let observed = self.compute_relations(i);
            let mut candidates = 0usize;
            let mut matched = 0usize;
            for j in 0..self.objects.len() {
                if j == i {
                    continue;
                }
                if let Some(cond) = condition {
                    if !cond.truthy(&ObjectScope { reasoner: self, index: j }) {
                        continue;
                    }
                }
                candidates += 1;
                let scope = RelationScope {
                    reasoner: self,
                    candidate: j,
                    relations: &observed,
                };
                if relations.truthy(&scope) {
                    matched += 1;
                }
            }
            let keep = match quantifier {
                Quantifier::Any => matched > 0,
                Quantifier::All => candidates > 0 && matched == candidates,
                Quantifier::None => matched == 0,
            };
            if keep {
                out.push(i);
            }
        }
        out
    }

    fn sort(&mut self, key: &SortKey, input: &[usize]) -> Result<Vec<usize>, SpatialError> {
        let mut decorated: Vec<(usize, f32)> = Vec::with_capacity(input.len());
        match &key.predicate {
            None => {
                for &i in input {
                    let value = ObjectScope { reasoner: self, index: i }
                        .attribute(&key.attribute)
                        .and_then(|v| v.as_number())
                        .unwrap_or(f32::INFINITY);
                    decorated.push((i, value));
                }
            }
            Some(predicate) => {
                let references = self.backtrace(key.steps)?;
                let predicate = Predicate::parse(predicate);
                let mut observed: Vec<Vec<SpatialRelation>> = Vec::new();
                for &r in &references {
                    observed.push(self.compute_relations(r));
                }
                for &i in input {
                    let value = observed
                        .iter()
                        .flatten()
                        .filter(|rel| rel.subject == i && rel.predicate == predicate)
                        .map(|rel| {
                            if key.attribute == "angle" {
                                rel.angle
                            } else {
                                rel.delta
                            }
                        })
                        .fold(f32::INFINITY, f32::min);
                    decorated.push((i, value));
                }
            }
        }
        // missing values sort last either way
        if key.ascending {
            decorated.sort_by(|a, b| a.1.total_cmp(&b.1));
        } else {
            decorated.sort_by(|a, b| {
                let a_missing = a.1 == f32::INFINITY;
                let b_missing = b.1 == f32::INFINITY;
                match (a_missing, b_missing) {
                    (false, false) => b.1.total_cmp(&a.1),
                    (true, false) => std::cmp::Ordering::Greater,
                    (false, true) => std::cmp::Ordering::Less,
                    (true, true) => std::cmp::Ordering::Equal,
                }
            });
        }
        Ok(decorated.into_iter().map(|(i, _)| i).collect())
    }

    fn backtrace(&self, steps: usize) -> Result<Vec<usize>, SpatialError> {
        let mut seen = 0usize;
        for stage in self.chain.iter().rev() {
            let manipulating = stage
                .op
                .as_ref()
                .is_some_and(|op| op.is_manipulating());
            if manipulating {
                seen += 1;
                if seen == steps {
                    return Ok(stage.input.clone());
                }
            }
        }
        Err(SpatialError::Parse {
            op: "backtrace".into(),
            args: steps.to_string(),
            details: format!("only {seen} manipulating stages on the chain"),
        })
    }

    fn reload(&mut self) -> Result<Vec<usize>, SpatialError> {
        let mut rebuilt = Vec::with_capacity(self.base.len());
        for (index, map) in self.base.iter().enumerate() {
            let mut object = SpatialObject::from_attributes(map)?;
            // keep bookkeeping continuous across reloads
            if let Some(old) = self.objects.get(index) {
                object.created = old.created;
                object.updated = old.updated;
                object.velocity = old.velocity;
            }
            rebuilt.push(object);
        }
        self.objects = rebuilt;
        self.invalidate_relations();
        Ok((0..self.objects.len()).collect())
    }

    // ── value operations ────────────────────────────────────────────────────

    fn calc(&mut self, assignments: &[(String, Expr)]) -> Result<(), SpatialError> {
        for (name, expr) in assignments {
            let value = expr
                .eval(&GlobalScope { reasoner: self })
                .ok_or_else(|| {
                    SpatialError::Expression(format!("cannot evaluate '{name}'"))
                })?;
            self.data.insert(name.clone(), value);
        }
        Ok(())
    }

    fn map_assign(
        &mut self,
        assignments: &[(String, Expr)],
        input: &[usize],
    ) -> Result<(), SpatialError> {
        for &i in input {
            for (name, expr) in assignments {
                let value = expr.eval(&ObjectScope { reasoner: self, index: i });
                let Some(value) = value else {
                    return Err(SpatialError::Expression(format!(
                        "cannot evaluate '{name}' for object {i}"
                    )));
                };
                self.base[i].insert(name.clone(), value);
            }
        }
        Ok(())
    }

    fn adjust(&mut self, args: &str) -> Result<(), SpatialError> {
        let mut next = self.adjustment;
        let mut errors = Vec::new();
        for setting in args.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let words: Vec<&str> = setting.split_whitespace().collect();
            let parse = |text: &str| -> Result<f32, String> {
                text.parse::<f32>()
                    .map_err(|_| format!("bad number '{text}' in '{setting}'"))
            };
            let outcome: Result<(), String> = match words.as_slice() {
                ["max", "gap", v] => parse(v).map(|f| next.max_gap = f),
                ["max", "angle", v] => parse(v).map(|f| next.max_angle_delta = f),
                ["sector", "limit", v] => parse(v).map(|f| next.sector_limit = f),
                ["sector", schema] | ["sector", schema, _] => {
                    match SectorSchema::parse(schema) {
                        Some(parsed) => {
                            next.sector_schema = parsed;
                            match words.get(2) {
                                Some(v) => parse(v).map(|f| next.sector_factor = f),
                                None => Ok(()),
                            }
                        }
                        None => Err(format!("unknown sector schema '{schema}'")),
                    }
                }
                ["nearby", "limit", v] => parse(v).map(|f| next.nearby_limit = f),
                ["nearby", schema] | ["nearby", schema, _] => {
                    match NearbySchema::parse(schema) {
                        Some(parsed) => {
                            next.nearby_schema = parsed;
                            match words.get(2) {
                                Some(v) => parse(v).map(|f| next.nearby_factor = f),
                                None => Ok(()),
                            }
                        }
                        None => Err(format!("unknown nearby schema '{schema}'")),
                    }
                }
                ["long", "ratio", v] => parse(v).map(|f| next.long_ratio = f),
                ["thin", "ratio", v] => parse(v).map(|f| next.thin_ratio = f),
                _ => Err(format!("unknown setting '{setting}'")),
            };
            if let Err(error) = outcome {
                errors.push(error);
            }
        }
        if !errors.is_empty() {
            return Err(SpatialError::Adjustment(errors.join("; ")));
        }
        self.adjustment = next;
        self.invalidate_relations();
        Ok(())
    }

    fn log(&self, args: &str) {
        let ids: Vec<&str> = self.objects.iter().map(|o| o.id.as_str()).collect();
        let stages: Vec<&str> = self.chain.iter().map(|s| s.operation.as_str()).collect();
        info!(args, objects = ?ids, chain = ?stages, data = ?self.data, "pipeline log");
    }

    // ── produce ─────────────────────────────────────────────────────────────

    fn produce(
        &mut self,
        rule: &str,
        assignments: &[(String, Expr)],
        input: &[usize],
    ) -> Result<Vec<usize>, SpatialError> {
        // earlier productions never serve as sources; re-running the same
        // rule converges on the same derived ids
        let sources: Vec<usize> = input
            .iter()
            .copied()
            .filter(|&i| self.objects[i].cause != ObjectCause::RuleProduced)
            .collect();
        let mut built: Vec<SpatialObject> = Vec::new();
        match rule {
            "group" | "aggregate" => {
                if let Some(object) = self.build_group(rule, &sources) {
                    built.push(object);
                }
            }
            "copy" | "duplicate" => {
                for &i in &sources {
                    let source = &self.objects[i];
                    let mut copy = source.clone();
                    copy.id = format!("{rule}:{}", source.id);
                    copy.cause = ObjectCause::RuleProduced;
                    built.push(copy);
                }
            }
            "on" | "by" | "at" => {
                let contact = match rule {
                    "on" => Predicate::On,
                    "by" => Predicate::By,
                    _ => Predicate::At,
                };
                built = self.build_contact_zones(rule, contact, &sources);
            }
            _ => match BBoxSector::from_label(rule) {
                Some(sector) => {
                    for &i in &sources {
                        built.push(self.build_sector_box(rule, sector, i));
                    }
                }
                None => return Err(SpatialError::UnknownRule(rule.to_string())),
            },
        }

        let mut output = input.to_vec();
        for mut object in built {
            for (name, expr) in assignments {
                let attrs = object.to_attributes();
                if let Some(value) = expr.eval(&MapScope(&attrs)) {
                    object.set_attribute(name, value);
                }
            }
            let index = self.adopt(object);
            if !output.contains(&index) {
                output.push(index);
            }
        }
        self.relations.clear();
        Ok(output)
    }

    /// Bounding union of the inputs, anchored to the largest by volume.
    fn build_group(&self, rule: &str, input: &[usize]) -> Option<SpatialObject> {
        let anchor = input
            .iter()
            .copied()
            .max_by(|&a, &b| self.objects[a].volume().total_cmp(&self.objects[b].volume()))?;
        let anchor_obj = &self.objects[anchor];
        let mut min = Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for &i in input {
            for corner in self.objects[i].corners() {
                let local = anchor_obj.into_local(corner);
                min = Vec3::new(min.x.min(local.x), min.y.min(local.y), min.z.min(local.z));
                max = Vec3::new(max.x.max(local.x), max.y.max(local.y), max.z.max(local.z));
            }
        }
        let center_local = min.add(max).scaled(0.5);
        let center = center_local.to_world(anchor_obj.center(), anchor_obj.angle);
        let (width, height, depth) = (max.x - min.x, max.y - min.y, max.z - min.z);
        let ids: Vec<&str> = input.iter().map(|&i| self.objects[i].id.as_str()).collect();
        let mut object = SpatialObject::new(format!("{rule}:{}", ids.join("+")))
            .with_position(Vec3::new(center.x, center.y - height / 2.0, center.z))
            .with_dimensions(width, height, depth)
            .with_angle(anchor_obj.angle)
            .with_label(rule)
            .with_cause(ObjectCause::RuleProduced);
        object.existence = ObjectExistence::Aggregational;
        Some(object)
    }

    /// Thin zones at `on`/`by`/`at` contacts among the input set.
    fn build_contact_zones(
        &mut self,
        rule: &str,
        contact: Predicate,
        input: &[usize],
    ) -> Vec<SpatialObject> {
        let thickness = (self.adjustment.max_gap * 2.0).max(0.01);
        let mut zones = Vec::new();
        for &i in input {
            let observed = self.compute_relations(i);
            for rel in observed.iter().filter(|r| r.predicate == contact) {
                let (s, o) = (rel.subject, rel.object);
                if !input.contains(&s) || !input.contains(&o) {
                    continue;
                }
                let subject = &self.objects[s];
                let object = &self.objects[o];
                let id = format!("{rule}:{}+{}", subject.id, object.id);
                let mut zone = match contact {
                    // a sliver atop the supporting object's top face
                    Predicate::On => SpatialObject::new(id)
                        .with_position(Vec3::new(
                            subject.position.x,
                            object.position.y + object.height,
                            subject.position.z,
                        ))
                        .with_dimensions(subject.width, thickness, subject.depth)
                        .with_angle(subject.angle),
                    // the subject's box pushed out to its free side
                    Predicate::At => {
                        let mut direction = subject.center().sub(object.center());
                        direction = Vec3::new(direction.x, 0.0, direction.z);
                        let length = direction.length().max(1e-6);
                        let offset = direction.scaled(subject.base_radius() / length);
                        SpatialObject::new(id)
                            .with_position(subject.position.add(offset))
                            .with_dimensions(subject.width, subject.height, subject.depth)
                            .with_angle(subject.angle)
                    }
                    // midway between the two contact partners
                    _ => {
                        let mid = subject.center().add(object.center()).scaled(0.5);
                        let width = subject.width.min(object.width).max(thickness);
                        let height = subject.height.min(object.height);
                        let depth = subject.depth.min(object.depth).max(thickness);
                        SpatialObject::new(id)
                            .with_position(Vec3::new(mid.x, mid.y - height / 2.0, mid.z))
                            .with_dimensions(width, height, depth)
                            .with_angle(object.angle)
                    }
                };
                zone.existence = ObjectExistence::Conceptual;
                zone.cause = ObjectCause::RuleProduced;
                zone.label = rule.to_string();
                zones.push(zone);
            }
        }
        zones
    }

    /// The box occupying one sector cell of an input object.
    fn build_sector_box(&self, rule: &str, sector: BBoxSector, index: usize) -> SpatialObject {
        let source = &self.objects[index];
        let lengths = source.sector_lengths(&self.adjustment);
        let half = Vec3::new(source.width / 2.0, source.height / 2.0, source.depth / 2.0);
        let axis = |pos: BBoxSector, neg: BBoxSector, half: f32, own: f32, length: f32| {
            if sector.contains(pos) {
                (half + length / 2.0, length)
            } else if sector.contains(neg) {
                (-half - length / 2.0, length)
            } else {
                (0.0, own)
            }
        };
        let (ox, width) = axis(BBoxSector::RIGHT, BBoxSector::LEFT, half.x, source.width, lengths.x);
        let (oy, height) = axis(BBoxSector::OVER, BBoxSector::UNDER, half.y, source.height, lengths.y);
        let (oz, depth) = axis(BBoxSector::AHEAD, BBoxSector::BEHIND, half.z, source.depth, lengths.z);
        let center = Vec3::new(ox, oy, oz).to_world(source.center(), source.angle);
        let mut zone = SpatialObject::new(format!("{rule}:{}", source.id))
            .with_position(Vec3::new(center.x, center.y - height / 2.0, center.z))
            .with_dimensions(width, height, depth)
            .with_angle(source.angle)
            .with_label(rule);
        zone.existence = ObjectExistence::Conceptual;
        zone.cause = ObjectCause::RuleProduced;
        zone
    }

    /// Add a produced object, replacing an earlier production with the same
    /// derived id so `produce` stays idempotent.
    fn adopt(&mut self, object: SpatialObject) -> usize {
        if let Some(index) = self.objects.iter().position(|o| o.id == object.id) {
            self.base[index] = object.to_attributes();
            self.objects[index] = object;
            index
        } else {
            self.base.push(object.to_attributes());
            self.objects.push(object);
            self.objects.len() - 1
        }
    }

    // ── aggregation ─────────────────────────────────────────────────────────

    fn aggregate(&self, func: Aggregate, expr: &Expr) -> Option<AttrValue> {
        let mut values = Vec::new();
        let mut count = 0usize;
        for index in 0..self.objects.len() {
            let scope = ObjectScope { reasoner: self, index };
            match func {
                Aggregate::Count => {
                    if expr.truthy(&scope) {
                        count += 1;
                    }
                }
                _ => {
                    if let Some(n) = expr.eval(&scope).and_then(|v| v.as_number()) {
                        values.push(n);
                    }
                }
            }
        }
        match func {
            Aggregate::Count => Some(AttrValue::Number(count as f32)),
            Aggregate::Sum => Some(AttrValue::Number(values.iter().sum())),
            Aggregate::Avg => {
                if values.is_empty() {
                    None
                } else {
                    Some(AttrValue::Number(
                        values.iter().sum::<f32>() / values.len() as f32,
                    ))
                }
            }
            Aggregate::Min => values.iter().copied().reduce(f32::min).map(AttrValue::Number),
            Aggregate::Max => values.iter().copied().reduce(f32::max).map(AttrValue::Number),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scopes
// ────────────────────────────────────────────────────────────────────────────

/// Expression scope of one object: the map mirror first (so `map` writes are
/// visible before `reload`), then the object's fixed/derived attributes,
/// then the global data map.
struct ObjectScope<'a> {
    reasoner: &'a Reasoner,
    index: usize,
}

impl Scope for ObjectScope<'_> {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        if let Some(value) = self
            .reasoner
            .base
            .get(self.index)
            .and_then(|map| map.get(name))
        {
            return Some(value.clone());
        }
        if let Some(value) = self
            .reasoner
            .objects
            .get(self.index)
            .and_then(|o| o.attribute(name, &self.reasoner.adjustment))
        {
            return Some(value);
        }
        self.reasoner.data.get(name).cloned()
    }

    fn aggregate(&self, func: Aggregate, expr: &Expr) -> Option<AttrValue> {
        self.reasoner.aggregate(func, expr)
    }
}

/// Scope of `calc`: the global data map plus fact-base aggregates.
struct GlobalScope<'a> {
    reasoner: &'a Reasoner,
}

impl Scope for GlobalScope<'_> {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        self.reasoner.data.get(name).cloned()
    }

    fn aggregate(&self, func: Aggregate, expr: &Expr) -> Option<AttrValue> {
        self.reasoner.aggregate(func, expr)
    }
}

/// Scope of a `pick`/`select` candidate: relation keywords resolve to
/// whether the candidate holds that relation with the reference, everything
/// else to the candidate's attributes.
struct RelationScope<'a> {
    reasoner: &'a Reasoner,
    candidate: usize,
    relations: &'a [SpatialRelation],
}

impl Scope for RelationScope<'_> {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        let predicate = Predicate::parse(name);
        if predicate != Predicate::Undefined {
            let holds = self
                .relations
                .iter()
                .any(|r| r.subject == self.candidate && r.predicate == predicate);
            return Some(AttrValue::Bool(holds));
        }
        ObjectScope {
            reasoner: self.reasoner,
            index: self.candidate,
        }
        .attribute(name)
    }

    fn aggregate(&self, func: Aggregate, expr: &Expr) -> Option<AttrValue> {
        self.reasoner.aggregate(func, expr)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Split a pipeline on `|`, but only outside parentheses so `isa(a | b)`
/// stays one token.
fn split_pipeline(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '|' if depth == 0 => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    tokens.push(current.trim().to_string());
    tokens.retain(|t| !t.is_empty());
    tokens
}

/// 1-based slicing with negative indices from the end, clamped bounds, and
/// auto-swap of reversed ranges.
fn slice(input: &[usize], lower: i64, upper: Option<i64>) -> Vec<usize> {
    let len = input.len() as i64;
    if len == 0 {
        return Vec::new();
    }
    let resolve = |bound: i64| -> i64 {
        let absolute = if bound < 0 { len + bound + 1 } else { bound };
        absolute.clamp(1, len)
    };
    let mut lo = resolve(lower);
    let mut hi = resolve(upper.unwrap_or(lower));
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
    }
    input[(lo - 1) as usize..hi as usize].to_vec()
}
