//! The taxonomy lookup boundary used by the `isa` operation.
//!
//! Ontology loading lives outside this crate; the pipeline only needs to
//! resolve a type/label string to a [`Concept`] and walk its parent chain.
//! [`InMemoryTaxonomy`] is the concrete store the tests and the CLI use;
//! an asynchronously populated store can implement [`TaxonomyLookup`] and
//! simply return `None` for concepts it has not resolved yet — `isa` then
//! degrades to "no match" instead of blocking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Walk limit for the parent chain; defends against cyclic ontologies.
const MAX_ANCESTRY: usize = 64;

/// A node of the type ontology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub label: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

impl Concept {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            synonyms: Vec::new(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Case-insensitive label/synonym match; non-strict mode also accepts
    /// substring containment in either direction.
    fn matches(&self, target: &str, strict: bool) -> bool {
        let target = target.to_ascii_lowercase();
        let hit = |candidate: &str| {
            let candidate = candidate.to_ascii_lowercase();
            candidate == target
                || (!strict && (candidate.contains(&target) || target.contains(&candidate)))
        };
        hit(&self.label) || self.synonyms.iter().any(|s| hit(s))
    }
}

/// Resolves a label to at most one concept.
pub trait TaxonomyLookup {
    fn concept(&self, label: &str) -> Option<Concept>;
}

/// A map-backed taxonomy, keyed by lowercase label.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaxonomy {
    concepts: HashMap<String, Concept>,
}

impl InMemoryTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, concept: Concept) {
        self.concepts
            .insert(concept.label.to_ascii_lowercase(), concept);
    }

    pub fn with(mut self, concept: Concept) -> Self {
        self.insert(concept);
        self
    }
}

impl TaxonomyLookup for InMemoryTaxonomy {
    fn concept(&self, label: &str) -> Option<Concept> {
        self.concepts.get(&label.to_ascii_lowercase()).cloned()
    }
}

/// Is `label` a `target`, via label/synonym equality at each level of the
/// parent chain?  Works without a taxonomy too: then only direct (or, in
/// non-strict mode, substring) matching applies.
pub fn is_a(
    taxonomy: Option<&dyn TaxonomyLookup>,
    label: &str,
    target: &str,
    strict: bool,
) -> bool {
    let direct = Concept::new(label).matches(target, strict);
    if direct {
        return true;
    }
    let Some(taxonomy) = taxonomy else {
        return false;
    };
    let mut current = taxonomy.concept(label);
    for _ in 0..MAX_ANCESTRY {
        let Some(concept) = current else {
            return false;
        };
        if concept.matches(target, strict) {
            return true;
        }
        current = concept.parent.as_deref().and_then(|p| taxonomy.concept(p));
    }
    false
}
