//! Metric similarity and comparability deduction.
//!
//! Similarity predicates assert that a derived metric of the subject falls
//! inside the band the reference object's metric spans when every linear
//! dimension is perturbed by ±`max_gap`.  The band therefore scales with the
//! metric's dimensionality: a linear metric tolerates `max_gap`, an areal
//! one the product of perturbed factors, a volumetric one the triple
//! product.  Comparability predicates fire only when the subject's metric
//! falls *outside* that band, so `samevolume` and `bigger` are mutually
//! exclusive for the same pair.

use crate::predicate::Predicate;
use crate::relation::SpatialRelation;
use spacia_geometry::{SpatialAdjustment, SpatialObject};

/// Inclusive band a reference metric spans under ±`max_gap` perturbation.
#[derive(Debug, Clone, Copy)]
struct Band {
    lo: f32,
    hi: f32,
}

impl Band {
    fn linear(value: f32, eps: f32) -> Self {
        Self {
            lo: value - eps,
            hi: value + eps,
        }
    }

    /// Band of a product of perturbed positive factors.
    fn product(factors: &[f32], eps: f32) -> Self {
        let lo = factors.iter().map(|f| (f - eps).max(0.0)).product();
        let hi = factors.iter().map(|f| f + eps).product();
        Self { lo, hi }
    }

    fn contains(&self, value: f32) -> bool {
        value >= self.lo && value <= self.hi
    }
}

fn surface_of(w: f32, h: f32, d: f32) -> f32 {
    2.0 * (w * d + w * h + d * h)
}

// ────────────────────────────────────────────────────────────────────────────
// Similarity
// ────────────────────────────────────────────────────────────────────────────

/// Deduce all similarity relations of `subject` relative to `object`.
pub fn deduce_similarity(
    subject: &SpatialObject,
    subject_idx: usize,
    object: &SpatialObject,
    object_idx: usize,
    adjustment: &SpatialAdjustment,
) -> Vec<SpatialRelation> {
    let eps = adjustment.max_gap;
    let mut relations = Vec::new();
    let mut emit = |pred: Predicate, delta: f32| {
        relations.push(SpatialRelation::new(subject_idx, pred, object_idx).with_delta(delta));
    };

    let center_gap = subject.center().distance(object.center());
    if center_gap <= eps {
        emit(Predicate::SameCenter, center_gap);
    }
    let position_gap = subject.position.distance(object.position);
    if position_gap <= eps {
        emit(Predicate::SamePosition, position_gap);
    }

    let (w, h, d) = (object.width, object.height, object.depth);
    let same_width = (subject.width - w).abs() <= eps;
    let same_height = (subject.height - h).abs() <= eps;
    let same_depth = (subject.depth - d).abs() <= eps;
    if same_width {
        emit(Predicate::SameWidth, subject.width - w);
    }
    if same_height {
        emit(Predicate::SameHeight, subject.height - h);
    }
    if same_depth {
        emit(Predicate::SameDepth, subject.depth - d);
    }
    if (subject.main_length() - object.main_length()).abs() <= eps {
        emit(Predicate::SameLength, subject.main_length() - object.main_length());
    }
    if Band::linear(object.perimeter(), 4.0 * eps).contains(subject.perimeter()) {
        emit(Predicate::SamePerimeter, subject.perimeter() - object.perimeter());
    }
    if Band::product(&[w, d], eps).contains(subject.footprint()) {
        emit(Predicate::SameFootprint, subject.footprint() - object.footprint());
    }
    if Band::product(&[w, h], eps).contains(subject.front_face()) {
        emit(Predicate::SameFront, subject.front_face() - object.front_face());
    }
    if Band::product(&[d, h], eps).contains(subject.side_face()) {
        emit(Predicate::SameSide, subject.side_face() - object.side_face());
    }
    let surface_band = Band {
        lo: surface_of((w - eps).max(0.0), (h - eps).max(0.0), (d - eps).max(0.0)),
        hi: surface_of(w + eps, h + eps, d + eps),
    };
    if surface_band.contains(subject.surface()) {
        emit(Predicate::SameSurface, subject.surface() - object.surface());
    }
    if Band::product(&[w, h, d], eps).contains(subject.volume()) {
        emit(Predicate::SameVolume, subject.volume() - object.volume());
    }
    if same_width && same_height && same_depth {
        emit(Predicate::SameCuboid, 0.0);
        let yaw_delta = (subject.angle - object.angle).sin().abs();
        if position_gap <= eps && yaw_delta <= adjustment.max_angle_delta {
            emit(Predicate::Congruent, position_gap);
        }
    }
    if subject.shape == object.shape && subject.shape != spacia_types::ObjectShape::Unknown {
        emit(Predicate::SameShape, 0.0);
    }

    relations
}

// ────────────────────────────────────────────────────────────────────────────
// Comparability
// ────────────────────────────────────────────────────────────────────────────

/// Deduce all comparability relations of `subject` relative to `object`.
pub fn deduce_comparability(
    subject: &SpatialObject,
    subject_idx: usize,
    object: &SpatialObject,
    object_idx: usize,
    adjustment: &SpatialAdjustment,
) -> Vec<SpatialRelation> {
    let eps = adjustment.max_gap;
    let mut relations: Vec<SpatialRelation> = Vec::new();
    let emit = |relations: &mut Vec<SpatialRelation>, pred: Predicate, delta: f32| {
        if !relations.iter().any(|r| r.predicate == pred) {
            relations
                .push(SpatialRelation::new(subject_idx, pred, object_idx).with_delta(delta));
        }
    };

    let volume_band = Band::product(&[object.width, object.height, object.depth], eps);
    if subject.volume() > volume_band.hi {
        emit(&mut relations, Predicate::Bigger, subject.volume() - object.volume());
    } else if subject.volume() < volume_band.lo {
        emit(&mut relations, Predicate::Smaller, subject.volume() - object.volume());
    }

    let height_delta = subject.height - object.height;
    if height_delta > eps {
        emit(&mut relations, Predicate::Taller, height_delta);
    } else if height_delta < -eps {
        emit(&mut relations, Predicate::Shorter, height_delta);
    }

    let length_delta = subject.main_length() - object.main_length();
    if length_delta > eps {
        emit(&mut relations, Predicate::Longer, length_delta);
    } else if length_delta < -eps {
        emit(&mut relations, Predicate::Shorter, length_delta);
    }

    let footprint_band = Band::product(&[object.width, object.depth], eps);
    if subject.footprint() > footprint_band.hi {
        emit(&mut relations, Predicate::Wider, subject.footprint() - object.footprint());
    } else if subject.footprint() < footprint_band.lo {
        emit(&mut relations, Predicate::Thinner, subject.footprint() - object.footprint());
    }

    // orientation-free fit: compare sorted dimension triples
    let mut subj_dims = [subject.width, subject.height, subject.depth];
    let mut obj_dims = [object.width, object.height, object.depth];
    subj_dims.sort_by(f32::total_cmp);
    obj_dims.sort_by(f32::total_cmp);
    let worst = subj_dims
        .iter()
        .zip(obj_dims.iter())
        .map(|(s, o)| s - o)
        .fold(f32::MIN, f32::max);
    if worst <= eps {
        emit(&mut relations, Predicate::Fitting, worst);
    } else {
        emit(&mut relations, Predicate::Exceeding, worst);
    }

    relations
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacia_geometry::Vec3;
    use spacia_types::ObjectShape;

    fn adj() -> SpatialAdjustment {
        SpatialAdjustment::default()
    }

    fn preds(relations: &[SpatialRelation]) -> Vec<String> {
        relations.iter().map(|r| r.predicate.name()).collect()
    }

    // ── similarity ──────────────────────────────────────────────────────────

    #[test]
    fn identical_cuboids_share_everything() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 2.0, 0.5);
        let b = SpatialObject::new("b").with_dimensions(1.0, 2.0, 0.5);
        let names = preds(&deduce_similarity(&b, 1, &a, 0, &adj()));
        for expected in [
            "samecenter",
            "sameposition",
            "samewidth",
            "sameheight",
            "samedepth",
            "samelength",
            "sameperimeter",
            "samefootprint",
            "samevolume",
            "samecuboid",
            "congruent",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn millimetre_jitter_stays_similar() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b").with_dimensions(1.015, 0.99, 1.01);
        let names = preds(&deduce_similarity(&b, 1, &a, 0, &adj()));
        assert!(names.contains(&"samecuboid".to_string()));
        assert!(names.contains(&"samevolume".to_string()));
    }

    #[test]
    fn displaced_twin_is_not_congruent() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(2.0, 0.0, 0.0))
            .with_dimensions(1.0, 1.0, 1.0);
        let names = preds(&deduce_similarity(&b, 1, &a, 0, &adj()));
        assert!(names.contains(&"samecuboid".to_string()));
        assert!(!names.contains(&"congruent".to_string()));
        assert!(!names.contains(&"sameposition".to_string()));
    }

    #[test]
    fn sameshape_requires_a_known_shape() {
        let mut a = SpatialObject::new("a");
        let mut b = SpatialObject::new("b");
        let names = preds(&deduce_similarity(&b, 1, &a, 0, &adj()));
        assert!(!names.contains(&"sameshape".to_string()));
        a.shape = ObjectShape::Cubical;
        b.shape = ObjectShape::Cubical;
        let names = preds(&deduce_similarity(&b, 1, &a, 0, &adj()));
        assert!(names.contains(&"sameshape".to_string()));
    }

    // ── comparability ───────────────────────────────────────────────────────

    #[test]
    fn clearly_larger_box_is_bigger_taller_wider() {
        let small = SpatialObject::new("s").with_dimensions(0.5, 0.5, 0.5);
        let large = SpatialObject::new("l").with_dimensions(2.0, 2.0, 2.0);
        let names = preds(&deduce_comparability(&large, 1, &small, 0, &adj()));
        assert!(names.contains(&"bigger".to_string()));
        assert!(names.contains(&"taller".to_string()));
        assert!(names.contains(&"longer".to_string()));
        assert!(names.contains(&"wider".to_string()));
        assert!(names.contains(&"exceeding".to_string()));
        assert!(!names.contains(&"fitting".to_string()));
    }

    #[test]
    fn smaller_box_fits() {
        let small = SpatialObject::new("s").with_dimensions(0.5, 0.5, 0.5);
        let large = SpatialObject::new("l").with_dimensions(2.0, 2.0, 2.0);
        let names = preds(&deduce_comparability(&small, 0, &large, 1, &adj()));
        assert!(names.contains(&"smaller".to_string()));
        assert!(names.contains(&"shorter".to_string()));
        assert!(names.contains(&"thinner".to_string()));
        assert!(names.contains(&"fitting".to_string()));
    }

    #[test]
    fn fitting_ignores_orientation_of_dimensions() {
        // a 2×0.4×0.3 bar fits a 0.5×0.5×2.1 shaft once rotated
        let shaft = SpatialObject::new("shaft").with_dimensions(0.5, 0.5, 2.1);
        let bar = SpatialObject::new("bar").with_dimensions(2.0, 0.4, 0.3);
        let names = preds(&deduce_comparability(&bar, 0, &shaft, 1, &adj()));
        assert!(names.contains(&"fitting".to_string()));
        assert!(!names.contains(&"exceeding".to_string()));
    }

    #[test]
    fn near_equal_volumes_compare_as_neither() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b").with_dimensions(1.01, 1.0, 1.0);
        let names = preds(&deduce_comparability(&b, 1, &a, 0, &adj()));
        assert!(!names.contains(&"bigger".to_string()));
        assert!(!names.contains(&"smaller".to_string()));
    }

    #[test]
    fn shorter_is_emitted_once_for_height_and_length() {
        let tall = SpatialObject::new("t").with_dimensions(0.2, 3.0, 0.2);
        let stub = SpatialObject::new("s").with_dimensions(0.2, 0.5, 0.2);
        let relations = deduce_comparability(&stub, 0, &tall, 1, &adj());
        let shorter = relations
            .iter()
            .filter(|r| r.predicate == Predicate::Shorter)
            .count();
        assert_eq!(shorter, 1);
    }
}
