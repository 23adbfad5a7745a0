//! Pairwise topology, adjacency and orientation deduction.
//!
//! [`deduce_topology`] is the workhorse of the inference layer: given a
//! subject and a reference object it classifies the subject's centre and
//! corners in the reference's local frame and emits every proximity,
//! directionality, adjacency, assembly, connectivity and orientation
//! predicate that holds.  The steps build on each other:
//!
//! 1. centre distance → `near` / `far`
//! 2. subject centre and corners transformed into the reference frame
//! 3. centre sector → `left`/`right`/`ahead`/`behind`/`above`/`below`
//! 4. single-axis divergence → side predicates and contact
//!    (`ontop`/`beneath`/`meeting`/`touching`, plus `on`/`by`/`at` once per
//!    unordered pair when connectivity is enabled)
//! 5. corner containment → `inside`/`containing`/`overlapping`/`crossing`/
//!    `disjoint` (and `beside` for near, laterally disjoint pairs)
//! 6. yaw difference → `aligned`/`opposite`/`orthogonal` and face alignment
//!
//! Contact refinement and assembly tests use corner spans, not centre
//! distance, so rotated subjects are handled without axis-aligned
//! approximation.

use crate::predicate::Predicate;
use crate::relation::SpatialRelation;
use spacia_geometry::{BBoxSector, SpatialAdjustment, SpatialObject, Vec3};
use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

// ────────────────────────────────────────────────────────────────────────────
// Corner spans
// ────────────────────────────────────────────────────────────────────────────

/// Axis-aligned extent of a corner set in the reference frame.
#[derive(Debug, Clone, Copy)]
struct Span {
    min: Vec3,
    max: Vec3,
}

impl Span {
    fn of(corners: &[Vec3; 8]) -> Self {
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = Vec3::new(min.x.min(c.x), min.y.min(c.y), min.z.min(c.z));
            max = Vec3::new(max.x.max(c.x), max.y.max(c.y), max.z.max(c.z));
        }
        Self { min, max }
    }

    /// Signed gap between the span and a box of the given half-extent,
    /// per axis.  Positive means separated, negative means penetrating.
    fn gap(&self, half: Vec3) -> Vec3 {
        Vec3::new(
            self.min.x.max(-self.max.x) - half.x,
            self.min.y.max(-self.max.y) - half.y,
            self.min.z.max(-self.max.z) - half.z,
        )
    }
}

fn half_extents(object: &SpatialObject) -> Vec3 {
    Vec3::new(object.width / 2.0, object.height / 2.0, object.depth / 2.0)
}

/// Rounding slack for boundary-exact contact.  Summing metre-scale
/// positions and half-extents in f32 leaves ~1e-7 of noise on a corner
/// offset; anything this close to the face reads as an exact-zero gap.
const CONTACT_SNAP: f32 = 1e-5;

/// Normalize an angle to (−π, π].
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// True when `angle` is within `tolerance` of a multiple of π/2.
fn is_right_angled(angle: f32, tolerance: f32) -> bool {
    let rem = angle.abs().rem_euclid(FRAC_PI_2);
    rem <= tolerance || rem >= FRAC_PI_2 - tolerance
}

// ────────────────────────────────────────────────────────────────────────────
// Topology deduction
// ────────────────────────────────────────────────────────────────────────────

/// Deduce all topology-family relations of `subject` relative to `object`.
///
/// When `connectivity` is set, contact and enclosure additionally emit the
/// connection predicates `on`/`by`/`at`/`in`, guarded by the `connections`
/// ledger so each unordered pair connects at most once.
pub fn deduce_topology(
    subject: &SpatialObject,
    subject_idx: usize,
    object: &SpatialObject,
    object_idx: usize,
    adjustment: &SpatialAdjustment,
    connectivity: bool,
    connections: &mut HashSet<(usize, usize)>,
) -> Vec<SpatialRelation> {
    let mut relations = Vec::new();
    let gap_tol = adjustment.max_gap;
    let rel = |pred: Predicate| SpatialRelation::new(subject_idx, pred, object_idx);
    let pair_key = (subject_idx.min(object_idx), subject_idx.max(object_idx));

    // step 1: proximity
    let distance = subject.center().distance(object.center());
    let near = distance <= subject.nearby_radius(adjustment) + object.nearby_radius(adjustment);
    if near {
        relations.push(rel(Predicate::Near).with_delta(distance));
    } else {
        relations.push(rel(Predicate::Far).with_delta(distance));
    }

    // step 2: subject in the reference frame
    let half = half_extents(object);
    let local_center = object.into_local(subject.center());
    let local_corners = subject.corners().map(|c| object.into_local(c));
    let span = Span::of(&local_corners);
    let gap = span.gap(half);

    // step 3: directionality from the centre sector
    let sector = object.sector_of(local_center, gap_tol);
    for (flag, pred, delta) in [
        (BBoxSector::LEFT, Predicate::Left, gap.x),
        (BBoxSector::RIGHT, Predicate::Right, gap.x),
        (BBoxSector::AHEAD, Predicate::Ahead, gap.z),
        (BBoxSector::BEHIND, Predicate::Behind, gap.z),
        (BBoxSector::OVER, Predicate::Above, gap.y),
        (BBoxSector::UNDER, Predicate::Below, gap.y),
    ] {
        if sector.contains(flag) {
            relations.push(rel(pred).with_delta(delta));
        }
    }

    // step 4: side and contact refinement on a single divergence axis.
    // The centre is re-classified with a widened tolerance so near pairs
    // whose centres sit just off one face still count as single-axis.
    let refine_tol = if near { gap_tol * 2.0 } else { gap_tol };
    let refined = object.sector_of(local_center, refine_tol);
    let mut side_separated = false;
    if refined.divergence() == 1 {
        let (side_pred, offset) = match refined {
            BBoxSector::LEFT => (Predicate::LeftSide, -half.x - span.max.x),
            BBoxSector::RIGHT => (Predicate::RightSide, span.min.x - half.x),
            BBoxSector::AHEAD => (Predicate::FrontSide, span.min.z - half.z),
            BBoxSector::BEHIND => (Predicate::BackSide, -half.z - span.max.z),
            BBoxSector::OVER => (Predicate::UpperSide, span.min.y - half.y),
            _ => (Predicate::LowerSide, -half.y - span.max.y),
        };
        let offset = if offset.abs() <= CONTACT_SNAP { 0.0 } else { offset };
        // every corner on or beyond the face: no overlap is possible
        if offset >= 0.0 {
            side_separated = true;
            relations.push(rel(side_pred).with_delta(offset));
            if offset <= gap_tol {
                let yaw_delta = wrap_angle(subject.angle - object.angle);
                let contact_pred = match refined {
                    BBoxSector::OVER => Predicate::Ontop,
                    BBoxSector::UNDER => Predicate::Beneath,
                    _ if is_right_angled(yaw_delta, adjustment.max_angle_delta) => {
                        Predicate::Meeting
                    }
                    _ => Predicate::Touching,
                };
                relations.push(rel(contact_pred).with_delta(offset).with_angle(yaw_delta));
                if connectivity && connections.insert(pair_key) {
                    let connection = match contact_pred {
                        // the resting object is the subject of `on`
                        Predicate::Ontop => rel(Predicate::On),
                        Predicate::Beneath => {
                            SpatialRelation::new(object_idx, Predicate::On, subject_idx)
                        }
                        Predicate::Meeting => rel(Predicate::At),
                        _ => rel(Predicate::By),
                    };
                    relations.push(connection.with_delta(offset));
                }
            }
        }
    }

    // step 5: assembly
    let inside = local_corners
        .iter()
        .all(|c| object.sector_of(*c, gap_tol).is_inside());
    let object_corners_in_subject = object
        .corners()
        .map(|c| subject.into_local(c));
    let containing = object_corners_in_subject
        .iter()
        .all(|c| subject.sector_of(*c, gap_tol).is_inside());
    // strict containment (shrunk by the tolerance) so a resting contact
    // whose corners sit exactly on a face does not read as overlap
    let any_strictly_inside = local_corners
        .iter()
        .any(|c| object.sector_of(*c, -gap_tol).is_inside())
        || object_corners_in_subject
            .iter()
            .any(|c| subject.sector_of(*c, -gap_tol).is_inside());
    let axes = [
        (span.min.x, span.max.x, half.x),
        (span.min.y, span.max.y, half.y),
        (span.min.z, span.max.z, half.z),
    ];
    let mid = |i: usize| (axes[i].0 + axes[i].1) / 2.0;
    let crossing = (0..3).any(|i| {
        let (min, max, h) = axes[i];
        let (j, k) = ((i + 1) % 3, (i + 2) % 3);
        min <= -h && max >= h && mid(j).abs() <= axes[j].2 && mid(k).abs() <= axes[k].2
    });

    if inside {
        relations.push(rel(Predicate::Inside).with_delta(distance));
        if connectivity && connections.insert(pair_key) {
            relations.push(rel(Predicate::In).with_delta(distance));
        }
    } else if containing {
        relations.push(rel(Predicate::Containing).with_delta(distance));
        if connectivity && connections.insert(pair_key) {
            relations.push(SpatialRelation::new(object_idx, Predicate::In, subject_idx)
                .with_delta(distance));
        }
    } else if any_strictly_inside && !side_separated {
        relations.push(rel(Predicate::Overlapping).with_delta(distance));
    } else if crossing && !side_separated {
        relations.push(rel(Predicate::Crossing).with_delta(distance));
    } else {
        relations.push(rel(Predicate::Disjoint).with_delta(distance));
        if near && !sector.is_vertical() {
            relations.push(rel(Predicate::Beside).with_delta(distance));
        }
    }

    // step 6: orientation
    let yaw_delta = wrap_angle(subject.angle - object.angle);
    let angle_tol = adjustment.max_angle_delta;
    if yaw_delta.abs() <= angle_tol {
        relations.push(rel(Predicate::Aligned).with_angle(yaw_delta));
        for (pred, offset) in [
            (Predicate::FrontAligned, span.max.z - half.z),
            (Predicate::BackAligned, span.min.z + half.z),
            (Predicate::RightAligned, span.max.x - half.x),
            (Predicate::LeftAligned, span.min.x + half.x),
        ] {
            if offset.abs() <= gap_tol {
                relations.push(rel(pred).with_delta(offset).with_angle(yaw_delta));
            }
        }
    } else if (yaw_delta.abs() - PI).abs() <= angle_tol {
        relations.push(rel(Predicate::Opposite).with_angle(yaw_delta));
    } else if (yaw_delta.abs() - FRAC_PI_2).abs() <= angle_tol {
        relations.push(rel(Predicate::Orthogonal).with_angle(yaw_delta));
    }

    relations
}

// ────────────────────────────────────────────────────────────────────────────
// Sectoriality
// ────────────────────────────────────────────────────────────────────────────

/// Classify the subject's centre into one of the reference's 27 sector
/// cells.  Beyond the configured sector extrusion lengths no cell applies
/// and nothing is emitted.
pub fn deduce_sectoriality(
    subject: &SpatialObject,
    subject_idx: usize,
    object: &SpatialObject,
    object_idx: usize,
    adjustment: &SpatialAdjustment,
) -> Vec<SpatialRelation> {
    let local = object.into_local(subject.center());
    let sector = object.sector_of(local, 0.0);
    let half = half_extents(object);
    let lengths = object.sector_lengths(adjustment);
    let within = |flag: BBoxSector, offset: f32, length: f32| {
        !sector.contains(flag) || offset <= length
    };
    let reachable = within(BBoxSector::RIGHT, local.x - half.x, lengths.x)
        && within(BBoxSector::LEFT, -half.x - local.x, lengths.x)
        && within(BBoxSector::OVER, local.y - half.y, lengths.y)
        && within(BBoxSector::UNDER, -half.y - local.y, lengths.y)
        && within(BBoxSector::AHEAD, local.z - half.z, lengths.z)
        && within(BBoxSector::BEHIND, -half.z - local.z, lengths.z);
    if !reachable {
        return Vec::new();
    }
    let distance = subject.center().distance(object.center());
    vec![
        SpatialRelation::new(subject_idx, Predicate::Sector(sector), object_idx)
            .with_delta(distance),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacia_geometry::Vec3;

    fn boxes() -> (SpatialObject, SpatialObject) {
        // 1 m cube resting centred on a 2×0.5×1 table top
        let table = SpatialObject::new("table")
            .with_position(Vec3::zero())
            .with_dimensions(2.0, 0.5, 1.0);
        let cube = SpatialObject::new("cube")
            .with_position(Vec3::new(0.0, 0.5, 0.0))
            .with_dimensions(0.4, 0.4, 0.4);
        (table, cube)
    }

    fn deduce(
        subject: &SpatialObject,
        object: &SpatialObject,
        connectivity: bool,
    ) -> Vec<SpatialRelation> {
        let mut ledger = HashSet::new();
        deduce_topology(
            subject,
            0,
            object,
            1,
            &SpatialAdjustment::default(),
            connectivity,
            &mut ledger,
        )
    }

    fn has(relations: &[SpatialRelation], pred: Predicate) -> bool {
        relations.iter().any(|r| r.predicate == pred)
    }

    // ── resting contact ─────────────────────────────────────────────────────

    #[test]
    fn cube_on_table_is_ontop_above_near_aligned() {
        let (table, cube) = boxes();
        let rels = deduce(&cube, &table, false);
        assert!(has(&rels, Predicate::Ontop));
        assert!(has(&rels, Predicate::Above));
        assert!(has(&rels, Predicate::Near));
        assert!(has(&rels, Predicate::Aligned));
        assert!(has(&rels, Predicate::UpperSide));
        assert!(!has(&rels, Predicate::Overlapping));
        assert!(!has(&rels, Predicate::Far));
    }

    #[test]
    fn table_under_cube_is_beneath() {
        let (table, cube) = boxes();
        let rels = deduce(&table, &cube, false);
        assert!(has(&rels, Predicate::Beneath));
        assert!(has(&rels, Predicate::Below));
        assert!(!has(&rels, Predicate::Ontop));
    }

    #[test]
    fn boundary_exact_resting_reads_as_zero_gap() {
        // 0.5 + 0.2 is not representable in f32: the cube's bottom corners
        // land ~1.5e-8 inside the table's top face.  The offset must snap
        // to an exact-zero gap instead of skipping the contact branch.
        let (table, cube) = boxes();
        let rels = deduce(&table, &cube, false);
        let beneath = rels
            .iter()
            .find(|r| r.predicate == Predicate::Beneath)
            .expect("beneath contact");
        assert_eq!(beneath.delta, 0.0);
        assert!(has(&rels, Predicate::LowerSide));
        assert!(!has(&rels, Predicate::Overlapping));

        let rels = deduce(&cube, &table, false);
        let ontop = rels
            .iter()
            .find(|r| r.predicate == Predicate::Ontop)
            .expect("ontop contact");
        assert_eq!(ontop.delta, 0.0);
    }

    #[test]
    fn connectivity_emits_on_once_per_pair() {
        let (table, cube) = boxes();
        let mut ledger = HashSet::new();
        let adj = SpatialAdjustment::default();
        let first = deduce_topology(&cube, 0, &table, 1, &adj, true, &mut ledger);
        assert!(has(&first, Predicate::On));
        // same pair from the other side: the ledger suppresses a second one
        let second = deduce_topology(&table, 1, &cube, 0, &adj, true, &mut ledger);
        assert!(!has(&second, Predicate::On));
    }

    // ── lateral contact ─────────────────────────────────────────────────────

    #[test]
    fn side_by_side_cubes_touch() {
        // rotated by 0.3 rad the small cube's xz footprint widens to
        // 0.4·(cos+sin) ≈ 0.5003, so its nearest corner sits 5 mm off the face
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(0.7552, 0.1, 0.0))
            .with_dimensions(0.4, 0.4, 0.4)
            .with_angle(0.3);
        let rels = deduce(&b, &a, false);
        assert!(has(&rels, Predicate::Right));
        assert!(has(&rels, Predicate::Touching));
        assert!(!has(&rels, Predicate::Meeting));
    }

    #[test]
    fn right_angle_contact_is_meeting() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(0.0, 0.0, 1.005))
            .with_dimensions(1.0, 1.0, 1.0)
            .with_angle(FRAC_PI_2);
        let rels = deduce(&b, &a, false);
        assert!(has(&rels, Predicate::FrontSide));
        assert!(has(&rels, Predicate::Meeting));
        assert!(!has(&rels, Predicate::Touching));
    }

    #[test]
    fn separated_cubes_have_side_but_no_contact() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(1.5, 0.0, 0.0))
            .with_dimensions(1.0, 1.0, 1.0);
        let rels = deduce(&b, &a, false);
        assert!(has(&rels, Predicate::RightSide));
        assert!(has(&rels, Predicate::Beside));
        assert!(!has(&rels, Predicate::Touching));
        assert!(!has(&rels, Predicate::Meeting));
    }

    // ── enclosure ───────────────────────────────────────────────────────────

    #[test]
    fn small_box_in_large_box() {
        let room = SpatialObject::new("room").with_dimensions(4.0, 3.0, 4.0);
        let chest = SpatialObject::new("chest")
            .with_position(Vec3::new(1.0, 0.0, 1.0))
            .with_dimensions(0.5, 0.5, 0.5);
        let rels = deduce(&chest, &room, false);
        assert!(has(&rels, Predicate::Inside));
        assert!(!has(&rels, Predicate::Containing));
        assert!(!has(&rels, Predicate::Disjoint));

        let back = deduce(&room, &chest, false);
        assert!(has(&back, Predicate::Containing));
        assert!(!has(&back, Predicate::Inside));
    }

    #[test]
    fn enclosure_emits_in_with_connectivity() {
        let room = SpatialObject::new("room").with_dimensions(4.0, 3.0, 4.0);
        let chest = SpatialObject::new("chest")
            .with_position(Vec3::new(1.0, 0.0, 1.0))
            .with_dimensions(0.5, 0.5, 0.5);
        let rels = deduce(&chest, &room, true);
        assert!(has(&rels, Predicate::In));
    }

    #[test]
    fn partial_penetration_is_overlapping() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(0.5, 0.2, 0.3))
            .with_dimensions(1.0, 1.0, 1.0);
        let rels = deduce(&b, &a, false);
        assert!(has(&rels, Predicate::Overlapping));
        assert!(!has(&rels, Predicate::Disjoint));
    }

    #[test]
    fn beam_through_wall_is_crossing() {
        let wall = SpatialObject::new("wall").with_dimensions(0.2, 2.0, 4.0);
        let beam = SpatialObject::new("beam")
            .with_position(Vec3::new(0.0, 0.9, 0.0))
            .with_dimensions(3.0, 0.1, 0.1);
        let rels = deduce(&beam, &wall, false);
        assert!(has(&rels, Predicate::Crossing));
        assert!(!has(&rels, Predicate::Overlapping));
    }

    #[test]
    fn distant_cubes_are_far_and_disjoint() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(10.0, 0.0, 0.0))
            .with_dimensions(1.0, 1.0, 1.0);
        let rels = deduce(&b, &a, false);
        assert!(has(&rels, Predicate::Far));
        assert!(has(&rels, Predicate::Disjoint));
        assert!(!has(&rels, Predicate::Near));
        assert!(!has(&rels, Predicate::Beside));
    }

    // ── orientation ─────────────────────────────────────────────────────────

    #[test]
    fn yaw_relations() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let opposite = SpatialObject::new("o")
            .with_position(Vec3::new(3.0, 0.0, 0.0))
            .with_dimensions(1.0, 1.0, 1.0)
            .with_angle(PI);
        let orthogonal = SpatialObject::new("q")
            .with_position(Vec3::new(3.0, 0.0, 0.0))
            .with_dimensions(1.0, 1.0, 1.0)
            .with_angle(FRAC_PI_2);
        assert!(has(&deduce(&opposite, &a, false), Predicate::Opposite));
        assert!(has(&deduce(&orthogonal, &a, false), Predicate::Orthogonal));
    }

    #[test]
    fn coplanar_front_faces_are_frontaligned() {
        let wall = SpatialObject::new("wall").with_dimensions(4.0, 2.5, 0.3);
        let door = SpatialObject::new("door")
            .with_position(Vec3::new(1.0, 0.0, 0.0))
            .with_dimensions(0.9, 2.0, 0.3);
        let rels = deduce(&door, &wall, false);
        assert!(has(&rels, Predicate::Aligned));
        assert!(has(&rels, Predicate::FrontAligned));
        assert!(has(&rels, Predicate::BackAligned));
    }

    // ── sectoriality ────────────────────────────────────────────────────────

    #[test]
    fn sector_cell_of_raised_neighbour() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(1.2, 1.2, 0.0))
            .with_dimensions(0.2, 0.2, 0.2);
        let rels = deduce_sectoriality(&b, 0, &a, 1, &SpatialAdjustment::default());
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].predicate.name(), "ro");
    }

    #[test]
    fn sector_beyond_extrusion_is_silent() {
        let a = SpatialObject::new("a").with_dimensions(1.0, 1.0, 1.0);
        let b = SpatialObject::new("b")
            .with_position(Vec3::new(40.0, 0.0, 0.0))
            .with_dimensions(0.2, 0.2, 0.2);
        let rels = deduce_sectoriality(&b, 0, &a, 1, &SpatialAdjustment::default());
        assert!(rels.is_empty());
    }
}
