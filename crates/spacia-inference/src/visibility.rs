//! Egocentric bearing and reach deduction.
//!
//! Bearings only make sense from a self-tracked observer (the device or
//! agent the session is anchored to), so [`deduce_visibility`] emits nothing
//! for any other reference object.  The observer's field of view is divided
//! into 30° clock-hour buckets centred on the hours, `12` straight ahead and
//! `3` to the right; the rear hours 5–7 are suppressed since the observer
//! cannot see behind itself.  A subject within arm's reach is additionally
//! `tangible`.

use crate::predicate::Predicate;
use crate::relation::SpatialRelation;
use spacia_geometry::SpatialObject;
use spacia_types::ObjectCause;

/// Reach distance for `tangible`, in metres.
pub const ARM_REACH: f32 = 1.25;

/// Half-width of a clock-hour bucket, in radians (15°).
const HOUR: f32 = std::f32::consts::PI / 6.0;

/// Deduce bearing and reach relations of `subject` as seen by `observer`.
/// Empty unless the observer is self-tracked.
pub fn deduce_visibility(
    subject: &SpatialObject,
    subject_idx: usize,
    observer: &SpatialObject,
    observer_idx: usize,
) -> Vec<SpatialRelation> {
    if observer.cause != ObjectCause::SelfTracked {
        return Vec::new();
    }
    let mut relations = Vec::new();
    let local = observer.into_local(subject.center());
    let distance = local.length();
    // 0 is straight ahead, positive clockwise (to the observer's right)
    let azimuth = local.x.atan2(local.z);
    let hour = (azimuth / HOUR).round() as i32;
    let bearing = match hour {
        0 => Some(Predicate::TwelveOClock),
        1 => Some(Predicate::OneOClock),
        2 => Some(Predicate::TwoOClock),
        3 => Some(Predicate::ThreeOClock),
        4 => Some(Predicate::FourOClock),
        -1 => Some(Predicate::ElevenOClock),
        -2 => Some(Predicate::TenOClock),
        -3 => Some(Predicate::NineOClock),
        -4 => Some(Predicate::EightOClock),
        // hours 5–7: behind the observer
        _ => None,
    };
    if let Some(pred) = bearing {
        relations.push(
            SpatialRelation::new(subject_idx, pred, observer_idx)
                .with_delta(distance)
                .with_angle(azimuth),
        );
    }
    if distance <= ARM_REACH {
        relations.push(
            SpatialRelation::new(subject_idx, Predicate::Tangible, observer_idx)
                .with_delta(distance)
                .with_angle(azimuth),
        );
    }
    relations
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacia_geometry::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn observer() -> SpatialObject {
        SpatialObject::new("me")
            .with_cause(ObjectCause::SelfTracked)
            .with_dimensions(0.2, 0.2, 0.2)
    }

    fn subject_at(x: f32, z: f32) -> SpatialObject {
        SpatialObject::new("thing")
            .with_position(Vec3::new(x, 0.0, z))
            .with_dimensions(0.2, 0.2, 0.2)
    }

    fn bearing_of(subject: &SpatialObject, observer: &SpatialObject) -> Option<Predicate> {
        deduce_visibility(subject, 0, observer, 1)
            .into_iter()
            .map(|r| r.predicate)
            .find(|p| *p != Predicate::Tangible)
    }

    #[test]
    fn straight_ahead_is_twelve() {
        assert_eq!(
            bearing_of(&subject_at(0.0, 2.0), &observer()),
            Some(Predicate::TwelveOClock)
        );
    }

    #[test]
    fn right_is_three_left_is_nine() {
        assert_eq!(
            bearing_of(&subject_at(2.0, 0.0), &observer()),
            Some(Predicate::ThreeOClock)
        );
        assert_eq!(
            bearing_of(&subject_at(-2.0, 0.0), &observer()),
            Some(Predicate::NineOClock)
        );
    }

    #[test]
    fn behind_is_suppressed() {
        assert_eq!(bearing_of(&subject_at(0.0, -2.0), &observer()), None);
        assert_eq!(bearing_of(&subject_at(0.3, -2.0), &observer()), None);
    }

    #[test]
    fn bearing_follows_observer_yaw() {
        // observer turned 90° to the left: a point ahead in world space is
        // now off its right shoulder
        let turned = observer().with_angle(FRAC_PI_2);
        assert_eq!(
            bearing_of(&subject_at(0.0, 2.0), &turned),
            Some(Predicate::ThreeOClock)
        );
    }

    #[test]
    fn within_reach_is_tangible() {
        let rels = deduce_visibility(&subject_at(0.0, 1.0), 0, &observer(), 1);
        assert!(rels.iter().any(|r| r.predicate == Predicate::Tangible));
        let rels = deduce_visibility(&subject_at(0.0, 3.0), 0, &observer(), 1);
        assert!(!rels.iter().any(|r| r.predicate == Predicate::Tangible));
    }

    #[test]
    fn non_observer_reference_is_silent() {
        let plain = SpatialObject::new("other").with_dimensions(0.2, 0.2, 0.2);
        assert!(deduce_visibility(&subject_at(0.0, 2.0), 0, &plain, 1).is_empty());
    }
}
