//! A single inferred relation between two objects.
//!
//! Relations are index pairs into the reasoner's object arena, never owned
//! copies: `subject predicate object`, with the measured gap (`delta`) and
//! yaw difference or bearing (`angle`) that produced the verdict.

use crate::predicate::Predicate;
use spacia_geometry::SpatialObject;
use std::fmt;

/// `subject predicate object`, by arena index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialRelation {
    /// Index of the subject in the object arena.
    pub subject: usize,
    /// Index of the reference object in the arena.
    pub object: usize,
    pub predicate: Predicate,
    /// Measured gap or distance in metres; negative when penetrating.
    pub delta: f32,
    /// Yaw difference or bearing in radians, when meaningful.
    pub angle: f32,
}

impl SpatialRelation {
    pub fn new(subject: usize, predicate: Predicate, object: usize) -> Self {
        Self {
            subject,
            object,
            predicate,
            delta: 0.0,
            angle: 0.0,
        }
    }

    pub fn with_delta(mut self, delta: f32) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Render the relation for a human reader using the predicate's term
    /// table and the objects' labels (falling back to ids).
    pub fn describe(&self, objects: &[SpatialObject]) -> String {
        let name = |index: usize| -> &str {
            match objects.get(index) {
                Some(obj) if !obj.label.is_empty() => &obj.label,
                Some(obj) => &obj.id,
                None => "?",
            }
        };
        let term = self.predicate.term();
        if let Predicate::Sector(sector) = self.predicate {
            format!(
                "{} {} {} {} {}",
                name(self.subject),
                term.verb,
                sector.label(),
                term.preposition,
                name(self.object)
            )
        } else {
            format!(
                "{} {} {} {}",
                name(self.subject),
                term.verb,
                term.preposition,
                name(self.object)
            )
        }
    }
}

impl fmt::Display for SpatialRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} #{}", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_uses_labels() {
        let objects = vec![
            SpatialObject::new("b1").with_label("box"),
            SpatialObject::new("t1").with_label("table"),
        ];
        let rel = SpatialRelation::new(0, Predicate::Ontop, 1).with_delta(0.01);
        assert_eq!(rel.describe(&objects), "box is on top of table");
    }

    #[test]
    fn describe_falls_back_to_id() {
        let objects = vec![SpatialObject::new("a"), SpatialObject::new("b")];
        let rel = SpatialRelation::new(1, Predicate::Near, 0);
        assert_eq!(rel.describe(&objects), "b is near a");
    }

    #[test]
    fn describe_sector_names_the_cell() {
        let objects = vec![
            SpatialObject::new("a").with_label("cup"),
            SpatialObject::new("b").with_label("shelf"),
        ];
        let pred = Predicate::parse("ao");
        let rel = SpatialRelation::new(0, pred, 1);
        assert_eq!(rel.describe(&objects), "cup is in sector ao of shelf");
    }
}
