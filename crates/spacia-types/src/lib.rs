//! `spacia-types` – shared vocabulary of the Spacia workspace.
//!
//! Every other crate builds on the types defined here:
//!
//! - [`ObjectExistence`], [`ObjectCause`], [`ObjectShape`] – the closed
//!   classification enums carried by every spatial object.
//! - [`ObjectConfidence`] – per-aspect plausibility scores in `[0, 1]`.
//! - [`AttrValue`] – the dynamic value type used for auxiliary object
//!   attributes, expression evaluation, and object import/export maps.
//! - [`SpatialError`] – the workspace-wide error enum.
//!
//! All classification enums parse *infallibly*: unknown text maps to the
//! `Unknown`/`Undefined` variant instead of failing, so payloads produced by
//! newer peers degrade gracefully.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Classification enums
// ────────────────────────────────────────────────────────────────────────────

/// How an object exists: as a physical thing, a virtual overlay, a pure
/// concept, or an aggregate produced by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectExistence {
    Real,
    Virtual,
    Conceptual,
    Aggregational,
    #[default]
    Undefined,
}

impl ObjectExistence {
    /// Parse from its snake_case name; anything unrecognised becomes
    /// [`ObjectExistence::Undefined`].
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "real" => Self::Real,
            "virtual" => Self::Virtual,
            "conceptual" => Self::Conceptual,
            "aggregational" => Self::Aggregational,
            _ => Self::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Virtual => "virtual",
            Self::Conceptual => "conceptual",
            Self::Aggregational => "aggregational",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for ObjectExistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an object came from: detected by a sensor pipeline, captured or
/// generated by a user, produced by a reasoning rule, or created remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCause {
    PlaneDetected,
    ObjectDetected,
    SelfTracked,
    UserCaptured,
    UserGenerated,
    RuleProduced,
    RemoteCreated,
    #[default]
    Unknown,
}

impl ObjectCause {
    /// Parse from its snake_case name; anything unrecognised becomes
    /// [`ObjectCause::Unknown`].
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "plane_detected" => Self::PlaneDetected,
            "object_detected" => Self::ObjectDetected,
            "self_tracked" => Self::SelfTracked,
            "user_captured" => Self::UserCaptured,
            "user_generated" => Self::UserGenerated,
            "rule_produced" => Self::RuleProduced,
            "remote_created" => Self::RemoteCreated,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlaneDetected => "plane_detected",
            Self::ObjectDetected => "object_detected",
            Self::SelfTracked => "self_tracked",
            Self::UserCaptured => "user_captured",
            Self::UserGenerated => "user_generated",
            Self::RuleProduced => "rule_produced",
            Self::RemoteCreated => "remote_created",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ObjectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse geometric shape classification of an object's bounding volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectShape {
    Planar,
    Cubical,
    Spherical,
    Cylindrical,
    Conical,
    Irregular,
    Changing,
    #[default]
    Unknown,
}

impl ObjectShape {
    /// Parse from its snake_case name; anything unrecognised becomes
    /// [`ObjectShape::Unknown`].
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "planar" => Self::Planar,
            "cubical" => Self::Cubical,
            "spherical" => Self::Spherical,
            "cylindrical" => Self::Cylindrical,
            "conical" => Self::Conical,
            "irregular" => Self::Irregular,
            "changing" => Self::Changing,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planar => "planar",
            Self::Cubical => "cubical",
            Self::Spherical => "spherical",
            Self::Cylindrical => "cylindrical",
            Self::Conical => "conical",
            Self::Irregular => "irregular",
            Self::Changing => "changing",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ObjectShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ObjectConfidence
// ────────────────────────────────────────────────────────────────────────────

/// Independent plausibility scores for the different aspects of an object,
/// each in `[0.0, 1.0]`.
///
/// The derived [`spatial`][ObjectConfidence::spatial] score averages the pose
/// and dimension confidences and is what most spatial consumers care about.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ObjectConfidence {
    /// Confidence in the object's position and orientation.
    pub pose: f32,
    /// Confidence in width/height/depth.
    pub dimension: f32,
    /// Confidence in the `label` classification.
    pub label: f32,
    /// Confidence in the free-text `look` description.
    pub look: f32,
}

impl ObjectConfidence {
    /// Create a confidence record, clamping every score to `[0, 1]`.
    pub fn new(pose: f32, dimension: f32, label: f32, look: f32) -> Self {
        Self {
            pose: pose.clamp(0.0, 1.0),
            dimension: dimension.clamp(0.0, 1.0),
            label: label.clamp(0.0, 1.0),
            look: look.clamp(0.0, 1.0),
        }
    }

    /// Derived overall spatial plausibility: mean of pose and dimension.
    pub fn spatial(&self) -> f32 {
        (self.pose + self.dimension) / 2.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AttrValue
// ────────────────────────────────────────────────────────────────────────────

/// A dynamically typed attribute value.
///
/// Used for the open-ended auxiliary attributes of a spatial object, for the
/// flat import/export map, and as the value domain of pipeline expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f32),
    Text(String),
}

impl AttrValue {
    /// Numeric view. `Text` that parses as a float is accepted so that
    /// imported string maps round-trip through arithmetic.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(t) => t.trim().parse().ok(),
            AttrValue::Bool(_) => None,
        }
    }

    /// Boolean view. A bare boolean attribute in a filter expression
    /// evaluates through this (`attr` ≡ `attr == true`).
    pub fn truthy(&self) -> bool {
        match self {
            AttrValue::Bool(b) => *b,
            AttrValue::Number(n) => *n != 0.0,
            AttrValue::Text(t) => t == "true",
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            AttrValue::Text(t) => t.clone(),
            AttrValue::Number(n) => format!("{n}"),
            AttrValue::Bool(b) => format!("{b}"),
        }
    }

    /// Ordering used by comparison operators: numeric when both sides are
    /// numeric, lexicographic for text, `false < true` for booleans.
    pub fn compare(&self, other: &AttrValue) -> Option<Ordering> {
        match (self, other) {
            (AttrValue::Bool(a), AttrValue::Bool(b)) => Some(a.cmp(b)),
            (AttrValue::Text(a), AttrValue::Text(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.as_number()?;
                let b = other.as_number()?;
                Some(a.total_cmp(&b))
            }
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(t) => f.write_str(t),
        }
    }
}

impl From<f32> for AttrValue {
    fn from(n: f32) -> Self {
        AttrValue::Number(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<&str> for AttrValue {
    fn from(t: &str) -> Self {
        AttrValue::Text(t.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(t: String) -> Self {
        AttrValue::Text(t)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SpatialError
// ────────────────────────────────────────────────────────────────────────────

/// Workspace-wide error type.
///
/// Pipeline stages capture these as text on the failing stage rather than
/// propagating them across `Reasoner::run`; library entry points that can
/// fail structurally (import, parsing) return them directly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    #[error("cannot parse arguments of {op}({args}): {details}")]
    Parse {
        op: String,
        args: String,
        details: String,
    },

    #[error("expression error: {0}")]
    Expression(String),

    #[error("invalid adjustment: {0}")]
    Adjustment(String),

    #[error("unknown production rule '{0}'")]
    UnknownRule(String),

    #[error("object index {index} out of range (fact base holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot import object: {0}")]
    Import(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── classification enums ────────────────────────────────────────────────

    #[test]
    fn existence_serde_roundtrip() {
        let json = serde_json::to_string(&ObjectExistence::Aggregational).unwrap();
        assert_eq!(json, "\"aggregational\"");
        let back: ObjectExistence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ObjectExistence::Aggregational);
    }

    #[test]
    fn existence_parse_unknown_is_undefined() {
        assert_eq!(ObjectExistence::parse("holographic"), ObjectExistence::Undefined);
        assert_eq!(ObjectExistence::parse(" real "), ObjectExistence::Real);
    }

    #[test]
    fn cause_parse_and_display_agree() {
        for cause in [
            ObjectCause::PlaneDetected,
            ObjectCause::SelfTracked,
            ObjectCause::RuleProduced,
            ObjectCause::Unknown,
        ] {
            assert_eq!(ObjectCause::parse(cause.as_str()), cause);
        }
    }

    #[test]
    fn shape_parse_unknown_is_unknown() {
        assert_eq!(ObjectShape::parse("dodecahedral"), ObjectShape::Unknown);
        assert_eq!(ObjectShape::parse("planar"), ObjectShape::Planar);
    }

    // ── ObjectConfidence ────────────────────────────────────────────────────

    #[test]
    fn confidence_clamps_scores() {
        let c = ObjectConfidence::new(1.5, -0.2, 0.5, 0.5);
        assert!((c.pose - 1.0).abs() < f32::EPSILON);
        assert!(c.dimension.abs() < f32::EPSILON);
    }

    #[test]
    fn spatial_is_mean_of_pose_and_dimension() {
        let c = ObjectConfidence::new(0.8, 0.4, 0.0, 0.0);
        assert!((c.spatial() - 0.6).abs() < 1e-6);
    }

    // ── AttrValue ───────────────────────────────────────────────────────────

    #[test]
    fn attr_value_untagged_serde() {
        let v: AttrValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(v, AttrValue::Number(3.5));
        let v: AttrValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, AttrValue::Bool(true));
        let v: AttrValue = serde_json::from_str("\"door\"").unwrap();
        assert_eq!(v, AttrValue::Text("door".into()));
    }

    #[test]
    fn attr_value_numeric_coercion_from_text() {
        assert_eq!(AttrValue::from("2.5").as_number(), Some(2.5));
        assert_eq!(AttrValue::from("wall").as_number(), None);
        assert_eq!(AttrValue::Bool(true).as_number(), None);
    }

    #[test]
    fn attr_value_truthiness() {
        assert!(AttrValue::Bool(true).truthy());
        assert!(!AttrValue::Bool(false).truthy());
        assert!(AttrValue::Number(1.0).truthy());
        assert!(!AttrValue::Number(0.0).truthy());
        assert!(AttrValue::from("true").truthy());
        assert!(!AttrValue::from("yes").truthy());
    }

    #[test]
    fn attr_value_mixed_comparison() {
        let a = AttrValue::Number(1.0);
        let b = AttrValue::from("2.0");
        assert_eq!(a.compare(&b), Some(Ordering::Less));

        let t1 = AttrValue::from("alpha");
        let t2 = AttrValue::from("beta");
        assert_eq!(t1.compare(&t2), Some(Ordering::Less));

        // Text that is not numeric cannot be compared with a number.
        assert_eq!(AttrValue::Number(1.0).compare(&AttrValue::from("wall")), None);
    }

    // ── SpatialError ────────────────────────────────────────────────────────

    #[test]
    fn error_display_contains_context() {
        let err = SpatialError::Parse {
            op: "slice".into(),
            args: "x..y".into(),
            details: "bad range bound".into(),
        };
        assert!(err.to_string().contains("slice"));
        assert!(err.to_string().contains("bad range bound"));

        let err = SpatialError::IndexOutOfRange { index: 9, len: 3 };
        assert!(err.to_string().contains('9'));
    }
}
