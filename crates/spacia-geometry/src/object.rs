//! [`SpatialObject`] – the unit of spatial reasoning.
//!
//! An oriented 3-D bounding box with identity, classification, confidence,
//! and motion.  `position` anchors the **centre of the bottom face**; the box
//! extends `width` along local x, `height` up, and `depth` along local z,
//! yawed counter-clockwise by `angle` about the vertical axis.
//!
//! The object owns its own geometric queries: world-space corners, the
//! world→local frame transform, sector classification of a local point, and
//! the schema-driven nearby radius and sector extrusion lengths.  All derived
//! metrics (volume, surface, radius, …) are pure functions of the current
//! dimensions and are never cached.
//!
//! # Example
//!
//! ```rust
//! use spacia_geometry::object::SpatialObject;
//! use spacia_geometry::vector::Vec3;
//!
//! let table = SpatialObject::new("table")
//!     .with_position(Vec3::new(1.0, 0.0, 2.0))
//!     .with_dimensions(1.2, 0.7, 0.8);
//!
//! assert!((table.volume() - 1.2 * 0.7 * 0.8).abs() < 1e-6);
//! assert!((table.center().y - 0.35).abs() < 1e-6);
//! ```

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use spacia_types::{AttrValue, ObjectCause, ObjectConfidence, ObjectExistence, ObjectShape, SpatialError};

use crate::adjustment::{NearbySchema, SectorSchema, SpatialAdjustment};
use crate::sector::BBoxSector;
use crate::vector::Vec3;

/// Position updates closer together than this are treated as jitter and do
/// not feed the velocity estimate (guards the division by elapsed time).
const VELOCITY_JITTER_SECS: f32 = 0.003;

// ────────────────────────────────────────────────────────────────────────────
// MainDirection
// ────────────────────────────────────────────────────────────────────────────

/// The axis along which a "long" object extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MainDirection {
    /// No dominant extent.
    #[default]
    None,
    Width,
    Height,
    Depth,
}

// ────────────────────────────────────────────────────────────────────────────
// SpatialObject
// ────────────────────────────────────────────────────────────────────────────

/// A labeled, oriented 3-D bounding box.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SpatialObject {
    /// Unique id within a fact base.
    pub id: String,
    pub existence: ObjectExistence,
    pub cause: ObjectCause,
    pub shape: ObjectShape,
    /// Classification label (e.g. `"chair"`).
    pub label: String,
    /// Type name used for taxonomy (`isa`) resolution.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text appearance description.
    pub look: String,
    /// Centre of the bottom face, world frame (metres).
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Yaw about the vertical axis, counter-clockwise (radians).
    pub angle: f32,
    /// Suppresses velocity tracking when set.
    pub immobile: bool,
    /// Derived from successive position updates; zero while unobserved.
    pub velocity: Vec3,
    pub confidence: ObjectConfidence,
    pub visible: bool,
    pub focused: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Open-ended auxiliary attributes, preserved opaquely on import/export.
    #[serde(default)]
    pub aux: BTreeMap<String, AttrValue>,
}

impl SpatialObject {
    /// Create an object with zeroed geometry at the world origin.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            existence: ObjectExistence::default(),
            cause: ObjectCause::default(),
            shape: ObjectShape::default(),
            label: String::new(),
            kind: String::new(),
            look: String::new(),
            position: Vec3::zero(),
            width: 0.0,
            height: 0.0,
            depth: 0.0,
            angle: 0.0,
            immobile: false,
            velocity: Vec3::zero(),
            confidence: ObjectConfidence::default(),
            visible: false,
            focused: false,
            created: now,
            updated: now,
            aux: BTreeMap::new(),
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Dimensions are clamped to be non-negative.
    pub fn with_dimensions(mut self, width: f32, height: f32, depth: f32) -> Self {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.depth = depth.max(0.0);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_cause(mut self, cause: ObjectCause) -> Self {
        self.cause = cause;
        self
    }

    // ── dynamics ────────────────────────────────────────────────────────────

    /// Move the object, updating the derived velocity.
    ///
    /// Velocity is recomputed only when the object is not `immobile` and the
    /// elapsed time since the previous update exceeds the jitter threshold.
    pub fn set_position(&mut self, position: Vec3) {
        self.set_position_at(position, Utc::now());
    }

    /// [`set_position`][Self::set_position] with an explicit timestamp.
    pub fn set_position_at(&mut self, position: Vec3, when: DateTime<Utc>) {
        let elapsed = (when - self.updated).num_microseconds().unwrap_or(0) as f32 / 1e6;
        if !self.immobile && elapsed > VELOCITY_JITTER_SECS {
            self.velocity = position.sub(self.position).scaled(1.0 / elapsed);
            debug!(id = %self.id, speed = self.speed(), "velocity updated");
        }
        self.position = position;
        self.updated = when;
    }

    /// Seconds since creation.
    pub fn lifespan(&self) -> f32 {
        (Utc::now() - self.created).num_milliseconds() as f32 / 1e3
    }

    /// Seconds since the last update.
    pub fn update_interval(&self) -> f32 {
        (Utc::now() - self.updated).num_milliseconds() as f32 / 1e3
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Azimuth of the motion vector on the footprint plane (radians).
    pub fn motion_angle(&self) -> f32 {
        if self.speed() < f32::EPSILON {
            0.0
        } else {
            self.velocity.x.atan2(self.velocity.z)
        }
    }

    // ── derived metrics (pure functions of the dimensions) ──────────────────

    /// Box centre: position shifted up by half the height.
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.position.x, self.position.y + self.height / 2.0, self.position.z)
    }

    pub fn volume(&self) -> f32 {
        self.width * self.height * self.depth
    }

    /// Footprint area (width × depth).
    pub fn footprint(&self) -> f32 {
        self.width * self.depth
    }

    /// Total surface area of the box.
    pub fn surface(&self) -> f32 {
        2.0 * (self.width * self.depth + self.width * self.height + self.depth * self.height)
    }

    /// Area of the front/back faces (width × height).
    pub fn front_face(&self) -> f32 {
        self.width * self.height
    }

    /// Area of the side faces (depth × height).
    pub fn side_face(&self) -> f32 {
        self.depth * self.height
    }

    /// Footprint perimeter.
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width + self.depth)
    }

    /// Radius of the circumscribed sphere.
    pub fn radius(&self) -> f32 {
        (self.width * self.width + self.height * self.height + self.depth * self.depth).sqrt()
            / 2.0
    }

    /// Radius of the footprint's bounding circle.
    pub fn base_radius(&self) -> f32 {
        (self.width * self.width + self.depth * self.depth).sqrt() / 2.0
    }

    /// The largest extent.
    pub fn main_length(&self) -> f32 {
        self.width.max(self.height).max(self.depth)
    }

    /// True when the largest extent is at least `long_ratio` times the
    /// second largest.
    pub fn is_long(&self, adjustment: &SpatialAdjustment) -> bool {
        let mut dims = [self.width, self.height, self.depth];
        dims.sort_by(f32::total_cmp);
        dims[1] > 0.0 && dims[2] >= adjustment.long_ratio * dims[1]
    }

    /// True when the smallest extent times `thin_ratio` still fits within
    /// each of the other two.
    pub fn is_thin(&self, adjustment: &SpatialAdjustment) -> bool {
        let mut dims = [self.width, self.height, self.depth];
        dims.sort_by(f32::total_cmp);
        dims[0] > 0.0 && dims[0] * adjustment.thin_ratio <= dims[1]
    }

    /// Axis of the dominant extent, or `None` when the object is not long.
    pub fn main_direction(&self, adjustment: &SpatialAdjustment) -> MainDirection {
        if !self.is_long(adjustment) {
            return MainDirection::None;
        }
        if self.width >= self.height && self.width >= self.depth {
            MainDirection::Width
        } else if self.height >= self.width && self.height >= self.depth {
            MainDirection::Height
        } else {
            MainDirection::Depth
        }
    }

    // ── box geometry ────────────────────────────────────────────────────────

    /// The 8 corners in the object's local, centre-anchored frame:
    /// bottom face first (−y), counter-clockwise from (−x, −z).
    pub fn local_corners(&self) -> [Vec3; 8] {
        let (hw, hh, hd) = (self.width / 2.0, self.height / 2.0, self.depth / 2.0);
        [
            Vec3::new(-hw, -hh, -hd),
            Vec3::new(hw, -hh, -hd),
            Vec3::new(hw, -hh, hd),
            Vec3::new(-hw, -hh, hd),
            Vec3::new(-hw, hh, -hd),
            Vec3::new(hw, hh, -hd),
            Vec3::new(hw, hh, hd),
            Vec3::new(-hw, hh, hd),
        ]
    }

    /// The 8 corners in world space.
    pub fn corners(&self) -> [Vec3; 8] {
        let center = self.center();
        self.local_corners().map(|c| c.to_world(center, self.angle))
    }

    /// Transform a world point into this object's local frame (anchored at
    /// the box centre, yaw removed).
    pub fn into_local(&self, point: Vec3) -> Vec3 {
        point.to_local(self.center(), self.angle)
    }

    /// Classify a local-frame point into a [`BBoxSector`].
    ///
    /// A point within all three half-extents ± `epsilon` is `INSIDE`;
    /// otherwise the flag for each exceeded axis is set independently.
    pub fn sector_of(&self, local: Vec3, epsilon: f32) -> BBoxSector {
        let (hw, hh, hd) = (self.width / 2.0, self.height / 2.0, self.depth / 2.0);
        let mut sector = BBoxSector::empty();
        if local.x > hw + epsilon {
            sector |= BBoxSector::RIGHT;
        } else if local.x < -hw - epsilon {
            sector |= BBoxSector::LEFT;
        }
        if local.y > hh + epsilon {
            sector |= BBoxSector::OVER;
        } else if local.y < -hh - epsilon {
            sector |= BBoxSector::UNDER;
        }
        if local.z > hd + epsilon {
            sector |= BBoxSector::AHEAD;
        } else if local.z < -hd - epsilon {
            sector |= BBoxSector::BEHIND;
        }
        if sector.is_empty() {
            BBoxSector::INSIDE
        } else {
            sector
        }
    }

    /// Radius within which other objects count as "nearby", per the
    /// configured schema, clamped to the configured limit.
    pub fn nearby_radius(&self, adjustment: &SpatialAdjustment) -> f32 {
        let raw = match adjustment.nearby_schema {
            NearbySchema::Fixed => adjustment.nearby_factor,
            NearbySchema::Circle => self.base_radius() * adjustment.nearby_factor,
            NearbySchema::Sphere => self.radius() * adjustment.nearby_factor,
            NearbySchema::Perimeter => self.perimeter() * adjustment.nearby_factor,
            NearbySchema::Area => self.footprint() * adjustment.nearby_factor,
        };
        raw.min(adjustment.nearby_limit)
    }

    /// How far the directional sector boxes extrude beyond each face,
    /// per axis (x, y, z), clamped to the configured limit.
    pub fn sector_lengths(&self, adjustment: &SpatialAdjustment) -> Vec3 {
        let uniform = |len: f32| Vec3::new(len, len, len);
        let raw = match adjustment.sector_schema {
            SectorSchema::Fixed => uniform(adjustment.sector_factor),
            SectorSchema::Dimension => Vec3::new(
                self.width * adjustment.sector_factor,
                self.height * adjustment.sector_factor,
                self.depth * adjustment.sector_factor,
            ),
            SectorSchema::Perimeter => uniform(self.perimeter() * adjustment.sector_factor),
            SectorSchema::Area => uniform(self.footprint() * adjustment.sector_factor),
            SectorSchema::Nearby => uniform(self.nearby_radius(adjustment)),
        };
        Vec3::new(
            raw.x.min(adjustment.sector_limit),
            raw.y.min(adjustment.sector_limit),
            raw.z.min(adjustment.sector_limit),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Attribute access (enum-keyed, for expression evaluation)
// ────────────────────────────────────────────────────────────────────────────

/// Every fixed-schema and derived attribute reachable from pipeline
/// expressions.  Unknown names fall back to the object's auxiliary map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAttr {
    Id,
    Label,
    Kind,
    Look,
    Existence,
    Cause,
    Shape,
    X,
    Y,
    Z,
    Width,
    Height,
    Depth,
    Angle,
    Volume,
    Footprint,
    Surface,
    FrontFace,
    SideFace,
    Perimeter,
    Radius,
    BaseRadius,
    Length,
    Speed,
    MotionAngle,
    Confidence,
    ConfidencePose,
    ConfidenceDimension,
    ConfidenceLabel,
    ConfidenceLook,
    Immobile,
    Visible,
    Focused,
    Long,
    Thin,
    Lifespan,
    UpdateInterval,
}

impl ObjectAttr {
    /// Resolve an attribute name as used in pipeline expressions.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "id" => Self::Id,
            "label" => Self::Label,
            "type" => Self::Kind,
            "look" => Self::Look,
            "existence" => Self::Existence,
            "cause" => Self::Cause,
            "shape" => Self::Shape,
            "x" => Self::X,
            "y" => Self::Y,
            "z" => Self::Z,
            "width" => Self::Width,
            "height" => Self::Height,
            "depth" => Self::Depth,
            "angle" => Self::Angle,
            "volume" => Self::Volume,
            "footprint" => Self::Footprint,
            "surface" => Self::Surface,
            "frontface" => Self::FrontFace,
            "sideface" => Self::SideFace,
            "perimeter" => Self::Perimeter,
            "radius" => Self::Radius,
            "baseradius" => Self::BaseRadius,
            "length" => Self::Length,
            "speed" => Self::Speed,
            "motionangle" => Self::MotionAngle,
            "confidence" => Self::Confidence,
            "confidence.pose" => Self::ConfidencePose,
            "confidence.dimension" => Self::ConfidenceDimension,
            "confidence.label" => Self::ConfidenceLabel,
            "confidence.look" => Self::ConfidenceLook,
            "immobile" => Self::Immobile,
            "visible" => Self::Visible,
            "focused" => Self::Focused,
            "long" => Self::Long,
            "thin" => Self::Thin,
            "lifespan" => Self::Lifespan,
            "updateinterval" => Self::UpdateInterval,
            _ => return None,
        })
    }
}

impl SpatialObject {
    /// Typed accessor behind expression evaluation.
    pub fn get(&self, attr: ObjectAttr, adjustment: &SpatialAdjustment) -> AttrValue {
        match attr {
            ObjectAttr::Id => self.id.as_str().into(),
            ObjectAttr::Label => self.label.as_str().into(),
            ObjectAttr::Kind => self.kind.as_str().into(),
            ObjectAttr::Look => self.look.as_str().into(),
            ObjectAttr::Existence => self.existence.as_str().into(),
            ObjectAttr::Cause => self.cause.as_str().into(),
            ObjectAttr::Shape => self.shape.as_str().into(),
            ObjectAttr::X => self.position.x.into(),
            ObjectAttr::Y => self.position.y.into(),
            ObjectAttr::Z => self.position.z.into(),
            ObjectAttr::Width => self.width.into(),
            ObjectAttr::Height => self.height.into(),
            ObjectAttr::Depth => self.depth.into(),
            ObjectAttr::Angle => self.angle.into(),
            ObjectAttr::Volume => self.volume().into(),
            ObjectAttr::Footprint => self.footprint().into(),
            ObjectAttr::Surface => self.surface().into(),
            ObjectAttr::FrontFace => self.front_face().into(),
            ObjectAttr::SideFace => self.side_face().into(),
            ObjectAttr::Perimeter => self.perimeter().into(),
            ObjectAttr::Radius => self.radius().into(),
            ObjectAttr::BaseRadius => self.base_radius().into(),
            ObjectAttr::Length => self.main_length().into(),
            ObjectAttr::Speed => self.speed().into(),
            ObjectAttr::MotionAngle => self.motion_angle().into(),
            ObjectAttr::Confidence => self.confidence.spatial().into(),
            ObjectAttr::ConfidencePose => self.confidence.pose.into(),
            ObjectAttr::ConfidenceDimension => self.confidence.dimension.into(),
            ObjectAttr::ConfidenceLabel => self.confidence.label.into(),
            ObjectAttr::ConfidenceLook => self.confidence.look.into(),
            ObjectAttr::Immobile => self.immobile.into(),
            ObjectAttr::Visible => self.visible.into(),
            ObjectAttr::Focused => self.focused.into(),
            ObjectAttr::Long => self.is_long(adjustment).into(),
            ObjectAttr::Thin => self.is_thin(adjustment).into(),
            ObjectAttr::Lifespan => self.lifespan().into(),
            ObjectAttr::UpdateInterval => self.update_interval().into(),
        }
    }

    /// Attribute lookup by name: fixed schema first, auxiliary map second.
    pub fn attribute(&self, name: &str, adjustment: &SpatialAdjustment) -> Option<AttrValue> {
        match ObjectAttr::parse(name) {
            Some(attr) => Some(self.get(attr, adjustment)),
            None => self.aux.get(name).cloned(),
        }
    }

    /// Write an attribute by name.  Fixed-schema fields are updated in place
    /// (dimensions clamped non-negative); everything else lands in the
    /// auxiliary map.  Returns `true` when the stored value changed.
    pub fn set_attribute(&mut self, name: &str, value: AttrValue) -> bool {
        let adj = SpatialAdjustment::default();
        let before = self.attribute(name, &adj);
        match (ObjectAttr::parse(name), &value) {
            (Some(ObjectAttr::Label), v) => self.label = v.as_text(),
            (Some(ObjectAttr::Kind), v) => self.kind = v.as_text(),
            (Some(ObjectAttr::Look), v) => self.look = v.as_text(),
            (Some(ObjectAttr::Existence), v) => self.existence = ObjectExistence::parse(&v.as_text()),
            (Some(ObjectAttr::Cause), v) => self.cause = ObjectCause::parse(&v.as_text()),
            (Some(ObjectAttr::Shape), v) => self.shape = ObjectShape::parse(&v.as_text()),
            (Some(ObjectAttr::X), v) => self.position.x = v.as_number().unwrap_or(self.position.x),
            (Some(ObjectAttr::Y), v) => self.position.y = v.as_number().unwrap_or(self.position.y),
            (Some(ObjectAttr::Z), v) => self.position.z = v.as_number().unwrap_or(self.position.z),
            (Some(ObjectAttr::Width), v) => {
                self.width = v.as_number().unwrap_or(self.width).max(0.0)
            }
            (Some(ObjectAttr::Height), v) => {
                self.height = v.as_number().unwrap_or(self.height).max(0.0)
            }
            (Some(ObjectAttr::Depth), v) => {
                self.depth = v.as_number().unwrap_or(self.depth).max(0.0)
            }
            (Some(ObjectAttr::Angle), v) => self.angle = v.as_number().unwrap_or(self.angle),
            (Some(ObjectAttr::Immobile), v) => self.immobile = v.truthy(),
            (Some(ObjectAttr::Visible), v) => self.visible = v.truthy(),
            (Some(ObjectAttr::Focused), v) => self.focused = v.truthy(),
            (Some(_), _) => {
                // Read-only derived attribute; keep the write in aux so the
                // caller can still observe it.
                self.aux.insert(name.to_string(), value.clone());
            }
            (None, _) => {
                self.aux.insert(name.to_string(), value.clone());
            }
        }
        self.attribute(name, &adj) != before
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Import / export
// ────────────────────────────────────────────────────────────────────────────

impl SpatialObject {
    /// Export to a flat string-keyed map: the fixed schema plus every
    /// auxiliary key.
    pub fn to_attributes(&self) -> BTreeMap<String, AttrValue> {
        let mut map = BTreeMap::new();
        map.insert("id".into(), self.id.as_str().into());
        map.insert("existence".into(), self.existence.as_str().into());
        map.insert("cause".into(), self.cause.as_str().into());
        map.insert("label".into(), self.label.as_str().into());
        map.insert("type".into(), self.kind.as_str().into());
        map.insert("look".into(), self.look.as_str().into());
        map.insert("x".into(), self.position.x.into());
        map.insert("y".into(), self.position.y.into());
        map.insert("z".into(), self.position.z.into());
        map.insert("width".into(), self.width.into());
        map.insert("height".into(), self.height.into());
        map.insert("depth".into(), self.depth.into());
        map.insert("angle".into(), self.angle.into());
        map.insert("immobile".into(), self.immobile.into());
        map.insert("velocity".into(), self.speed().into());
        map.insert("shape".into(), self.shape.as_str().into());
        map.insert("visible".into(), self.visible.into());
        map.insert("focused".into(), self.focused.into());
        map.insert("confidence.pose".into(), self.confidence.pose.into());
        map.insert("confidence.dimension".into(), self.confidence.dimension.into());
        map.insert("confidence.label".into(), self.confidence.label.into());
        map.insert("confidence.look".into(), self.confidence.look.into());
        for (key, value) in &self.aux {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    /// Import from a flat attribute map.  Requires an `id`; unknown keys are
    /// preserved as auxiliary attributes.  Velocity is derived state and is
    /// not reconstructed from the map.
    pub fn from_attributes(map: &BTreeMap<String, AttrValue>) -> Result<Self, SpatialError> {
        let id = map
            .get("id")
            .map(|v| v.as_text())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SpatialError::Import("missing 'id'".into()))?;

        let number = |key: &str| -> Result<f32, SpatialError> {
            match map.get(key) {
                None => Ok(0.0),
                Some(v) => v
                    .as_number()
                    .ok_or_else(|| SpatialError::Import(format!("'{key}' is not numeric"))),
            }
        };

        let mut object = SpatialObject::new(id);
        object.position = Vec3::new(number("x")?, number("y")?, number("z")?);
        object.width = number("width")?.max(0.0);
        object.height = number("height")?.max(0.0);
        object.depth = number("depth")?.max(0.0);
        object.angle = number("angle")?;
        object.confidence = ObjectConfidence::new(
            number("confidence.pose")?,
            number("confidence.dimension")?,
            number("confidence.label")?,
            number("confidence.look")?,
        );

        for (key, value) in map {
            match key.as_str() {
                "id" | "x" | "y" | "z" | "width" | "height" | "depth" | "angle" | "velocity"
                | "confidence.pose" | "confidence.dimension" | "confidence.label"
                | "confidence.look" => {}
                "existence" => object.existence = ObjectExistence::parse(&value.as_text()),
                "cause" => object.cause = ObjectCause::parse(&value.as_text()),
                "shape" => object.shape = ObjectShape::parse(&value.as_text()),
                "label" => object.label = value.as_text(),
                "type" => object.kind = value.as_text(),
                "look" => object.look = value.as_text(),
                "immobile" => object.immobile = value.truthy(),
                "visible" => object.visible = value.truthy(),
                "focused" => object.focused = value.truthy(),
                _ => {
                    object.aux.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::f32::consts::FRAC_PI_2;

    fn unit_box(id: &str) -> SpatialObject {
        SpatialObject::new(id).with_dimensions(1.0, 1.0, 1.0)
    }

    // ── derived metrics ─────────────────────────────────────────────────────

    #[test]
    fn metrics_follow_dimensions() {
        let b = SpatialObject::new("b").with_dimensions(2.0, 1.0, 0.5);
        assert!((b.volume() - 1.0).abs() < 1e-6);
        assert!((b.footprint() - 1.0).abs() < 1e-6);
        assert!((b.perimeter() - 5.0).abs() < 1e-6);
        assert!((b.surface() - 2.0 * (1.0 + 2.0 + 0.5)).abs() < 1e-6);
        assert!((b.front_face() - 2.0).abs() < 1e-6);
        assert!((b.side_face() - 0.5).abs() < 1e-6);
        assert!((b.main_length() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn negative_dimensions_are_clamped() {
        let b = SpatialObject::new("b").with_dimensions(-1.0, 2.0, -0.5);
        assert_eq!(b.width, 0.0);
        assert_eq!(b.depth, 0.0);
    }

    #[test]
    fn center_sits_half_height_above_position() {
        let b = unit_box("b").with_position(Vec3::new(1.0, 0.5, 2.0));
        assert!((b.center().y - 1.0).abs() < 1e-6);
        assert!((b.center().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn long_and_thin_classification() {
        let adj = SpatialAdjustment::default();
        let pole = SpatialObject::new("pole").with_dimensions(0.05, 2.0, 0.05);
        assert!(pole.is_long(&adj));
        assert_eq!(pole.main_direction(&adj), MainDirection::Height);

        let wall = SpatialObject::new("wall").with_dimensions(4.0, 2.4, 0.1);
        assert!(wall.is_thin(&adj));
        assert_eq!(wall.main_direction(&adj), MainDirection::None);

        let cube = unit_box("cube");
        assert!(!cube.is_long(&adj));
        assert!(!cube.is_thin(&adj));
    }

    // ── dynamics ────────────────────────────────────────────────────────────

    #[test]
    fn velocity_from_position_updates() {
        let mut b = unit_box("b");
        let t0 = b.updated;
        b.set_position_at(Vec3::new(1.0, 0.0, 0.0), t0 + Duration::milliseconds(500));
        assert!((b.speed() - 2.0).abs() < 1e-3, "speed = {}", b.speed());
    }

    #[test]
    fn jitter_updates_do_not_touch_velocity() {
        let mut b = unit_box("b");
        let t0 = b.updated;
        b.set_position_at(Vec3::new(5.0, 0.0, 0.0), t0 + Duration::microseconds(1000));
        assert_eq!(b.speed(), 0.0);
        // Position still moves.
        assert!((b.position.x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn immobile_objects_never_gain_velocity() {
        let mut b = unit_box("b");
        b.immobile = true;
        let t0 = b.updated;
        b.set_position_at(Vec3::new(3.0, 0.0, 0.0), t0 + Duration::seconds(1));
        assert_eq!(b.speed(), 0.0);
    }

    // ── box geometry ────────────────────────────────────────────────────────

    #[test]
    fn corners_of_axis_aligned_unit_box() {
        let b = unit_box("b");
        let corners = b.corners();
        for c in corners {
            assert!((c.x.abs() - 0.5).abs() < 1e-6);
            assert!((c.z.abs() - 0.5).abs() < 1e-6);
            assert!(c.y.abs() < 1e-6 || (c.y - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn corners_respect_yaw() {
        // Quarter turn: the width axis maps onto world z.
        let b = SpatialObject::new("b")
            .with_dimensions(2.0, 1.0, 0.5)
            .with_angle(FRAC_PI_2);
        let max_z = b
            .corners()
            .iter()
            .map(|c| c.z)
            .fold(f32::MIN, f32::max);
        assert!((max_z - 1.0).abs() < 1e-5, "max_z = {max_z}");
    }

    #[test]
    fn into_local_is_center_anchored() {
        let b = unit_box("b").with_position(Vec3::new(1.0, 0.0, 1.0));
        let local = b.into_local(b.center());
        assert!(local.length() < 1e-6);
    }

    // ── sector classification ───────────────────────────────────────────────

    #[test]
    fn sector_inside_within_epsilon() {
        let b = unit_box("b");
        assert_eq!(b.sector_of(Vec3::zero(), 0.0), BBoxSector::INSIDE);
        // Just over the half-extent, but within epsilon.
        assert_eq!(b.sector_of(Vec3::new(0.51, 0.0, 0.0), 0.02), BBoxSector::INSIDE);
    }

    #[test]
    fn sector_single_axis_divergence() {
        let b = unit_box("b");
        assert_eq!(b.sector_of(Vec3::new(1.0, 0.0, 0.0), 0.0), BBoxSector::RIGHT);
        assert_eq!(b.sector_of(Vec3::new(-1.0, 0.0, 0.0), 0.0), BBoxSector::LEFT);
        assert_eq!(b.sector_of(Vec3::new(0.0, 1.0, 0.0), 0.0), BBoxSector::OVER);
        assert_eq!(b.sector_of(Vec3::new(0.0, -1.0, 0.0), 0.0), BBoxSector::UNDER);
        assert_eq!(b.sector_of(Vec3::new(0.0, 0.0, 1.0), 0.0), BBoxSector::AHEAD);
        assert_eq!(b.sector_of(Vec3::new(0.0, 0.0, -1.0), 0.0), BBoxSector::BEHIND);
    }

    #[test]
    fn sector_corner_divergence() {
        let b = unit_box("b");
        let sector = b.sector_of(Vec3::new(2.0, 2.0, 2.0), 0.0);
        assert_eq!(sector, BBoxSector::RIGHT | BBoxSector::OVER | BBoxSector::AHEAD);
        assert_eq!(sector.divergence(), 3);
    }

    // ── nearby radius & sector lengths ──────────────────────────────────────

    #[test]
    fn nearby_radius_schemas() {
        let b = unit_box("b");
        let mut adj = SpatialAdjustment::default();

        adj.nearby_schema = NearbySchema::Fixed;
        adj.nearby_factor = 0.8;
        assert!((b.nearby_radius(&adj) - 0.8).abs() < 1e-6);

        adj.nearby_schema = NearbySchema::Circle;
        adj.nearby_factor = 2.0;
        let circle = 2.0_f32.sqrt() / 2.0 * 2.0;
        assert!((b.nearby_radius(&adj) - circle).abs() < 1e-5);

        adj.nearby_schema = NearbySchema::Sphere;
        let sphere = 3.0_f32.sqrt() / 2.0 * 2.0;
        assert!((b.nearby_radius(&adj) - sphere).abs() < 1e-5);
    }

    #[test]
    fn nearby_radius_clamps_to_limit() {
        let big = SpatialObject::new("big").with_dimensions(10.0, 10.0, 10.0);
        let adj = SpatialAdjustment::default();
        assert!((big.nearby_radius(&adj) - adj.nearby_limit).abs() < 1e-6);
    }

    #[test]
    fn sector_lengths_dimension_schema() {
        let b = SpatialObject::new("b").with_dimensions(2.0, 1.0, 0.5);
        let mut adj = SpatialAdjustment::default();
        adj.sector_schema = SectorSchema::Dimension;
        adj.sector_factor = 1.0;
        adj.sector_limit = 10.0;
        let lengths = b.sector_lengths(&adj);
        assert!((lengths.x - 2.0).abs() < 1e-6);
        assert!((lengths.y - 1.0).abs() < 1e-6);
        assert!((lengths.z - 0.5).abs() < 1e-6);
    }

    // ── attribute access ────────────────────────────────────────────────────

    #[test]
    fn attribute_resolves_fixed_and_aux() {
        let adj = SpatialAdjustment::default();
        let mut b = unit_box("b").with_label("box");
        b.aux.insert("material".into(), "wood".into());

        assert_eq!(b.attribute("width", &adj), Some(AttrValue::Number(1.0)));
        assert_eq!(b.attribute("volume", &adj), Some(AttrValue::Number(1.0)));
        assert_eq!(b.attribute("label", &adj), Some("box".into()));
        assert_eq!(b.attribute("material", &adj), Some("wood".into()));
        assert_eq!(b.attribute("nonexistent", &adj), None);
    }

    #[test]
    fn set_attribute_reports_change() {
        let mut b = unit_box("b");
        assert!(b.set_attribute("width", AttrValue::Number(2.0)));
        assert!((b.width - 2.0).abs() < 1e-6);
        // Same value again: no change.
        assert!(!b.set_attribute("width", AttrValue::Number(2.0)));
        // Unknown key lands in aux.
        assert!(b.set_attribute("grade", AttrValue::Number(3.0)));
        assert_eq!(b.aux.get("grade"), Some(&AttrValue::Number(3.0)));
    }

    // ── import / export ─────────────────────────────────────────────────────

    #[test]
    fn attribute_map_roundtrip() {
        let mut b = SpatialObject::new("door1")
            .with_position(Vec3::new(0.85, 0.0, 0.2))
            .with_dimensions(0.9, 2.05, 0.08)
            .with_angle(0.1)
            .with_label("door")
            .with_kind("Door");
        b.aux.insert("color".into(), "white".into());
        b.aux.insert("locked".into(), true.into());

        let map = b.to_attributes();
        let back = SpatialObject::from_attributes(&map).unwrap();

        assert_eq!(back.id, b.id);
        assert_eq!(back.label, b.label);
        assert_eq!(back.kind, b.kind);
        assert!((back.width - b.width).abs() < 1e-6);
        assert!((back.height - b.height).abs() < 1e-6);
        assert!((back.depth - b.depth).abs() < 1e-6);
        assert!((back.angle - b.angle).abs() < 1e-6);
        assert!(back.position.distance(b.position) < 1e-6);
        assert_eq!(back.aux.get("color"), Some(&"white".into()));
        assert_eq!(back.aux.get("locked"), Some(&AttrValue::Bool(true)));
    }

    #[test]
    fn serde_json_roundtrip() {
        let mut b = SpatialObject::new("shelf1")
            .with_position(Vec3::new(1.0, 0.0, -0.5))
            .with_dimensions(0.8, 2.0, 0.3)
            .with_angle(0.25)
            .with_kind("Shelf");
        b.aux.insert("material".into(), "oak".into());

        let json = serde_json::to_string(&b).unwrap();
        let back: SpatialObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, b.id);
        assert_eq!(back.kind, b.kind);
        assert!((back.angle - b.angle).abs() < 1e-6);
        assert!(back.position.distance(b.position) < 1e-6);
        assert_eq!(back.aux.get("material"), Some(&"oak".into()));
    }

    #[test]
    fn import_requires_id() {
        let map = BTreeMap::from([("width".to_string(), AttrValue::Number(1.0))]);
        assert!(matches!(
            SpatialObject::from_attributes(&map),
            Err(SpatialError::Import(_))
        ));
    }

    #[test]
    fn import_rejects_non_numeric_geometry() {
        let map = BTreeMap::from([
            ("id".to_string(), AttrValue::from("b")),
            ("width".to_string(), AttrValue::from("wide")),
        ]);
        assert!(matches!(
            SpatialObject::from_attributes(&map),
            Err(SpatialError::Import(_))
        ));
    }
}
