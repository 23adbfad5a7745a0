//! Tolerance and calculation-schema configuration.
//!
//! Every geometric predicate test consults a [`SpatialAdjustment`]: how wide
//! the gap tolerance is, how nearby "near" is, and how far directional
//! sector boxes extrude.  There is deliberately no process-wide mutable
//! default – [`SpatialAdjustment::default`] is a documented constant and
//! every reasoning session owns its own copy.
//!
//! [`DeductionCategories`] selects which relation families are computed at
//! all; disabled categories are skipped entirely during inference.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Schemas
// ────────────────────────────────────────────────────────────────────────────

/// How the "nearby" radius of an object is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NearbySchema {
    /// A fixed radius in metres (the factor *is* the radius).
    Fixed,
    /// Bounding circle of the footprint × factor.
    Circle,
    /// Bounding sphere of the box × factor.
    Sphere,
    /// Footprint perimeter × factor.
    Perimeter,
    /// Footprint area × factor.
    Area,
}

impl NearbySchema {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "fixed" => Some(Self::Fixed),
            "circle" => Some(Self::Circle),
            "sphere" => Some(Self::Sphere),
            "perimeter" => Some(Self::Perimeter),
            "area" => Some(Self::Area),
            _ => None,
        }
    }
}

/// How far a directional sector box extrudes from the object's faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SectorSchema {
    /// A fixed extrusion length in metres (the factor *is* the length).
    Fixed,
    /// The object's own extent on the sector axis × factor.
    Dimension,
    /// Footprint perimeter × factor.
    Perimeter,
    /// Footprint area × factor.
    Area,
    /// Reuse the nearby radius.
    Nearby,
}

impl SectorSchema {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "fixed" => Some(Self::Fixed),
            "dimension" => Some(Self::Dimension),
            "perimeter" => Some(Self::Perimeter),
            "area" => Some(Self::Area),
            "nearby" => Some(Self::Nearby),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SpatialAdjustment
// ────────────────────────────────────────────────────────────────────────────

/// Tolerances and sizing schemas consulted by every geometric predicate test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpatialAdjustment {
    /// Linear tolerance in metres for gap/contact tests.
    pub max_gap: f32,
    /// Angular tolerance in radians for alignment tests.
    pub max_angle_delta: f32,
    /// Sector extrusion schema, factor, and clamp limit (metres).
    pub sector_schema: SectorSchema,
    pub sector_factor: f32,
    pub sector_limit: f32,
    /// Nearby radius schema, factor, and clamp limit (metres).
    pub nearby_schema: NearbySchema,
    pub nearby_factor: f32,
    pub nearby_limit: f32,
    /// An object is "long" when its largest extent is at least `long_ratio`
    /// times the second largest.
    pub long_ratio: f32,
    /// An object is "thin" when its smallest extent times `thin_ratio` still
    /// fits within each of the other two.
    pub thin_ratio: f32,
}

impl Default for SpatialAdjustment {
    /// The documented baseline: 2 cm gap, ~3° angle tolerance, nearby =
    /// footprint circle × 2 (≤ 2.5 m), sectors extrude to the nearby radius.
    fn default() -> Self {
        Self {
            max_gap: 0.02,
            max_angle_delta: 0.05,
            sector_schema: SectorSchema::Nearby,
            sector_factor: 1.0,
            sector_limit: 2.5,
            nearby_schema: NearbySchema::Circle,
            nearby_factor: 2.0,
            nearby_limit: 2.5,
            long_ratio: 4.0,
            thin_ratio: 10.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DeductionCategories
// ────────────────────────────────────────────────────────────────────────────

/// Togglable relation families.  A disabled category is skipped entirely by
/// relation inference for the remainder of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeductionCategories {
    pub topology: bool,
    pub connectivity: bool,
    pub comparability: bool,
    pub similarity: bool,
    pub sectoriality: bool,
    pub visibility: bool,
    pub geography: bool,
}

impl Default for DeductionCategories {
    /// Topology, connectivity, comparability, similarity, and visibility on;
    /// sectoriality and geography off (geography is reserved).
    fn default() -> Self {
        Self {
            topology: true,
            connectivity: true,
            comparability: true,
            similarity: true,
            sectoriality: false,
            visibility: true,
            geography: false,
        }
    }
}

impl DeductionCategories {
    /// Nothing enabled.
    pub fn none() -> Self {
        Self {
            topology: false,
            connectivity: false,
            comparability: false,
            similarity: false,
            sectoriality: false,
            visibility: false,
            geography: false,
        }
    }

    /// Parse a `deduce(...)` argument: space-separated keywords, matched by
    /// prefix (`topo`, `connect`, `compar`, `simil`, `sector`, `visib`,
    /// `geo`).  Absent keywords disable their category.
    pub fn parse(text: &str) -> Self {
        let mut cats = Self::none();
        for word in text.split_whitespace() {
            if word.starts_with("topo") {
                cats.topology = true;
            } else if word.starts_with("connect") {
                cats.connectivity = true;
            } else if word.starts_with("compar") {
                cats.comparability = true;
            } else if word.starts_with("simil") {
                cats.similarity = true;
            } else if word.starts_with("sector") {
                cats.sectoriality = true;
            } else if word.starts_with("visib") {
                cats.visibility = true;
            } else if word.starts_with("geo") {
                cats.geography = true;
            }
        }
        cats
    }
}
