//! `spacia-geometry` – the spatial substrate.
//!
//! Everything the relation-inference layer needs to reason about oriented
//! boxes, with no reasoning of its own.
//!
//! # Modules
//!
//! - [`vector`] – [`Vec3`][vector::Vec3]: 3-D points/vectors with yaw
//!   rotation and world↔local frame transforms (+x right, +y up, +z ahead).
//! - [`sector`] – [`BBoxSector`][sector::BBoxSector]: the 27-cell
//!   directional sector lattice around a box, encoded as a bit-set with one
//!   flag per axis pair.
//! - [`adjustment`] – [`SpatialAdjustment`][adjustment::SpatialAdjustment]
//!   and [`DeductionCategories`][adjustment::DeductionCategories]: the
//!   tolerance/schema configuration consulted by every geometric predicate
//!   test.
//! - [`object`] – [`SpatialObject`][object::SpatialObject]: the entity
//!   model with its own geometric queries (corners, local-frame transform,
//!   sector classification, nearby radius, sector extrusion lengths) and the
//!   flat attribute-map import/export.

pub mod adjustment;
pub mod object;
pub mod sector;
pub mod vector;

pub use adjustment::{DeductionCategories, NearbySchema, SectorSchema, SpatialAdjustment};
pub use object::{MainDirection, ObjectAttr, SpatialObject};
pub use sector::BBoxSector;
pub use vector::Vec3;
