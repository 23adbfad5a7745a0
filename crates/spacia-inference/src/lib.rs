//! `spacia-inference` – qualitative relation deduction over oriented boxes.
//!
//! This crate turns pairs of [`SpatialObject`][spacia_geometry::SpatialObject]s
//! into lists of named [`SpatialRelation`]s: `cup ontop table`, `door inside
//! wall`, `shelf nineoclock observer`.  It owns the closed [`Predicate`]
//! taxonomy and the per-category deduction passes; session orchestration
//! (arenas, caching, pipelines) lives a layer above.
//!
//! # Modules
//!
//! - [`predicate`] – the predicate taxonomy, term table and converses.
//! - [`relation`] – the relation record and its renderer.
//! - [`topology`] – proximity, directionality, adjacency, assembly,
//!   connectivity, orientation and sectoriality.
//! - [`metrics`] – similarity and comparability of derived metrics.
//! - [`visibility`] – clock-hour bearings and reach from a self-tracked
//!   observer.
//!
//! # Example
//!
//! ```
//! use spacia_geometry::{SpatialAdjustment, SpatialObject, Vec3};
//! use spacia_inference::{deduce_topology, Predicate};
//! use std::collections::HashSet;
//!
//! let table = SpatialObject::new("table").with_dimensions(2.0, 0.5, 1.0);
//! let cup = SpatialObject::new("cup")
//!     .with_position(Vec3::new(0.0, 0.5, 0.0))
//!     .with_dimensions(0.1, 0.1, 0.1);
//! let mut connections = HashSet::new();
//! let relations = deduce_topology(
//!     &cup, 0, &table, 1,
//!     &SpatialAdjustment::default(), false, &mut connections,
//! );
//! assert!(relations.iter().any(|r| r.predicate == Predicate::Ontop));
//! ```

pub mod metrics;
pub mod predicate;
pub mod relation;
pub mod topology;
pub mod visibility;

pub use metrics::{deduce_comparability, deduce_similarity};
pub use predicate::{Predicate, PredicateCategory, Term};
pub use relation::SpatialRelation;
pub use topology::{deduce_sectoriality, deduce_topology};
pub use visibility::{deduce_visibility, ARM_REACH};
