//! Pipeline interpreter and reasoner.
//!
//! This crate turns a fact base of spatial objects into answers:
//!
//! - [`expression`]: the attribute/relation expression language used inside
//!   pipeline operations,
//! - [`stage`]: pipeline token parsing and the per-stage audit record,
//! - [`taxonomy`]: the type-ontology boundary behind `isa`,
//! - [`reasoner`]: the [`Reasoner`] that owns the fact base, memoizes
//!   relations, and executes pipe-delimited pipelines.
//!
//! # Example
//!
//! ```
//! use spacia_geometry::{SpatialObject, Vec3};
//! use spacia_pipeline::Reasoner;
//!
//! let mut reasoner = Reasoner::new();
//! reasoner.load(vec![
//!     SpatialObject::new("shelf").with_dimensions(0.8, 2.0, 0.3),
//!     SpatialObject::new("bin")
//!         .with_position(Vec3::new(1.0, 0.0, 0.0))
//!         .with_dimensions(0.4, 0.5, 0.4),
//! ]);
//! assert!(reasoner.run("filter(height > 1.0) | pick(near)"));
//! assert_eq!(reasoner.result()[0].id, "bin");
//! ```

pub mod expression;
pub mod reasoner;
pub mod stage;
pub mod taxonomy;

pub use expression::{Aggregate, BinOp, Expr, MapScope, Scope, UnaryOp};
pub use reasoner::Reasoner;
pub use stage::{PipelineOp, Quantifier, SortKey, Stage};
pub use taxonomy::{Concept, InMemoryTaxonomy, TaxonomyLookup};
