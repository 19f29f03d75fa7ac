//! Core types for integer-encoded knowledge graphs.
//!
//! This crate provides the data layer that every link-prediction component
//! builds on:
//!
//! - [`Triple`] - An integer-encoded (head, relation, tail) statement
//! - [`TriplesFactory`] - A fixed vocabulary plus an ordered triple sequence
//! - [`Dataset`] - Named train/validation/test factories over one vocabulary
//! - [`SplitRatios`] - Seeded ratio-based partitioning, used by [`Dataset::remix`]
//!
//! Entity and relation identifiers are dense indices: entity ids live in
//! `[0, num_entities)` and relation ids in `[0, num_relations)`. Mapping
//! labels to ids is a concern of whatever produced the triples; everything
//! downstream works on the integer encoding only.
//!
//! # Example
//!
//! ```rust
//! use rankle_core::{Triple, TriplesFactory};
//!
//! let factory = TriplesFactory::from_triples(vec![
//!     Triple::new(0, 0, 1),
//!     Triple::new(0, 0, 2),
//!     Triple::new(1, 1, 2),
//! ]);
//!
//! assert_eq!(factory.num_entities(), 3);
//! assert_eq!(factory.num_relations(), 2);
//! assert_eq!(factory.num_triples(), 3);
//! ```

mod dataset;
mod error;
mod split;
mod triples;

pub use dataset::{Dataset, DatasetSummary};
pub use error::{DatasetError, Result};
pub use split::{split_triples, SplitRatios};
pub use triples::{EntityId, RelationId, Triple, TriplesFactory};
