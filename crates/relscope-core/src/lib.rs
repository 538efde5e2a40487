//! Core types for relscope.
//!
//! This crate provides the metadata layer that the query-construction crate
//! builds on:
//!
//! - `Model` trait exposing static table/relationship metadata
//! - `RelationshipInfo` descriptors with single or composite join keys
//! - `Value` for dynamically-typed SQL parameters
//! - the typed construction-error taxonomy
//!
//! Everything here is plain data: no connections, no I/O, no caching. The
//! query layer reads this metadata and produces SQL fragments from it.

pub mod error;
pub mod model;
pub mod relationship;
pub mod value;

pub use error::{Error, Result};
pub use model::Model;
pub use relationship::{
    RelationshipInfo, RelationshipKind, find_relationship, resolve_relationship,
};
pub use value::Value;
