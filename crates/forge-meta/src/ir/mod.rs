//! Intermediate Representation (IR) for component surfaces
//!
//! This module provides the structural type system consumed by the engine,
//! the queryable type model interface and the component input types.

pub mod component;
pub mod model;
pub mod types;

pub use component::*;
pub use model::*;
pub use types::*;
