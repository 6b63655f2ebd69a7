//! Component metadata
//!
//! - `descriptor`: resolved component and property trees
//! - `annotations`: documentation tag interpretation
//! - `assembler`: descriptor building and invariant checks
//! - `tiers`: RT and DT JSON projections

pub mod annotations;
pub mod assembler;
pub mod descriptor;
pub mod tiers;

pub use annotations::Annotations;
pub use assembler::{MetadataAssembler, CHILDREN_TYPE, DEFAULT_SLOT};
pub use descriptor::{
    ComponentDescriptor, EventDescriptor, MethodDescriptor, ParamDescriptor, PropertyDescriptor,
    PropertyMap, SlotDescriptor,
};
pub use tiers::{design_time_json, runtime_json, Tier};
