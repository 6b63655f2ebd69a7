//! Type resolution
//!
//! - `signature`: descriptor to [`TypeSignature`] resolution
//! - `generics`: generic parameter lists, bindings and mapped-type chains
//! - `walker`: expansion of struct-shaped types into property trees

pub mod generics;
pub mod signature;
pub mod walker;

pub use generics::{
    bind_dependent, declare, unwrap_mapped, BindingTarget, GenericBinding, GenericsInfo,
    MappedChain, WrapperLayer,
};
pub use signature::{
    ContextKind, ExpansionTarget, ResolveContext, SignatureResolver, TypeSignature,
    WELL_KNOWN_TYPES,
};
pub use walker::{Expansion, PropertyPath, PropertyWalker};
