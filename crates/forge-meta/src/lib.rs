//! Forge-Meta: component metadata and declaration synthesis
//!
//! This crate resolves the typed public surface of UI components into
//! serializable metadata and synthesized TypeScript declarations. It never
//! parses source text: a front end supplies a structural [`TypeModel`] and
//! one [`ComponentSource`] per component.
//!
//! # Architecture
//!
//! - `ir`: type descriptors, the type model interface and component inputs
//! - `resolve`: signature resolution, generics and the complex property walker
//! - `metadata`: component descriptors, annotations and the RT/DT tiers
//! - `codegen`: per-component declaration fragments
//! - `closure`: declaration closure assembly for packaged modules
//! - `session`: the explicit per-build context
//!
//! # Usage
//!
//! ```rust,ignore
//! use forge_meta::{BuildConfig, BuildSession, InMemoryTypeModel};
//!
//! let model: InMemoryTypeModel = serde_json::from_str(&model_json)?;
//! let mut session = BuildSession::new(&model, BuildConfig::load("forge-meta.toml")?);
//! for component in &components {
//!     session.process_component(component);
//! }
//! session.write_outputs("dist/meta")?;
//! ```

pub mod closure;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod ir;
pub mod metadata;
pub mod resolve;
pub mod session;

// Re-export commonly used types
pub use closure::{AssembledModule, DeclarationClosureAssembler, ModuleInput};
pub use codegen::{FragmentGenerator, FragmentNames};
pub use config::{BuildConfig, OutputShape};
pub use diagnostics::{
    AnnotationError, AssemblyError, CheckCategory, ComponentError, Diagnostic,
    DiagnosticSeverity, DiagnosticsCollector, MetaError, MetaResult, StructuralError,
};
pub use ir::{
    ComponentSource, DocTags, InMemoryTypeModel, TypeDeclaration, TypeDescriptor, TypeModel,
    TypeParam,
};
pub use metadata::{ComponentDescriptor, MetadataAssembler, PropertyDescriptor};
pub use resolve::{
    ContextKind, GenericsInfo, PropertyPath, PropertyWalker, ResolveContext, SignatureResolver,
    TypeSignature,
};
pub use session::{BuildSession, ComponentMetadata};
