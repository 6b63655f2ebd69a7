//! Error types and diagnostics
//!
//! This module provides the error taxonomy of the metadata engine and the
//! diagnostic collector used to report recoverable problems.
//!
//! - [`StructuralError`]: the type graph lacks a shape the engine requires.
//!   Fatal for the current component only (see [`ComponentError`]).
//! - [`AnnotationError`]: a documentation tag could not be interpreted. The
//!   tag is ignored and a warning is recorded.
//! - Configuration warnings: discouraged but valid usage, recorded as
//!   [`Diagnostic`]s with a [`CheckCategory`].
//! - [`AssemblyError`]: declaration closure discovery or copying failed.
//!   Fatal for that module's assembly only.

use crate::ir::{DynamicSlotKind, Location};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for forge-meta operations
pub type MetaResult<T> = Result<T, MetaError>;

/// Main error type for forge-meta
#[derive(Debug, Error)]
pub enum MetaError {
    /// A component failed structural checks
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// Declaration assembly failed
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The build recorded errors
    #[error("build failed with {errors} error(s); first: {first}")]
    Build { errors: usize, first: String },
}

impl MetaError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        MetaError::Config(message.into())
    }
}

/// Categories of checks that configuration can disable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCategory {
    /// Writeback property / change event pairing
    Writeback,
    /// Reserved default slot and its `Children` type
    DefaultSlot,
    /// At most one dynamic slot provider of each kind, never both
    DynamicSlot,
    /// Dynamic slot definitions and the keys properties reference
    DynamicSlotDefinitions,
    /// Public surface references a deprecated type
    DeprecatedType,
    /// A type shape degraded to `object`
    UnsupportedType,
}

impl CheckCategory {
    /// Every category, in declaration order
    pub const ALL: [CheckCategory; 6] = [
        CheckCategory::Writeback,
        CheckCategory::DefaultSlot,
        CheckCategory::DynamicSlot,
        CheckCategory::DynamicSlotDefinitions,
        CheckCategory::DeprecatedType,
        CheckCategory::UnsupportedType,
    ];

    /// Look up a category by its diagnostic code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Diagnostic code for this category
    pub fn code(&self) -> &'static str {
        match self {
            CheckCategory::Writeback => "writeback",
            CheckCategory::DefaultSlot => "default-slot",
            CheckCategory::DynamicSlot => "dynamic-slot",
            CheckCategory::DynamicSlotDefinitions => "dynamic-slot-definitions",
            CheckCategory::DeprecatedType => "deprecated-type",
            CheckCategory::UnsupportedType => "unsupported-type",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The type graph lacks a shape the engine requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("conditional type `{text}` resolves to no concrete branch in {context} position")]
    UnresolvedConditional { text: String, context: String },

    #[error("base type `{name}` cannot be resolved")]
    UnresolvedBaseType { name: String },

    #[error("writeback property `{property}` has no matching change event")]
    UnmatchedWriteback { property: String },

    #[error("event `{event}` writes back `{property}`, which is not a writeback property")]
    OrphanWritebackEvent { event: String, property: String },

    #[error("default slot must be typed with `{expected}`")]
    DefaultSlotType { expected: String },

    #[error("{member} uses `{children}`, which is reserved for the default slot")]
    ChildrenOutsideDefaultSlot { member: String, children: String },

    #[error("properties `{first}` and `{second}` both declare {kind} support")]
    DuplicateDynamicSlot {
        kind: DynamicSlotKind,
        first: String,
        second: String,
    },

    #[error(
        "property `{slot_property}` declares dynamic slot support and `{template_property}` \
         declares dynamic template slot support; only one is allowed"
    )]
    ConflictingDynamicSlots {
        slot_property: String,
        template_property: String,
    },

    #[error("property `{property}` references unknown dynamic slot definition `{key}`")]
    UnknownDynamicSlotKey { property: String, key: String },

    #[error("dynamic slot definition `{key}` is not referenced by any property")]
    UnreferencedDynamicSlot { key: String },
}

impl StructuralError {
    /// The check category, if this error can be disabled by configuration
    pub fn category(&self) -> Option<CheckCategory> {
        match self {
            StructuralError::UnresolvedConditional { .. }
            | StructuralError::UnresolvedBaseType { .. } => None,
            StructuralError::UnmatchedWriteback { .. }
            | StructuralError::OrphanWritebackEvent { .. } => Some(CheckCategory::Writeback),
            StructuralError::DefaultSlotType { .. }
            | StructuralError::ChildrenOutsideDefaultSlot { .. } => Some(CheckCategory::DefaultSlot),
            StructuralError::DuplicateDynamicSlot { .. }
            | StructuralError::ConflictingDynamicSlots { .. } => Some(CheckCategory::DynamicSlot),
            StructuralError::UnknownDynamicSlotKey { .. }
            | StructuralError::UnreferencedDynamicSlot { .. } => {
                Some(CheckCategory::DynamicSlotDefinitions)
            }
        }
    }
}

/// A structural error attributed to a component
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("component `{component}` ({location}): {error}")]
pub struct ComponentError {
    pub component: String,
    pub location: Location,
    #[source]
    pub error: StructuralError,
}

/// A documentation tag could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("@{tag} value `{value}` cannot be parsed: {reason}")]
    Unparsable {
        tag: String,
        value: String,
        reason: String,
    },

    #[error("@{tag} value `{value}` does not match type `{expected}`")]
    Mistyped {
        tag: String,
        value: String,
        expected: String,
    },

    #[error("@{tag} value `{value}` is not a version")]
    InvalidVersion { tag: String, value: String },

    #[error("@{tag} is empty")]
    Empty { tag: String },
}

/// Declaration closure discovery or copying failed
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("{}: referenced declaration `{specifier}` not found", importer.display())]
    MissingDependency { importer: PathBuf, specifier: String },

    #[error("primary declaration file not found: {}", .0.display())]
    PrimaryNotFound(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssemblyError {
    /// Wrap an IO error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssemblyError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Error - the component or module produced no output
    Error,
    /// Warning - generation continues
    Warning,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Component the diagnostic belongs to
    pub component: Option<String>,
    /// Source location
    pub location: Option<Location>,
    /// Check category (for disabling and filtering)
    pub category: Option<CheckCategory>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            component: None,
            location: None,
            category: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Attribute to a component
    pub fn in_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set the location
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the check category
    pub fn with_category(mut self, category: CheckCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = String::new();

        if let Some(ref location) = self.location {
            if !location.is_unknown() {
                result.push_str(&location.to_string());
                result.push_str(": ");
            }
        }

        result.push_str(self.severity.display());

        if let Some(category) = self.category {
            result.push('[');
            result.push_str(category.code());
            result.push(']');
        }

        result.push_str(": ");
        if let Some(ref component) = self.component {
            result.push_str(component);
            result.push_str(": ");
        }
        result.push_str(&self.message);

        result
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Collector for diagnostics during a build
#[derive(Debug, Default, Clone)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Move all diagnostics from another collector into this one
    pub fn extend(&mut self, other: DiagnosticsCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get error count
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticSeverity::Error)
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.count(DiagnosticSeverity::Warning)
    }

    fn count(&self, severity: DiagnosticSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Diagnostics attributed to a component
    pub fn for_component<'a>(&'a self, component: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.component.as_deref() == Some(component))
    }

    /// Drop everything collected so far
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}
