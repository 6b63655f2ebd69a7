//! Type model supplied by the surrounding driver
//!
//! The engine never parses source text. A front end (compiler plugin,
//! language service, JSON dump) hands it a [`TypeModel`] that can look up
//! named declarations, enumerate struct members and pretty-print types.
//! [`InMemoryTypeModel`] is the serde-backed implementation used by the CLI
//! and the tests.

use crate::ir::{StructMember, TypeDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind of a named declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Interface,
    Class,
    Alias,
    Enum,
}

/// Generic type parameter: `T extends Constraint = Default`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParam {
    pub name: String,
    #[serde(default)]
    pub constraint: Option<TypeDescriptor>,
    #[serde(default)]
    pub default: Option<TypeDescriptor>,
}

impl TypeParam {
    /// Create an unconstrained parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            default: None,
        }
    }

    /// Set the constraint (extends clause)
    pub fn with_constraint(mut self, constraint: TypeDescriptor) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: TypeDescriptor) -> Self {
        self.default = Some(default);
        self
    }

    /// Generate TypeScript declaration
    pub fn to_typescript(&self) -> String {
        let mut out = self.name.clone();
        if let Some(ref constraint) = self.constraint {
            out.push_str(" extends ");
            out.push_str(&constraint.to_typescript());
        }
        if let Some(ref default) = self.default {
            out.push_str(" = ");
            out.push_str(&default.to_typescript());
        }
        out
    }
}

/// A named declaration in the type model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: DeclarationKind,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    /// Struct shape for interfaces/classes, aliased type for aliases
    #[serde(default)]
    pub body: TypeDescriptor,
    /// Member values for enums, in declaration order
    #[serde(default)]
    pub enum_values: Vec<crate::ir::LiteralValue>,
    /// Whether the declaration is exported from its module
    #[serde(default)]
    pub exported: bool,
    /// Whether the declaration comes from a library rather than local sources
    #[serde(default)]
    pub library: bool,
    /// Deprecation note, if the declaration is deprecated
    #[serde(default)]
    pub deprecated: Option<String>,
    /// Declaring file
    #[serde(default)]
    pub source: Option<String>,
}

impl TypeDeclaration {
    /// Create an exported interface declaration
    pub fn interface(name: impl Into<String>, members: Vec<StructMember>) -> Self {
        let name = name.into();
        Self {
            body: TypeDescriptor::named_struct(name.clone(), members),
            name,
            kind: DeclarationKind::Interface,
            type_params: Vec::new(),
            enum_values: Vec::new(),
            exported: true,
            library: false,
            deprecated: None,
            source: None,
        }
    }

    /// Create an exported type alias
    pub fn alias(name: impl Into<String>, body: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::Alias,
            type_params: Vec::new(),
            body,
            enum_values: Vec::new(),
            exported: true,
            library: false,
            deprecated: None,
            source: None,
        }
    }

    /// Create an exported enum
    pub fn enumeration(name: impl Into<String>, values: Vec<crate::ir::LiteralValue>) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::Enum,
            type_params: Vec::new(),
            body: TypeDescriptor::Any,
            enum_values: values,
            exported: true,
            library: false,
            deprecated: None,
            source: None,
        }
    }

    /// Add type parameters
    pub fn with_type_params(mut self, params: Vec<TypeParam>) -> Self {
        self.type_params = params;
        self
    }

    /// Mark as not exported
    pub fn local(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Mark as a library declaration
    pub fn library(mut self) -> Self {
        self.library = true;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self, note: impl Into<String>) -> Self {
        self.deprecated = Some(note.into());
        self
    }
}

/// Queryable structural type model
pub trait TypeModel {
    /// Look up a named declaration
    fn declaration(&self, name: &str) -> Option<&TypeDeclaration>;

    /// Enumerate the ordered members of a struct-shaped type
    ///
    /// References are followed through interface bodies and aliases;
    /// mapped wrappers yield the members of their wrapped type.
    fn members(&self, ty: &TypeDescriptor) -> Option<Vec<StructMember>> {
        let mut current = ty;
        // Alias chains are finite in a well-formed model but guard anyway.
        for _ in 0..32 {
            match current {
                TypeDescriptor::Struct(s) => return Some(s.members.clone()),
                TypeDescriptor::Reference(r) => current = &self.declaration(&r.name)?.body,
                TypeDescriptor::Mapped(m) => current = m.args.first()?,
                _ => return None,
            }
        }
        None
    }

    /// Pretty-print a type for documentation
    fn print(&self, ty: &TypeDescriptor) -> String {
        ty.to_typescript()
    }
}

/// In-memory type model, deserializable from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryTypeModel {
    #[serde(default, with = "declaration_list")]
    declarations: IndexMap<String, TypeDeclaration>,
}

impl InMemoryTypeModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration
    pub fn declare(mut self, decl: TypeDeclaration) -> Self {
        self.insert(decl);
        self
    }

    /// Insert a declaration, replacing any previous one with the same name
    pub fn insert(&mut self, decl: TypeDeclaration) {
        self.declarations.insert(decl.name.clone(), decl);
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check if the model has no declarations
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterate declarations in insertion order
    pub fn declarations(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.declarations.values()
    }
}

impl TypeModel for InMemoryTypeModel {
    fn declaration(&self, name: &str) -> Option<&TypeDeclaration> {
        self.declarations.get(name)
    }
}

/// Declarations serialize as a plain list and are keyed by name on load
mod declaration_list {
    use super::TypeDeclaration;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        map: &IndexMap<String, TypeDeclaration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<&TypeDeclaration> = map.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<String, TypeDeclaration>, D::Error> {
        let list = Vec::<TypeDeclaration>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|d| (d.name.clone(), d)).collect())
    }
}
