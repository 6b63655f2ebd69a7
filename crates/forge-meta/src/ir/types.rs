//! Structural type descriptors for component surfaces
//!
//! This module provides the type representation consumed by the metadata
//! engine. Descriptors are produced by an external front end (see
//! [`crate::ir::TypeModel`]) and are never computed here: the engine only
//! walks them.
//!
//! # Descriptor Overview
//!
//! | Descriptor | TypeScript | Notes |
//! |------------|------------|-------|
//! | `Primitive` | `string`, `number`, `boolean`, ... | Leaf types |
//! | `Literal` | `"a"`, `42`, `true` | String literals feed enum values |
//! | `Array` | `T[]` / `Array<T>` | Element resolved recursively |
//! | `Struct` | `{ a: T }`, `interface Foo` | Ordered members with optionality |
//! | `Reference` | `Foo<T>` | Named type looked up through the model |
//! | `Union` | `A \| B` | `null` / `undefined` members are decorations |
//! | `Intersection` | `A & B` | Opaque unless `primitive & {}` |
//! | `Mapped` | `Partial<T>` | Wrapper chains are unwound outer to inner |
//! | `Generic` | `T` | Type parameter reference |
//! | `Function` | `(a: T) => U` | Never expanded into properties |
//! | `Conditional` | `T extends U ? X : Y` | Must resolve to a branch |
//! | `Any` / `Unknown` | `any` / `unknown` | Collapse to `any` |
//! | `Null` | `null` | |
//!
//! # JSON Shape
//!
//! Descriptors deserialize from an internally tagged representation:
//!
//! ```json
//! { "kind": "union", "members": [
//!     { "kind": "literal", "value": "small" },
//!     { "kind": "literal", "value": "large" },
//!     { "kind": "null" }
//! ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive TypeScript types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
    #[serde(rename = "bigint")]
    BigInt,
    Symbol,
    Void,
    Undefined,
    Never,
    /// The non-primitive `object` keyword
    Object,
}

impl Primitive {
    /// Convert to TypeScript type string
    pub fn to_typescript(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::BigInt => "bigint",
            Primitive::Symbol => "symbol",
            Primitive::Void => "void",
            Primitive::Undefined => "undefined",
            Primitive::Never => "never",
            Primitive::Object => "object",
        }
    }

    /// Parse from TypeScript type string
    pub fn from_typescript(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Primitive::String),
            "number" => Some(Primitive::Number),
            "boolean" => Some(Primitive::Boolean),
            "bigint" => Some(Primitive::BigInt),
            "symbol" => Some(Primitive::Symbol),
            "void" => Some(Primitive::Void),
            "undefined" => Some(Primitive::Undefined),
            "never" => Some(Primitive::Never),
            "object" => Some(Primitive::Object),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_typescript())
    }
}

/// Literal type values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl LiteralValue {
    /// The primitive this literal widens to
    pub fn widened(&self) -> Primitive {
        match self {
            LiteralValue::Boolean(_) => Primitive::Boolean,
            LiteralValue::Number(_) => Primitive::Number,
            LiteralValue::String(_) => Primitive::String,
        }
    }

    /// Plain text of the value, without quotes
    pub fn as_text(&self) -> String {
        match self {
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::String(s) => s.clone(),
        }
    }

    /// Convert to TypeScript literal type syntax
    pub fn to_typescript(&self) -> String {
        match self {
            LiteralValue::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
            other => other.as_text(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A member of a struct-shaped type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub readonly: bool,
}

impl StructMember {
    /// Create a required member
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            readonly: false,
        }
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark as readonly
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Get TypeScript member declaration
    pub fn to_typescript_member(&self) -> String {
        let readonly = if self.readonly { "readonly " } else { "" };
        let optional = if self.optional { "?" } else { "" };
        format!(
            "{}{}{}: {}",
            readonly,
            self.name,
            optional,
            self.ty.to_typescript()
        )
    }
}

/// Struct, interface or class shape
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructType {
    /// Declared name; `None` for anonymous type literals
    #[serde(default)]
    pub name: Option<String>,
    /// Type arguments the name was instantiated with
    #[serde(default)]
    pub type_args: Vec<TypeDescriptor>,
    /// Ordered members
    #[serde(default)]
    pub members: Vec<StructMember>,
}

impl StructType {
    /// Check if this is the empty marker object `{}`
    pub fn is_empty_marker(&self) -> bool {
        self.name.is_none() && self.members.is_empty()
    }
}

/// Reference to a named type declared in the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeDescriptor>,
}

/// Mapped-type wrapper such as `Partial<T>` or `Pick<T, K>`
///
/// The first argument is the wrapped type; further arguments are layer
/// parameters (key sets and the like).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedType {
    pub wrapper: String,
    #[serde(default)]
    pub args: Vec<TypeDescriptor>,
}

/// Parameter of a function type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub optional: bool,
}

/// Structural type descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDescriptor {
    /// `string`, `number`, ...
    Primitive { name: Primitive },

    /// `"a"`, `42`, `true`
    Literal { value: LiteralValue },

    /// `T[]`
    Array { element: Box<TypeDescriptor> },

    /// Object literal, interface or class
    Struct(StructType),

    /// Named type resolved through the model
    Reference(TypeRef),

    /// `A | B`
    Union { members: Vec<TypeDescriptor> },

    /// `A & B`
    Intersection { members: Vec<TypeDescriptor> },

    /// `Partial<T>`, `Readonly<T>`, ...
    Mapped(MappedType),

    /// Type parameter reference
    Generic {
        name: String,
        #[serde(default)]
        constraint: Option<Box<TypeDescriptor>>,
    },

    /// `(a: A) => R`
    Function {
        #[serde(default)]
        params: Vec<FunctionParam>,
        returns: Box<TypeDescriptor>,
    },

    /// Conditional type with the branch the front end resolved, if any
    Conditional {
        text: String,
        #[serde(default)]
        resolved: Option<Box<TypeDescriptor>>,
    },

    #[default]
    Any,

    Unknown,

    Null,
}

impl TypeDescriptor {
    /// Convert to TypeScript type string
    pub fn to_typescript(&self) -> String {
        match self {
            TypeDescriptor::Primitive { name } => name.to_typescript().to_string(),

            TypeDescriptor::Literal { value } => value.to_typescript(),

            TypeDescriptor::Array { element } => {
                format!("{}[]", element.to_typescript_with_parens())
            }

            TypeDescriptor::Struct(s) => match &s.name {
                Some(name) => with_args(name, &s.type_args),
                None if s.members.is_empty() => "{}".to_string(),
                None => {
                    let members: Vec<String> =
                        s.members.iter().map(|m| m.to_typescript_member()).collect();
                    format!("{{ {} }}", members.join("; "))
                }
            },

            TypeDescriptor::Reference(r) => with_args(&r.name, &r.args),

            TypeDescriptor::Union { members } => {
                let parts: Vec<String> = members
                    .iter()
                    .map(|m| m.to_typescript_with_parens())
                    .collect();
                parts.join(" | ")
            }

            TypeDescriptor::Intersection { members } => {
                let parts: Vec<String> = members
                    .iter()
                    .map(|m| m.to_typescript_with_parens())
                    .collect();
                parts.join(" & ")
            }

            TypeDescriptor::Mapped(m) => with_args(&m.wrapper, &m.args),

            TypeDescriptor::Generic { name, .. } => name.clone(),

            TypeDescriptor::Function { params, returns } => {
                let params: Vec<String> = params
                    .iter()
                    .map(|p| {
                        let optional = if p.optional { "?" } else { "" };
                        format!("{}{}: {}", p.name, optional, p.ty.to_typescript())
                    })
                    .collect();
                format!("({}) => {}", params.join(", "), returns.to_typescript())
            }

            TypeDescriptor::Conditional { text, .. } => text.clone(),

            TypeDescriptor::Any => "any".to_string(),

            TypeDescriptor::Unknown => "unknown".to_string(),

            TypeDescriptor::Null => "null".to_string(),
        }
    }

    /// Convert to TypeScript with parentheses if needed (array elements, union members)
    fn to_typescript_with_parens(&self) -> String {
        match self {
            TypeDescriptor::Union { members } | TypeDescriptor::Intersection { members }
                if members.len() > 1 =>
            {
                format!("({})", self.to_typescript())
            }
            TypeDescriptor::Function { .. } | TypeDescriptor::Conditional { .. } => {
                format!("({})", self.to_typescript())
            }
            _ => self.to_typescript(),
        }
    }

    /// Check if this is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive { .. })
    }

    /// Check if this is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Primitive {
                name: Primitive::Undefined
            }
        )
    }

    /// Check if this is a function type
    pub fn is_function(&self) -> bool {
        matches!(self, TypeDescriptor::Function { .. })
    }

    /// Name of a struct or reference, if it has one
    pub fn type_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Struct(s) => s.name.as_deref(),
            TypeDescriptor::Reference(r) => Some(&r.name),
            _ => None,
        }
    }

    /// Create a primitive type
    pub fn primitive(name: Primitive) -> Self {
        TypeDescriptor::Primitive { name }
    }

    /// Create a string type
    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }

    /// Create a number type
    pub fn number() -> Self {
        Self::primitive(Primitive::Number)
    }

    /// Create a boolean type
    pub fn boolean() -> Self {
        Self::primitive(Primitive::Boolean)
    }

    /// Create a void type
    pub fn void() -> Self {
        Self::primitive(Primitive::Void)
    }

    /// Create an undefined type
    pub fn undefined() -> Self {
        Self::primitive(Primitive::Undefined)
    }

    /// Create a string literal type
    pub fn string_literal(value: impl Into<String>) -> Self {
        TypeDescriptor::Literal {
            value: LiteralValue::String(value.into()),
        }
    }

    /// Create a number literal type
    pub fn number_literal(value: f64) -> Self {
        TypeDescriptor::Literal {
            value: LiteralValue::Number(value),
        }
    }

    /// Create an array type
    pub fn array(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
        }
    }

    /// Create a union type
    pub fn union(members: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Union { members }
    }

    /// Create an intersection type
    pub fn intersection(members: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Intersection { members }
    }

    /// Create a named reference without type arguments
    pub fn reference(name: impl Into<String>) -> Self {
        TypeDescriptor::Reference(TypeRef {
            name: name.into(),
            args: Vec::new(),
        })
    }

    /// Create a named reference with type arguments
    pub fn reference_with(name: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Reference(TypeRef {
            name: name.into(),
            args,
        })
    }

    /// Create an anonymous object literal
    pub fn object(members: Vec<StructMember>) -> Self {
        TypeDescriptor::Struct(StructType {
            name: None,
            type_args: Vec::new(),
            members,
        })
    }

    /// Create a named struct
    pub fn named_struct(name: impl Into<String>, members: Vec<StructMember>) -> Self {
        TypeDescriptor::Struct(StructType {
            name: Some(name.into()),
            type_args: Vec::new(),
            members,
        })
    }

    /// Create a mapped wrapper around `inner`
    pub fn mapped(wrapper: impl Into<String>, inner: TypeDescriptor) -> Self {
        TypeDescriptor::Mapped(MappedType {
            wrapper: wrapper.into(),
            args: vec![inner],
        })
    }

    /// Create a generic parameter reference
    pub fn generic(name: impl Into<String>) -> Self {
        TypeDescriptor::Generic {
            name: name.into(),
            constraint: None,
        }
    }

    /// Create a function type
    pub fn function(params: Vec<FunctionParam>, returns: TypeDescriptor) -> Self {
        TypeDescriptor::Function {
            params,
            returns: Box::new(returns),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_typescript())
    }
}

fn with_args(name: &str, args: &[TypeDescriptor]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        let args: Vec<String> = args.iter().map(|a| a.to_typescript()).collect();
        format!("{}<{}>", name, args.join(", "))
    }
}
