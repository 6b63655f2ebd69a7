//! Type signature resolution
//!
//! Resolves a [`TypeDescriptor`] into a [`TypeSignature`]: the display type
//! used by runtime validators, the documentation type shown by design-time
//! tooling, and the enum/array/struct bookkeeping the walker and the
//! metadata tiers consume.
//!
//! # Resolution Rules
//!
//! | Descriptor | Display type | Doc type |
//! |------------|--------------|----------|
//! | `"a" \| "b" \| null` | `string\|null` | `"a"\|"b"\|null` |
//! | `Foo[]` | `Array<object>` | `Array<Foo>` |
//! | `interface Foo` | `object` | `Foo` |
//! | `Date`, `Map<K, V>` | printed text | printed text |
//! | `enum Size` | `string` / `number` | `Size` |
//! | `T` | `any` | `T` |
//! | `(a: A) => R` | `Function` | printed signature |
//! | `Readonly<Partial<Foo>>` | `object` | printed chain |
//!
//! Unsupported shapes degrade to `object` with a warning. The only hard
//! failure is a conditional type with no resolved branch in a property,
//! event detail or slot position.

use crate::config::BuildConfig;
use crate::diagnostics::{CheckCategory, Diagnostic, DiagnosticsCollector, StructuralError};
use crate::ir::{
    DeclarationKind, LiteralValue, Primitive, StructType, TypeDeclaration, TypeDescriptor,
    TypeModel,
};
use crate::resolve::generics::{self, WrapperLayer};
use im::OrdSet;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// Library types kept verbatim and never expanded into properties
pub const WELL_KNOWN_TYPES: &[&str] = &[
    "Date",
    "Map",
    "Set",
    "Promise",
    "Record",
    "HTMLElement",
    "Element",
    "Node",
    "Event",
    "CustomEvent",
    "RegExp",
    "Error",
    "ReadonlyArray",
    "WeakMap",
    "WeakSet",
    "File",
    "Blob",
];

/// Position a type appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextKind {
    Property,
    Param,
    Return,
    EventDetail,
    SlotData,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContextKind::Property => "property",
            ContextKind::Param => "parameter",
            ContextKind::Return => "return",
            ContextKind::EventDetail => "event detail",
            ContextKind::SlotData => "slot data",
        };
        f.write_str(s)
    }
}

/// Resolution context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolveContext {
    pub kind: ContextKind,
    /// Resolving members of an inline expansion: no typedefs, no fallback warnings
    pub in_extension: bool,
}

impl ResolveContext {
    pub fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            in_extension: false,
        }
    }

    pub fn property() -> Self {
        Self::new(ContextKind::Property)
    }

    pub fn param() -> Self {
        Self::new(ContextKind::Param)
    }

    pub fn returns() -> Self {
        Self::new(ContextKind::Return)
    }

    pub fn event_detail() -> Self {
        Self::new(ContextKind::EventDetail)
    }

    pub fn slot_data() -> Self {
        Self::new(ContextKind::SlotData)
    }

    /// Same kind, inside an inline expansion
    pub fn extension(mut self) -> Self {
        self.in_extension = true;
        self
    }

    fn requires_concrete(&self) -> bool {
        matches!(
            self.kind,
            ContextKind::Property | ContextKind::EventDetail | ContextKind::SlotData
        )
    }
}

/// Resolved description of a type
///
/// The display type, doc type, enum values and the two enum/array flags
/// feed the metadata tiers; the remaining fields are engine bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSignature {
    pub display_type: String,
    pub doc_type: Option<String>,
    pub enum_values: Option<IndexSet<String>>,
    pub is_enum_values_for_dt_only: bool,
    pub is_array_of_object: bool,

    pub requires_typedef: bool,
    pub typedef: Option<String>,
    pub nullable: bool,
    pub optional_via_union: bool,
    /// Struct-shaped and expandable into sub-properties
    pub is_struct: bool,
    pub type_name: Option<String>,
    pub circular_ref: bool,
    /// Mapped wrappers around the resolved type, outermost first
    pub wrappers: Vec<WrapperLayer>,
}

impl TypeSignature {
    /// Create a signature with the same display and doc type
    pub fn simple(display: impl Into<String>) -> Self {
        let display = display.into();
        Self {
            doc_type: Some(display.clone()),
            display_type: display,
            ..Default::default()
        }
    }

    /// Create a signature with distinct display and doc types
    pub fn documented(display: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            display_type: display.into(),
            doc_type: Some(doc.into()),
            ..Default::default()
        }
    }

    /// The `any` signature
    pub fn any() -> Self {
        Self::simple("any")
    }

    /// Doc type, falling back to the display type
    pub fn doc(&self) -> &str {
        self.doc_type.as_deref().unwrap_or(&self.display_type)
    }

    /// Enum values that belong in runtime metadata
    pub fn structural_enum_values(&self) -> Option<&IndexSet<String>> {
        if self.is_enum_values_for_dt_only {
            None
        } else {
            self.enum_values.as_ref()
        }
    }

    /// Check whether the display type is a single primitive keyword
    pub fn is_primitive_display(&self) -> bool {
        matches!(
            self.display_type.as_str(),
            "string" | "number" | "boolean" | "bigint" | "symbol"
        )
    }
}

/// Struct-shaped type the walker can expand
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionTarget {
    /// Type whose members are expanded (struct, reference or mapped chain)
    pub ty: TypeDescriptor,
    /// Declared name, used for cycle detection
    pub name: Option<String>,
    /// Reached through an array element
    pub array: bool,
}

/// Resolves type descriptors against a type model
pub struct SignatureResolver<'a> {
    model: &'a dyn TypeModel,
    config: &'a BuildConfig,
    diagnostics: DiagnosticsCollector,
    component: Option<String>,
    reported_deprecations: BTreeSet<String>,
}

impl<'a> SignatureResolver<'a> {
    /// Create a resolver over a model
    pub fn new(model: &'a dyn TypeModel, config: &'a BuildConfig) -> Self {
        Self {
            model,
            config,
            diagnostics: DiagnosticsCollector::new(),
            component: None,
            reported_deprecations: BTreeSet::new(),
        }
    }

    /// Attribute subsequent diagnostics to a component
    pub fn set_component(&mut self, name: impl Into<String>) {
        self.component = Some(name.into());
        self.reported_deprecations.clear();
    }

    /// The underlying model
    pub fn model(&self) -> &'a dyn TypeModel {
        self.model
    }

    /// The build configuration
    pub fn config(&self) -> &'a BuildConfig {
        self.config
    }

    /// Take the diagnostics collected so far
    pub fn take_diagnostics(&mut self) -> DiagnosticsCollector {
        std::mem::take(&mut self.diagnostics)
    }

    /// Resolve a type in a context
    pub fn resolve(
        &mut self,
        ty: &TypeDescriptor,
        ctx: ResolveContext,
    ) -> Result<TypeSignature, StructuralError> {
        self.resolve_with(ty, ctx, &OrdSet::new())
    }

    /// Check whether a name is kept verbatim and never expanded
    pub fn is_well_known(&self, name: &str) -> bool {
        WELL_KNOWN_TYPES.contains(&name)
            || self.config.well_known_types.contains(name)
            || self.model.declaration(name).map_or(false, |d| d.library)
    }

    fn resolve_with(
        &mut self,
        ty: &TypeDescriptor,
        ctx: ResolveContext,
        seen: &OrdSet<String>,
    ) -> Result<TypeSignature, StructuralError> {
        match ty {
            TypeDescriptor::Primitive { name } => Ok(TypeSignature::simple(name.to_typescript())),

            TypeDescriptor::Literal { value } => Ok(literal_signature(value)),

            TypeDescriptor::Array { element } => {
                let elem = self.resolve_with(element, ctx, seen)?;
                Ok(array_signature(elem))
            }

            TypeDescriptor::Struct(s) => Ok(self.resolve_struct(ty, s, ctx)),

            TypeDescriptor::Reference(r) => self.resolve_reference(ty, &r.name, ctx, seen),

            TypeDescriptor::Union { members } => self.resolve_union(members, ctx, seen),

            TypeDescriptor::Intersection { members } => {
                self.resolve_intersection(members, ctx, seen)
            }

            TypeDescriptor::Mapped(m) if m.args.is_empty() => {
                let printed = self.model.print(ty);
                self.degrade(
                    ctx,
                    format!("mapped type `{}` has no type argument", m.wrapper),
                );
                Ok(TypeSignature::documented("object", printed))
            }

            TypeDescriptor::Mapped(_) => {
                let chain = generics::unwrap_mapped(self.model, ty);
                let mut sig = self.resolve_with(&chain.inner, ctx, seen)?;
                sig.doc_type = Some(self.model.print(ty));
                sig.wrappers = chain.wrappers;
                Ok(sig)
            }

            TypeDescriptor::Generic { name, .. } => Ok(TypeSignature::documented("any", name)),

            TypeDescriptor::Function { .. } => {
                Ok(TypeSignature::documented("Function", self.model.print(ty)))
            }

            TypeDescriptor::Conditional { text, resolved } => match resolved {
                Some(branch) => self.resolve_with(branch, ctx, seen),
                None if ctx.requires_concrete() => Err(StructuralError::UnresolvedConditional {
                    text: text.clone(),
                    context: ctx.kind.to_string(),
                }),
                None => Ok(TypeSignature::documented("any", text)),
            },

            TypeDescriptor::Any | TypeDescriptor::Unknown => Ok(TypeSignature::any()),

            TypeDescriptor::Null => Ok(TypeSignature::simple("null")),
        }
    }

    fn resolve_struct(
        &mut self,
        ty: &TypeDescriptor,
        s: &StructType,
        ctx: ResolveContext,
    ) -> TypeSignature {
        let printed = self.model.print(ty);
        let name = match &s.name {
            Some(name) => name,
            None => {
                let readable =
                    !s.members.is_empty() && s.members.iter().all(|m| self.is_simple(&m.ty));
                let mut sig = if readable {
                    TypeSignature::simple(printed)
                } else {
                    TypeSignature::documented("object", printed)
                };
                sig.is_struct = true;
                return sig;
            }
        };

        if self.is_well_known(name) {
            return TypeSignature::simple(printed);
        }

        let model = self.model;
        let decl = model.declaration(name);
        if let Some(decl) = decl {
            self.check_deprecated(decl);
        }
        let mut sig = TypeSignature::documented("object", printed);
        sig.is_struct = true;
        sig.type_name = Some(name.clone());
        self.mark_typedef(&mut sig, name, decl.map_or(false, |d| d.exported), ctx);
        sig
    }

    fn resolve_reference(
        &mut self,
        ty: &TypeDescriptor,
        name: &str,
        ctx: ResolveContext,
        seen: &OrdSet<String>,
    ) -> Result<TypeSignature, StructuralError> {
        let printed = self.model.print(ty);

        if generics::is_mapped_wrapper(self.model, ty) {
            let chain = generics::unwrap_mapped(self.model, ty);
            let mut sig = self.resolve_with(&chain.inner, ctx, seen)?;
            sig.doc_type = Some(printed);
            sig.wrappers = chain.wrappers;
            return Ok(sig);
        }

        let model = self.model;
        let decl = match model.declaration(name) {
            Some(decl) => decl,
            None if self.is_well_known(name) => return Ok(TypeSignature::simple(printed)),
            None => {
                self.degrade(ctx, format!("type `{}` is not declared in the type model", printed));
                return Ok(TypeSignature::documented("object", printed));
            }
        };

        self.check_deprecated(decl);
        if decl.library || self.is_well_known(name) {
            return Ok(TypeSignature::simple(printed));
        }

        match decl.kind {
            DeclarationKind::Enum => Ok(enum_signature(decl)),

            DeclarationKind::Interface | DeclarationKind::Class => {
                let mut sig = TypeSignature::documented("object", printed);
                sig.is_struct = true;
                sig.type_name = Some(decl.name.clone());
                self.mark_typedef(&mut sig, &decl.name, decl.exported, ctx);
                Ok(sig)
            }

            DeclarationKind::Alias => {
                if seen.contains(name) {
                    debug!(alias = name, "recursive alias resolved to any");
                    let mut sig = TypeSignature::documented("any", printed);
                    sig.circular_ref = true;
                    return Ok(sig);
                }
                let inner_seen = seen.update(name.to_string());
                let mut sig = self.resolve_with(&decl.body, ctx, &inner_seen)?;
                sig.doc_type = Some(printed);
                if sig.is_struct && sig.wrappers.is_empty() {
                    sig.type_name = Some(decl.name.clone());
                    self.mark_typedef(&mut sig, &decl.name, decl.exported, ctx);
                }
                Ok(sig)
            }
        }
    }

    fn resolve_union(
        &mut self,
        members: &[TypeDescriptor],
        ctx: ResolveContext,
        seen: &OrdSet<String>,
    ) -> Result<TypeSignature, StructuralError> {
        let mut flat = Vec::new();
        flatten_union(members, &mut flat);

        let mut nullable = false;
        let mut optional_via_union = false;
        let mut rest = Vec::new();
        for member in flat {
            match member {
                TypeDescriptor::Any | TypeDescriptor::Unknown => return Ok(TypeSignature::any()),
                TypeDescriptor::Null => nullable = true,
                m if m.is_undefined() => {
                    if ctx.kind == ContextKind::Return {
                        optional_via_union = true;
                    }
                }
                m => rest.push(m),
            }
        }

        let mut sig = match rest.as_slice() {
            [] if nullable => {
                let mut sig = TypeSignature::simple("null");
                sig.optional_via_union = optional_via_union;
                return Ok(sig);
            }
            [] => return Ok(TypeSignature::simple("undefined")),
            [single] => self.resolve_with(single, ctx, seen)?,
            many => self.resolve_union_members(many, ctx, seen)?,
        };

        if sig.display_type == "any" {
            return Ok(sig);
        }
        if nullable {
            sig.nullable = true;
            sig.display_type.push_str("|null");
            if let Some(ref mut doc) = sig.doc_type {
                doc.push_str("|null");
            }
        }
        sig.optional_via_union = optional_via_union;
        Ok(sig)
    }

    fn resolve_union_members(
        &mut self,
        members: &[&TypeDescriptor],
        ctx: ResolveContext,
        seen: &OrdSet<String>,
    ) -> Result<TypeSignature, StructuralError> {
        let mut displays: IndexSet<String> = IndexSet::new();
        let mut docs: IndexSet<String> = IndexSet::new();
        let mut enum_values: IndexSet<String> = IndexSet::new();
        let mut has_enum_members = false;
        let mut other_displays: IndexSet<String> = IndexSet::new();
        let mut collapse_to_any = false;
        let mut requires_typedef = false;
        let mut typedef = None;

        for member in members {
            let sig = self.resolve_with(member, ctx, seen)?;
            if sig.display_type == "any" {
                collapse_to_any = true;
            }
            match sig.enum_values {
                Some(ref values) => {
                    has_enum_members = true;
                    enum_values.extend(values.iter().cloned());
                }
                None => {
                    other_displays.insert(sig.display_type.clone());
                }
            }
            requires_typedef |= sig.requires_typedef;
            if typedef.is_none() {
                typedef = sig.typedef.clone();
            }
            docs.insert(sig.doc().to_string());
            displays.insert(sig.display_type);
        }

        let doc = docs.into_iter().collect::<Vec<_>>().join("|");
        if collapse_to_any {
            return Ok(TypeSignature::documented("any", doc));
        }

        let mut sig = TypeSignature::documented(
            displays.into_iter().collect::<Vec<_>>().join("|"),
            doc,
        );
        sig.requires_typedef = requires_typedef;
        sig.typedef = typedef;

        if has_enum_members && !enum_values.is_empty() {
            match other_displays.len() {
                0 => sig.enum_values = Some(enum_values),
                1 => {
                    sig.enum_values = Some(enum_values);
                    sig.is_enum_values_for_dt_only = true;
                }
                _ => debug!("mixed union members, enum values dropped"),
            }
        }
        Ok(sig)
    }

    fn resolve_intersection(
        &mut self,
        members: &[TypeDescriptor],
        ctx: ResolveContext,
        seen: &OrdSet<String>,
    ) -> Result<TypeSignature, StructuralError> {
        if let [a, b] = members {
            let pair = match (is_empty_marker(a), is_empty_marker(b)) {
                (false, true) => Some(a),
                (true, false) => Some(b),
                _ => None,
            };
            if let Some(candidate) = pair {
                let sig = self.resolve_with(candidate, ctx, seen)?;
                if sig.is_primitive_display() {
                    return Ok(sig);
                }
            }
        }

        let names: Vec<String> = members
            .iter()
            .map(|m| match m.type_name() {
                Some(name) => name.to_string(),
                None => self.model.print(m),
            })
            .collect();
        Ok(TypeSignature::documented("object", names.join(" & ")))
    }

    /// Find the struct-shaped type behind a descriptor, if it can be expanded
    ///
    /// Nullish union members are ignored, aliases are followed and one
    /// array level is looked through.
    pub fn expansion_target(&self, ty: &TypeDescriptor) -> Option<ExpansionTarget> {
        self.expansion_target_inner(ty, false, 0)
    }

    fn expansion_target_inner(
        &self,
        ty: &TypeDescriptor,
        array: bool,
        depth: usize,
    ) -> Option<ExpansionTarget> {
        if depth > 32 {
            return None;
        }
        match ty {
            TypeDescriptor::Union { members } => {
                let mut flat = Vec::new();
                flatten_union(members, &mut flat);
                let mut rest = flat
                    .into_iter()
                    .filter(|m| !matches!(m, TypeDescriptor::Null) && !m.is_undefined());
                match (rest.next(), rest.next()) {
                    (Some(single), None) => self.expansion_target_inner(single, array, depth + 1),
                    _ => None,
                }
            }
            TypeDescriptor::Array { element } if !array => {
                self.expansion_target_inner(element, true, depth + 1)
            }
            TypeDescriptor::Struct(s) => match &s.name {
                Some(name) if self.is_well_known(name) => None,
                name => Some(ExpansionTarget {
                    ty: ty.clone(),
                    name: name.clone(),
                    array,
                }),
            },
            TypeDescriptor::Reference(r) => {
                if generics::is_mapped_wrapper(self.model, ty) {
                    return self.mapped_target(ty, array, depth);
                }
                if self.is_well_known(&r.name) {
                    return None;
                }
                let decl = self.model.declaration(&r.name)?;
                match decl.kind {
                    DeclarationKind::Interface | DeclarationKind::Class => Some(ExpansionTarget {
                        ty: ty.clone(),
                        name: Some(decl.name.clone()),
                        array,
                    }),
                    DeclarationKind::Alias => {
                        let target = self.expansion_target_inner(&decl.body, array, depth + 1)?;
                        // Anonymous bodies take the alias name for cycle detection
                        Some(ExpansionTarget {
                            name: target.name.or_else(|| Some(decl.name.clone())),
                            ..target
                        })
                    }
                    DeclarationKind::Enum => None,
                }
            }
            TypeDescriptor::Mapped(m) if !m.args.is_empty() => self.mapped_target(ty, array, depth),
            TypeDescriptor::Conditional {
                resolved: Some(branch),
                ..
            } => self.expansion_target_inner(branch, array, depth + 1),
            _ => None,
        }
    }

    fn mapped_target(
        &self,
        ty: &TypeDescriptor,
        array: bool,
        depth: usize,
    ) -> Option<ExpansionTarget> {
        let chain = generics::unwrap_mapped(self.model, ty);
        let inner = self.expansion_target_inner(&chain.inner, false, depth + 1)?;
        if inner.array {
            return None;
        }
        Some(ExpansionTarget {
            ty: ty.clone(),
            name: inner.name,
            array,
        })
    }

    fn is_simple(&self, ty: &TypeDescriptor) -> bool {
        match ty {
            TypeDescriptor::Primitive { .. } | TypeDescriptor::Literal { .. } => true,
            TypeDescriptor::Union { members } => members.iter().all(|m| {
                matches!(
                    m,
                    TypeDescriptor::Literal { .. }
                        | TypeDescriptor::Null
                        | TypeDescriptor::Primitive { .. }
                )
            }),
            TypeDescriptor::Reference(r) => self
                .model
                .declaration(&r.name)
                .map_or(false, |d| d.kind == DeclarationKind::Enum),
            _ => false,
        }
    }

    fn mark_typedef(&self, sig: &mut TypeSignature, name: &str, exported: bool, ctx: ResolveContext) {
        if ctx.in_extension {
            return;
        }
        sig.requires_typedef = true;
        if exported {
            sig.typedef = Some(name.to_string());
        }
    }

    fn check_deprecated(&mut self, decl: &TypeDeclaration) {
        let Some(ref note) = decl.deprecated else {
            return;
        };
        if !self.config.is_enabled(CheckCategory::DeprecatedType)
            || !self.reported_deprecations.insert(decl.name.clone())
        {
            return;
        }
        let mut message = format!("type `{}` is deprecated", decl.name);
        if !note.is_empty() {
            message.push_str(": ");
            message.push_str(note);
        }
        warn!(component = self.component.as_deref().unwrap_or(""), "{}", message);
        self.push(Diagnostic::warning(message).with_category(CheckCategory::DeprecatedType));
    }

    fn degrade(&mut self, ctx: ResolveContext, message: String) {
        if ctx.in_extension || !self.config.is_enabled(CheckCategory::UnsupportedType) {
            return;
        }
        warn!(component = self.component.as_deref().unwrap_or(""), "{}, using object", message);
        self.push(
            Diagnostic::warning(format!("{}, using `object`", message))
                .with_category(CheckCategory::UnsupportedType),
        );
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match self.component {
            Some(ref name) => diagnostic.in_component(name.clone()),
            None => diagnostic,
        };
        self.diagnostics.add(diagnostic);
    }
}

fn literal_signature(value: &LiteralValue) -> TypeSignature {
    let mut sig = TypeSignature::documented(value.widened().to_typescript(), value.to_typescript());
    if let LiteralValue::String(s) = value {
        sig.enum_values = Some(IndexSet::from([s.clone()]));
    }
    sig
}

fn array_signature(elem: TypeSignature) -> TypeSignature {
    TypeSignature {
        display_type: format!("Array<{}>", elem.display_type),
        doc_type: Some(format!("Array<{}>", elem.doc())),
        enum_values: elem.enum_values,
        is_enum_values_for_dt_only: elem.is_enum_values_for_dt_only,
        is_array_of_object: elem.is_struct,
        requires_typedef: elem.requires_typedef,
        typedef: elem.typedef,
        type_name: elem.type_name,
        circular_ref: elem.circular_ref,
        ..Default::default()
    }
}

fn enum_signature(decl: &TypeDeclaration) -> TypeSignature {
    let numeric = !decl.enum_values.is_empty()
        && decl
            .enum_values
            .iter()
            .all(|v| v.widened() == Primitive::Number);
    let display = if numeric { "number" } else { "string" };
    let mut sig = TypeSignature::documented(display, decl.name.clone());
    sig.enum_values = Some(decl.enum_values.iter().map(|v| v.as_text()).collect());
    sig.type_name = Some(decl.name.clone());
    sig
}

fn is_empty_marker(ty: &TypeDescriptor) -> bool {
    matches!(ty, TypeDescriptor::Struct(s) if s.is_empty_marker())
}

fn flatten_union<'t>(members: &'t [TypeDescriptor], out: &mut Vec<&'t TypeDescriptor>) {
    for member in members {
        match member {
            TypeDescriptor::Union { members } => flatten_union(members, out),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{InMemoryTypeModel, StructMember, TypeDeclaration};
    use pretty_assertions::assert_eq;

    fn model() -> InMemoryTypeModel {
        InMemoryTypeModel::new()
            .declare(TypeDeclaration::interface(
                "Item",
                vec![StructMember::new("label", TypeDescriptor::string())],
            ))
            .declare(
                TypeDeclaration::interface(
                    "Hidden",
                    vec![StructMember::new("x", TypeDescriptor::number())],
                )
                .local(),
            )
            .declare(TypeDeclaration::enumeration(
                "Size",
                vec![
                    LiteralValue::String("S".into()),
                    LiteralValue::String("M".into()),
                ],
            ))
            .declare(TypeDeclaration::alias(
                "Json",
                TypeDescriptor::union(vec![
                    TypeDescriptor::string(),
                    TypeDescriptor::array(TypeDescriptor::reference("Json")),
                ]),
            ))
            .declare(TypeDeclaration::interface("Temporal", vec![]).library())
            .declare(TypeDeclaration::interface("Legacy", vec![]).deprecated("use Item"))
    }

    fn resolve(ty: TypeDescriptor) -> TypeSignature {
        let model = model();
        let config = BuildConfig::default();
        let mut resolver = SignatureResolver::new(&model, &config);
        resolver.resolve(&ty, ResolveContext::property()).unwrap()
    }

    #[test]
    fn test_nullable_primitive() {
        let sig = resolve(TypeDescriptor::union(vec![
            TypeDescriptor::string(),
            TypeDescriptor::Null,
        ]));
        assert_eq!(sig.display_type, "string|null");
        assert!(sig.nullable);
        assert!(sig.enum_values.is_none());
    }

    #[test]
    fn test_string_literal_union() {
        let sig = resolve(TypeDescriptor::union(vec![
            TypeDescriptor::string_literal("a"),
            TypeDescriptor::string_literal("b"),
            TypeDescriptor::Null,
        ]));
        assert_eq!(sig.display_type, "string|null");
        assert_eq!(sig.doc(), "\"a\"|\"b\"|null");
        let values: Vec<&str> = sig.enum_values.as_ref().unwrap().iter().map(|s| s.as_str()).collect();
        assert_eq!(values, vec!["a", "b"]);
        assert!(!sig.is_enum_values_for_dt_only);
    }

    #[test]
    fn test_literals_with_uniform_other_member() {
        let sig = resolve(TypeDescriptor::union(vec![
            TypeDescriptor::string_literal("auto"),
            TypeDescriptor::number(),
        ]));
        assert_eq!(sig.display_type, "string|number");
        assert!(sig.is_enum_values_for_dt_only);
        assert!(sig.structural_enum_values().is_none());

        let mixed = resolve(TypeDescriptor::union(vec![
            TypeDescriptor::string_literal("auto"),
            TypeDescriptor::number(),
            TypeDescriptor::boolean(),
        ]));
        assert!(mixed.enum_values.is_none());
    }

    #[test]
    fn test_undefined_only_marks_return_context() {
        let model = model();
        let config = BuildConfig::default();
        let mut resolver = SignatureResolver::new(&model, &config);
        let ty = TypeDescriptor::union(vec![TypeDescriptor::number(), TypeDescriptor::undefined()]);

        let ret = resolver.resolve(&ty, ResolveContext::returns()).unwrap();
        assert_eq!(ret.display_type, "number");
        assert!(ret.optional_via_union);

        let prop = resolver.resolve(&ty, ResolveContext::property()).unwrap();
        assert_eq!(prop.display_type, "number");
        assert!(!prop.optional_via_union);
    }

    #[test]
    fn test_any_collapses_union() {
        let sig = resolve(TypeDescriptor::union(vec![
            TypeDescriptor::string(),
            TypeDescriptor::Unknown,
            TypeDescriptor::Null,
        ]));
        assert_eq!(sig.display_type, "any");
        assert!(!sig.nullable);
    }

    #[test]
    fn test_branded_primitive_intersection() {
        let sig = resolve(TypeDescriptor::intersection(vec![
            TypeDescriptor::string(),
            TypeDescriptor::object(vec![]),
        ]));
        assert_eq!(sig.display_type, "string");

        let triple = resolve(TypeDescriptor::intersection(vec![
            TypeDescriptor::string(),
            TypeDescriptor::object(vec![]),
            TypeDescriptor::object(vec![]),
        ]));
        assert_eq!(triple.display_type, "object");

        let opaque = resolve(TypeDescriptor::intersection(vec![
            TypeDescriptor::reference("Item"),
            TypeDescriptor::reference("Hidden"),
        ]));
        assert_eq!(opaque.display_type, "object");
        assert_eq!(opaque.doc(), "Item & Hidden");
    }

    #[test]
    fn test_array_of_interface() {
        let sig = resolve(TypeDescriptor::array(TypeDescriptor::reference("Item")));
        assert_eq!(sig.display_type, "Array<object>");
        assert_eq!(sig.doc(), "Array<Item>");
        assert!(sig.is_array_of_object);
        assert_eq!(sig.typedef.as_deref(), Some("Item"));
    }

    #[test]
    fn test_interfaces_and_typedefs() {
        let exported = resolve(TypeDescriptor::reference("Item"));
        assert_eq!(exported.display_type, "object");
        assert!(exported.is_struct);
        assert!(exported.requires_typedef);
        assert_eq!(exported.typedef.as_deref(), Some("Item"));

        let local = resolve(TypeDescriptor::reference("Hidden"));
        assert!(local.requires_typedef);
        assert!(local.typedef.is_none());
    }

    #[test]
    fn test_well_known_and_library_types() {
        let date = resolve(TypeDescriptor::reference("Date"));
        assert_eq!(date.display_type, "Date");
        assert!(!date.is_struct);

        let map = resolve(TypeDescriptor::reference_with(
            "Map",
            vec![TypeDescriptor::string(), TypeDescriptor::number()],
        ));
        assert_eq!(map.display_type, "Map<string, number>");

        let lib = resolve(TypeDescriptor::reference("Temporal"));
        assert_eq!(lib.display_type, "Temporal");
        assert!(!lib.requires_typedef);
    }

    #[test]
    fn test_readable_anonymous_literal() {
        let sig = resolve(TypeDescriptor::object(vec![
            StructMember::new("x", TypeDescriptor::number()),
            StructMember::new("y", TypeDescriptor::number()),
        ]));
        assert_eq!(sig.display_type, "{ x: number; y: number }");

        let nested = resolve(TypeDescriptor::object(vec![StructMember::new(
            "item",
            TypeDescriptor::reference("Item"),
        )]));
        assert_eq!(nested.display_type, "object");
        assert!(nested.is_struct);
    }

    #[test]
    fn test_enum_declaration() {
        let sig = resolve(TypeDescriptor::reference("Size"));
        assert_eq!(sig.display_type, "string");
        assert_eq!(sig.doc(), "Size");
        assert_eq!(sig.enum_values.unwrap().len(), 2);
    }

    #[test]
    fn test_recursive_alias_terminates() {
        let sig = resolve(TypeDescriptor::reference("Json"));
        assert_eq!(sig.display_type, "string|Array<any>");
        assert_eq!(sig.doc(), "Json");
    }

    #[test]
    fn test_generic_function_and_mapped() {
        assert_eq!(resolve(TypeDescriptor::generic("T")).doc(), "T");
        assert_eq!(resolve(TypeDescriptor::generic("T")).display_type, "any");

        let f = resolve(TypeDescriptor::function(vec![], TypeDescriptor::void()));
        assert_eq!(f.display_type, "Function");
        assert_eq!(f.doc(), "() => void");

        let mapped = resolve(TypeDescriptor::mapped(
            "Readonly",
            TypeDescriptor::mapped("Partial", TypeDescriptor::reference("Item")),
        ));
        assert_eq!(mapped.display_type, "object");
        assert_eq!(mapped.doc(), "Readonly<Partial<Item>>");
        assert_eq!(mapped.wrappers.len(), 2);
    }

    #[test]
    fn test_mapped_without_argument_degrades() {
        let model = model();
        let config = BuildConfig::default();
        let mut resolver = SignatureResolver::new(&model, &config);
        let ty: TypeDescriptor =
            serde_json::from_str(r#"{"kind":"mapped","wrapper":"Partial"}"#).unwrap();

        let sig = resolver.resolve(&ty, ResolveContext::property()).unwrap();
        assert_eq!(sig.display_type, "object");
        assert_eq!(sig.doc(), "Partial");
        assert!(resolver.expansion_target(&ty).is_none());

        let diagnostics = resolver.take_diagnostics();
        assert_eq!(diagnostics.warning_count(), 1);
        assert!(diagnostics.diagnostics()[0].message.contains("Partial"));
    }

    #[test]
    fn test_unresolved_conditional() {
        let model = model();
        let config = BuildConfig::default();
        let mut resolver = SignatureResolver::new(&model, &config);
        let cond = TypeDescriptor::Conditional {
            text: "T extends string ? A : B".into(),
            resolved: None,
        };

        let err = resolver.resolve(&cond, ResolveContext::property()).unwrap_err();
        assert!(matches!(err, StructuralError::UnresolvedConditional { .. }));

        let param = resolver.resolve(&cond, ResolveContext::param()).unwrap();
        assert_eq!(param.display_type, "any");
    }

    #[test]
    fn test_unknown_reference_degrades_with_warning() {
        let model = model();
        let config = BuildConfig::default();
        let mut resolver = SignatureResolver::new(&model, &config);
        let sig = resolver
            .resolve(&TypeDescriptor::reference("Missing"), ResolveContext::property())
            .unwrap();
        assert_eq!(sig.display_type, "object");
        let diagnostics = resolver.take_diagnostics();
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(
            diagnostics.diagnostics()[0].category,
            Some(CheckCategory::UnsupportedType)
        );
    }

    #[test]
    fn test_deprecated_type_warning_can_be_disabled() {
        let model = model();
        let config = BuildConfig::default();
        let mut resolver = SignatureResolver::new(&model, &config);
        resolver
            .resolve(&TypeDescriptor::reference("Legacy"), ResolveContext::property())
            .unwrap();
        resolver
            .resolve(&TypeDescriptor::reference("Legacy"), ResolveContext::param())
            .unwrap();
        assert_eq!(resolver.take_diagnostics().warning_count(), 1);

        let quiet = BuildConfig::default().disable(CheckCategory::DeprecatedType);
        let mut resolver = SignatureResolver::new(&model, &quiet);
        resolver
            .resolve(&TypeDescriptor::reference("Legacy"), ResolveContext::property())
            .unwrap();
        assert_eq!(resolver.take_diagnostics().warning_count(), 0);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let ty = TypeDescriptor::union(vec![
            TypeDescriptor::array(TypeDescriptor::reference("Item")),
            TypeDescriptor::Null,
        ]);
        assert_eq!(resolve(ty.clone()), resolve(ty));
    }

    #[test]
    fn test_expansion_target() {
        let model = model();
        let config = BuildConfig::default();
        let resolver = SignatureResolver::new(&model, &config);

        let target = resolver
            .expansion_target(&TypeDescriptor::union(vec![
                TypeDescriptor::array(TypeDescriptor::reference("Item")),
                TypeDescriptor::Null,
            ]))
            .unwrap();
        assert!(target.array);
        assert_eq!(target.name.as_deref(), Some("Item"));

        assert!(resolver.expansion_target(&TypeDescriptor::reference("Date")).is_none());
        assert!(resolver.expansion_target(&TypeDescriptor::reference("Size")).is_none());
        assert!(resolver.expansion_target(&TypeDescriptor::string()).is_none());
    }
}
