//! Generic parameters and mapped-type wrapper chains
//!
//! - [`declare`] prints a component's generic parameter list.
//! - [`bind_dependent`] maps the formal parameters of a referenced generic
//!   declaration to the component's own parameters or to concrete types.
//! - [`unwrap_mapped`] unwinds `Readonly<Partial<Foo<T>>>` into its wrapper
//!   layers and innermost type.

use crate::diagnostics::StructuralError;
use crate::ir::{TypeDeclaration, TypeDescriptor, TypeModel, TypeParam};
use crate::resolve::signature::{ResolveContext, SignatureResolver};
use indexmap::IndexSet;
use serde::Serialize;

/// Wrapper names treated as mapped layers even when given as plain references
pub const MAPPED_WRAPPERS: &[&str] = &[
    "Partial",
    "Required",
    "Readonly",
    "Pick",
    "Omit",
    "NonNullable",
];

/// Printed generic parameter list of a component
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericsInfo {
    /// `<T extends string = "a", U>`, empty when there are no parameters
    pub declaration: String,
    pub names: Vec<String>,
}

impl GenericsInfo {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Argument list instantiating every parameter with `any`
    pub fn any_arguments(&self) -> String {
        if self.names.is_empty() {
            String::new()
        } else {
            format!("<{}>", vec!["any"; self.names.len()].join(", "))
        }
    }

    /// Argument list forwarding the parameter names: `<T, U>`
    pub fn forwarded_arguments(&self) -> String {
        if self.names.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.names.join(", "))
        }
    }
}

/// What a formal parameter of a dependent declaration is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum BindingTarget {
    /// One of the component's own generic parameters
    Component { name: String },
    /// A concrete type
    #[serde(rename_all = "camelCase")]
    Concrete {
        display_type: String,
        doc_type: String,
    },
}

/// Binding of one formal parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericBinding {
    pub formal: String,
    pub target: BindingTarget,
}

/// One layer of a mapped-type chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperLayer {
    pub name: String,
    /// Printed extra type arguments (the key set of `Pick`, ...)
    pub params: Vec<String>,
}

impl WrapperLayer {
    fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Unwound mapped-type chain
#[derive(Debug, Clone, PartialEq)]
pub struct MappedChain {
    /// Outermost layer first
    pub wrappers: Vec<WrapperLayer>,
    pub inner: TypeDescriptor,
    /// Generic parameter names used in the innermost type's arguments
    pub inner_generics: Vec<String>,
}

/// Print a generic parameter list
pub fn declare(params: &[TypeParam]) -> GenericsInfo {
    if params.is_empty() {
        return GenericsInfo::default();
    }
    let printed: Vec<String> = params.iter().map(|p| p.to_typescript()).collect();
    GenericsInfo {
        declaration: format!("<{}>", printed.join(", ")),
        names: params.iter().map(|p| p.name.clone()).collect(),
    }
}

/// Bind the formal parameters of `decl` given the reference arguments
///
/// Arguments naming a component parameter bind to it directly. Missing
/// arguments use the formal's default, then the component parameter of the
/// same name, then the one at the same position.
pub fn bind_dependent(
    resolver: &mut SignatureResolver<'_>,
    decl: &TypeDeclaration,
    args: &[TypeDescriptor],
    component_generics: &[TypeParam],
) -> Result<Vec<GenericBinding>, StructuralError> {
    let mut bindings = Vec::with_capacity(decl.type_params.len());

    for (index, formal) in decl.type_params.iter().enumerate() {
        let arg = args.get(index).or(formal.default.as_ref());
        let target = match arg {
            Some(TypeDescriptor::Generic { name, .. }) => {
                match match_component(name, index, component_generics) {
                    Some(target) => target,
                    None => concrete(resolver, &TypeDescriptor::generic(name.clone()))?,
                }
            }
            Some(ty) => concrete(resolver, ty)?,
            None => match match_component(&formal.name, index, component_generics) {
                Some(target) => target,
                None => concrete(resolver, &TypeDescriptor::Any)?,
            },
        };
        bindings.push(GenericBinding {
            formal: formal.name.clone(),
            target,
        });
    }

    Ok(bindings)
}

fn match_component(
    name: &str,
    index: usize,
    component_generics: &[TypeParam],
) -> Option<BindingTarget> {
    component_generics
        .iter()
        .find(|p| p.name == name)
        .or_else(|| component_generics.get(index))
        .map(|p| BindingTarget::Component {
            name: p.name.clone(),
        })
}

fn concrete(
    resolver: &mut SignatureResolver<'_>,
    ty: &TypeDescriptor,
) -> Result<BindingTarget, StructuralError> {
    let sig = resolver.resolve(ty, ResolveContext::param())?;
    Ok(BindingTarget::Concrete {
        doc_type: sig.doc().to_string(),
        display_type: sig.display_type,
    })
}

/// Check whether a descriptor is a mapped-type layer
///
/// Plain references count when they name a known wrapper that the model
/// does not redeclare.
pub fn is_mapped_wrapper(model: &dyn TypeModel, ty: &TypeDescriptor) -> bool {
    match ty {
        TypeDescriptor::Mapped(m) => !m.args.is_empty(),
        TypeDescriptor::Reference(r) => {
            !r.args.is_empty()
                && MAPPED_WRAPPERS.contains(&r.name.as_str())
                && model.declaration(&r.name).is_none()
        }
        _ => false,
    }
}

/// Unwind a mapped-type chain outer to inner
///
/// Stops at the first layer without a type argument. A non-mapped type
/// yields an empty chain with itself as the inner type.
pub fn unwrap_mapped(model: &dyn TypeModel, ty: &TypeDescriptor) -> MappedChain {
    let mut wrappers = Vec::new();
    let mut current = ty;

    while is_mapped_wrapper(model, current) {
        let (name, args) = match current {
            TypeDescriptor::Mapped(m) => (&m.wrapper, &m.args),
            TypeDescriptor::Reference(r) => (&r.name, &r.args),
            _ => break,
        };
        let Some((inner, extra)) = args.split_first() else {
            break;
        };
        wrappers.push(WrapperLayer::new(
            name.clone(),
            extra.iter().map(|a| model.print(a)).collect(),
        ));
        current = inner;
    }

    let mut names = IndexSet::new();
    match current {
        TypeDescriptor::Reference(r) => r.args.iter().for_each(|a| collect_generics(a, &mut names)),
        TypeDescriptor::Struct(s) => s
            .type_args
            .iter()
            .for_each(|a| collect_generics(a, &mut names)),
        _ => {}
    }

    MappedChain {
        wrappers,
        inner: current.clone(),
        inner_generics: names.into_iter().collect(),
    }
}

fn collect_generics(ty: &TypeDescriptor, out: &mut IndexSet<String>) {
    match ty {
        TypeDescriptor::Generic { name, .. } => {
            out.insert(name.clone());
        }
        TypeDescriptor::Array { element } => collect_generics(element, out),
        TypeDescriptor::Union { members } | TypeDescriptor::Intersection { members } => {
            members.iter().for_each(|m| collect_generics(m, out))
        }
        TypeDescriptor::Reference(r) => r.args.iter().for_each(|a| collect_generics(a, out)),
        TypeDescriptor::Mapped(m) => m.args.iter().for_each(|a| collect_generics(a, out)),
        TypeDescriptor::Struct(s) => {
            s.type_args.iter().for_each(|a| collect_generics(a, out));
            s.members.iter().for_each(|m| collect_generics(&m.ty, out));
        }
        TypeDescriptor::Function { params, returns } => {
            params.iter().for_each(|p| collect_generics(&p.ty, out));
            collect_generics(returns, out);
        }
        _ => {}
    }
}
