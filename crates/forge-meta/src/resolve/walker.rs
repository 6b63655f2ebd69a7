//! Complex property walker
//!
//! Expands struct-shaped types into nested [`PropertyDescriptor`] trees.
//!
//! Each branch carries its own [`PropertyPath`] whose seen-set is a
//! persistent set: extending a path shares structure with the parent and
//! never mutates it, so sibling branches never observe each other's marks.
//! A member whose type name is already on the path becomes a circular
//! placeholder (`object` or `Array<object>`) and is not descended into.

use crate::diagnostics::StructuralError;
use crate::ir::{LiteralValue, StructMember, TypeDescriptor, TypeModel};
use crate::metadata::{PropertyDescriptor, PropertyMap};
use crate::resolve::generics;
use crate::resolve::signature::{ExpansionTarget, ResolveContext, SignatureResolver};
use im::OrdSet;
use std::fmt;
use tracing::debug;

/// Position of a property inside an expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<String>,
    seen: OrdSet<String>,
    /// Names of enclosing array-typed members
    arrays: Vec<String>,
}

impl PropertyPath {
    /// Create a root path for a component property
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
            ..Default::default()
        }
    }

    /// Extend with a member name
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self {
            segments,
            seen: self.seen.clone(),
            arrays: self.arrays.clone(),
        }
    }

    /// Mark a type name as visited on this branch
    pub fn visiting(&self, type_name: &str) -> Self {
        Self {
            seen: self.seen.update(type_name.to_string()),
            ..self.clone()
        }
    }

    /// Enter the element of an array-typed member
    pub fn entering_array(&self) -> Self {
        let mut arrays = self.arrays.clone();
        arrays.push(self.segments.last().cloned().unwrap_or_default());
        Self {
            arrays,
            ..self.clone()
        }
    }

    /// Check whether a type name was visited on this branch
    pub fn has_seen(&self, type_name: &str) -> bool {
        self.seen.contains(type_name)
    }

    /// Check whether no enclosing member is an array
    pub fn is_outside_arrays(&self) -> bool {
        self.arrays.is_empty()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Expansion of one top-level property
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expansion {
    pub properties: Option<PropertyMap>,
    pub item_properties: Option<PropertyMap>,
}

/// Walks struct-shaped types into property trees
pub struct PropertyWalker<'r, 'a> {
    resolver: &'r mut SignatureResolver<'a>,
}

impl<'r, 'a> PropertyWalker<'r, 'a> {
    pub fn new(resolver: &'r mut SignatureResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Expand a top-level property, event detail or slot type
    ///
    /// Arrays of structs at this level expand into item properties,
    /// structs into inline properties.
    pub fn expand_root(
        &mut self,
        name: &str,
        ty: &TypeDescriptor,
    ) -> Result<Expansion, StructuralError> {
        let Some(target) = self.resolver.expansion_target(ty) else {
            return Ok(Expansion::default());
        };
        let mut path = PropertyPath::root(name);
        if let Some(ref type_name) = target.name {
            path = path.visiting(type_name);
        }
        if target.array {
            let items = self.expand(&target, &path.entering_array())?;
            Ok(Expansion {
                properties: None,
                item_properties: items,
            })
        } else {
            Ok(Expansion {
                properties: self.expand(&target, &path)?,
                item_properties: None,
            })
        }
    }

    /// Expand the members of a target; `None` when nothing is expandable
    pub fn expand(
        &mut self,
        target: &ExpansionTarget,
        path: &PropertyPath,
    ) -> Result<Option<PropertyMap>, StructuralError> {
        let model = self.resolver.model();
        let chain = generics::unwrap_mapped(model, &target.ty);
        let Some(members) = model.members(&chain.inner) else {
            debug!(path = %path, "type has no enumerable members");
            return Ok(None);
        };

        let layers = member_layers(&target.ty, model);
        let mut properties = PropertyMap::new();

        for member in members {
            let Some(member) = apply_layers(member, &layers) else {
                continue;
            };
            if member.ty.is_function() {
                continue;
            }
            if let Some(property) = self.expand_member(&member, path)? {
                properties.insert(member.name.clone(), property);
            }
        }

        if properties.is_empty() {
            Ok(None)
        } else {
            Ok(Some(properties))
        }
    }

    fn expand_member(
        &mut self,
        member: &StructMember,
        path: &PropertyPath,
    ) -> Result<Option<PropertyDescriptor>, StructuralError> {
        let signature = self
            .resolver
            .resolve(&member.ty, ResolveContext::property().extension())?;
        // Function-typed aliases are methods too
        if signature.display_type == "Function" {
            return Ok(None);
        }
        let declared = self.resolver.model().print(&member.ty);
        let mut property = PropertyDescriptor::new(signature, declared);
        property.optional = member.optional || property.signature.optional_via_union;
        property.read_only = member.readonly;

        let Some(target) = self.resolver.expansion_target(&member.ty) else {
            return Ok(Some(property));
        };

        if let Some(ref name) = target.name {
            if path.has_seen(name) {
                debug!(path = %path, member = %member.name, type_name = %name, "circular reference");
                property.signature.display_type = if target.array {
                    "Array<object>".to_string()
                } else {
                    "object".to_string()
                };
                property.signature.circular_ref = true;
                property.circular_ref = true;
                return Ok(Some(property));
            }
        }

        let mut child = path.child(member.name.clone());
        if let Some(ref name) = target.name {
            child = child.visiting(name);
        }

        if target.array {
            let items = self.expand(&target, &child.entering_array())?;
            if path.is_outside_arrays() {
                property.item_properties = items;
            } else {
                property.properties = items;
            }
        } else {
            property.properties = self.expand(&target, &child)?;
        }
        Ok(Some(property))
    }
}

/// Member adjustment from one mapped layer
#[derive(Debug, Clone, PartialEq)]
enum Layer {
    Optional(bool),
    Readonly,
    Pick(Vec<String>),
    Omit(Vec<String>),
}

/// Member adjustments of a mapped chain, innermost first
fn member_layers(ty: &TypeDescriptor, model: &dyn TypeModel) -> Vec<Layer> {
    let mut layers = Vec::new();
    let mut current = ty;
    while generics::is_mapped_wrapper(model, current) {
        let (name, args) = match current {
            TypeDescriptor::Mapped(m) => (m.wrapper.as_str(), &m.args),
            TypeDescriptor::Reference(r) => (r.name.as_str(), &r.args),
            _ => break,
        };
        let keys = || args.get(1).map(key_literals).unwrap_or_default();
        match name {
            "Partial" => layers.push(Layer::Optional(true)),
            "Required" => layers.push(Layer::Optional(false)),
            "Readonly" => layers.push(Layer::Readonly),
            "Pick" => layers.push(Layer::Pick(keys())),
            "Omit" => layers.push(Layer::Omit(keys())),
            _ => {}
        }
        match args.first() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    layers.reverse();
    layers
}

fn apply_layers(mut member: StructMember, layers: &[Layer]) -> Option<StructMember> {
    for layer in layers {
        match layer {
            Layer::Optional(optional) => member.optional = *optional,
            Layer::Readonly => member.readonly = true,
            Layer::Pick(keys) if !keys.contains(&member.name) => return None,
            Layer::Omit(keys) if keys.contains(&member.name) => return None,
            _ => {}
        }
    }
    Some(member)
}

fn key_literals(ty: &TypeDescriptor) -> Vec<String> {
    match ty {
        TypeDescriptor::Literal {
            value: LiteralValue::String(key),
        } => vec![key.clone()],
        TypeDescriptor::Union { members } => members.iter().flat_map(key_literals).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::ir::{FunctionParam, InMemoryTypeModel, TypeDeclaration};

    fn tree_model() -> InMemoryTypeModel {
        InMemoryTypeModel::new()
            .declare(TypeDeclaration::interface(
                "TreeNode",
                vec![
                    StructMember::new("label", TypeDescriptor::string()),
                    StructMember::new(
                        "children",
                        TypeDescriptor::array(TypeDescriptor::reference("TreeNode")),
                    )
                    .optional(),
                    StructMember::new(
                        "select",
                        TypeDescriptor::function(
                            vec![FunctionParam {
                                name: "event".into(),
                                ty: TypeDescriptor::reference("Event"),
                                optional: false,
                            }],
                            TypeDescriptor::void(),
                        ),
                    ),
                ],
            ))
            .declare(TypeDeclaration::interface(
                "Column",
                vec![
                    StructMember::new("key", TypeDescriptor::string()),
                    StructMember::new(
                        "cells",
                        TypeDescriptor::array(TypeDescriptor::reference("Cell")),
                    ),
                ],
            ))
            .declare(TypeDeclaration::interface(
                "Cell",
                vec![StructMember::new("value", TypeDescriptor::number())],
            ))
            .declare(TypeDeclaration::interface(
                "Handlers",
                vec![StructMember::new(
                    "onClick",
                    TypeDescriptor::function(vec![], TypeDescriptor::void()),
                )],
            ))
    }

    fn expand(model: &InMemoryTypeModel, ty: TypeDescriptor) -> Expansion {
        let config = BuildConfig::default();
        let mut resolver = SignatureResolver::new(model, &config);
        PropertyWalker::new(&mut resolver)
            .expand_root("root", &ty)
            .unwrap()
    }

    #[test]
    fn test_cycle_emits_single_placeholder() {
        let model = tree_model();
        let expansion = expand(&model, TypeDescriptor::reference("TreeNode"));
        let props = expansion.properties.unwrap();

        assert_eq!(props.len(), 2, "function members are skipped");
        let children = &props["children"];
        assert!(children.circular_ref);
        assert_eq!(children.signature.display_type, "Array<object>");
        assert!(children.properties.is_none());
        assert!(children.item_properties.is_none());
        assert!(children.optional);
    }

    #[test]
    fn test_top_level_array_expands_into_items() {
        let model = tree_model();
        let expansion = expand(
            &model,
            TypeDescriptor::array(TypeDescriptor::reference("Column")),
        );
        assert!(expansion.properties.is_none());
        let items = expansion.item_properties.unwrap();
        let cells = &items["cells"];
        assert!(cells.item_properties.is_none());
        assert_eq!(
            cells.properties.as_ref().unwrap()["value"].signature.display_type,
            "number"
        );
    }

    #[test]
    fn test_nested_array_outside_arrays_uses_item_properties() {
        let model = tree_model();
        let expansion = expand(&model, TypeDescriptor::reference("Column"));
        let props = expansion.properties.unwrap();
        let cells = &props["cells"];
        assert!(cells.properties.is_none());
        assert!(cells.item_properties.as_ref().unwrap().contains_key("value"));
    }

    #[test]
    fn test_empty_expansion_yields_no_block() {
        let model = tree_model();
        let expansion = expand(&model, TypeDescriptor::reference("Handlers"));
        assert_eq!(expansion, Expansion::default());

        let empty = expand(&model, TypeDescriptor::object(vec![]));
        assert!(empty.properties.is_none());
    }

    #[test]
    fn test_mapped_layers_adjust_members() {
        let model = tree_model();
        let partial = expand(
            &model,
            TypeDescriptor::mapped(
                "Readonly",
                TypeDescriptor::mapped("Partial", TypeDescriptor::reference("Cell")),
            ),
        );
        let value = &partial.properties.unwrap()["value"];
        assert!(value.optional);
        assert!(value.read_only);

        let picked = expand(
            &model,
            TypeDescriptor::reference_with(
                "Pick",
                vec![
                    TypeDescriptor::reference("Column"),
                    TypeDescriptor::string_literal("key"),
                ],
            ),
        );
        let keys: Vec<&String> = picked.properties.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["key"]);
    }

    #[test]
    fn test_sibling_branches_do_not_share_marks() {
        let model = InMemoryTypeModel::new()
            .declare(TypeDeclaration::interface(
                "Pair",
                vec![
                    StructMember::new("left", TypeDescriptor::reference("Cell")),
                    StructMember::new("right", TypeDescriptor::reference("Cell")),
                ],
            ))
            .declare(TypeDeclaration::interface(
                "Cell",
                vec![StructMember::new("value", TypeDescriptor::number())],
            ));
        let props = expand(&model, TypeDescriptor::reference("Pair"))
            .properties
            .unwrap();
        assert!(!props["left"].circular_ref);
        assert!(!props["right"].circular_ref);
        assert!(props["right"].properties.is_some());
    }

    #[test]
    fn test_path_is_copy_on_branch() {
        let root = PropertyPath::root("items").visiting("Item");
        let branch = root.child("next").visiting("Node");
        assert!(branch.has_seen("Item"));
        assert!(branch.has_seen("Node"));
        assert!(!root.has_seen("Node"));
        assert_eq!(branch.to_string(), "items.next");
        assert!(!root.entering_array().is_outside_arrays());
    }
}
