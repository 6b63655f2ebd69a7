//! Resolved component descriptors
//!
//! A [`ComponentDescriptor`] is built once per component per build session
//! by the [`MetadataAssembler`](crate::metadata::MetadataAssembler) and is
//! read-only afterwards: the RT/DT projections and the declaration fragment
//! are all derived from it.

use crate::ir::{DynamicSlotKind, Location};
use crate::metadata::annotations::Annotations;
use crate::resolve::{GenericBinding, GenericsInfo, TypeSignature};
use indexmap::IndexMap;

/// Ordered property tree keyed by member name
pub type PropertyMap = IndexMap<String, PropertyDescriptor>;

/// A resolved property, possibly with nested sub-properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyDescriptor {
    pub signature: TypeSignature,
    /// Printed declared type, for declaration fragments
    pub declared_type: String,
    /// Inline expansion of a struct-shaped type
    pub properties: Option<PropertyMap>,
    /// Expansion of a top-level array element (design-time only)
    pub item_properties: Option<PropertyMap>,
    pub read_only: bool,
    pub writeback: bool,
    pub optional: bool,
    pub docs: Annotations,
    pub dynamic_slot: Option<DynamicSlotKind>,
    pub dynamic_slot_key: Option<String>,
    /// Placeholder emitted on re-encountering a type already on the path
    pub circular_ref: bool,
    pub generic_bindings: Vec<GenericBinding>,
}

impl PropertyDescriptor {
    /// Create a descriptor for a resolved signature
    pub fn new(signature: TypeSignature, declared_type: impl Into<String>) -> Self {
        Self {
            signature,
            declared_type: declared_type.into(),
            ..Default::default()
        }
    }
}

/// A resolved event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventDescriptor {
    pub detail: Option<TypeSignature>,
    pub detail_declared: Option<String>,
    pub detail_properties: Option<PropertyMap>,
    /// Expansion of an array detail's element (design-time only)
    pub detail_item_properties: Option<PropertyMap>,
    /// Property this event writes back
    pub writeback_for: Option<String>,
    pub bubbles: bool,
    pub cancelable: bool,
    pub docs: Annotations,
}

/// A resolved slot or dynamic slot definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlotDescriptor {
    pub signature: Option<TypeSignature>,
    pub docs: Annotations,
}

/// A resolved method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub signature: TypeSignature,
    pub declared_type: String,
    pub optional: bool,
    pub docs: Annotations,
}

/// A resolved method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub params: Vec<ParamDescriptor>,
    pub returns: TypeSignature,
    pub declared_return: String,
    pub docs: Annotations,
}

/// The resolved public surface of one component
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDescriptor {
    /// Class name
    pub name: String,
    pub tag_name: String,
    pub since: Option<String>,
    pub location: Location,
    pub docs: Annotations,
    pub properties: PropertyMap,
    pub events: IndexMap<String, EventDescriptor>,
    pub slots: IndexMap<String, SlotDescriptor>,
    pub dynamic_slots: IndexMap<String, SlotDescriptor>,
    pub methods: IndexMap<String, MethodDescriptor>,
    pub generics: GenericsInfo,
}

impl ComponentDescriptor {
    /// Create an empty descriptor
    pub fn new(name: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag_name: tag_name.into(),
            since: None,
            location: Location::default(),
            docs: Annotations::default(),
            properties: IndexMap::new(),
            events: IndexMap::new(),
            slots: IndexMap::new(),
            dynamic_slots: IndexMap::new(),
            methods: IndexMap::new(),
            generics: GenericsInfo::default(),
        }
    }

    /// Properties that can be set from markup (not read-only)
    pub fn settable_properties(&self) -> impl Iterator<Item = (&String, &PropertyDescriptor)> {
        self.properties.iter().filter(|(_, p)| !p.read_only)
    }

    /// Typedef names the documentation must define
    pub fn typedefs(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |sig: &TypeSignature| {
            if let Some(ref name) = sig.typedef {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        };
        for property in self.properties.values() {
            push(&property.signature);
        }
        for event in self.events.values() {
            if let Some(ref detail) = event.detail {
                push(detail);
            }
        }
        for method in self.methods.values() {
            method.params.iter().for_each(|p| push(&p.signature));
            push(&method.returns);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settable_properties_skip_read_only() {
        let mut desc = ComponentDescriptor::new("Button", "my-button");
        desc.properties.insert(
            "label".into(),
            PropertyDescriptor::new(TypeSignature::simple("string"), "string"),
        );
        let mut state = PropertyDescriptor::new(TypeSignature::simple("string"), "string");
        state.read_only = true;
        desc.properties.insert("state".into(), state);

        let names: Vec<&String> = desc.settable_properties().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["label"]);
    }

    #[test]
    fn test_typedefs_are_unique_and_ordered() {
        let mut desc = ComponentDescriptor::new("List", "my-list");
        let mut item = TypeSignature::simple("object");
        item.typedef = Some("Item".into());
        desc.properties
            .insert("first".into(), PropertyDescriptor::new(item.clone(), "Item"));
        desc.properties
            .insert("second".into(), PropertyDescriptor::new(item, "Item"));
        let mut detail = TypeSignature::simple("object");
        detail.typedef = Some("SelectDetail".into());
        desc.events.insert(
            "select".into(),
            EventDescriptor {
                detail: Some(detail),
                ..Default::default()
            },
        );

        assert_eq!(desc.typedefs(), vec!["Item", "SelectDetail"]);
    }
}
