//! Component surface declarations
//!
//! This module provides the input structures describing a component's
//! public surface as the driver sees it: properties, events, slots,
//! dynamic slots and methods, each typed with a [`TypeDescriptor`] and
//! annotated with documentation tags.

use crate::ir::{TypeDescriptor, TypeParam};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Source filename
    pub filename: String,
    /// 1-indexed line number
    #[serde(default)]
    pub line: usize,
    /// 0-indexed column number
    #[serde(default)]
    pub col: usize,
}

impl Location {
    /// Create a new location
    pub fn new(filename: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            col,
        }
    }

    /// Check if this location is unknown/unset (default values)
    pub fn is_unknown(&self) -> bool {
        self.filename.is_empty() && self.line == 0 && self.col == 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}:{}", self.filename, self.line, self.col)
        }
    }
}

/// Documentation tags attached to a declaration
///
/// Values are taken verbatim from the documentation source; interpretation
/// (and recovery from malformed values) happens in
/// [`crate::metadata::annotations`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocTags {
    #[serde(default)]
    pub description: Option<String>,
    /// `@deprecated` text (may be empty)
    #[serde(default)]
    pub deprecated: Option<String>,
    /// `@since` version
    #[serde(default)]
    pub since: Option<String>,
    /// `@default` value, as written
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Any other tags, passed through to design-time metadata
    #[serde(default)]
    pub tags: IndexMap<String, String>,
}

impl DocTags {
    /// Tags with only a description
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Set `@default`
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set `@deprecated`
    pub fn with_deprecated(mut self, note: impl Into<String>) -> Self {
        self.deprecated = Some(note.into());
        self
    }

    /// Set `@since`
    pub fn with_since(mut self, version: impl Into<String>) -> Self {
        self.since = Some(version.into());
        self
    }

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Add a pass-through tag
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }
}

/// Which kind of dynamic slot a property provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DynamicSlotKind {
    /// Property value names slots rendered from element children
    Slot,
    /// Property value names slots rendered from templates
    TemplateSlot,
}

impl fmt::Display for DynamicSlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicSlotKind::Slot => write!(f, "dynamic slot"),
            DynamicSlotKind::TemplateSlot => write!(f, "dynamic template slot"),
        }
    }
}

/// A declared property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySource {
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Read-only property the component writes back through a change event
    #[serde(default)]
    pub writeback: bool,
    #[serde(default)]
    pub dynamic_slot: Option<DynamicSlotKind>,
    /// Key of the dynamic slot definition this property populates
    #[serde(default)]
    pub dynamic_slot_key: Option<String>,
    #[serde(default)]
    pub docs: DocTags,
}

impl PropertySource {
    /// Create a new property
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            optional: false,
            read_only: false,
            writeback: false,
            dynamic_slot: None,
            dynamic_slot_key: None,
            docs: DocTags::default(),
        }
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark as read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Mark as read-only-writeback
    pub fn writeback(mut self) -> Self {
        self.writeback = true;
        self
    }

    /// Declare dynamic slot support
    pub fn dynamic_slot(mut self, kind: DynamicSlotKind) -> Self {
        self.dynamic_slot = Some(kind);
        self
    }

    /// Reference a dynamic slot definition
    pub fn with_dynamic_slot_key(mut self, key: impl Into<String>) -> Self {
        self.dynamic_slot_key = Some(key.into());
        self
    }

    /// Set documentation
    pub fn with_docs(mut self, docs: DocTags) -> Self {
        self.docs = docs;
        self
    }
}

/// A declared event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub detail: Option<TypeDescriptor>,
    /// Property this event writes back (the on-change counterpart)
    #[serde(default)]
    pub writeback_for: Option<String>,
    #[serde(default)]
    pub bubbles: bool,
    #[serde(default)]
    pub cancelable: bool,
    #[serde(default)]
    pub docs: DocTags,
}

impl EventSource {
    /// Create an event with a detail type
    pub fn with_detail(detail: TypeDescriptor) -> Self {
        Self {
            detail: Some(detail),
            ..Default::default()
        }
    }

    /// Mark as the writeback counterpart of `property`
    pub fn writeback_for(mut self, property: impl Into<String>) -> Self {
        self.writeback_for = Some(property.into());
        self
    }

    /// Set documentation
    pub fn with_docs(mut self, docs: DocTags) -> Self {
        self.docs = docs;
        self
    }
}

/// A declared slot (static or dynamic definition)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSource {
    /// Slot content/data type
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDescriptor>,
    #[serde(default)]
    pub docs: DocTags,
}

impl SlotSource {
    /// Create a typed slot
    pub fn typed(ty: TypeDescriptor) -> Self {
        Self {
            ty: Some(ty),
            docs: DocTags::default(),
        }
    }
}

/// Parameter of a public method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub docs: DocTags,
}

impl MethodParam {
    /// Create a required parameter
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            docs: DocTags::default(),
        }
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A declared public method
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSource {
    #[serde(default)]
    pub params: Vec<MethodParam>,
    #[serde(default)]
    pub returns: Option<TypeDescriptor>,
    #[serde(default)]
    pub docs: DocTags,
}

impl MethodSource {
    /// Create a method
    pub fn new(params: Vec<MethodParam>, returns: TypeDescriptor) -> Self {
        Self {
            params,
            returns: Some(returns),
            docs: DocTags::default(),
        }
    }
}

/// A component's full declared surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSource {
    /// Class name (e.g., "Button")
    pub name: String,
    /// Public tag name (e.g., "my-button")
    pub tag_name: String,
    /// Version the component was introduced in
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub docs: DocTags,
    #[serde(default)]
    pub generics: Vec<TypeParam>,
    /// Declared base type, typically the component's properties interface
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertySource>,
    #[serde(default)]
    pub events: IndexMap<String, EventSource>,
    #[serde(default)]
    pub slots: IndexMap<String, SlotSource>,
    #[serde(default)]
    pub dynamic_slots: IndexMap<String, SlotSource>,
    #[serde(default)]
    pub methods: IndexMap<String, MethodSource>,
}

impl ComponentSource {
    /// Create a new component
    pub fn new(name: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag_name: tag_name.into(),
            since: None,
            location: Location::default(),
            docs: DocTags::default(),
            generics: Vec::new(),
            base: None,
            properties: IndexMap::new(),
            events: IndexMap::new(),
            slots: IndexMap::new(),
            dynamic_slots: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    /// Set the declared base type
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Add a property
    pub fn property(mut self, name: impl Into<String>, property: PropertySource) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Add an event
    pub fn event(mut self, name: impl Into<String>, event: EventSource) -> Self {
        self.events.insert(name.into(), event);
        self
    }

    /// Add a slot
    pub fn slot(mut self, name: impl Into<String>, slot: SlotSource) -> Self {
        self.slots.insert(name.into(), slot);
        self
    }

    /// Add a dynamic slot definition
    pub fn dynamic_slot(mut self, key: impl Into<String>, slot: SlotSource) -> Self {
        self.dynamic_slots.insert(key.into(), slot);
        self
    }

    /// Add a method
    pub fn method(mut self, name: impl Into<String>, method: MethodSource) -> Self {
        self.methods.insert(name.into(), method);
        self
    }

    /// Set generic type parameters
    pub fn with_generics(mut self, generics: Vec<TypeParam>) -> Self {
        self.generics = generics;
        self
    }

    /// Set the introduction version
    pub fn since(mut self, version: impl Into<String>) -> Self {
        self.since = Some(version.into());
        self
    }

    /// Set the source location
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// Convert a kebab-case tag name to PascalCase (`my-button` -> `MyButton`)
pub fn tag_to_pascal_case(tag: &str) -> String {
    tag.split(|c| c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
