//! Runtime (RT) and design-time (DT) metadata projections
//!
//! RT metadata is what a runtime property validator needs: display types,
//! structural enum values, defaults and the read-only/writeback flags. DT
//! metadata is a superset carrying documentation types, optionality,
//! descriptions, typedefs, editor hints, item properties and circular
//! bookkeeping.
//!
//! Both are emitted as camelCase JSON objects with keys in declaration order.

use crate::metadata::annotations::Annotations;
use crate::metadata::descriptor::{
    ComponentDescriptor, EventDescriptor, MethodDescriptor, PropertyDescriptor, PropertyMap,
    SlotDescriptor,
};
use crate::resolve::TypeSignature;
use serde_json::{json, Map, Value};

/// Metadata tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Runtime,
    DesignTime,
}

impl Tier {
    fn is_dt(self) -> bool {
        self == Tier::DesignTime
    }

    /// Output file suffix
    pub fn extension(self) -> &'static str {
        match self {
            Tier::Runtime => "rt.json",
            Tier::DesignTime => "dt.json",
        }
    }
}

/// Project a component into runtime metadata
pub fn runtime_json(desc: &ComponentDescriptor) -> Value {
    project(desc, Tier::Runtime)
}

/// Project a component into design-time metadata
pub fn design_time_json(desc: &ComponentDescriptor) -> Value {
    project(desc, Tier::DesignTime)
}

/// Project a component into the given tier
pub fn project(desc: &ComponentDescriptor, tier: Tier) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(desc.name));
    out.insert("tag".into(), json!(desc.tag_name));

    if tier.is_dt() {
        if let Some(ref since) = desc.since {
            out.insert("since".into(), json!(since));
        }
        insert_docs(&mut out, &desc.docs);
        if !desc.generics.is_empty() {
            out.insert("generics".into(), json!(desc.generics));
        }
        let typedefs = desc.typedefs();
        if !typedefs.is_empty() {
            out.insert("typedefs".into(), json!(typedefs));
        }
    }

    out.insert("properties".into(), Value::Object(properties(&desc.properties, tier)));

    let events: Map<String, Value> = desc
        .events
        .iter()
        .map(|(name, event)| (name.clone(), self::event(event, tier)))
        .collect();
    out.insert("events".into(), Value::Object(events));

    let slots: Map<String, Value> = desc
        .slots
        .iter()
        .map(|(name, slot)| (name.clone(), self::slot(slot, tier)))
        .collect();
    out.insert("slots".into(), Value::Object(slots));

    if tier.is_dt() && !desc.dynamic_slots.is_empty() {
        let dynamic: Map<String, Value> = desc
            .dynamic_slots
            .iter()
            .map(|(key, slot)| (key.clone(), self::slot(slot, tier)))
            .collect();
        out.insert("dynamicSlots".into(), Value::Object(dynamic));
    }

    let methods: Map<String, Value> = desc
        .methods
        .iter()
        .map(|(name, method)| (name.clone(), self::method(method, tier)))
        .collect();
    out.insert("methods".into(), Value::Object(methods));

    Value::Object(out)
}

fn properties(map: &PropertyMap, tier: Tier) -> Map<String, Value> {
    map.iter()
        .map(|(name, property)| (name.clone(), self::property(property, tier)))
        .collect()
}

fn property(property: &PropertyDescriptor, tier: Tier) -> Value {
    let mut out = signature(&property.signature, tier);

    if let Some(ref value) = property.docs.default_value {
        out.insert("defaultValue".into(), value.clone());
    }
    if property.read_only {
        out.insert("readOnly".into(), json!(true));
    }
    if property.writeback {
        out.insert("writeback".into(), json!(true));
    }
    if let Some(ref nested) = property.properties {
        out.insert("properties".into(), Value::Object(properties(nested, tier)));
    }

    if tier.is_dt() {
        out.insert("optional".into(), json!(property.optional));
        if let Some(ref typedef) = property.signature.typedef {
            out.insert("typedef".into(), json!(typedef));
        }
        if property.signature.is_enum_values_for_dt_only {
            if let Some(ref values) = property.signature.enum_values {
                out.insert("propertyEditorValues".into(), json!(values));
            }
        }
        if let Some(ref editor) = property.docs.editor {
            out.insert("propertyEditor".into(), json!(editor));
        }
        if let Some(ref items) = property.item_properties {
            out.insert("itemProperties".into(), Value::Object(properties(items, tier)));
        }
        if property.circular_ref {
            out.insert("circularRef".into(), json!(true));
        }
        if let Some(kind) = property.dynamic_slot {
            out.insert("dynamicSlot".into(), json!(kind));
        }
        if let Some(ref key) = property.dynamic_slot_key {
            out.insert("dynamicSlotKey".into(), json!(key));
        }
        if !property.generic_bindings.is_empty() {
            out.insert("genericBindings".into(), json!(property.generic_bindings));
        }
        insert_docs(&mut out, &property.docs);
    }

    Value::Object(out)
}

fn event(event: &EventDescriptor, tier: Tier) -> Value {
    let mut out = Map::new();
    if let Some(ref detail) = event.detail {
        let mut detail_out = signature(detail, tier);
        if let Some(ref nested) = event.detail_properties {
            detail_out.insert("properties".into(), Value::Object(properties(nested, tier)));
        }
        if let Some(ref items) = event.detail_item_properties {
            if tier.is_dt() {
                detail_out.insert("itemProperties".into(), Value::Object(properties(items, tier)));
            }
        }
        out.insert("detail".into(), Value::Object(detail_out));
    }
    if let Some(ref property) = event.writeback_for {
        out.insert("writebackFor".into(), json!(property));
    }
    if tier.is_dt() {
        out.insert("bubbles".into(), json!(event.bubbles));
        out.insert("cancelable".into(), json!(event.cancelable));
        insert_docs(&mut out, &event.docs);
    }
    Value::Object(out)
}

fn slot(slot: &SlotDescriptor, tier: Tier) -> Value {
    let mut out = match slot.signature {
        Some(ref sig) => signature(sig, tier),
        None => Map::new(),
    };
    if tier.is_dt() {
        insert_docs(&mut out, &slot.docs);
    }
    Value::Object(out)
}

fn method(method: &MethodDescriptor, tier: Tier) -> Value {
    let params: Vec<Value> = method
        .params
        .iter()
        .map(|param| {
            let mut out = Map::new();
            out.insert("name".into(), json!(param.name));
            out.extend(signature(&param.signature, tier));
            if tier.is_dt() {
                out.insert("optional".into(), json!(param.optional));
                insert_docs(&mut out, &param.docs);
            }
            Value::Object(out)
        })
        .collect();

    let mut out = Map::new();
    out.insert("params".into(), Value::Array(params));
    out.insert("returns".into(), Value::Object(signature(&method.returns, tier)));
    if tier.is_dt() {
        insert_docs(&mut out, &method.docs);
    }
    Value::Object(out)
}

fn signature(sig: &TypeSignature, tier: Tier) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("type".into(), json!(sig.display_type));

    let enum_values = if tier.is_dt() {
        sig.enum_values.as_ref()
    } else {
        sig.structural_enum_values()
    };
    if let Some(values) = enum_values {
        out.insert("enumValues".into(), json!(values));
    }

    if tier.is_dt() {
        out.insert("docType".into(), json!(sig.doc()));
        if sig.is_array_of_object {
            out.insert("isArrayOfObject".into(), json!(true));
        }
        if sig.nullable {
            out.insert("nullable".into(), json!(true));
        }
    }
    out
}

fn insert_docs(out: &mut Map<String, Value>, docs: &Annotations) {
    if let Some(ref description) = docs.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(ref deprecated) = docs.deprecated {
        let value = if deprecated.is_empty() {
            json!(true)
        } else {
            json!(deprecated)
        };
        out.insert("deprecated".into(), value);
    }
    if let Some(ref since) = docs.since {
        out.insert("since".into(), json!(since));
    }
    if let Some(ref name) = docs.display_name {
        out.insert("displayName".into(), json!(name));
    }
    for (tag, value) in &docs.tags {
        out.entry(tag.clone()).or_insert_with(|| json!(value));
    }
}
