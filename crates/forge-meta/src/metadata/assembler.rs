//! Component metadata assembly
//!
//! Builds a [`ComponentDescriptor`] from a [`ComponentSource`] and enforces
//! the cross-member invariants of a component surface:
//!
//! | Check | Rule |
//! |-------|------|
//! | `writeback` | every writeback property has a change event, every writeback event targets a writeback property |
//! | `default-slot` | the `default` slot is typed `Children`; `Children` is reserved for it |
//! | `dynamic-slot` | at most one dynamic slot and one dynamic template slot property, never both |
//! | `dynamic-slot-definitions` | referenced keys exist and every definition is referenced |
//!
//! A violation is fatal for that component only. Each check can be disabled
//! through [`BuildConfig::disabled_checks`].

use crate::config::{parse_version, BuildConfig};
use crate::diagnostics::{
    AnnotationError, CheckCategory, ComponentError, Diagnostic, DiagnosticsCollector,
    StructuralError,
};
use crate::ir::{
    ComponentSource, DocTags, DynamicSlotKind, EventSource, MethodSource, PropertySource,
    SlotSource, TypeDescriptor, TypeModel, TypeParam,
};
use crate::metadata::annotations::{self, Annotations};
use crate::metadata::descriptor::{
    ComponentDescriptor, EventDescriptor, MethodDescriptor, ParamDescriptor, PropertyDescriptor,
    SlotDescriptor,
};
use crate::resolve::{
    bind_dependent, declare, GenericBinding, PropertyWalker, ResolveContext, SignatureResolver,
    TypeSignature,
};
use tracing::{debug, warn};

/// Name of the reserved default slot
pub const DEFAULT_SLOT: &str = "default";

/// Reserved type of the default slot
pub const CHILDREN_TYPE: &str = "Children";

/// Builds component descriptors
pub struct MetadataAssembler<'a> {
    resolver: SignatureResolver<'a>,
    config: &'a BuildConfig,
    diagnostics: DiagnosticsCollector,
}

impl<'a> MetadataAssembler<'a> {
    /// Create an assembler over a type model
    pub fn new(model: &'a dyn TypeModel, config: &'a BuildConfig) -> Self {
        Self {
            resolver: SignatureResolver::new(model, config),
            config,
            diagnostics: DiagnosticsCollector::new(),
        }
    }

    /// Take warnings collected so far, including resolver warnings
    pub fn take_diagnostics(&mut self) -> DiagnosticsCollector {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.extend(self.resolver.take_diagnostics());
        diagnostics
    }

    /// Build the descriptor of one component
    pub fn assemble(
        &mut self,
        source: &ComponentSource,
    ) -> Result<ComponentDescriptor, ComponentError> {
        debug!(component = %source.name, tag = %source.tag_name, "assembling metadata");
        self.resolver.set_component(source.name.clone());
        let attribute = |error: StructuralError| ComponentError {
            component: source.name.clone(),
            location: source.location.clone(),
            error,
        };

        self.check_base(source).map_err(&attribute)?;
        self.check(source).map_err(&attribute)?;

        let mut desc = ComponentDescriptor::new(source.name.clone(), source.tag_name.clone());
        desc.since = source.since.clone();
        self.check_since(source);
        desc.location = source.location.clone();
        desc.generics = declare(&source.generics);
        desc.docs = self.annotate(source, "", &source.docs, None);

        for (name, property) in &source.properties {
            let built = self.property(source, name, property).map_err(&attribute)?;
            desc.properties.insert(name.clone(), built);
        }
        for (name, event) in &source.events {
            let built = self.event(source, name, event).map_err(&attribute)?;
            desc.events.insert(name.clone(), built);
        }
        for (name, slot) in &source.slots {
            let built = self.slot(source, name, slot).map_err(&attribute)?;
            desc.slots.insert(name.clone(), built);
        }
        for (key, slot) in &source.dynamic_slots {
            let built = self.slot(source, key, slot).map_err(&attribute)?;
            desc.dynamic_slots.insert(key.clone(), built);
        }
        for (name, method) in &source.methods {
            let built = self.method(source, name, method).map_err(&attribute)?;
            desc.methods.insert(name.clone(), built);
        }

        Ok(desc)
    }

    fn property(
        &mut self,
        source: &ComponentSource,
        name: &str,
        property: &PropertySource,
    ) -> Result<PropertyDescriptor, StructuralError> {
        let signature = self
            .resolver
            .resolve(&property.ty, ResolveContext::property())?;
        let docs = self.annotate(source, name, &property.docs, Some(&signature));
        let expansion = PropertyWalker::new(&mut self.resolver).expand_root(name, &property.ty)?;
        let bindings = self.bindings(&property.ty, &source.generics)?;

        let declared = self.resolver.model().print(&property.ty);
        let mut desc = PropertyDescriptor::new(signature, declared);
        desc.properties = expansion.properties;
        desc.item_properties = expansion.item_properties;
        desc.read_only = property.read_only;
        desc.writeback = property.writeback;
        desc.optional = property.optional;
        desc.docs = docs;
        desc.dynamic_slot = property.dynamic_slot;
        desc.dynamic_slot_key = property.dynamic_slot_key.clone();
        desc.generic_bindings = bindings;
        Ok(desc)
    }

    fn event(
        &mut self,
        source: &ComponentSource,
        name: &str,
        event: &EventSource,
    ) -> Result<EventDescriptor, StructuralError> {
        let mut desc = EventDescriptor {
            writeback_for: event.writeback_for.clone(),
            bubbles: event.bubbles,
            cancelable: event.cancelable,
            ..Default::default()
        };
        if let Some(ref detail) = event.detail {
            let signature = self.resolver.resolve(detail, ResolveContext::event_detail())?;
            desc.detail = Some(signature);
            desc.detail_declared = Some(self.resolver.model().print(detail));
            let expansion = PropertyWalker::new(&mut self.resolver).expand_root(name, detail)?;
            desc.detail_properties = expansion.properties;
            desc.detail_item_properties = expansion.item_properties;
        }
        desc.docs = self.annotate(source, name, &event.docs, None);
        Ok(desc)
    }

    fn slot(
        &mut self,
        source: &ComponentSource,
        name: &str,
        slot: &SlotSource,
    ) -> Result<SlotDescriptor, StructuralError> {
        let signature = match slot.ty {
            Some(ref ty) => Some(self.resolver.resolve(ty, ResolveContext::slot_data())?),
            None => None,
        };
        Ok(SlotDescriptor {
            signature,
            docs: self.annotate(source, name, &slot.docs, None),
        })
    }

    fn method(
        &mut self,
        source: &ComponentSource,
        name: &str,
        method: &MethodSource,
    ) -> Result<MethodDescriptor, StructuralError> {
        let model = self.resolver.model();
        let mut params = Vec::with_capacity(method.params.len());
        for param in &method.params {
            let signature = self.resolver.resolve(&param.ty, ResolveContext::param())?;
            let member = format!("{}({})", name, param.name);
            params.push(ParamDescriptor {
                name: param.name.clone(),
                declared_type: model.print(&param.ty),
                optional: param.optional,
                docs: self.annotate(source, &member, &param.docs, None),
                signature,
            });
        }

        let returns_ty = method.returns.clone().unwrap_or_else(TypeDescriptor::void);
        let returns = self.resolver.resolve(&returns_ty, ResolveContext::returns())?;
        Ok(MethodDescriptor {
            params,
            declared_return: model.print(&returns_ty),
            returns,
            docs: self.annotate(source, name, &method.docs, None),
        })
    }

    fn bindings(
        &mut self,
        ty: &TypeDescriptor,
        component_generics: &[TypeParam],
    ) -> Result<Vec<GenericBinding>, StructuralError> {
        let reference = match strip_nullish(ty) {
            Some(TypeDescriptor::Reference(r)) => r,
            _ => return Ok(Vec::new()),
        };
        let model = self.resolver.model();
        match model.declaration(&reference.name) {
            Some(decl) if !decl.type_params.is_empty() => {
                bind_dependent(&mut self.resolver, decl, &reference.args, component_generics)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn annotate(
        &mut self,
        source: &ComponentSource,
        member: &str,
        docs: &DocTags,
        signature: Option<&TypeSignature>,
    ) -> Annotations {
        let (annotations, errors) = annotations::interpret(docs, signature);
        for error in errors {
            self.report_annotation(source, member, error);
        }
        annotations
    }

    fn report_annotation(
        &mut self,
        source: &ComponentSource,
        member: &str,
        error: AnnotationError,
    ) {
        let message = if member.is_empty() {
            error.to_string()
        } else {
            format!("{}: {}", member, error)
        };
        warn!(component = %source.name, "ignoring tag: {}", message);
        self.diagnostics.add(
            Diagnostic::warning(message)
                .in_component(source.name.clone())
                .at(source.location.clone()),
        );
    }

    fn check_since(&mut self, source: &ComponentSource) {
        let Some(ref since) = source.since else {
            return;
        };
        if self.config.legacy_name_threshold.is_none() || parse_version(since).is_some() {
            return;
        }
        let message = format!(
            "since `{}` is not a version, legacy-named declarations are skipped",
            since
        );
        warn!(component = %source.name, "{}", message);
        self.diagnostics.add(
            Diagnostic::warning(message)
                .in_component(source.name.clone())
                .at(source.location.clone()),
        );
    }

    fn check_base(&self, source: &ComponentSource) -> Result<(), StructuralError> {
        let Some(ref base) = source.base else {
            return Ok(());
        };
        if self.resolver.model().declaration(base).is_some() || self.resolver.is_well_known(base) {
            return Ok(());
        }
        Err(StructuralError::UnresolvedBaseType { name: base.clone() })
    }

    /// Run every enabled invariant check
    pub fn check(&self, source: &ComponentSource) -> Result<(), StructuralError> {
        if self.config.is_enabled(CheckCategory::Writeback) {
            check_writeback(source)?;
        }
        if self.config.is_enabled(CheckCategory::DefaultSlot) {
            check_default_slot(source)?;
        }
        if self.config.is_enabled(CheckCategory::DynamicSlot) {
            check_dynamic_slots(source)?;
        }
        if self.config.is_enabled(CheckCategory::DynamicSlotDefinitions) {
            check_dynamic_slot_definitions(source)?;
        }
        Ok(())
    }
}

/// The single non-nullish member of a union, or the type itself
fn strip_nullish(ty: &TypeDescriptor) -> Option<&TypeDescriptor> {
    match ty {
        TypeDescriptor::Union { members } => {
            let mut rest = members
                .iter()
                .filter(|m| !matches!(m, TypeDescriptor::Null) && !m.is_undefined());
            match (rest.next(), rest.next()) {
                (Some(single), None) => Some(single),
                _ => None,
            }
        }
        other => Some(other),
    }
}

fn check_writeback(source: &ComponentSource) -> Result<(), StructuralError> {
    for (name, property) in &source.properties {
        if !property.writeback {
            continue;
        }
        let paired = source
            .events
            .values()
            .any(|e| e.writeback_for.as_deref() == Some(name.as_str()));
        if !paired {
            return Err(StructuralError::UnmatchedWriteback {
                property: name.clone(),
            });
        }
    }
    for (event, source_event) in &source.events {
        let Some(ref target) = source_event.writeback_for else {
            continue;
        };
        let valid = source.properties.get(target).map_or(false, |p| p.writeback);
        if !valid {
            return Err(StructuralError::OrphanWritebackEvent {
                event: event.clone(),
                property: target.clone(),
            });
        }
    }
    Ok(())
}

fn is_children(ty: &TypeDescriptor) -> bool {
    match ty {
        TypeDescriptor::Array { element } => is_children(element),
        other => other.type_name() == Some(CHILDREN_TYPE),
    }
}

fn children_outside_default(member: String) -> StructuralError {
    StructuralError::ChildrenOutsideDefaultSlot {
        member,
        children: CHILDREN_TYPE.to_string(),
    }
}

fn check_default_slot(source: &ComponentSource) -> Result<(), StructuralError> {
    for (name, slot) in &source.slots {
        let children = slot.ty.as_ref().map_or(false, is_children);
        if name == DEFAULT_SLOT && !children {
            return Err(StructuralError::DefaultSlotType {
                expected: CHILDREN_TYPE.to_string(),
            });
        }
        if name != DEFAULT_SLOT && children {
            return Err(children_outside_default(format!("slot `{}`", name)));
        }
    }
    for (name, property) in &source.properties {
        if strip_nullish(&property.ty).map_or(false, is_children) {
            return Err(children_outside_default(format!("property `{}`", name)));
        }
    }
    for (key, slot) in &source.dynamic_slots {
        if slot.ty.as_ref().map_or(false, is_children) {
            return Err(children_outside_default(format!("dynamic slot `{}`", key)));
        }
    }
    Ok(())
}

fn check_dynamic_slots(source: &ComponentSource) -> Result<(), StructuralError> {
    let mut slot: Option<&String> = None;
    let mut template: Option<&String> = None;

    for (name, property) in &source.properties {
        let Some(kind) = property.dynamic_slot else {
            continue;
        };
        let current = match kind {
            DynamicSlotKind::Slot => &mut slot,
            DynamicSlotKind::TemplateSlot => &mut template,
        };
        if let Some(first) = *current {
            return Err(StructuralError::DuplicateDynamicSlot {
                kind,
                first: first.to_string(),
                second: name.clone(),
            });
        }
        *current = Some(name);
    }

    match (slot, template) {
        (Some(slot_property), Some(template_property)) => {
            Err(StructuralError::ConflictingDynamicSlots {
                slot_property: slot_property.clone(),
                template_property: template_property.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn check_dynamic_slot_definitions(source: &ComponentSource) -> Result<(), StructuralError> {
    for (name, property) in &source.properties {
        if let Some(ref key) = property.dynamic_slot_key {
            if !source.dynamic_slots.contains_key(key) {
                return Err(StructuralError::UnknownDynamicSlotKey {
                    property: name.clone(),
                    key: key.clone(),
                });
            }
        }
    }
    for key in source.dynamic_slots.keys() {
        let referenced = source
            .properties
            .values()
            .any(|p| p.dynamic_slot_key.as_deref() == Some(key.as_str()));
        if !referenced {
            return Err(StructuralError::UnreferencedDynamicSlot { key: key.clone() });
        }
    }
    Ok(())
}
