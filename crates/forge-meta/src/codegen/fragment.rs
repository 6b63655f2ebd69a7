//! Per-component declaration fragments
//!
//! For tag `my-button` on class `Button` the fragment declares:
//!
//! - `HTMLMyButtonElement`: the element interface
//! - `MyButtonProperties`: settable properties, all optional
//! - `MyButtonEventMap`: event name to `CustomEvent<detail>`
//! - a `declare global` block registering the tag in
//!   `HTMLElementTagNameMap` and `IntrinsicProps`
//!
//! Components introduced before the configured legacy-name threshold also
//! get deprecated aliases named after the class (`ButtonElement`,
//! `ButtonProperties`, `ButtonEventMap`, `ButtonIntrinsicProps`).

use crate::config::BuildConfig;
use crate::ir::tag_to_pascal_case;
use crate::metadata::{Annotations, ComponentDescriptor};

/// Declared names of one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentNames {
    pub pascal: String,
    pub element: String,
    pub properties: String,
    pub event_map: String,
}

impl FragmentNames {
    /// Derive names from a tag
    pub fn for_tag(tag: &str) -> Self {
        let pascal = tag_to_pascal_case(tag);
        Self {
            element: format!("HTML{}Element", pascal),
            properties: format!("{}Properties", pascal),
            event_map: format!("{}EventMap", pascal),
            pascal,
        }
    }

    /// Legacy names derived from the class name, as (legacy, modern) pairs
    pub fn legacy(&self, class: &str) -> Vec<(String, String)> {
        vec![
            (format!("{}Element", class), self.element.clone()),
            (format!("{}Properties", class), self.properties.clone()),
            (format!("{}EventMap", class), self.event_map.clone()),
            (format!("{}IntrinsicProps", class), self.properties.clone()),
        ]
    }

    fn is_modern(&self, name: &str) -> bool {
        name == self.element || name == self.properties || name == self.event_map
    }
}

/// Fragment file name for a tag
pub fn fragment_file_name(tag: &str) -> String {
    format!("{}.fragment.d.ts", tag)
}

/// Generator for declaration fragments
pub struct FragmentGenerator<'a> {
    desc: &'a ComponentDescriptor,
    config: &'a BuildConfig,
    names: FragmentNames,
}

impl<'a> FragmentGenerator<'a> {
    /// Create a generator for a component
    pub fn new(desc: &'a ComponentDescriptor, config: &'a BuildConfig) -> Self {
        Self {
            names: FragmentNames::for_tag(&desc.tag_name),
            desc,
            config,
        }
    }

    /// Declared names
    pub fn names(&self) -> &FragmentNames {
        &self.names
    }

    /// Generate the complete fragment text
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("// <{}> declarations\n\n", self.desc.tag_name));
        output.push_str(&self.generate_element_interface());
        output.push('\n');
        output.push_str(&self.generate_properties());
        output.push('\n');
        output.push_str(&self.generate_event_map());
        output.push('\n');
        output.push_str(&self.generate_global_block());

        if self.config.needs_legacy_names(self.desc.since.as_deref()) {
            output.push('\n');
            output.push_str(&self.generate_legacy_aliases());
        }

        output
    }

    fn generate_element_interface(&self) -> String {
        let generics = &self.desc.generics;
        let mut output = doc_comment(&self.desc.docs, "");
        output.push_str(&format!(
            "export interface {}{} extends {}{}, HTMLElement {{}}\n",
            self.names.element,
            generics.declaration,
            self.desc.name,
            generics.forwarded_arguments()
        ));
        output
    }

    fn generate_properties(&self) -> String {
        let mut output = format!(
            "export type {}{} = {{\n",
            self.names.properties, self.desc.generics.declaration
        );
        for (name, property) in self.desc.settable_properties() {
            output.push_str(&doc_comment(&property.docs, "  "));
            output.push_str(&format!(
                "  {}?: {};\n",
                property_key(name),
                property.declared_type
            ));
        }
        output.push_str("};\n");
        output
    }

    fn generate_event_map(&self) -> String {
        let mut output = format!(
            "export interface {}{} {{\n",
            self.names.event_map, self.desc.generics.declaration
        );
        for (name, event) in &self.desc.events {
            let detail = event.detail_declared.as_deref().unwrap_or("void");
            output.push_str(&doc_comment(&event.docs, "  "));
            output.push_str(&format!("  \"{}\": CustomEvent<{}>;\n", name, detail));
        }
        output.push_str("}\n");
        output
    }

    fn generate_global_block(&self) -> String {
        let args = self.desc.generics.any_arguments();
        let tag = &self.desc.tag_name;
        let mut output = String::from("declare global {\n");
        output.push_str("  interface HTMLElementTagNameMap {\n");
        output.push_str(&format!("    \"{}\": {}{};\n", tag, self.names.element, args));
        output.push_str("  }\n");
        output.push_str("  interface IntrinsicProps {\n");
        output.push_str(&format!(
            "    \"{}\": {}{};\n",
            tag, self.names.properties, args
        ));
        output.push_str("  }\n");
        output.push_str("}\n");
        output
    }

    fn generate_legacy_aliases(&self) -> String {
        let generics = &self.desc.generics;
        let mut output = String::new();
        for (legacy, modern) in self.names.legacy(&self.desc.name) {
            if self.names.is_modern(&legacy) || legacy == self.desc.name {
                continue;
            }
            let args = generics.forwarded_arguments();
            output.push_str(&format!("/** @deprecated Use `{}` instead. */\n", modern));
            output.push_str(&format!(
                "export type {}{} = {}{};\n",
                legacy, generics.declaration, modern, args
            ));
        }
        output
    }
}

fn property_key(name: &str) -> String {
    let identifier = name.chars().enumerate().all(|(i, c)| {
        c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())
    });
    if identifier && !name.is_empty() {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}

fn doc_comment(docs: &Annotations, indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    if let Some(ref description) = docs.description {
        lines.extend(description.lines().map(str::to_string));
    }
    if let Some(ref deprecated) = docs.deprecated {
        if deprecated.is_empty() {
            lines.push("@deprecated".to_string());
        } else {
            lines.push(format!("@deprecated {}", deprecated));
        }
    }
    if lines.is_empty() {
        return String::new();
    }
    if lines.len() == 1 {
        return format!("{}/** {} */\n", indent, lines[0]);
    }
    let mut output = format!("{}/**\n", indent);
    for line in lines {
        output.push_str(&format!("{} * {}\n", indent, line));
    }
    output.push_str(&format!("{} */\n", indent));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeParam;
    use crate::metadata::{EventDescriptor, PropertyDescriptor};
    use crate::resolve::{declare, TypeSignature};

    fn button() -> ComponentDescriptor {
        let mut desc = ComponentDescriptor::new("Button", "my-button");
        desc.since = Some("1.0".into());
        let mut label = PropertyDescriptor::new(TypeSignature::simple("string"), "string");
        label.docs.description = Some("Visible text".into());
        desc.properties.insert("label".into(), label);
        let mut state = PropertyDescriptor::new(TypeSignature::simple("string"), "string");
        state.read_only = true;
        desc.properties.insert("state".into(), state);
        desc.properties.insert(
            "aria-label".into(),
            PropertyDescriptor::new(TypeSignature::simple("string"), "string"),
        );
        desc.events.insert(
            "click".into(),
            EventDescriptor {
                detail_declared: Some("{ x: number }".into()),
                ..Default::default()
            },
        );
        desc
    }

    #[test]
    fn test_fragment_names() {
        let names = FragmentNames::for_tag("my-button");
        assert_eq!(names.element, "HTMLMyButtonElement");
        assert_eq!(names.properties, "MyButtonProperties");
        assert_eq!(names.event_map, "MyButtonEventMap");
        assert_eq!(fragment_file_name("my-button"), "my-button.fragment.d.ts");
    }

    #[test]
    fn test_generate_fragment() {
        let desc = button();
        let config = BuildConfig::default();
        let text = FragmentGenerator::new(&desc, &config).generate();

        assert!(
            text.contains("export interface HTMLMyButtonElement extends Button, HTMLElement {}")
        );
        assert!(text.contains("  /** Visible text */\n  label?: string;"));
        assert!(text.contains("  \"aria-label\"?: string;"));
        assert!(!text.contains("state?:"));
        assert!(text.contains("  \"click\": CustomEvent<{ x: number }>;"));
        assert!(text.contains("    \"my-button\": HTMLMyButtonElement;"));
        assert!(text.contains("    \"my-button\": MyButtonProperties;"));
        assert!(!text.contains("@deprecated"));
    }

    #[test]
    fn test_legacy_quadruple() {
        let desc = button();
        let config = BuildConfig::default().with_legacy_name_threshold("2.0");
        let text = FragmentGenerator::new(&desc, &config).generate();

        assert!(text.contains("export type ButtonElement = HTMLMyButtonElement;"));
        assert!(text.contains("export type ButtonProperties = MyButtonProperties;"));
        assert!(text.contains("export type ButtonEventMap = MyButtonEventMap;"));
        assert!(text.contains("export type ButtonIntrinsicProps = MyButtonProperties;"));
        assert_eq!(text.matches("@deprecated").count(), 4);
    }

    #[test]
    fn test_legacy_names_skip_collisions() {
        let mut desc = button();
        desc.name = "MyButton".into();
        let config = BuildConfig::default().with_legacy_name_threshold("2.0");
        let text = FragmentGenerator::new(&desc, &config).generate();

        assert!(text.contains("export type MyButtonElement = HTMLMyButtonElement;"));
        assert!(text.contains("export type MyButtonIntrinsicProps = MyButtonProperties;"));
        assert_eq!(text.matches("@deprecated").count(), 2);
    }

    #[test]
    fn test_generic_component() {
        let mut desc = button();
        desc.generics = declare(&[TypeParam::new("T")]);
        let config = BuildConfig::default();
        let text = FragmentGenerator::new(&desc, &config).generate();

        assert!(text.contains(
            "export interface HTMLMyButtonElement<T> extends Button<T>, HTMLElement {}"
        ));
        assert!(text.contains("export type MyButtonProperties<T> = {"));
        assert!(text.contains("\"my-button\": HTMLMyButtonElement<any>;"));
    }

    #[test]
    fn test_generic_event_map_declares_parameters() {
        let mut desc = button();
        desc.generics = declare(&[TypeParam::new("T")]);
        desc.events.insert(
            "select".into(),
            EventDescriptor {
                detail_declared: Some("T".into()),
                ..Default::default()
            },
        );
        let config = BuildConfig::default().with_legacy_name_threshold("2.0");
        let text = FragmentGenerator::new(&desc, &config).generate();

        assert!(text.contains("export interface MyButtonEventMap<T> {"));
        assert!(text.contains("  \"select\": CustomEvent<T>;"));
        assert!(text.contains("export type ButtonEventMap<T> = MyButtonEventMap<T>;"));
    }
}
