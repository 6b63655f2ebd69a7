//! End-to-end builds through the public API

use forge_meta::closure::scan;
use forge_meta::ir::{DynamicSlotKind, EventSource, PropertySource, SlotSource, StructMember};
use forge_meta::resolve::unwrap_mapped;
use forge_meta::{
    BuildConfig, BuildSession, CheckCategory, ComponentSource, DeclarationClosureAssembler,
    DiagnosticSeverity, InMemoryTypeModel, ModuleInput, OutputShape, TypeDeclaration,
    TypeDescriptor,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MODEL_JSON: &str = r#"{
  "declarations": [
    {
      "name": "TreeNode",
      "kind": "interface",
      "exported": true,
      "body": {
        "kind": "struct",
        "members": [
          { "name": "label", "type": { "kind": "primitive", "name": "string" } },
          {
            "name": "children",
            "optional": true,
            "type": { "kind": "array", "element": { "kind": "reference", "name": "TreeNode" } }
          }
        ]
      }
    },
    {
      "name": "Handlers",
      "kind": "interface",
      "exported": true,
      "body": {
        "kind": "struct",
        "members": [
          {
            "name": "onSelect",
            "type": { "kind": "function", "returns": { "kind": "primitive", "name": "void" } }
          }
        ]
      }
    }
  ]
}"#;

const TREE_JSON: &str = r#"{
  "name": "Tree",
  "tagName": "my-tree",
  "since": "1.0",
  "properties": {
    "nodes": {
      "type": { "kind": "array", "element": { "kind": "reference", "name": "TreeNode" } }
    },
    "mode": {
      "type": {
        "kind": "union",
        "members": [
          { "kind": "literal", "value": "single" },
          { "kind": "literal", "value": "multi" },
          { "kind": "null" }
        ]
      },
      "docs": { "default": "\"single\"" }
    },
    "handlers": {
      "type": { "kind": "reference", "name": "Handlers" }
    }
  }
}"#;

fn model() -> InMemoryTypeModel {
    serde_json::from_str(MODEL_JSON).unwrap()
}

fn tree() -> ComponentSource {
    serde_json::from_str(TREE_JSON).unwrap()
}

#[test]
fn test_json_input_round_through_session() {
    let model = model();
    let mut session = BuildSession::new(&model, BuildConfig::default());
    let metadata = session.process_component(&tree()).unwrap();

    let mode = &metadata.runtime["properties"]["mode"];
    assert_eq!(mode["type"], json!("string|null"));
    assert_eq!(mode["enumValues"], json!(["single", "multi"]));
    assert_eq!(mode["defaultValue"], json!("single"));

    let dt_mode = &metadata.design_time["properties"]["mode"];
    assert_eq!(dt_mode["docType"], json!("\"single\"|\"multi\"|null"));
    assert_eq!(dt_mode["nullable"], json!(true));
}

#[test]
fn test_output_is_deterministic() {
    let model = model();
    let render = || {
        let mut session = BuildSession::new(&model, BuildConfig::default());
        let metadata = session.process_component(&tree()).unwrap();
        (
            serde_json::to_string(&metadata.runtime).unwrap(),
            serde_json::to_string(&metadata.design_time).unwrap(),
            metadata.fragment.clone(),
        )
    };
    assert_eq!(render(), render());
}

#[test]
fn test_array_of_object_expands_only_in_design_time() {
    let model = model();
    let mut session = BuildSession::new(&model, BuildConfig::default());
    let metadata = session.process_component(&tree()).unwrap();

    let rt_nodes = &metadata.runtime["properties"]["nodes"];
    assert_eq!(rt_nodes, &json!({ "type": "Array<object>" }));

    let dt_nodes = &metadata.design_time["properties"]["nodes"];
    assert_eq!(dt_nodes["isArrayOfObject"], json!(true));
    let items = &dt_nodes["itemProperties"];
    assert_eq!(items["label"]["type"], json!("string"));

    let children = &items["children"];
    assert_eq!(children["circularRef"], json!(true));
    assert_eq!(children["type"], json!("Array<object>"));
    assert!(children.get("properties").is_none());
    assert!(children.get("itemProperties").is_none());
}

#[test]
fn test_empty_expansion_has_no_sub_block() {
    let model = model();
    let mut session = BuildSession::new(&model, BuildConfig::default());
    let metadata = session.process_component(&tree()).unwrap();

    for tier in [&metadata.runtime, &metadata.design_time] {
        let handlers = &tier["properties"]["handlers"];
        assert!(handlers.get("properties").is_none());
        assert!(handlers.get("itemProperties").is_none());
    }
}

fn slotted(kinds: &[(&str, DynamicSlotKind)]) -> ComponentSource {
    let mut source = ComponentSource::new("Grid", "my-grid");
    for (name, kind) in kinds {
        source = source.property(
            *name,
            PropertySource::new(TypeDescriptor::array(TypeDescriptor::string()))
                .dynamic_slot(*kind),
        );
    }
    source
}

#[test]
fn test_dynamic_slot_invariant() {
    let model = model();
    let mut session = BuildSession::new(&model, BuildConfig::default());

    assert!(session
        .process_component(&slotted(&[("columns", DynamicSlotKind::Slot)]))
        .is_some());
    assert!(session
        .process_component(&slotted(&[
            ("columns", DynamicSlotKind::Slot),
            ("rows", DynamicSlotKind::TemplateSlot),
        ]))
        .is_none());

    let errors: Vec<String> = session
        .diagnostics()
        .diagnostics()
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .map(|d| d.message.clone())
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("columns"));
    assert!(errors[0].contains("rows"));
}

#[test]
fn test_disabled_dynamic_slot_check() {
    let model = model();
    let config = BuildConfig::from_toml_str("disabled-checks = [\"dynamic-slot\"]\n").unwrap();
    assert!(!config.is_enabled(CheckCategory::DynamicSlot));

    let mut session = BuildSession::new(&model, config);
    assert!(session
        .process_component(&slotted(&[
            ("columns", DynamicSlotKind::Slot),
            ("rows", DynamicSlotKind::TemplateSlot),
        ]))
        .is_some());
}

#[test]
fn test_writeback_pair_and_default_slot() {
    let model = model().declare(TypeDeclaration::interface("Children", vec![]).library());
    let source = ComponentSource::new("Input", "my-input")
        .property("value", PropertySource::new(TypeDescriptor::string()).writeback())
        .event(
            "value-changed",
            EventSource::with_detail(TypeDescriptor::string()).writeback_for("value"),
        )
        .slot("default", SlotSource::typed(TypeDescriptor::reference("Children")));

    let mut session = BuildSession::new(&model, BuildConfig::default());
    let metadata = session.process_component(&source).unwrap();
    assert_eq!(metadata.runtime["properties"]["value"]["writeback"], json!(true));
    assert_eq!(
        metadata.runtime["events"]["value-changed"]["writebackFor"],
        json!("value")
    );
    assert!(metadata.fragment.contains("  value?: string;"));
}

#[test]
fn test_mapped_unwrap() {
    let model = InMemoryTypeModel::new().declare(
        TypeDeclaration::interface(
            "Foo",
            vec![StructMember::new("value", TypeDescriptor::generic("T"))],
        )
        .with_type_params(vec![forge_meta::TypeParam::new("T")]),
    );
    let ty = TypeDescriptor::mapped(
        "Readonly",
        TypeDescriptor::mapped(
            "Partial",
            TypeDescriptor::reference_with("Foo", vec![TypeDescriptor::generic("T")]),
        ),
    );

    let chain = unwrap_mapped(&model, &ty);
    let wrappers: Vec<&str> = chain.wrappers.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(wrappers, vec!["Readonly", "Partial"]);
    assert_eq!(chain.inner.type_name(), Some("Foo"));
    assert_eq!(chain.inner_generics, vec!["T"]);
}

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_closure_correctness() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    write(&src, "index.d.ts", "export { A } from \"./a\";\nexport { B } from \"./b\";\n");
    write(&src, "a.d.ts", "import type { C } from \"./c\";\nexport interface A { c: C }\n");
    write(&src, "b.d.ts", "export interface B {}\n");
    write(&src, "c.d.ts", "export interface C {}\n");

    let config = BuildConfig::default().with_output_shape(OutputShape::Library);
    let assembler = DeclarationClosureAssembler::new(&config);
    let input = ModuleInput::new("lib", src.join("index.d.ts"), tmp.path().join("out"));
    let mut processed = BTreeSet::new();

    let assembled = assembler.assemble(&input, &[], &mut processed).unwrap().unwrap();
    let names: Vec<String> = assembled
        .closure
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.d.ts", "b.d.ts", "c.d.ts"]);
    for name in &names {
        assert!(tmp.path().join("out").join(name).is_file());
    }

    let output = fs::read_to_string(&assembled.output).unwrap();
    assert_eq!(scan::export_statements(&output).len(), 2);

    assert!(assembler.assemble(&input, &[], &mut processed).unwrap().is_none());
}

#[test]
fn test_single_component_module_strips_imports() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    write(
        &src,
        "index.d.ts",
        "import type { Theme } from \"./theme\";\nimport { html } from \"lit\";\n\
         export declare function configure(theme: Theme): void;\n\
         export { Tree } from \"./tree\";\n",
    );
    write(&src, "theme.d.ts", "export interface Theme {}\n");
    write(&src, "tree.d.ts", "export declare class Tree {}\n");

    let model = model();
    let mut session = BuildSession::new(&model, BuildConfig::default());
    session.process_component(&tree()).unwrap();

    let components = vec!["Tree".to_string()];
    let input = ModuleInput::new("tree", src.join("index.d.ts"), tmp.path().join("out"));
    let assembled = session.assemble_module(&input, &components).unwrap();

    let output = fs::read_to_string(&assembled.output).unwrap();
    assert!(scan::import_specifiers(&output).is_empty());
    assert!(output.starts_with("export declare function configure(theme: Theme): void;"));
    assert!(output.contains("export interface HTMLMyTreeElement"));
    assert!(output.ends_with("export { Tree } from \"./tree\";\n"));
    assert!(tmp.path().join("out").join("tree.d.ts").is_file());
    assert!(!session.diagnostics().has_errors());

    assert!(session.assemble_module(&input, &components).is_some());
}

#[test]
fn test_array_event_detail_expands_only_in_design_time() {
    let model = model();
    let source = ComponentSource::new("Picker", "my-picker").event(
        "select",
        EventSource::with_detail(TypeDescriptor::array(TypeDescriptor::reference("TreeNode"))),
    );
    let mut session = BuildSession::new(&model, BuildConfig::default());
    let metadata = session.process_component(&source).unwrap();

    let rt_detail = &metadata.runtime["events"]["select"]["detail"];
    assert_eq!(rt_detail, &json!({ "type": "Array<object>" }));

    let dt_detail = &metadata.design_time["events"]["select"]["detail"];
    assert!(dt_detail.get("properties").is_none());
    assert_eq!(dt_detail["isArrayOfObject"], json!(true));
    assert_eq!(dt_detail["itemProperties"]["label"]["type"], json!("string"));
}

#[test]
fn test_children_property_fails_component() {
    let model = model().declare(TypeDeclaration::interface("Children", vec![]).library());
    let source = ComponentSource::new("Panel", "my-panel")
        .property("content", PropertySource::new(TypeDescriptor::reference("Children")));
    let mut session = BuildSession::new(&model, BuildConfig::default());

    assert!(session.process_component(&source).is_none());
    let errors: Vec<_> = session.diagnostics().for_component("Panel").collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].category, Some(CheckCategory::DefaultSlot));
}

#[test]
fn test_mapped_without_argument_does_not_abort() {
    let model = model();
    let source: ComponentSource = serde_json::from_str(
        r#"{
            "name": "Form",
            "tagName": "my-form",
            "properties": { "values": { "type": { "kind": "mapped", "wrapper": "Partial" } } }
        }"#,
    )
    .unwrap();
    let mut session = BuildSession::new(&model, BuildConfig::default());
    let metadata = session.process_component(&source).unwrap();

    assert_eq!(metadata.runtime["properties"]["values"]["type"], json!("object"));
    assert_eq!(session.diagnostics().warning_count(), 1);
}

#[test]
fn test_session_reset_between_builds() {
    let model = model();
    let mut session = BuildSession::new(&model, BuildConfig::default());
    session.process_component(&tree());
    assert_eq!(session.components().count(), 1);

    session.reset();
    assert_eq!(session.components().count(), 0);

    let metadata = session.process_component(&tree()).unwrap();
    assert_eq!(metadata.design_time["name"], Value::from("Tree"));
}
