//! Build session
//!
//! A [`BuildSession`] owns everything one build accumulates: the metadata of
//! each processed component, collected diagnostics and the set of modules
//! already assembled. Call [`BuildSession::reset`] before reusing it for
//! another build.

use crate::closure::{AssembledModule, DeclarationClosureAssembler, ModuleInput};
use crate::codegen::{fragment_file_name, FragmentGenerator};
use crate::config::BuildConfig;
use crate::diagnostics::{
    Diagnostic, DiagnosticSeverity, DiagnosticsCollector, MetaError, MetaResult,
};
use crate::ir::{ComponentSource, TypeModel};
use crate::metadata::{design_time_json, runtime_json, ComponentDescriptor, MetadataAssembler, Tier};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Everything produced for one component
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMetadata {
    pub descriptor: ComponentDescriptor,
    pub runtime: Value,
    pub design_time: Value,
    /// Declaration fragment text
    pub fragment: String,
}

impl ComponentMetadata {
    pub fn tag_name(&self) -> &str {
        &self.descriptor.tag_name
    }
}

/// State of one build
pub struct BuildSession<'m> {
    model: &'m dyn TypeModel,
    config: BuildConfig,
    components: IndexMap<String, ComponentMetadata>,
    diagnostics: DiagnosticsCollector,
    processed_modules: BTreeSet<String>,
}

impl<'m> BuildSession<'m> {
    /// Create a session over a type model
    pub fn new(model: &'m dyn TypeModel, config: BuildConfig) -> Self {
        Self {
            model,
            config,
            components: IndexMap::new(),
            diagnostics: DiagnosticsCollector::new(),
            processed_modules: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &DiagnosticsCollector {
        &self.diagnostics
    }

    /// Metadata of a processed component, by class name
    pub fn component(&self, name: &str) -> Option<&ComponentMetadata> {
        self.components.get(name)
    }

    /// All processed components in processing order
    pub fn components(&self) -> impl Iterator<Item = &ComponentMetadata> {
        self.components.values()
    }

    /// Modules assembled so far
    pub fn processed_modules(&self) -> &BTreeSet<String> {
        &self.processed_modules
    }

    /// Build metadata and the declaration fragment of one component
    ///
    /// A structural error is recorded as an error diagnostic and the
    /// component produces nothing; the session stays usable.
    pub fn process_component(&mut self, source: &ComponentSource) -> Option<&ComponentMetadata> {
        let mut assembler = MetadataAssembler::new(self.model, &self.config);
        let result = assembler.assemble(source);
        self.diagnostics.extend(assembler.take_diagnostics());

        let descriptor = match result {
            Ok(descriptor) => descriptor,
            Err(e) => {
                error!(component = %e.component, "{}", e.error);
                let mut diagnostic = Diagnostic::error(e.error.to_string())
                    .in_component(e.component.clone())
                    .at(e.location.clone());
                if let Some(category) = e.error.category() {
                    diagnostic = diagnostic.with_category(category);
                }
                self.diagnostics.add(diagnostic);
                return None;
            }
        };

        let fragment = FragmentGenerator::new(&descriptor, &self.config).generate();
        let metadata = ComponentMetadata {
            runtime: runtime_json(&descriptor),
            design_time: design_time_json(&descriptor),
            fragment,
            descriptor,
        };
        info!(
            component = %source.name,
            tag = %source.tag_name,
            properties = metadata.descriptor.properties.len(),
            events = metadata.descriptor.events.len(),
            "processed component"
        );

        let name = source.name.clone();
        self.components.insert(name.clone(), metadata);
        self.components.get(&name)
    }

    /// Assemble a module's declarations with the fragments of its components
    ///
    /// Unknown or failed component names are skipped with a warning. An
    /// assembly failure is recorded as an error diagnostic.
    pub fn assemble_module(
        &mut self,
        input: &ModuleInput,
        components: &[String],
    ) -> Option<AssembledModule> {
        let mut fragments = Vec::with_capacity(components.len());
        for name in components {
            match self.components.get(name) {
                Some(metadata) => fragments.push(metadata.fragment.clone()),
                None => self.diagnostics.add(
                    Diagnostic::warning(format!(
                        "module `{}` lists `{}`, which produced no metadata",
                        input.name, name
                    ))
                    .in_component(name.clone()),
                ),
            }
        }

        let assembler = DeclarationClosureAssembler::new(&self.config);
        match assembler.assemble(input, &fragments, &mut self.processed_modules) {
            Ok(assembled) => assembled,
            Err(e) => {
                error!(module = %input.name, "{}", e);
                self.diagnostics
                    .add(Diagnostic::error(format!("module `{}`: {}", input.name, e)));
                None
            }
        }
    }

    /// Write `{tag}.rt.json`, `{tag}.dt.json` and `{tag}.fragment.d.ts` for
    /// every component
    ///
    /// The directory is emptied first.
    pub fn write_outputs(&self, out_dir: impl AsRef<Path>) -> MetaResult<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        if out_dir.exists() {
            fs::remove_dir_all(out_dir)?;
        }
        fs::create_dir_all(out_dir)?;

        let mut written = Vec::new();
        for metadata in self.components.values() {
            let tag = metadata.tag_name();
            for (tier, value) in [
                (Tier::Runtime, &metadata.runtime),
                (Tier::DesignTime, &metadata.design_time),
            ] {
                let path = out_dir.join(format!("{}.{}", tag, tier.extension()));
                let mut text = serde_json::to_string_pretty(value)?;
                text.push('\n');
                fs::write(&path, text)?;
                written.push(path);
            }
            let path = out_dir.join(fragment_file_name(tag));
            fs::write(&path, &metadata.fragment)?;
            written.push(path);
            debug!(tag, "wrote component outputs");
        }

        info!(dir = %out_dir.display(), files = written.len(), "wrote outputs");
        Ok(written)
    }

    /// Fail with the first recorded error, if any
    pub fn finish(&self) -> MetaResult<()> {
        match self
            .diagnostics
            .diagnostics()
            .iter()
            .find(|d| d.severity == DiagnosticSeverity::Error)
        {
            Some(first) => Err(MetaError::Build {
                errors: self.diagnostics.error_count(),
                first: first.format(),
            }),
            None => Ok(()),
        }
    }

    /// Forget everything accumulated, keeping model and configuration
    pub fn reset(&mut self) {
        self.components.clear();
        self.diagnostics.clear();
        self.processed_modules.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputShape;
    use crate::diagnostics::CheckCategory;
    use crate::ir::{InMemoryTypeModel, PropertySource, StructMember, TypeDeclaration, TypeDescriptor};
    use tempfile::TempDir;

    fn model() -> InMemoryTypeModel {
        InMemoryTypeModel::new().declare(TypeDeclaration::interface(
            "Item",
            vec![StructMember::new("text", TypeDescriptor::string())],
        ))
    }

    fn button() -> ComponentSource {
        ComponentSource::new("Button", "my-button")
            .property("label", PropertySource::new(TypeDescriptor::string()))
            .property(
                "item",
                PropertySource::new(TypeDescriptor::reference("Item")),
            )
    }

    fn broken() -> ComponentSource {
        ComponentSource::new("Toggle", "my-toggle")
            .property("checked", PropertySource::new(TypeDescriptor::boolean()).writeback())
    }

    #[test]
    fn test_process_component() {
        let model = model();
        let mut session = BuildSession::new(&model, BuildConfig::default());
        let metadata = session.process_component(&button()).unwrap();

        assert_eq!(metadata.runtime["tag"], "my-button");
        assert_eq!(metadata.runtime["properties"]["label"]["type"], "string");
        assert!(metadata.fragment.contains("HTMLMyButtonElement"));
        assert!(session.component("Button").is_some());
    }

    #[test]
    fn test_structural_error_is_recorded() {
        let model = model();
        let mut session = BuildSession::new(&model, BuildConfig::default());

        assert!(session.process_component(&broken()).is_none());
        assert!(session.process_component(&button()).is_some());

        let errors: Vec<&Diagnostic> = session
            .diagnostics()
            .diagnostics()
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].component.as_deref(), Some("Toggle"));
        assert_eq!(errors[0].category, Some(CheckCategory::Writeback));
        assert!(session.finish().is_err());
    }

    #[test]
    fn test_disabled_check_lets_component_through() {
        let model = model();
        let config = BuildConfig::default().disable(CheckCategory::Writeback);
        let mut session = BuildSession::new(&model, config);
        assert!(session.process_component(&broken()).is_some());
        assert!(session.finish().is_ok());
    }

    #[test]
    fn test_reset() {
        let model = model();
        let mut session = BuildSession::new(&model, BuildConfig::default());
        session.process_component(&button());
        session.process_component(&broken());
        session.reset();

        assert_eq!(session.components().count(), 0);
        assert!(session.diagnostics().diagnostics().is_empty());
        assert!(session.processed_modules().is_empty());
    }

    #[test]
    fn test_write_outputs() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("meta");
        let model = model();
        let mut session = BuildSession::new(&model, BuildConfig::default());
        session.process_component(&button());

        let written = session.write_outputs(&out).unwrap();
        assert_eq!(written.len(), 3);
        let rt: Value =
            serde_json::from_str(&fs::read_to_string(out.join("my-button.rt.json")).unwrap())
                .unwrap();
        assert_eq!(rt["name"], "Button");
        assert!(out.join("my-button.dt.json").is_file());
        assert!(out.join("my-button.fragment.d.ts").is_file());
    }

    #[test]
    fn test_assemble_module_with_fragments() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("index.d.ts"),
            "export { Button, MyButtonProperties } from \"./button\";\n",
        )
        .unwrap();
        fs::write(src.join("button.d.ts"), "export declare class Button {}\n").unwrap();

        let model = model();
        let config = BuildConfig::default().with_output_shape(OutputShape::Library);
        let mut session = BuildSession::new(&model, config);
        session.process_component(&button());

        let input = ModuleInput::new("buttons", src.join("index.d.ts"), tmp.path().join("out"));
        let names = vec!["Button".to_string(), "Missing".to_string()];
        let assembled = session.assemble_module(&input, &names).unwrap();

        let text = fs::read_to_string(&assembled.output).unwrap();
        assert!(text.contains("export type MyButtonProperties = {"));
        assert!(text.contains("export { Button } from \"./button\";"));
        assert_eq!(session.diagnostics().for_component("Missing").count(), 1);
        assert!(session.assemble_module(&input, &names).is_none());
    }

    #[test]
    fn test_missing_dependency_is_recorded() {
        let tmp = TempDir::new().unwrap();
        let primary = tmp.path().join("index.d.ts");
        fs::write(&primary, "export * from \"./gone\";\n").unwrap();

        let model = model();
        let mut session = BuildSession::new(&model, BuildConfig::default());
        let input = ModuleInput::new("main", &primary, tmp.path().join("out"));

        assert!(session.assemble_module(&input, &[]).is_none());
        assert!(session.diagnostics().has_errors());
    }
}
