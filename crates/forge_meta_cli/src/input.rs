//! Build input files
//!
//! A build input is a JSON document:
//!
//! ```json
//! {
//!   "model": { "declarations": [ ... ] },
//!   "components": [ { "name": "Button", "tagName": "my-button", ... } ],
//!   "modules": [ { "name": "button", "primary": "types/index.d.ts", "components": ["Button"] } ]
//! }
//! ```
//!
//! Module paths are relative to the file that lists them. A directory input
//! merges every `*.json` file below it in path order.

use anyhow::{Context, Result};
use forge_meta::{ComponentSource, InMemoryTypeModel};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A module whose declarations get assembled
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSpec {
    pub name: String,
    pub primary: PathBuf,
    /// Component class names whose fragments the module carries
    #[serde(default)]
    pub components: Vec<String>,
}

/// Everything one build reads
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInput {
    #[serde(default)]
    pub model: InMemoryTypeModel,
    #[serde(default)]
    pub components: Vec<ComponentSource>,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

impl BuildInput {
    /// Load a file or every JSON file under a directory
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Self::load_file(path);
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
            .collect();
        files.sort();
        debug!(dir = %path.display(), files = files.len(), "loading build input directory");

        let mut input = BuildInput::default();
        for file in &files {
            input.merge(Self::load_file(file)?);
        }
        Ok(input)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read build input: {}", path.display()))?;
        let mut input: BuildInput = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse build input: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for module in &mut input.modules {
            if module.primary.is_relative() {
                module.primary = base.join(&module.primary);
            }
        }
        Ok(input)
    }

    fn merge(&mut self, other: BuildInput) {
        for decl in other.model.declarations() {
            self.model.insert(decl.clone());
        }
        self.components.extend(other.components);
        self.modules.extend(other.modules);
    }
}
