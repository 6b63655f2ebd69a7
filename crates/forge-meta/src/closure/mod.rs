//! Declaration closure assembly
//!
//! A module's public declaration file re-exports sibling declaration files
//! (`export { X } from "./x"`). Assembly merges the primary file with the
//! module's component fragments and copies every local file the result
//! transitively needs next to it.
//!
//! ## Discovery order
//!
//! | Step | Source | Statements scanned |
//! |------|--------|--------------------|
//! | 1 | primary file | `export ... from "./..."` |
//! | 2 | each discovered file, in order | `import ... from "./..."` |
//!
//! Files are keyed by basename; the first discovery wins.

pub mod scan;

use crate::config::{BuildConfig, OutputShape};
use crate::diagnostics::AssemblyError;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use scan::{ExportClause, ExportFrom, ExportSpecifier};

/// One module to assemble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInput {
    /// Module name, used for exclusion and the processed-module set
    pub name: String,
    /// Primary declaration file
    pub primary: PathBuf,
    /// Directory the assembled output goes to; emptied first
    pub out_dir: PathBuf,
}

impl ModuleInput {
    pub fn new(
        name: impl Into<String>,
        primary: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            primary: primary.into(),
            out_dir: out_dir.into(),
        }
    }
}

/// Result of assembling one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledModule {
    pub name: String,
    /// Written declaration file
    pub output: PathBuf,
    /// Source files of the closure, in discovery order
    pub closure: Vec<PathBuf>,
    /// Where each closure file was copied to
    pub copied: Vec<PathBuf>,
}

/// Merges declaration files and copies their local dependencies
pub struct DeclarationClosureAssembler<'a> {
    config: &'a BuildConfig,
}

impl<'a> DeclarationClosureAssembler<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Discover the declaration closure of a primary file
    ///
    /// `primary_text` is the primary file's content; dependencies are read
    /// from disk.
    pub fn discover(
        &self,
        primary: &Path,
        primary_text: &str,
    ) -> Result<Vec<PathBuf>, AssemblyError> {
        let mut visited: BTreeSet<OsString> = BTreeSet::new();
        if let Some(name) = primary.file_name() {
            visited.insert(name.to_os_string());
        }
        let mut closure = Vec::new();

        for statement in scan::export_statements(primary_text) {
            if !scan::is_relative(&statement.specifier) {
                continue;
            }
            let file = resolve_required(primary, &statement.specifier)?;
            push_unvisited(&mut closure, &mut visited, file);
        }

        let mut next = 0;
        while next < closure.len() {
            let file = closure[next].clone();
            let text = fs::read_to_string(&file).map_err(|e| AssemblyError::io(&file, e))?;
            for specifier in scan::import_specifiers(&text) {
                if !scan::is_relative(&specifier) {
                    continue;
                }
                let dependency = resolve_required(&file, &specifier)?;
                push_unvisited(&mut closure, &mut visited, dependency);
            }
            next += 1;
        }

        debug!(primary = %primary.display(), files = closure.len(), "discovered declaration closure");
        Ok(closure)
    }

    /// Merge a primary file with fragment texts
    ///
    /// Re-export statements move to the end, minus names a fragment
    /// already exports.
    pub fn merge(&self, primary_text: &str, fragments: &[String]) -> String {
        let body = match self.config.output_shape {
            OutputShape::SingleComponent => scan::strip_imports(primary_text),
            OutputShape::Library => primary_text.to_string(),
        };
        let exports = scan::export_statements(&body);
        let body = scan::strip_export_statements(&body);

        let fragment_names: BTreeSet<String> = fragments
            .iter()
            .flat_map(|fragment| scan::exported_names(fragment))
            .collect();

        let mut sections: Vec<String> = Vec::new();
        let body = body.trim();
        if !body.is_empty() {
            sections.push(body.to_string());
        }
        sections.extend(
            fragments
                .iter()
                .map(|fragment| fragment.trim())
                .filter(|fragment| !fragment.is_empty())
                .map(str::to_string),
        );
        let statements: Vec<String> = exports
            .iter()
            .filter_map(|statement| statement.without(&fragment_names))
            .map(|statement| statement.to_statement())
            .collect();
        if !statements.is_empty() {
            sections.push(statements.join("\n"));
        }

        let mut output = sections.join("\n\n");
        output.push('\n');
        output
    }

    /// Assemble one module
    ///
    /// Returns `Ok(None)` when the library shape skips the module, either
    /// because it is excluded or because it was already assembled in this
    /// session.
    pub fn assemble(
        &self,
        input: &ModuleInput,
        fragments: &[String],
        processed: &mut BTreeSet<String>,
    ) -> Result<Option<AssembledModule>, AssemblyError> {
        if self.config.output_shape == OutputShape::Library {
            if self.config.excluded_modules.contains(&input.name) {
                debug!(module = %input.name, "module excluded from assembly");
                return Ok(None);
            }
            if processed.contains(&input.name) {
                debug!(module = %input.name, "module already assembled");
                return Ok(None);
            }
        }

        let primary_text = fs::read_to_string(&input.primary).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AssemblyError::PrimaryNotFound(input.primary.clone())
            } else {
                AssemblyError::io(&input.primary, e)
            }
        })?;
        let file_name = input
            .primary
            .file_name()
            .ok_or_else(|| AssemblyError::PrimaryNotFound(input.primary.clone()))?;

        let closure = self.discover(&input.primary, &primary_text)?;
        let merged = self.merge(&primary_text, fragments);

        reset_dir(&input.out_dir)?;
        let output = input.out_dir.join(file_name);
        fs::write(&output, merged).map_err(|e| AssemblyError::io(&output, e))?;

        let base = input.primary.parent().unwrap_or_else(|| Path::new(""));
        let mut copied = Vec::with_capacity(closure.len());
        for file in &closure {
            let relative = match file.strip_prefix(base) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => PathBuf::from(file.file_name().unwrap_or_default()),
            };
            let dest = input.out_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| AssemblyError::io(parent, e))?;
            }
            fs::copy(file, &dest).map_err(|e| AssemblyError::io(file, e))?;
            copied.push(dest);
        }

        processed.insert(input.name.clone());
        info!(
            module = %input.name,
            fragments = fragments.len(),
            files = closure.len(),
            "assembled module declarations"
        );

        Ok(Some(AssembledModule {
            name: input.name.clone(),
            output,
            closure,
            copied,
        }))
    }
}

/// Resolve a relative specifier against the importing file
///
/// Tries `x.d.ts`, then `x` with a `.js` extension swapped for `.d.ts`,
/// then `x/index.d.ts`.
pub fn resolve_specifier(importer: &Path, specifier: &str) -> Option<PathBuf> {
    let dir = importer.parent().unwrap_or_else(|| Path::new(""));
    let target = dir.join(specifier);
    let raw = target.to_string_lossy();

    let mut candidates = vec![PathBuf::from(format!("{}.d.ts", raw))];
    if let Some(stem) = raw.strip_suffix(".js") {
        candidates.push(PathBuf::from(format!("{}.d.ts", stem)));
    }
    if raw.ends_with(".d.ts") {
        candidates.push(target.clone());
    }
    candidates.push(target.join("index.d.ts"));

    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .map(|candidate| normalize(&candidate))
}

fn resolve_required(importer: &Path, specifier: &str) -> Result<PathBuf, AssemblyError> {
    resolve_specifier(importer, specifier).ok_or_else(|| AssemblyError::MissingDependency {
        importer: importer.to_path_buf(),
        specifier: specifier.to_string(),
    })
}

fn push_unvisited(closure: &mut Vec<PathBuf>, visited: &mut BTreeSet<OsString>, file: PathBuf) {
    let key = file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    if visited.insert(key) {
        debug!(file = %file.display(), "closure dependency");
        closure.push(file);
    }
}

/// Collapse `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn reset_dir(dir: &Path) -> Result<(), AssemblyError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| AssemblyError::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| AssemblyError::io(dir, e))
}
