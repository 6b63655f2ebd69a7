//! Build configuration
//!
//! Loaded from a `forge-meta.toml` file (all keys optional, kebab-case):
//!
//! ```toml
//! output-shape = "library"
//! excluded-modules = ["internal"]
//! legacy-name-threshold = "2.0"
//! disabled-checks = ["dynamic-slot-definitions"]
//! well-known-types = ["Temporal.Instant"]
//! ```

use crate::diagnostics::{CheckCategory, MetaError, MetaResult};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Shape of the assembled declaration output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputShape {
    /// Many modules packaged together; modules are assembled once per build
    Library,
    /// One self-contained component module; outward imports are stripped
    #[default]
    SingleComponent,
}

/// Configuration for one build invocation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BuildConfig {
    /// Module names never assembled in library packaging
    pub excluded_modules: BTreeSet<String>,
    /// Components introduced before this version also get legacy-named declarations
    pub legacy_name_threshold: Option<String>,
    pub output_shape: OutputShape,
    /// Check categories downgraded to silent no-ops
    pub disabled_checks: BTreeSet<CheckCategory>,
    /// Extra library type names kept verbatim and never expanded
    pub well_known_types: BTreeSet<String>,
}

impl BuildConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> MetaResult<Self> {
        toml::from_str(text).map_err(|e| MetaError::config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> MetaResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        if let Some(ref threshold) = config.legacy_name_threshold {
            if parse_version(threshold).is_none() {
                return Err(MetaError::config(format!(
                    "{}: legacy-name-threshold `{}` is not a version",
                    path.display(),
                    threshold
                )));
            }
        }
        Ok(config)
    }

    /// Set the output shape
    pub fn with_output_shape(mut self, shape: OutputShape) -> Self {
        self.output_shape = shape;
        self
    }

    /// Disable a check category
    pub fn disable(mut self, category: CheckCategory) -> Self {
        self.disabled_checks.insert(category);
        self
    }

    /// Exclude a module from library assembly
    pub fn exclude_module(mut self, name: impl Into<String>) -> Self {
        self.excluded_modules.insert(name.into());
        self
    }

    /// Set the legacy-name threshold version
    pub fn with_legacy_name_threshold(mut self, version: impl Into<String>) -> Self {
        self.legacy_name_threshold = Some(version.into());
        self
    }

    /// Check whether a category is enabled
    pub fn is_enabled(&self, category: CheckCategory) -> bool {
        !self.disabled_checks.contains(&category)
    }

    /// Whether a component introduced in `since` needs legacy-named declarations
    pub fn needs_legacy_names(&self, since: Option<&str>) -> bool {
        match (self.legacy_name_threshold.as_deref(), since) {
            (Some(threshold), Some(since)) => {
                compare_versions(since, threshold) == Some(Ordering::Less)
            }
            _ => false,
        }
    }
}

/// Parse a version, padding `1` and `1.2` out to three components
pub fn parse_version(text: &str) -> Option<Version> {
    let text = text.trim().trim_start_matches('v');
    let (core, suffix) = text.split_at(text.find(['-', '+']).unwrap_or(text.len()));
    let padded = match core.split('.').count() {
        1 => format!("{}.0.0{}", core, suffix),
        2 => format!("{}.0{}", core, suffix),
        _ => text.to_string(),
    };
    Version::parse(&padded).ok()
}

/// Compare two versions
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    Some(parse_version(a)?.cmp(&parse_version(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_from_toml() {
        let config = BuildConfig::from_toml_str(
            r#"
output-shape = "library"
excluded-modules = ["internal", "testing"]
legacy-name-threshold = "2.0"
disabled-checks = ["writeback", "unsupported-type"]
"#,
        )
        .unwrap();

        assert_eq!(config.output_shape, OutputShape::Library);
        assert!(config.excluded_modules.contains("internal"));
        assert!(!config.is_enabled(CheckCategory::Writeback));
        assert!(config.is_enabled(CheckCategory::DynamicSlot));
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = BuildConfig::from_toml_str("").unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.output_shape, OutputShape::SingleComponent);
    }

    #[test]
    fn test_unknown_check_is_rejected() {
        assert!(BuildConfig::from_toml_str("disabled-checks = [\"nope\"]").is_err());
    }

    #[test]
    fn test_load_rejects_bad_threshold() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "legacy-name-threshold = \"next\"").unwrap();
        let err = BuildConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("legacy-name-threshold"));
    }

    #[test]
    fn test_version_comparison() {
        assert_eq!(compare_versions("1.9", "2.0"), Some(Ordering::Less));
        assert_eq!(compare_versions("2", "2.0.0"), Some(Ordering::Equal));
        assert_eq!(compare_versions("2.1.0-rc.1", "2.0"), Some(Ordering::Greater));
        assert_eq!(compare_versions("next", "2.0"), None);
        assert_eq!(compare_versions("v1.2", "1.10"), Some(Ordering::Less));
        assert_eq!(compare_versions("2.0-beta", "2.0"), Some(Ordering::Less));
    }

    #[test]
    fn test_parse_version_pads_short_forms() {
        assert_eq!(parse_version("2"), Some(Version::new(2, 0, 0)));
        assert_eq!(parse_version("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_version("1.2.3"), Some(Version::new(1, 2, 3)));
        assert!(parse_version("").is_none());
        assert!(parse_version("1.x").is_none());
    }

    #[test]
    fn test_needs_legacy_names() {
        let config = BuildConfig::new().with_legacy_name_threshold("3.0");
        assert!(config.needs_legacy_names(Some("2.4")));
        assert!(!config.needs_legacy_names(Some("3.0")));
        assert!(!config.needs_legacy_names(None));
        assert!(!BuildConfig::new().needs_legacy_names(Some("1.0")));
    }
}
