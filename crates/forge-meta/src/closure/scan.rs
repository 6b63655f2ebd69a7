//! Line-oriented scanning of declaration text
//!
//! Statements are matched with regular expressions, not parsed. A statement
//! may span several lines as long as its braces contain no nested braces.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

lazy_static! {
    /// `import ... from "x";` and side-effect `import "x";`
    static ref IMPORT_REGEX: Regex = Regex::new(
        r#"(?m)^[ \t]*import\s+(?:type\s+)?(?:[\w$*\s,]*(?:\{[^{}]*\})?\s*from\s+)?["']([^"']+)["'][ \t]*;?[ \t]*(?:\r?\n)?"#
    ).unwrap();

    /// `export { a, b as c } from "x";`, `export * from "x";`, `export * as ns from "x";`
    static ref EXPORT_FROM_REGEX: Regex = Regex::new(
        r#"(?m)^[ \t]*export\s+(type\s+)?(\*(?:\s+as\s+[\w$]+)?|\{[^{}]*\})\s*from\s+["']([^"']+)["'][ \t]*;?[ \t]*(?:\r?\n)?"#
    ).unwrap();

    /// Names declared by top-level `export` declarations
    static ref EXPORTED_DECLARATION_REGEX: Regex = Regex::new(
        r"(?m)^[ \t]*export\s+(?:declare\s+)?(?:abstract\s+)?(?:interface|type|class|const|let|var|function|enum|namespace)\s+([\w$]+)"
    ).unwrap();

    /// `as alias` inside a star export
    static ref STAR_ALIAS_REGEX: Regex = Regex::new(r"^\*\s+as\s+([\w$]+)$").unwrap();
}

/// One name in an export clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpecifier {
    pub name: String,
    pub alias: Option<String>,
    pub type_only: bool,
}

impl ExportSpecifier {
    /// Name visible to importers
    pub fn exported_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for ExportSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.type_only {
            f.write_str("type ")?;
        }
        f.write_str(&self.name)?;
        if let Some(ref alias) = self.alias {
            write!(f, " as {}", alias)?;
        }
        Ok(())
    }
}

/// Export clause of a re-export statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportClause {
    /// `*` or `* as ns`
    All { alias: Option<String> },
    /// `{ a, b as c }`
    Named(Vec<ExportSpecifier>),
}

/// A re-export statement: `export ... from "specifier"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFrom {
    pub type_only: bool,
    pub clause: ExportClause,
    pub specifier: String,
    /// Byte range of the statement in the scanned text
    pub span: Range<usize>,
}

impl ExportFrom {
    /// Drop names already exported elsewhere; `None` when nothing is left
    ///
    /// Star exports are always kept.
    pub fn without(&self, exported: &BTreeSet<String>) -> Option<ExportFrom> {
        match self.clause {
            ExportClause::All { .. } => Some(self.clone()),
            ExportClause::Named(ref specs) => {
                let kept: Vec<ExportSpecifier> = specs
                    .iter()
                    .filter(|s| !exported.contains(s.exported_name()))
                    .cloned()
                    .collect();
                if kept.is_empty() {
                    None
                } else {
                    Some(ExportFrom {
                        clause: ExportClause::Named(kept),
                        ..self.clone()
                    })
                }
            }
        }
    }

    /// Print as a single-line statement
    pub fn to_statement(&self) -> String {
        let type_prefix = if self.type_only { "type " } else { "" };
        let clause = match self.clause {
            ExportClause::All { alias: None } => "*".to_string(),
            ExportClause::All {
                alias: Some(ref alias),
            } => format!("* as {}", alias),
            ExportClause::Named(ref specs) => {
                let specs: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
                format!("{{ {} }}", specs.join(", "))
            }
        };
        format!(
            "export {}{} from \"{}\";",
            type_prefix, clause, self.specifier
        )
    }
}

/// Check whether a module specifier is relative to the importing file
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Specifiers of every import statement, in order
pub fn import_specifiers(text: &str) -> Vec<String> {
    IMPORT_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Remove every import statement
pub fn strip_imports(text: &str) -> String {
    IMPORT_REGEX.replace_all(text, "").into_owned()
}

/// Every re-export statement, in order
pub fn export_statements(text: &str) -> Vec<ExportFrom> {
    EXPORT_FROM_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let clause_text = caps.get(2)?.as_str().trim();
            let clause = if clause_text.starts_with('*') {
                ExportClause::All {
                    alias: STAR_ALIAS_REGEX
                        .captures(clause_text)
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str().to_string()),
                }
            } else {
                ExportClause::Named(parse_specifiers(clause_text))
            };
            Some(ExportFrom {
                type_only: caps.get(1).is_some(),
                clause,
                specifier: caps.get(3)?.as_str().to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Remove every re-export statement
pub fn strip_export_statements(text: &str) -> String {
    EXPORT_FROM_REGEX.replace_all(text, "").into_owned()
}

/// Names declared by top-level export declarations
pub fn exported_names(text: &str) -> BTreeSet<String> {
    EXPORTED_DECLARATION_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn parse_specifiers(clause: &str) -> Vec<ExportSpecifier> {
    clause
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (type_only, entry) = match entry.strip_prefix("type ") {
                Some(rest) => (true, rest.trim()),
                None => (false, entry),
            };
            let mut parts = entry.split_whitespace();
            let name = parts.next().unwrap_or_default().to_string();
            let alias = match (parts.next(), parts.next()) {
                (Some("as"), Some(alias)) => Some(alias.to_string()),
                _ => None,
            };
            ExportSpecifier {
                name,
                alias,
                type_only,
            }
        })
        .collect()
}
