//! Documentation tag interpretation
//!
//! Turns raw [`DocTags`] into validated [`Annotations`]. Tags that cannot be
//! interpreted produce an [`AnnotationError`]; the tag is dropped and the
//! rest of the component is processed normally.

use crate::config::parse_version;
use crate::diagnostics::AnnotationError;
use crate::ir::DocTags;
use crate::resolve::TypeSignature;
use indexmap::IndexMap;
use serde_json::Value;

/// Tag naming the design-time property editor
pub const EDITOR_TAG: &str = "editor";

/// Interpreted documentation of a member
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotations {
    pub description: Option<String>,
    /// Deprecation note; empty when deprecated without a note
    pub deprecated: Option<String>,
    pub since: Option<String>,
    pub display_name: Option<String>,
    pub default_value: Option<Value>,
    /// Property editor hint
    pub editor: Option<String>,
    /// Remaining tags, passed through to design-time metadata
    pub tags: IndexMap<String, String>,
}

impl Annotations {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }
}

/// Interpret documentation tags
///
/// `signature` is the resolved type the `@default` value must match;
/// without it a default value is rejected.
pub fn interpret(
    docs: &DocTags,
    signature: Option<&TypeSignature>,
) -> (Annotations, Vec<AnnotationError>) {
    let mut errors = Vec::new();
    let mut annotations = Annotations {
        description: non_empty(docs.description.as_deref()),
        deprecated: docs.deprecated.as_ref().map(|note| note.trim().to_string()),
        ..Default::default()
    };

    if let Some(ref since) = docs.since {
        if parse_version(since).is_some() {
            annotations.since = Some(since.trim().to_string());
        } else {
            errors.push(AnnotationError::InvalidVersion {
                tag: "since".into(),
                value: since.clone(),
            });
        }
    }

    if let Some(ref name) = docs.display_name {
        match non_empty(Some(name)) {
            Some(name) => annotations.display_name = Some(name),
            None => errors.push(AnnotationError::Empty {
                tag: "displayName".into(),
            }),
        }
    }

    if let Some(ref raw) = docs.default {
        match parse_default(raw, signature) {
            Ok(value) => annotations.default_value = Some(value),
            Err(e) => errors.push(e),
        }
    }

    for (tag, value) in &docs.tags {
        if tag == EDITOR_TAG {
            match non_empty(Some(value)) {
                Some(editor) => annotations.editor = Some(editor),
                None => errors.push(AnnotationError::Empty { tag: tag.clone() }),
            }
        } else {
            annotations.tags.insert(tag.clone(), value.clone());
        }
    }

    (annotations, errors)
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_default(raw: &str, signature: Option<&TypeSignature>) -> Result<Value, AnnotationError> {
    let value: Value = serde_json::from_str(raw.trim()).map_err(|e| AnnotationError::Unparsable {
        tag: "default".into(),
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    let mistyped = |expected: &str| AnnotationError::Mistyped {
        tag: "default".into(),
        value: raw.to_string(),
        expected: expected.to_string(),
    };

    let Some(signature) = signature else {
        return Err(mistyped("unknown"));
    };
    if !matches_display_type(&value, &signature.display_type) {
        return Err(mistyped(&signature.display_type));
    }
    if let (Some(values), Value::String(s)) = (signature.structural_enum_values(), &value) {
        if !values.contains(s) {
            return Err(mistyped(signature.doc()));
        }
    }
    Ok(value)
}

/// Check a JSON value against a display type such as `string|null`
pub fn matches_display_type(value: &Value, display: &str) -> bool {
    split_top_level(display).into_iter().any(|part| match part {
        "any" => true,
        "string" => value.is_string(),
        "number" => value.is_number(),
        "bigint" => value.is_number() || value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "undefined" | "void" | "Function" | "symbol" => false,
        "object" => value.is_object() || value.is_null(),
        p if p.starts_with("Array<") => value.is_array(),
        p if p.starts_with('{') => value.is_object(),
        // Library types have no JSON form to check against
        _ => true,
    })
}

/// Split on `|` outside of `<>` and `{}`
fn split_top_level(display: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in display.char_indices() {
        match c {
            '<' | '{' | '(' => depth += 1,
            '>' | '}' | ')' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(display[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(display[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    fn enum_sig() -> TypeSignature {
        let mut sig = TypeSignature::documented("string", "Size");
        sig.enum_values = Some(IndexSet::from(["S".to_string(), "M".to_string()]));
        sig
    }

    #[test]
    fn test_valid_tags() {
        let docs = DocTags::described("  The label ")
            .with_default("\"OK\"")
            .with_since("1.2")
            .with_display_name("Label")
            .with_tag(EDITOR_TAG, "text")
            .with_tag("category", "Appearance");
        let (annotations, errors) = interpret(&docs, Some(&TypeSignature::simple("string")));

        assert!(errors.is_empty());
        assert_eq!(annotations.description.as_deref(), Some("The label"));
        assert_eq!(annotations.default_value, Some(Value::String("OK".into())));
        assert_eq!(annotations.editor.as_deref(), Some("text"));
        assert_eq!(annotations.tags.get("category").map(String::as_str), Some("Appearance"));
        assert!(!annotations.tags.contains_key(EDITOR_TAG));
    }

    #[test]
    fn test_unparsable_default_is_dropped() {
        let docs = DocTags::default().with_default("primary");
        let (annotations, errors) = interpret(&docs, Some(&TypeSignature::simple("string")));
        assert!(annotations.default_value.is_none());
        assert!(matches!(errors[0], AnnotationError::Unparsable { .. }));
    }

    #[test]
    fn test_mistyped_default() {
        let docs = DocTags::default().with_default("42");
        let (_, errors) = interpret(&docs, Some(&TypeSignature::simple("boolean")));
        assert!(matches!(errors[0], AnnotationError::Mistyped { .. }));

        let docs = DocTags::default().with_default("\"XL\"");
        let (_, errors) = interpret(&docs, Some(&enum_sig()));
        assert_eq!(errors.len(), 1);

        let docs = DocTags::default().with_default("\"M\"");
        let (annotations, errors) = interpret(&docs, Some(&enum_sig()));
        assert!(errors.is_empty());
        assert!(annotations.default_value.is_some());
    }

    #[test]
    fn test_invalid_version_and_empty_name() {
        let docs = DocTags::default()
            .with_since("someday")
            .with_display_name("   ");
        let (annotations, errors) = interpret(&docs, None);
        assert!(annotations.since.is_none());
        assert!(annotations.display_name.is_none());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_display_type_matching() {
        assert!(matches_display_type(&Value::Null, "string|null"));
        assert!(matches_display_type(&serde_json::json!([1, 2]), "Array<string|number>"));
        assert!(!matches_display_type(&serde_json::json!("x"), "Array<string|number>"));
        assert!(matches_display_type(&serde_json::json!({"x": 1}), "object"));
        assert!(matches_display_type(&serde_json::json!("2024-01-01"), "Date"));
        assert!(!matches_display_type(&serde_json::json!(1), "Function"));
    }
}
