//! Core types and JSON helpers shared by the conversion passes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConvertError;

/// Version tag written into every converted document.
pub const SWAGGER_VERSION: &str = "2.0";

/// `info.title` used when the resource listing has none.
pub const DEFAULT_TITLE: &str = "Title was not specified";

/// `info.version` used when the resource listing has no `apiVersion`.
pub const DEFAULT_API_VERSION: &str = "1.0.0";

/// Description of synthesized or message-less responses.
pub const NO_RESPONSE_DESCRIPTION: &str = "No response was specified";

/// Prefix of every local model reference.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Options for a single conversion.
///
/// Deserializes from the same camelCase keys the legacy tooling used:
///
/// ```
/// use swagger_converter::ConvertOptions;
///
/// let options: ConvertOptions =
///     serde_json::from_str(r#"{"collectionFormat": "csv", "buildTagsFromPaths": true}"#).unwrap();
/// assert_eq!(options.collection_format.as_deref(), Some("csv"));
/// assert!(options.build_tags_from_paths);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Stamped onto every array-typed non-body parameter.
    pub collection_format: Option<String>,
    /// Name tags after the listing's `apis[].path` instead of each
    /// declaration's `resourcePath`.
    pub build_tags_from_paths: bool,
}

impl ConvertOptions {
    /// Create options with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection format for array parameters.
    pub fn collection_format(mut self, format: impl Into<String>) -> Self {
        self.collection_format = Some(format.into());
        self
    }

    /// Derive tag names from listing paths.
    pub fn build_tags_from_paths(mut self, enabled: bool) -> Self {
        self.build_tags_from_paths = enabled;
        self
    }
}

/// Require `value` to be an object.
pub(crate) fn as_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, ConvertError> {
    value
        .as_object()
        .ok_or_else(|| ConvertError::InvalidStructure {
            path: path.to_string(),
            expected: "object",
            actual: json_type_name(value).to_string(),
        })
}

/// Optional object field. `null` counts as absent.
pub(crate) fn get_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a Map<String, Value>>, ConvertError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_object(value, &format!("{}/{}", path, key)).map(Some),
    }
}

/// Optional array field, empty when absent.
pub(crate) fn get_array<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a [Value], ConvertError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(ConvertError::InvalidStructure {
            path: format!("{}/{}", path, key),
            expected: "array",
            actual: json_type_name(other).to_string(),
        }),
    }
}

/// String field; anything else is treated as absent.
pub(crate) fn get_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Copy `key` from `source` to `target` under `target_key` when it holds a value.
pub(crate) fn copy_field(
    source: &Map<String, Value>,
    key: &str,
    target: &mut Map<String, Value>,
    target_key: &str,
) {
    match source.get(key) {
        None | Some(Value::Null) => {}
        Some(value) => {
            target.insert(target_key.to_string(), value.clone());
        }
    }
}

/// Replace the legacy `{format}` placeholder with `json`.
pub(crate) fn replace_format(path: &str) -> String {
    path.replace("{format}", "json")
}
