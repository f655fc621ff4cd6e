//! Data-type and model translation.
//!
//! Legacy documents describe types in several overlapping ways: a type
//! name under `type`, `dataType`, `responseClass`, `$ref` or
//! `responseModel`, textual collections such as `List[Pet]` or
//! `Map[String,Pet]`, and string-encoded bounds and defaults. Everything
//! funnels through [`build_data_type`], which returns a Swagger 2.0 schema
//! object.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};

use crate::converter::Context;
use crate::error::ConvertError;
use crate::literal::{coerce_bool, coerce_literal, coerce_number, Fallback};
use crate::types::{
    as_object, copy_field, get_array, get_object, get_str, json_type_name, DEFINITIONS_PREFIX,
};

/// Keys that may name the type of a legacy data-type descriptor, in priority order.
const TYPE_NAME_KEYS: &[&str] = &["type", "dataType", "responseClass", "$ref", "responseModel"];

/// How a type name that is not a primitive is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refs {
    /// `{"$ref": "#/definitions/<name>"}`
    Resolve,
    /// `{"type": "<name>"}`, for contexts where references are not allowed.
    Verbatim,
}

/// Map a legacy primitive or alias name (case-insensitive) to its schema.
fn primitive_type(name: &str) -> Option<Map<String, Value>> {
    let (ty, format) = match name.to_ascii_lowercase().as_str() {
        "integer" => ("integer", None),
        "number" => ("number", None),
        "string" => ("string", None),
        "boolean" => ("boolean", None),
        "array" | "list" => ("array", None),
        "object" | "map" => ("object", None),
        "file" => ("file", None),
        "int" => ("integer", Some("int32")),
        "long" => ("integer", Some("int64")),
        "float" => ("number", Some("float")),
        "double" => ("number", Some("double")),
        "byte" => ("string", Some("byte")),
        "date" => ("string", Some("date")),
        "datetime" | "date-time" => ("string", Some("date-time")),
        "set" => {
            let mut schema = Map::new();
            schema.insert("type".to_string(), json!("array"));
            schema.insert("uniqueItems".to_string(), json!(true));
            return Some(schema);
        }
        "void" | "any" => return Some(Map::new()),
        _ => return None,
    };

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!(ty));
    if let Some(format) = format {
        schema.insert("format".to_string(), json!(format));
    }
    Some(schema)
}

/// Split `Outer[Inner]` on its first bracket pair.
fn split_collection(name: &str) -> Option<(&str, &str)> {
    let open = name.find('[')?;
    let inner = name[open + 1..].strip_suffix(']')?;
    Some((&name[..open], inner))
}

/// Split `K,V` on its first comma outside nested brackets.
fn split_key_value(inner: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((&inner[..i], &inner[i + 1..])),
            _ => {}
        }
    }
    None
}

fn named_type(name: &str, refs: Refs) -> Map<String, Value> {
    let mut schema = Map::new();
    match refs {
        Refs::Resolve => {
            schema.insert(
                "$ref".to_string(),
                json!(format!("{}{}", DEFINITIONS_PREFIX, name)),
            );
        }
        Refs::Verbatim => {
            schema.insert("type".to_string(), json!(name));
        }
    }
    schema
}

/// Translate a bare legacy type name.
///
/// Declared models win over the primitive table, then collection syntax
/// is expanded; anything left is treated as a (possibly external) model
/// name.
pub(crate) fn build_type(
    ctx: &Context<'_>,
    name: &str,
    refs: Refs,
) -> Result<Map<String, Value>, ConvertError> {
    let name = name.trim();

    if ctx.is_custom_type(name) {
        return Ok(named_type(name, refs));
    }
    if let Some(schema) = primitive_type(name) {
        return Ok(schema);
    }

    if let Some((outer, inner)) = split_collection(name) {
        if let Some(mut schema) = primitive_type(outer) {
            match schema.get("type").and_then(Value::as_str) {
                // Map[String,Pet]
                Some("object") => {
                    if let Some((_, value_type)) = split_key_value(inner) {
                        schema.insert(
                            "additionalProperties".to_string(),
                            Value::Object(build_type(ctx, value_type, refs)?),
                        );
                        return Ok(schema);
                    }
                }
                Some("array") => {
                    schema.insert(
                        "items".to_string(),
                        Value::Object(build_type(ctx, inner, refs)?),
                    );
                    return Ok(schema);
                }
                _ => {}
            }
        }
    }

    Ok(named_type(name, refs))
}

/// Translate a legacy data-type descriptor into a schema.
///
/// `source` may be an object descriptor, a bare type name (as found in
/// some `items` fields), or `null`.
pub(crate) fn build_data_type(
    ctx: &Context<'_>,
    source: &Value,
    path: &str,
    refs: Refs,
) -> Result<Map<String, Value>, ConvertError> {
    match source {
        Value::Null => Ok(Map::new()),
        Value::String(name) => build_type(ctx, name, refs),
        other => build_descriptor(ctx, as_object(other, path)?, path, refs),
    }
}

/// Translate an object-shaped data-type descriptor.
///
/// Operations are descriptors too: their type fields describe the `200`
/// response.
pub(crate) fn build_descriptor(
    ctx: &Context<'_>,
    source: &Map<String, Value>,
    path: &str,
    refs: Refs,
) -> Result<Map<String, Value>, ConvertError> {
    let name = TYPE_NAME_KEYS
        .iter()
        .find_map(|key| get_str(source, key))
        .filter(|name| !name.is_empty());
    let mut schema = match name {
        Some(name) => build_type(ctx, name, refs)?,
        None => Map::new(),
    };

    if let Some(format) = get_str(source, "format") {
        schema.insert("format".to_string(), json!(format));
    }

    if let Some(items) = source.get("items").filter(|v| !v.is_null()) {
        let items = build_data_type(ctx, items, &format!("{}/items", path), refs)?;
        if !items.is_empty() {
            if !schema.contains_key("type") && !schema.contains_key("$ref") {
                schema.insert("type".to_string(), json!("array"));
            }
            schema.insert("items".to_string(), Value::Object(items));
        }
    }

    if let Some(unique) = coerce_bool(source.get("uniqueItems"), "uniqueItems")? {
        schema.insert("uniqueItems".to_string(), json!(unique));
    }
    for key in ["minimum", "maximum"] {
        if let Some(bound) = coerce_number(source.get(key), key)? {
            schema.insert(key.to_string(), bound);
        }
    }
    if let Some(values) = source.get("enum").filter(|v| v.is_array()) {
        schema.insert("enum".to_string(), values.clone());
    }

    apply_default(&mut schema, source)?;

    Ok(schema)
}

/// Set `default` from `defaultValue`/`default` against the schema's
/// current type.
///
/// String-typed defaults are kept verbatim, everything else is coerced
/// and silently dropped when it is not a valid literal. Callers that
/// settle the type later call this again.
pub(crate) fn apply_default(
    schema: &mut Map<String, Value>,
    source: &Map<String, Value>,
) -> Result<(), ConvertError> {
    let default = source
        .get("defaultValue")
        .filter(|v| !v.is_null())
        .or_else(|| source.get("default"));

    let value = if schema.get("type").and_then(Value::as_str) == Some("string") {
        default.filter(|v| !v.is_null()).cloned()
    } else {
        coerce_literal(default, "default", Fallback::Absent)?
    };

    match value {
        Some(value) => schema.insert("default".to_string(), value),
        None => schema.remove("default"),
    };
    Ok(())
}

/// Translate one legacy model into a definition.
pub(crate) fn build_model(
    ctx: &Context<'_>,
    id: &str,
    model: &Value,
) -> Result<Map<String, Value>, ConvertError> {
    let path = format!("/models/{}", id);
    let source = as_object(model, &path)?;
    let mut schema = Map::new();

    // Array-shaped models keep their own element type.
    if source.get("items").is_some_and(|v| !v.is_null()) {
        let array = build_data_type(ctx, model, &path, Refs::Resolve)?;
        for key in ["type", "items"] {
            if let Some(value) = array.get(key) {
                schema.insert(key.to_string(), value.clone());
            }
        }
    }

    copy_field(source, "description", &mut schema, "description");

    let mut required = Vec::new();
    let mut properties = Map::new();
    if let Some(props) = get_object(source, "properties", &path)? {
        for (name, prop) in props {
            let prop_path = format!("{}/properties/{}", path, name);
            let prop_source = as_object(prop, &prop_path)?;
            let mut prop_schema = build_data_type(ctx, prop, &prop_path, Refs::Resolve)?;
            copy_field(prop_source, "description", &mut prop_schema, "description");
            if coerce_bool(prop_source.get("required"), "required")? == Some(true) {
                required.push(Value::String(name.clone()));
            }
            properties.insert(name.clone(), Value::Object(prop_schema));
        }
    }

    match source.get("required") {
        Some(Value::Array(explicit)) => {
            schema.insert("required".to_string(), Value::Array(explicit.clone()));
        }
        _ if !required.is_empty() => {
            schema.insert("required".to_string(), Value::Array(required));
        }
        _ => {}
    }

    copy_field(source, "discriminator", &mut schema, "discriminator");
    if !properties.is_empty() {
        schema.insert("properties".to_string(), Value::Object(properties));
    }
    copy_field(source, "example", &mut schema, "example");

    Ok(schema)
}

/// Translate a resource's `models` map and apply its `subTypes` links.
///
/// Runs in two passes: every model is built first, then each child is
/// wrapped as `allOf: [parent $ref, own schema]`; further parents are
/// appended after the own schema. Multi-level
/// hierarchies stay nested: a child only ever references its direct
/// parents, which may themselves be `allOf` compositions.
pub(crate) fn build_definitions(
    ctx: &Context<'_>,
    models: Option<&Map<String, Value>>,
) -> Result<Map<String, Value>, ConvertError> {
    let Some(models) = models else {
        return Ok(Map::new());
    };

    let mut definitions = Map::new();
    for (id, model) in models {
        definitions.insert(id.clone(), Value::Object(build_model(ctx, id, model)?));
    }

    let edges = subtype_edges(models)?;
    check_acyclic(&edges)?;

    for (parent, child) in &edges {
        let schema =
            definitions
                .get_mut(child)
                .ok_or_else(|| ConvertError::UnknownSubType {
                    model: parent.clone(),
                    sub_type: child.clone(),
                })?;
        inherit(schema, parent);
    }

    Ok(definitions)
}

/// Collect `(parent, child)` pairs in declaration order.
fn subtype_edges(models: &Map<String, Value>) -> Result<Vec<(String, String)>, ConvertError> {
    let mut edges = Vec::new();
    for (id, model) in models {
        let path = format!("/models/{}", id);
        let model = as_object(model, &path)?;
        for sub_type in get_array(model, "subTypes", &path)? {
            let child = sub_type
                .as_str()
                .ok_or_else(|| ConvertError::InvalidStructure {
                    path: format!("{}/subTypes", path),
                    expected: "array of model ids",
                    actual: json_type_name(sub_type).to_string(),
                })?;
            if child == id {
                return Err(ConvertError::CircularInheritance { model: id.clone() });
            }
            edges.push((id.clone(), child.to_string()));
        }
    }
    Ok(edges)
}

/// Reject hierarchies where a model ends up as its own ancestor.
fn check_acyclic(edges: &[(String, String)]) -> Result<(), ConvertError> {
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for (parent, child) in edges {
        parents.entry(child.as_str()).or_default().push(parent.as_str());
    }

    for (parent, child) in edges {
        let mut visited = HashSet::new();
        let mut queue = vec![parent.as_str()];
        while let Some(current) = queue.pop() {
            if current == child.as_str() {
                return Err(ConvertError::CircularInheritance {
                    model: child.clone(),
                });
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(grandparents) = parents.get(current) {
                queue.extend(grandparents.iter().copied());
            }
        }
    }
    Ok(())
}

/// Compose `schema` with a reference to `parent`.
fn inherit(schema: &mut Value, parent: &str) {
    let parent_ref = json!({ "$ref": format!("{}{}", DEFINITIONS_PREFIX, parent) });

    if let Some(all_of) = schema.get_mut("allOf").and_then(Value::as_array_mut) {
        all_of.push(parent_ref);
        return;
    }

    let own = std::mem::take(schema);
    *schema = json!({ "allOf": [parent_ref, own] });
}
