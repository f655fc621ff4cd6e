//! Paths, operations, parameters and responses.

use serde_json::{json, Map, Value};

use crate::converter::Context;
use crate::datatype::{apply_default, build_data_type, build_descriptor, build_type, Refs};
use crate::error::ConvertError;
use crate::literal::coerce_bool;
use crate::security::build_security;
use crate::types::{
    as_object, copy_field, get_array, get_str, json_type_name, replace_format,
    NO_RESPONSE_DESCRIPTION,
};

/// Types a non-body parameter (or its items) may have.
const PARAMETER_TYPES: &[&str] = &["string", "number", "integer", "boolean", "array", "file"];

/// Normalize a legacy path: leading `/`, `{format}` replaced with `json`.
pub(crate) fn normalize_path(path: &str) -> String {
    let path = replace_format(path);
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

/// Translate one declaration's `apis` into `paths`.
///
/// Operations on the same normalized path accumulate into one path item;
/// a method already present is overwritten.
pub(crate) fn build_paths(
    ctx: &Context<'_>,
    declaration: &Map<String, Value>,
    tag: Option<&str>,
    paths: &mut Map<String, Value>,
) -> Result<(), ConvertError> {
    for (index, api) in get_array(declaration, "apis", "")?.iter().enumerate() {
        let api_path = format!("/apis/{}", index);
        let api = as_object(api, &api_path)?;
        let Some(path) = get_str(api, "path") else {
            return Err(ConvertError::InvalidStructure {
                path: format!("{}/path", api_path),
                expected: "string",
                actual: api
                    .get("path")
                    .map_or("nothing", json_type_name)
                    .to_string(),
            });
        };
        let path = normalize_path(path);

        for operation in get_array(api, "operations", &api_path)? {
            let operation = as_object(operation, &format!("{}/operations", api_path))?;
            let method = get_str(operation, "method")
                .or_else(|| get_str(operation, "httpMethod"))
                .ok_or_else(|| ConvertError::MissingMethod { path: path.clone() })?
                .to_ascii_lowercase();

            let built = build_operation(ctx, operation, declaration, tag, &path)?;

            let item = paths
                .entry(path.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(item) = item {
                item.insert(method, Value::Object(built));
            }
        }
    }
    Ok(())
}

fn build_operation(
    ctx: &Context<'_>,
    operation: &Map<String, Value>,
    declaration: &Map<String, Value>,
    tag: Option<&str>,
    path: &str,
) -> Result<Map<String, Value>, ConvertError> {
    let op_path = format!("/paths{}", path);
    let mut result = Map::new();

    let mut tags: Vec<String> = tag.map(str::to_string).into_iter().collect();
    for extra in get_array(operation, "tags", &op_path)? {
        if let Some(extra) = extra.as_str() {
            if !tags.iter().any(|t| t == extra) {
                tags.push(extra.to_string());
            }
        }
    }
    if !tags.is_empty() {
        result.insert("tags".to_string(), json!(tags));
    }

    copy_field(operation, "summary", &mut result, "summary");
    if get_str(operation, "description").is_some() {
        copy_field(operation, "description", &mut result, "description");
    } else {
        copy_field(operation, "notes", &mut result, "description");
    }
    copy_field(operation, "nickname", &mut result, "operationId");

    for key in ["produces", "consumes"] {
        let source = if operation.get(key).is_some_and(|v| !v.is_null()) {
            operation
        } else {
            declaration
        };
        if let Some(types) = source.get(key).filter(|v| !v.is_null()) {
            if !types.is_array() {
                return Err(ConvertError::InvalidStructure {
                    path: format!("{}/{}", op_path, key),
                    expected: "array",
                    actual: json_type_name(types).to_string(),
                });
            }
            result.insert(key.to_string(), types.clone());
        }
    }

    let mut parameters = Vec::new();
    for parameter in get_array(operation, "parameters", &op_path)? {
        parameters.push(Value::Object(build_parameter(ctx, parameter, &op_path)?));
    }
    if !parameters.is_empty() {
        result.insert("parameters".to_string(), Value::Array(parameters));
    }

    result.insert(
        "responses".to_string(),
        Value::Object(build_responses(ctx, operation, &op_path)?),
    );

    if let Some(deprecated) = coerce_bool(operation.get("deprecated"), "deprecated")? {
        result.insert("deprecated".to_string(), json!(deprecated));
    }

    let security = build_security(
        &ctx.security_names,
        operation.get("authorizations"),
        &format!("{}/authorizations", op_path),
    )?;
    if !security.is_empty() {
        result.insert("security".to_string(), Value::Array(security));
    }

    Ok(result)
}

/// Translate one legacy parameter.
pub(crate) fn build_parameter(
    ctx: &Context<'_>,
    parameter: &Value,
    op_path: &str,
) -> Result<Map<String, Value>, ConvertError> {
    let path = format!("{}/parameters", op_path);
    let source = as_object(parameter, &path)?;
    let mut result = Map::new();

    let location = get_str(source, "paramType").map(|p| if p == "form" { "formData" } else { p });
    if let Some(location) = location {
        result.insert("in".to_string(), json!(location));
    }
    copy_field(source, "name", &mut result, "name");
    copy_field(source, "description", &mut result, "description");
    if let Some(required) = coerce_bool(source.get("required"), "required")? {
        result.insert("required".to_string(), json!(required));
    }

    if location == Some("body") {
        result
            .entry("name".to_string())
            .or_insert_with(|| json!("body"));
        let schema = build_data_type(ctx, parameter, &path, Refs::Resolve)?;
        result.insert("schema".to_string(), Value::Object(schema));
        return Ok(result);
    }

    let name = get_str(source, "name").unwrap_or("");
    let mut schema = build_data_type(ctx, parameter, &path, Refs::Verbatim)?;
    ensure_primitive(name, &mut schema)?;
    // The type may only now be known to be `string`.
    apply_default(&mut schema, source)?;

    if coerce_bool(source.get("allowMultiple"), "allowMultiple")? == Some(true)
        && schema_type(&schema) != Some("array")
    {
        let items = std::mem::take(&mut schema);
        schema.insert("type".to_string(), json!("array"));
        schema.insert("items".to_string(), Value::Object(items));
    }

    if let Some(format) = &ctx.options.collection_format {
        let multi_forbidden = format == "multi" && matches!(location, Some("path" | "formData"));
        if schema_type(&schema) == Some("array") && !multi_forbidden {
            schema.insert("collectionFormat".to_string(), json!(format));
        }
    }

    result.extend(schema);

    if location == Some("path") {
        result.insert("required".to_string(), json!(true));
    }

    Ok(result)
}

fn schema_type(schema: &Map<String, Value>) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

/// Default missing types to `string` and reject anything a non-body
/// parameter cannot express.
fn ensure_primitive(name: &str, schema: &mut Map<String, Value>) -> Result<(), ConvertError> {
    reject_complex(name, schema)?;
    if !schema.contains_key("type") {
        schema.insert("type".to_string(), json!("string"));
    }

    if schema_type(schema) == Some("array") {
        let items = schema
            .entry("items".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(items) = items {
            reject_complex(name, items)?;
            if !items.contains_key("type") {
                items.insert("type".to_string(), json!("string"));
            }
            check_type(name, items)?;
        }
    }
    check_type(name, schema)
}

fn reject_complex(name: &str, schema: &Map<String, Value>) -> Result<(), ConvertError> {
    match schema.get("$ref").and_then(Value::as_str) {
        Some(reference) => Err(ConvertError::ComplexParameterType {
            name: name.to_string(),
            type_name: reference.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_type(name: &str, schema: &Map<String, Value>) -> Result<(), ConvertError> {
    match schema_type(schema) {
        Some(ty) if !PARAMETER_TYPES.contains(&ty) => Err(ConvertError::ComplexParameterType {
            name: name.to_string(),
            type_name: ty.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Build `responses`, always including `200`.
fn build_responses(
    ctx: &Context<'_>,
    operation: &Map<String, Value>,
    op_path: &str,
) -> Result<Map<String, Value>, ConvertError> {
    let path = format!("{}/responseMessages", op_path);
    let mut responses = Map::new();
    responses.insert(
        "200".to_string(),
        json!({ "description": NO_RESPONSE_DESCRIPTION }),
    );

    for message in get_array(operation, "responseMessages", op_path)? {
        let message = as_object(message, &path)?;
        let code = match message.get("code") {
            Some(Value::String(code)) => code.clone(),
            Some(Value::Number(code)) => code.to_string(),
            other => {
                return Err(ConvertError::InvalidStructure {
                    path: format!("{}/code", path),
                    expected: "status code",
                    actual: other.map_or("nothing", json_type_name).to_string(),
                })
            }
        };

        let description = get_str(message, "message")
            .filter(|m| !m.is_empty())
            .unwrap_or(NO_RESPONSE_DESCRIPTION);
        let mut response = Map::new();
        response.insert("description".to_string(), json!(description));
        if let Some(model) = get_str(message, "responseModel").filter(|m| !m.is_empty()) {
            let schema = build_type(ctx, model, Refs::Resolve)?;
            if !schema.is_empty() {
                response.insert("schema".to_string(), Value::Object(schema));
            }
        }
        responses.insert(code, Value::Object(response));
    }

    // The operation doubles as the descriptor of its 200 response.
    let schema = build_descriptor(ctx, operation, op_path, Refs::Resolve)?;
    if !schema.is_empty() {
        if let Some(Value::Object(ok)) = responses.get_mut("200") {
            ok.insert("schema".to_string(), Value::Object(schema));
        }
    }

    Ok(responses)
}
