//! Security definitions and requirements.
//!
//! Swagger 2.0 allows a single OAuth2 flow per security definition, so a
//! legacy authorization that offers both the implicit and the
//! authorization-code grant becomes two definitions. The mapping from
//! legacy name to generated names is kept so that requirements naming the
//! legacy authorization can be expanded afterwards.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::error::ConvertError;
use crate::types::{as_object, copy_field, get_array, get_object, get_str, json_type_name};

/// Legacy grant type keys and the flow each becomes, in output order.
const GRANT_FLOWS: &[(&str, &str)] = &[
    ("implicit", "implicit"),
    ("authorization_code", "accessCode"),
];

/// Translated `securityDefinitions` plus the legacy-name mapping.
#[derive(Debug, Default)]
pub(crate) struct SecurityDefinitions {
    pub(crate) definitions: Map<String, Value>,
    /// Legacy authorization name -> generated definition names.
    pub(crate) names: HashMap<String, Vec<String>>,
}

/// Translate the resource listing's `authorizations` map.
pub(crate) fn build_security_definitions(
    authorizations: Option<&Map<String, Value>>,
) -> Result<SecurityDefinitions, ConvertError> {
    let mut result = SecurityDefinitions::default();
    let Some(authorizations) = authorizations else {
        return Ok(result);
    };

    for (name, auth) in authorizations {
        let path = format!("/authorizations/{}", name);
        let auth = as_object(auth, &path)?;

        let generated = match get_object(auth, "grantTypes", &path)? {
            Some(grant_types) => {
                build_oauth2_definitions(name, auth, grant_types, &path, &mut result.definitions)?
            }
            None => {
                result
                    .definitions
                    .insert(name.clone(), Value::Object(build_definition(auth, &path)?));
                vec![name.clone()]
            }
        };
        result.names.insert(name.clone(), generated);
    }

    Ok(result)
}

/// `apiKey`, `basicAuth` and grant-less `oauth2` authorizations.
fn build_definition(auth: &Map<String, Value>, path: &str) -> Result<Map<String, Value>, ConvertError> {
    let mut definition = Map::new();
    if let Some(ty) = get_str(auth, "type") {
        let ty = if ty == "basicAuth" { "basic" } else { ty };
        definition.insert("type".to_string(), json!(ty));
    }
    copy_field(auth, "description", &mut definition, "description");
    copy_field(auth, "passAs", &mut definition, "in");
    copy_field(auth, "keyname", &mut definition, "name");

    let scopes = build_scopes(auth, path)?;
    if !scopes.is_empty() {
        definition.insert("scopes".to_string(), Value::Object(scopes));
    }
    Ok(definition)
}

/// One definition per grant type; returns the generated names.
fn build_oauth2_definitions(
    name: &str,
    auth: &Map<String, Value>,
    grant_types: &Map<String, Value>,
    path: &str,
    definitions: &mut Map<String, Value>,
) -> Result<Vec<String>, ConvertError> {
    let grants: Vec<(&str, &Map<String, Value>)> = GRANT_FLOWS
        .iter()
        .filter_map(|(grant, flow)| grant_types.get(*grant).map(|g| (*grant, *flow, g)))
        .map(|(grant, flow, g)| {
            as_object(g, &format!("{}/grantTypes/{}", path, grant)).map(|g| (flow, g))
        })
        .collect::<Result<_, _>>()?;

    let scopes = build_scopes(auth, path)?;
    let mut generated = Vec::with_capacity(grants.len());

    for (flow, grant) in &grants {
        let definition_name = if grants.len() > 1 {
            format!("{}_{}", name, flow)
        } else {
            name.to_string()
        };

        let mut definition = Map::new();
        definition.insert("type".to_string(), json!("oauth2"));
        copy_field(auth, "description", &mut definition, "description");
        definition.insert("flow".to_string(), json!(flow));
        match *flow {
            "implicit" => {
                if let Some(url) = endpoint_url(grant, "loginEndpoint") {
                    definition.insert("authorizationUrl".to_string(), json!(url));
                }
            }
            _ => {
                if let Some(url) = endpoint_url(grant, "tokenRequestEndpoint") {
                    definition.insert("authorizationUrl".to_string(), json!(url));
                }
                if let Some(url) = endpoint_url(grant, "tokenEndpoint") {
                    definition.insert("tokenUrl".to_string(), json!(url));
                }
            }
        }
        definition.insert("scopes".to_string(), Value::Object(scopes.clone()));

        definitions.insert(definition_name.clone(), Value::Object(definition));
        generated.push(definition_name);
    }

    Ok(generated)
}

fn endpoint_url<'a>(grant: &'a Map<String, Value>, endpoint: &str) -> Option<&'a str> {
    grant
        .get(endpoint)
        .and_then(Value::as_object)
        .and_then(|e| get_str(e, "url"))
}

/// `[{scope, description}]` -> `{scope: description}`.
fn build_scopes(auth: &Map<String, Value>, path: &str) -> Result<Map<String, Value>, ConvertError> {
    let mut scopes = Map::new();
    for scope in get_array(auth, "scopes", path)? {
        let scope = as_object(scope, &format!("{}/scopes", path))?;
        let Some(name) = get_str(scope, "scope") else {
            continue;
        };
        let description = get_str(scope, "description")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Undescribed {}", name));
        scopes.insert(name.to_string(), json!(description));
    }
    Ok(scopes)
}

/// Expand an `authorizations` requirement map into Swagger 2.0 `security`.
///
/// Each legacy name yields one requirement per generated definition.
/// Names without a mapping pass through unchanged.
pub(crate) fn build_security(
    names: &HashMap<String, Vec<String>>,
    authorizations: Option<&Value>,
    path: &str,
) -> Result<Vec<Value>, ConvertError> {
    let authorizations = match authorizations {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => as_object(value, path)?,
    };

    let mut security = Vec::new();
    for (name, scopes) in authorizations {
        let scopes = requirement_scopes(scopes, &format!("{}/{}", path, name))?;
        let fallback = [name.clone()];
        let targets = names.get(name).map_or(&fallback[..], Vec::as_slice);
        for target in targets {
            let mut requirement = Map::new();
            requirement.insert(target.clone(), json!(scopes));
            security.push(Value::Object(requirement));
        }
    }
    Ok(security)
}

/// Scope names from `[{scope, description}]` or `["scope"]`.
fn requirement_scopes(scopes: &Value, path: &str) -> Result<Vec<String>, ConvertError> {
    let items = match scopes {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ConvertError::InvalidStructure {
                path: path.to_string(),
                expected: "array",
                actual: json_type_name(other).to_string(),
            })
        }
    };

    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => get_str(obj, "scope").map(str::to_string),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions(authorizations: Value) -> SecurityDefinitions {
        build_security_definitions(authorizations.as_object()).unwrap()
    }

    #[test]
    fn api_key_definition() {
        let result = definitions(json!({
            "api_key": { "type": "apiKey", "passAs": "header", "keyname": "api_key" }
        }));
        assert_eq!(
            Value::Object(result.definitions),
            json!({ "api_key": { "type": "apiKey", "in": "header", "name": "api_key" } })
        );
        assert_eq!(result.names["api_key"], vec!["api_key".to_string()]);
    }

    #[test]
    fn basic_auth_is_renamed() {
        let result = definitions(json!({ "basic": { "type": "basicAuth" } }));
        assert_eq!(result.definitions["basic"], json!({ "type": "basic" }));
    }

    #[test]
    fn single_grant_keeps_original_name() {
        let result = definitions(json!({
            "oauth2": {
                "type": "oauth2",
                "scopes": [
                    { "scope": "write:pets", "description": "Modify pets" },
                    { "scope": "read:pets" }
                ],
                "grantTypes": {
                    "implicit": {
                        "loginEndpoint": { "url": "http://petstore.swagger.io/oauth/dialog" },
                        "tokenName": "access_token"
                    }
                }
            }
        }));
        assert_eq!(
            result.definitions["oauth2"],
            json!({
                "type": "oauth2",
                "flow": "implicit",
                "authorizationUrl": "http://petstore.swagger.io/oauth/dialog",
                "scopes": {
                    "write:pets": "Modify pets",
                    "read:pets": "Undescribed read:pets"
                }
            })
        );
        assert_eq!(result.names["oauth2"], vec!["oauth2".to_string()]);
    }

    #[test]
    fn multiple_grants_split_into_flows() {
        let result = definitions(json!({
            "oauth2": {
                "type": "oauth2",
                "grantTypes": {
                    "implicit": {
                        "loginEndpoint": { "url": "http://example.com/login" }
                    },
                    "authorization_code": {
                        "tokenRequestEndpoint": { "url": "http://example.com/authorize" },
                        "tokenEndpoint": { "url": "http://example.com/token" }
                    }
                }
            }
        }));
        assert_eq!(
            result.names["oauth2"],
            vec!["oauth2_implicit".to_string(), "oauth2_accessCode".to_string()]
        );
        assert_eq!(
            result.definitions["oauth2_accessCode"],
            json!({
                "type": "oauth2",
                "flow": "accessCode",
                "authorizationUrl": "http://example.com/authorize",
                "tokenUrl": "http://example.com/token",
                "scopes": {}
            })
        );
        assert_eq!(result.definitions["oauth2_implicit"]["flow"], json!("implicit"));
    }

    #[test]
    fn requirements_expand_through_name_map() {
        let mut names = HashMap::new();
        names.insert(
            "oauth2".to_string(),
            vec!["oauth2_implicit".to_string(), "oauth2_accessCode".to_string()],
        );
        let auth = json!({ "oauth2": [{ "scope": "write:pets", "description": "Modify" }] });

        let security = build_security(&names, Some(&auth), "/op").unwrap();
        assert_eq!(
            security,
            vec![
                json!({ "oauth2_implicit": ["write:pets"] }),
                json!({ "oauth2_accessCode": ["write:pets"] })
            ]
        );
    }

    #[test]
    fn unmapped_requirement_passes_through() {
        let auth = json!({ "api_key": [] });
        let security = build_security(&HashMap::new(), Some(&auth), "/op").unwrap();
        assert_eq!(security, vec![json!({ "api_key": [] })]);
    }

    #[test]
    fn requirement_scopes_must_be_a_list() {
        let auth = json!({ "api_key": "all" });
        let result = build_security(&HashMap::new(), Some(&auth), "/op");
        assert!(matches!(result, Err(ConvertError::InvalidStructure { .. })));
    }
}
