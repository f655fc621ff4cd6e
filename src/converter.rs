//! Top-level conversion of a Swagger 1.x resource listing plus its API
//! declarations into one Swagger 2.0 document.
//!
//! The conversion is a pure function of its inputs. Its only working state
//! (declared model names and the security name map) lives in a
//! [`Context`] for the duration of one call.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};
use url::Url;

use crate::datatype::build_definitions;
use crate::error::ConvertError;
use crate::operations::build_paths;
use crate::security::build_security_definitions;
use crate::types::{
    as_object, copy_field, get_array, get_object, get_str, json_type_name, replace_format,
    ConvertOptions, DEFAULT_API_VERSION, DEFAULT_TITLE, SWAGGER_VERSION,
};

/// Per-conversion working state shared by every translation pass.
pub(crate) struct Context<'a> {
    pub(crate) options: &'a ConvertOptions,
    /// Model ids declared by any resource.
    custom_types: HashSet<String>,
    /// Legacy authorization name -> generated security definition names.
    pub(crate) security_names: HashMap<String, Vec<String>>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        options: &'a ConvertOptions,
        custom_types: HashSet<String>,
        security_names: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            options,
            custom_types,
            security_names,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_types(options: &'a ConvertOptions, types: &[&str]) -> Self {
        Self::new(
            options,
            types.iter().map(|t| t.to_string()).collect(),
            HashMap::new(),
        )
    }

    /// Whether `name` is a model declared by one of the resources.
    pub(crate) fn is_custom_type(&self, name: &str) -> bool {
        self.custom_types.contains(name)
    }
}

/// One legacy resource: an API declaration and the tag its operations get.
struct Resource<'a> {
    declaration: &'a Map<String, Value>,
    tag: Option<String>,
}

/// Convert a resource listing and its API declarations.
///
/// `api_declarations` is keyed by the `path` under which the listing
/// references each declaration, as returned by
/// [`list_api_declarations`](crate::list_api_declarations). A listing
/// whose `apis` carry inline `operations` is converted on its own and
/// needs no declarations.
///
/// # Errors
///
/// Returns `ConvertError` when the input is structurally invalid, a
/// referenced declaration is missing, base paths conflict, or a value
/// cannot be represented in Swagger 2.0. No partial document is
/// produced.
pub fn convert(
    resource_listing: &Value,
    api_declarations: &HashMap<String, Value>,
    options: &ConvertOptions,
) -> Result<Value, ConvertError> {
    let listing = as_object(resource_listing, "")?;
    let entries = get_array(listing, "apis", "")?
        .iter()
        .enumerate()
        .map(|(i, entry)| as_object(entry, &format!("/apis/{}", i)))
        .collect::<Result<Vec<_>, _>>()?;

    let embedded = entries
        .iter()
        .filter(|entry| entry.get("operations").is_some_and(|v| !v.is_null()))
        .count();
    if embedded > 0 && embedded < entries.len() {
        return Err(ConvertError::MixedDeclarationStyle);
    }
    let is_embedded = embedded > 0;

    let resources = if is_embedded {
        vec![Resource {
            declaration: listing,
            tag: None,
        }]
    } else {
        referenced_resources(&entries, api_declarations, options)?
    };

    let mut custom_types = HashSet::new();
    for resource in &resources {
        if let Some(models) = get_object(resource.declaration, "models", "")? {
            custom_types.extend(models.keys().cloned());
        }
    }

    let security = build_security_definitions(get_object(listing, "authorizations", "")?)?;
    let ctx = Context::new(options, custom_types, security.names);

    let mut definitions = Map::new();
    let mut paths = Map::new();
    for resource in &resources {
        definitions.extend(build_definitions(
            &ctx,
            get_object(resource.declaration, "models", "")?,
        )?);
        build_paths(
            &ctx,
            resource.declaration,
            resource.tag.as_deref(),
            &mut paths,
        )?;
    }

    let root_base = get_str(listing, "basePath");
    let base_path = if is_embedded {
        root_base.map(str::to_string)
    } else {
        aggregate_base_path(root_base, &resources)?
    };

    let mut document = Map::new();
    document.insert("swagger".to_string(), json!(SWAGGER_VERSION));
    document.insert("info".to_string(), Value::Object(build_info(listing)?));
    if let Some(base_path) = base_path {
        document.extend(build_path_components(&base_path));
    }

    let tags: Vec<Value> = if is_embedded {
        Vec::new()
    } else {
        build_tags(&entries, &resources)
    };
    if !tags.is_empty() {
        document.insert("tags".to_string(), Value::Array(tags));
    }
    if !paths.is_empty() {
        document.insert("paths".to_string(), Value::Object(paths));
    }
    if !security.definitions.is_empty() {
        document.insert(
            "securityDefinitions".to_string(),
            Value::Object(security.definitions),
        );
    }
    if !definitions.is_empty() {
        document.insert("definitions".to_string(), Value::Object(definitions));
    }

    Ok(Value::Object(document))
}

/// Resolve every listing entry to its declaration and name its tag.
fn referenced_resources<'a>(
    entries: &[&Map<String, Value>],
    api_declarations: &'a HashMap<String, Value>,
    options: &ConvertOptions,
) -> Result<Vec<Resource<'a>>, ConvertError> {
    let mut declarations = Vec::with_capacity(entries.len());
    let mut listing_paths = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let path = get_str(entry, "path").ok_or_else(|| ConvertError::InvalidStructure {
            path: format!("/apis/{}/path", i),
            expected: "string",
            actual: entry
                .get("path")
                .map_or("nothing", json_type_name)
                .to_string(),
        })?;
        let declaration = api_declarations
            .get(path)
            .ok_or_else(|| ConvertError::MissingDeclaration {
                path: path.to_string(),
            })?;
        declarations.push(as_object(declaration, path)?);
        listing_paths.push(path);
    }

    let resource_paths: Vec<Option<&str>> = declarations
        .iter()
        .map(|d| get_str(d, "resourcePath"))
        .collect();
    let distinct: HashSet<&str> = resource_paths.iter().flatten().copied().collect();

    let names: Vec<&str> = if options.build_tags_from_paths || distinct.len() < declarations.len()
    {
        listing_paths
    } else {
        resource_paths.into_iter().flatten().collect()
    };
    let tags = tag_names(&names);

    Ok(declarations
        .into_iter()
        .zip(tags)
        .map(|(declaration, tag)| Resource {
            declaration,
            tag: Some(tag),
        })
        .collect())
}

/// Shorten resource names into tag names.
///
/// Strips the longest shared prefix ending at a `/`, then the `{format}`
/// placeholder, trailing slashes and a `.json` suffix:
/// `/api-docs/pet.json` and `/api-docs/user.json` become `pet` and `user`.
/// A name consumed entirely by the prefix keeps its unstripped form.
pub(crate) fn tag_names(names: &[&str]) -> Vec<String> {
    let prefix_len = common_prefix_len(names);
    names
        .iter()
        .map(|name| {
            let tag = replace_format(&name[prefix_len..]);
            let tag = tag.trim_end_matches('/');
            match tag.strip_suffix(".json").unwrap_or(tag) {
                "" => name.to_string(),
                tag => tag.to_string(),
            }
        })
        .collect()
}

/// Length of the longest common prefix of `names` that ends with `/`.
fn common_prefix_len(names: &[&str]) -> usize {
    let Some((first, rest)) = names.split_first() else {
        return 0;
    };

    let mut len = first.len();
    for name in rest {
        len = first
            .bytes()
            .zip(name.bytes())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }

    first.as_bytes()[..len]
        .iter()
        .rposition(|&b| b == b'/')
        .map_or(0, |slash| slash + 1)
}

fn build_tags(entries: &[&Map<String, Value>], resources: &[Resource<'_>]) -> Vec<Value> {
    entries
        .iter()
        .zip(resources)
        .filter_map(|(entry, resource)| {
            let name = resource.tag.as_ref()?;
            let mut tag = Map::new();
            tag.insert("name".to_string(), json!(name));
            copy_field(entry, "description", &mut tag, "description");
            Some(Value::Object(tag))
        })
        .collect()
}

fn build_info(listing: &Map<String, Value>) -> Result<Map<String, Value>, ConvertError> {
    let empty = Map::new();
    let source = get_object(listing, "info", "")?.unwrap_or(&empty);
    let mut info = Map::new();

    info.insert(
        "title".to_string(),
        json!(get_str(source, "title").unwrap_or(DEFAULT_TITLE)),
    );
    let version = match listing.get("apiVersion") {
        Some(Value::String(v)) => v.clone(),
        Some(Value::Number(v)) => v.to_string(),
        _ => DEFAULT_API_VERSION.to_string(),
    };
    info.insert("version".to_string(), json!(version));
    copy_field(source, "description", &mut info, "description");
    copy_field(source, "termsOfServiceUrl", &mut info, "termsOfService");

    if let Some(email) = source.get("contact").filter(|v| !v.is_null()) {
        info.insert("contact".to_string(), json!({ "email": email }));
    }

    let mut license = Map::new();
    copy_field(source, "license", &mut license, "name");
    copy_field(source, "licenseUrl", &mut license, "url");
    if !license.is_empty() {
        info.insert("license".to_string(), Value::Object(license));
    }

    Ok(info)
}

/// Pick the single document base path.
///
/// The first declaration with a `basePath` establishes it (relative
/// values resolve against the listing's `basePath`); every later one must
/// agree. The listing's own `basePath` is only used when no declaration
/// has one.
fn aggregate_base_path(
    root: Option<&str>,
    resources: &[Resource<'_>],
) -> Result<Option<String>, ConvertError> {
    let root_url = root.and_then(|r| Url::parse(r).ok());
    let mut established: Option<String> = None;

    for resource in resources {
        let Some(base) = get_str(resource.declaration, "basePath") else {
            continue;
        };
        let resolved = match (Url::parse(base), &root_url) {
            (Ok(url), _) => url.to_string(),
            (Err(_), Some(root_url)) => root_url
                .join(base)
                .map_err(|source| ConvertError::InvalidUrl {
                    url: base.to_string(),
                    source,
                })?
                .to_string(),
            (Err(_), None) => base.to_string(),
        };

        if let Some(current) = &established {
            if !same_base(current, &resolved) {
                return Err(ConvertError::ConflictingBasePath {
                    established: current.clone(),
                    conflicting: resolved,
                });
            }
        } else {
            established = Some(resolved);
        }
    }

    Ok(established.or_else(|| root.map(str::to_string)))
}

fn same_base(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// Split a base URL into `host`, `basePath` and `schemes`.
pub(crate) fn build_path_components(base: &str) -> Map<String, Value> {
    let mut components = Map::new();

    // Protocol-relative URLs carry a host but no scheme.
    let (parsed, has_scheme) = match Url::parse(base) {
        Ok(url) => (Some(url), true),
        Err(_) if base.starts_with("//") => (Url::parse(&format!("http:{}", base)).ok(), false),
        Err(_) => (None, false),
    };

    let Some(url) = parsed.filter(|url| url.has_host()) else {
        let path = if base.is_empty() { "/" } else { base };
        components.insert("basePath".to_string(), json!(path));
        return components;
    };

    if let Some(host) = url.host_str() {
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        components.insert("host".to_string(), json!(host));
    }
    let path = if url.path().is_empty() { "/" } else { url.path() };
    components.insert("basePath".to_string(), json!(path));
    if has_scheme {
        components.insert("schemes".to_string(), json!([url.scheme()]));
    }

    components
}
