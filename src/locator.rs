//! Locating the API declarations a resource listing refers to.
//!
//! Pure URL arithmetic: nothing is fetched here.

use std::collections::BTreeMap;

use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::error::ConvertError;
use crate::types::{as_object, get_array, get_str, replace_format};

/// Compute the absolute URL of every API declaration referenced by a
/// resource listing.
///
/// The listing's `basePath` (resolved against `source_url`) or else
/// `source_url` itself is the base. Each `apis[].path` is appended to
/// that base, not resolved against it, because legacy paths are relative
/// to the base path even when they start with `/`. Swagger 1.0 listings
/// addressed declarations next to the listing file, so a trailing
/// `*.json` file name is dropped first. A base with a query string
/// (`http://host/?spec=`) receives the encoded path in the query.
///
/// Entries with inline `operations` are skipped. The result is keyed by
/// the path exactly as written in the listing.
///
/// # Errors
///
/// Returns `ConvertError::InvalidUrl` when `basePath` cannot be resolved,
/// or `ConvertError::InvalidStructure` when `apis` is malformed.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use swagger_converter::list_api_declarations;
/// use url::Url;
///
/// let source = Url::parse("http://petstore.swagger.io/api/api-docs").unwrap();
/// let listing = json!({
///     "swaggerVersion": "1.2",
///     "apis": [{ "path": "/pet" }, { "path": "/user" }]
/// });
///
/// let urls = list_api_declarations(&source, &listing).unwrap();
/// assert_eq!(urls["/pet"].as_str(), "http://petstore.swagger.io/api/api-docs/pet");
/// ```
pub fn list_api_declarations(
    source_url: &Url,
    resource_listing: &Value,
) -> Result<BTreeMap<String, Url>, ConvertError> {
    let listing = as_object(resource_listing, "")?;

    let mut base = match get_str(listing, "basePath") {
        Some(base_path) => source_url
            .join(base_path)
            .map_err(|source| ConvertError::InvalidUrl {
                url: base_path.to_string(),
                source,
            })?,
        None => source_url.clone(),
    };

    if get_str(listing, "swaggerVersion") == Some("1.0") && has_json_file_name(&base) {
        let dir = match base.path().rfind('/') {
            Some(slash) => base.path()[..=slash].to_string(),
            None => "/".to_string(),
        };
        base.set_path(&dir);
    }

    let mut result = BTreeMap::new();
    for (i, entry) in get_array(listing, "apis", "")?.iter().enumerate() {
        let entry = as_object(entry, &format!("/apis/{}", i))?;
        if entry.get("operations").is_some_and(|v| !v.is_null()) {
            continue;
        }
        let Some(path) = get_str(entry, "path") else {
            continue;
        };
        result.insert(path.to_string(), append_path(&base, &replace_format(path)));
    }

    Ok(result)
}

fn has_json_file_name(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("json"))
}

/// Append `path` to `base`, either to its path or (for query-style bases)
/// to its query.
fn append_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();

    if let Some(query) = base.query().filter(|q| !q.is_empty()) {
        let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
        url.set_query(Some(&format!("{}{}", query, encoded)));
        return url;
    }

    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    // set_path collapses `.` and `..` segments.
    url.set_path(&joined);
    url
}
