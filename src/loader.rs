//! Document loading from files, strings and HTTP URLs.
//!
//! Also drives the end-to-end conversion of a listing given by location:
//! load the listing, locate its declarations, load those, convert.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};
use serde_json::Value;
use url::Url;

use crate::converter::convert;
use crate::error::{LoadError, SourceError};
use crate::locator::list_api_declarations;
use crate::types::ConvertOptions;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson {
        source_name: path.display().to_string(),
        source,
    })
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson {
        source_name: "<string>".to_string(),
        source,
    })
}

/// Load a JSON document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the response
/// isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| LoadError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let response = client
        .get(url)
        .send()
        .map_err(|source| LoadError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    // Check for HTTP errors before parsing
    let response = response
        .error_for_status()
        .map_err(|source| LoadError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    response.json().map_err(|source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    })
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a JSON document from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::UnsupportedUrl {
                url: source.to_string(),
                message: "built without the `remote` feature".to_string(),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// The absolute URL of a source given as an HTTP URL or a file path.
///
/// Relative paths are taken from the current directory and become
/// `file:` URLs, so declarations can be located next to the listing.
///
/// # Errors
///
/// Returns `LoadError::UnsupportedUrl` if the source cannot be expressed
/// as a URL.
pub fn source_url(source: &str) -> Result<Url, LoadError> {
    if is_url(source) {
        return Url::parse(source).map_err(|e| LoadError::UnsupportedUrl {
            url: source.to_string(),
            message: e.to_string(),
        });
    }

    let path = Path::new(source);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| LoadError::ReadError {
                path: path.to_path_buf(),
                source,
            })?
            .join(path)
    };

    Url::from_file_path(&absolute).map_err(|()| LoadError::UnsupportedUrl {
        url: source.to_string(),
        message: "not an absolute file path".to_string(),
    })
}

/// Fetches a legacy document by URL.
///
/// The seam between locating declarations and reading them; tests and
/// embedders can serve documents from memory.
pub trait ResourceLoader {
    fn load(&self, url: &Url) -> Result<Value, LoadError>;
}

/// Reads `file:` URLs from disk and `http(s):` URLs over the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLoader;

impl ResourceLoader for DefaultLoader {
    fn load(&self, url: &Url) -> Result<Value, LoadError> {
        match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|()| LoadError::UnsupportedUrl {
                    url: url.to_string(),
                    message: "not a local file path".to_string(),
                })?;
                load_document(&path)
            }
            "http" | "https" => load_document_auto(url.as_str()),
            scheme => Err(LoadError::UnsupportedUrl {
                url: url.to_string(),
                message: format!("unsupported scheme '{}'", scheme),
            }),
        }
    }
}

/// Load a resource listing and everything it references, then convert.
///
/// # Errors
///
/// Returns `SourceError::Load` if any document cannot be read and
/// `SourceError::Convert` if the documents cannot be converted.
pub fn convert_source(source: &str, options: &ConvertOptions) -> Result<Value, SourceError> {
    convert_source_with(&DefaultLoader, source, options)
}

/// Like [`convert_source`], reading documents through `loader`.
///
/// # Errors
///
/// See [`convert_source`].
pub fn convert_source_with<L: ResourceLoader + ?Sized>(
    loader: &L,
    source: &str,
    options: &ConvertOptions,
) -> Result<Value, SourceError> {
    let base = source_url(source)?;
    debug!("loading resource listing from {}", base);
    let listing = loader.load(&base)?;

    let locations = list_api_declarations(&base, &listing)?;
    let mut declarations = HashMap::with_capacity(locations.len());
    for (path, url) in locations {
        debug!("loading API declaration {} from {}", path, url);
        let declaration = loader.load(&url)?;
        declarations.insert(path, declaration);
    }
    info!(
        "loaded {} API declaration(s) for {}",
        declarations.len(),
        base
    );

    Ok(convert(&listing, &declarations, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn load_document_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"swaggerVersion": "1.2"}}"#).unwrap();

        let document = load_document(file.path()).unwrap();
        assert_eq!(document["swaggerVersion"], "1.2");
    }

    #[test]
    fn load_document_file_not_found() {
        let result = load_document(Path::new("/nonexistent/api-docs.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_document_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_document(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_document_str_valid() {
        let document = load_document_str(r#"{"apis": []}"#).unwrap();
        assert_eq!(document["apis"], json!([]));
    }

    #[test]
    fn load_document_str_invalid() {
        let result = load_document_str("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn is_url_detection() {
        assert!(is_url("https://example.com/api-docs"));
        assert!(is_url("http://example.com/api-docs"));
        assert!(!is_url("/path/to/api-docs.json"));
        assert!(!is_url("./api-docs.json"));
        assert!(!is_url("api-docs.json"));
    }

    #[test]
    fn source_url_for_relative_path_is_absolute_file_url() {
        let url = source_url("api-docs.json").unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/api-docs.json"));
    }

    #[test]
    fn source_url_keeps_http_urls() {
        let url = source_url("http://petstore.swagger.io/api/api-docs").unwrap();
        assert_eq!(url.as_str(), "http://petstore.swagger.io/api/api-docs");
    }

    #[test]
    fn default_loader_rejects_other_schemes() {
        let url = Url::parse("ftp://example.com/api-docs").unwrap();
        let result = DefaultLoader.load(&url);
        assert!(matches!(result, Err(LoadError::UnsupportedUrl { .. })));
    }

    fn write_file(dir: &TempDir, name: &str, content: &Value) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string(content).unwrap()).unwrap();
        path
    }

    #[test]
    fn convert_source_reads_declarations_next_to_listing() {
        let dir = TempDir::new().unwrap();
        let listing = write_file(
            &dir,
            "resources.json",
            &json!({
                "swaggerVersion": "1.0",
                "apiVersion": "0.2",
                "apis": [{ "path": "/pet.{format}", "description": "Operations about pets" }]
            }),
        );
        write_file(
            &dir,
            "pet.json",
            &json!({
                "swaggerVersion": "1.0",
                "basePath": "http://petstore.swagger.io/api",
                "resourcePath": "/pet",
                "apis": [{
                    "path": "/pet.{format}/{petId}",
                    "operations": [{
                        "httpMethod": "GET",
                        "nickname": "getPetById",
                        "responseClass": "Pet",
                        "parameters": [{
                            "paramType": "path",
                            "name": "petId",
                            "dataType": "string"
                        }]
                    }]
                }],
                "models": {
                    "Pet": { "id": "Pet", "properties": { "id": { "type": "long" } } }
                }
            }),
        );

        let document =
            convert_source(listing.to_str().unwrap(), &ConvertOptions::default()).unwrap();

        assert_eq!(document["swagger"], "2.0");
        assert_eq!(document["info"]["version"], "0.2");
        assert_eq!(document["host"], "petstore.swagger.io");
        assert_eq!(document["basePath"], "/api");
        assert_eq!(
            document["tags"],
            json!([{ "name": "pet", "description": "Operations about pets" }])
        );
        let operation = &document["paths"]["/pet.json/{petId}"]["get"];
        assert_eq!(operation["operationId"], "getPetById");
        assert_eq!(operation["parameters"][0]["required"], true);
        assert_eq!(
            operation["responses"]["200"]["schema"],
            json!({ "$ref": "#/definitions/Pet" })
        );
        assert_eq!(
            document["definitions"]["Pet"]["properties"]["id"],
            json!({ "type": "integer", "format": "int64" })
        );
    }

    #[test]
    fn convert_source_reports_missing_declaration_file() {
        let dir = TempDir::new().unwrap();
        let listing = write_file(
            &dir,
            "api-docs.json",
            &json!({ "swaggerVersion": "1.2", "apis": [{ "path": "/missing" }] }),
        );

        let result = convert_source(listing.to_str().unwrap(), &ConvertOptions::default());
        assert!(matches!(
            result,
            Err(SourceError::Load(LoadError::FileNotFound { .. }))
        ));
    }

    /// Serves documents from memory and records what was asked for.
    struct MemoryLoader {
        documents: HashMap<String, Value>,
        requested: RefCell<Vec<String>>,
    }

    impl ResourceLoader for MemoryLoader {
        fn load(&self, url: &Url) -> Result<Value, LoadError> {
            self.requested.borrow_mut().push(url.to_string());
            self.documents
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| LoadError::UnsupportedUrl {
                    url: url.to_string(),
                    message: "not served".to_string(),
                })
        }
    }

    #[test]
    fn convert_source_with_custom_loader() {
        let mut documents = HashMap::new();
        documents.insert(
            "http://example.com/api-docs".to_string(),
            json!({ "swaggerVersion": "1.2", "apis": [{ "path": "/store" }] }),
        );
        documents.insert(
            "http://example.com/api-docs/store".to_string(),
            json!({
                "swaggerVersion": "1.2",
                "resourcePath": "/store",
                "apis": [{
                    "path": "/store/inventory",
                    "operations": [{ "method": "GET", "nickname": "getInventory" }]
                }]
            }),
        );
        let loader = MemoryLoader {
            documents,
            requested: RefCell::new(Vec::new()),
        };

        let document = convert_source_with(
            &loader,
            "http://example.com/api-docs",
            &ConvertOptions::default(),
        )
        .unwrap();

        assert_eq!(
            document["paths"]["/store/inventory"]["get"]["operationId"],
            "getInventory"
        );
        assert_eq!(
            *loader.requested.borrow(),
            vec![
                "http://example.com/api-docs".to_string(),
                "http://example.com/api-docs/store".to_string()
            ]
        );
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_document_url_valid() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/api-docs")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"swaggerVersion": "1.2", "apis": []}"#)
                .create();

            let document = load_document_url(&format!("{}/api-docs", server.url())).unwrap();
            assert_eq!(document["swaggerVersion"], "1.2");
            mock.assert();
        }

        #[test]
        fn load_document_url_404() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/api-docs").with_status(404).create();

            let result = load_document_url(&format!("{}/api-docs", server.url()));
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }

        #[test]
        fn convert_source_over_http() {
            let mut server = mockito::Server::new();
            let _listing = server
                .mock("GET", "/api-docs")
                .with_header("content-type", "application/json")
                .with_body(r#"{"swaggerVersion": "1.2", "apis": [{"path": "/user"}]}"#)
                .create();
            let _user = server
                .mock("GET", "/api-docs/user")
                .with_header("content-type", "application/json")
                .with_body(
                    r#"{
                        "swaggerVersion": "1.2",
                        "resourcePath": "/user",
                        "apis": [{
                            "path": "/user/login",
                            "operations": [{"method": "GET", "nickname": "loginUser"}]
                        }]
                    }"#,
                )
                .create();

            let document = convert_source(
                &format!("{}/api-docs", server.url()),
                &ConvertOptions::default(),
            )
            .unwrap();
            assert_eq!(
                document["paths"]["/user/login"]["get"]["operationId"],
                "loginUser"
            );
            assert_eq!(document["tags"], json!([{ "name": "user" }]));
        }
    }
}
