//! Swagger 1.x to Swagger 2.0 Converter
//!
//! Turns a legacy resource listing plus the API declarations it references
//! into one Swagger 2.0 document.
//!
//! The conversion itself is pure: documents go in as JSON values and one
//! JSON value comes out. Locating and fetching the declarations are
//! separate steps, so callers can bring their own transport.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use swagger_converter::{convert, ConvertOptions};
//! use serde_json::json;
//!
//! let listing = json!({
//!     "swaggerVersion": "1.2",
//!     "apiVersion": "1.0.0",
//!     "info": { "title": "Petstore" },
//!     "apis": [{ "path": "/pet", "description": "Operations about pets" }]
//! });
//!
//! let mut declarations = HashMap::new();
//! declarations.insert("/pet".to_string(), json!({
//!     "swaggerVersion": "1.2",
//!     "basePath": "http://petstore.swagger.io/api",
//!     "resourcePath": "/pet",
//!     "apis": [{
//!         "path": "/pet/{petId}",
//!         "operations": [{
//!             "method": "GET",
//!             "nickname": "getPetById",
//!             "type": "Pet",
//!             "parameters": [{ "paramType": "path", "name": "petId", "type": "integer" }]
//!         }]
//!     }],
//!     "models": {
//!         "Pet": { "id": "Pet", "properties": { "name": { "type": "string" } } }
//!     }
//! }));
//!
//! let document = convert(&listing, &declarations, &ConvertOptions::default()).unwrap();
//!
//! assert_eq!(document["swagger"], "2.0");
//! assert_eq!(document["host"], "petstore.swagger.io");
//! assert_eq!(document["basePath"], "/api");
//! assert_eq!(
//!     document["paths"]["/pet/{petId}"]["get"]["responses"]["200"]["schema"],
//!     json!({ "$ref": "#/definitions/Pet" })
//! );
//! ```
//!
//! # Type Mapping
//!
//! | Legacy type | Swagger 2.0 |
//! |-------------|-------------|
//! | `int`, `int32` | `integer` / `int32` |
//! | `long`, `int64` | `integer` / `int64` |
//! | `float`, `double` | `number` / `float`, `double` |
//! | `date`, `date-time` | `string` / `date`, `date-time` |
//! | `byte` | `string` / `byte` |
//! | `set` | `array` with `uniqueItems` |
//! | `List[T]`, `Array[T]` | `array` of `T` |
//! | `Map[K,V]` | `object` with `additionalProperties` |
//! | `void`, `any` | `{}` |
//! | model name | `$ref` to `#/definitions/` |

mod converter;
mod datatype;
mod error;
mod literal;
mod loader;
mod locator;
mod operations;
mod security;
mod types;
mod validator;

pub use converter::convert;
pub use error::{ConvertError, LoadError, SchemaError, SourceError, ValidateError};
pub use loader::{
    convert_source, convert_source_with, is_url, load_document, load_document_auto,
    load_document_str, source_url, DefaultLoader, ResourceLoader,
};
pub use locator::list_api_declarations;
pub use types::{
    json_type_name, ConvertOptions, DEFAULT_API_VERSION, DEFAULT_TITLE, DEFINITIONS_PREFIX,
    NO_RESPONSE_DESCRIPTION, SWAGGER_VERSION,
};
pub use validator::validate_document;

#[cfg(feature = "remote")]
pub use loader::load_document_url;
