//! Error types for Swagger 1.x to 2.0 conversion, loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while converting legacy documents.
///
/// Every variant aborts the conversion; no partial document is returned.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid document structure at {path}: expected {expected}, got {actual}")]
    InvalidStructure {
        path: String,
        expected: &'static str,
        actual: String,
    },

    #[error("API declaration for path \"{path}\" was not supplied")]
    MissingDeclaration { path: String },

    #[error("model '{model}' lists unknown subType '{sub_type}'")]
    UnknownSubType { model: String, sub_type: String },

    #[error("model '{model}' inherits from itself")]
    CircularInheritance { model: String },

    #[error("conflicting base paths: '{established}' and '{conflicting}'")]
    ConflictingBasePath {
        established: String,
        conflicting: String,
    },

    #[error("resource listing mixes embedded operations with API declaration references")]
    MixedDeclarationStyle,

    #[error("parameter '{name}' has complex type '{type_name}' outside of a body parameter")]
    ComplexParameterType { name: String, type_name: String },

    #[error("operation on \"{path}\" has no method or httpMethod")]
    MissingMethod { path: String },

    #[error("malformed literal in '{field}': {value}")]
    MalformedLiteral { field: String, value: String },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while fetching and parsing legacy documents.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON in {source_name}: {source}")]
    InvalidJson {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot load '{url}': {message}")]
    UnsupportedUrl { url: String, message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors from the end-to-end "load then convert" entry points.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl SourceError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SourceError::Load(e) => e.exit_code(),
            SourceError::Convert(e) => e.exit_code(),
        }
    }
}

/// Errors during validation of a converted document.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid meta-schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
