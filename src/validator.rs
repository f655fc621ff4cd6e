//! Validation of converted documents against a Swagger 2.0 meta-schema.
//!
//! The meta-schema is supplied by the caller; none is bundled.

use serde_json::Value;

use crate::error::{SchemaError, ValidateError};

/// Validate a converted document against a JSON Schema.
///
/// Every violation is reported, each with the JSON Pointer of the
/// offending value.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if `meta_schema` is not a usable
/// JSON Schema, or `ValidateError::Invalid` if the document doesn't match.
pub fn validate_document(document: &Value, meta_schema: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(meta_schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(document)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
