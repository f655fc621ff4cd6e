//! Coercion of string-encoded literals.
//!
//! Legacy documents frequently carry booleans and numbers as strings
//! (`"required": "true"`, `"minimum": "0"`, `"defaultValue": "10"`).
//! Every coercion site picks a [`Fallback`] policy: most fields reject a
//! bad literal, defaults quietly drop it.

use serde_json::Value;

use crate::error::ConvertError;
use crate::types::json_type_name;

/// What to do with a string that is neither a boolean nor a JSON literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Fail the conversion with `ConvertError::MalformedLiteral`.
    Strict,
    /// Treat the field as absent.
    Absent,
}

/// Coerce a possibly string-encoded literal.
///
/// - `None`, `null` and `""` are absent
/// - `"true"`/`"false"` (any case) become booleans
/// - other strings are parsed as JSON literals (`"42"` -> `42`, `"\"a\""` -> `"a"`)
/// - non-string values pass through unchanged
pub fn coerce_literal(
    value: Option<&Value>,
    field: &str,
    fallback: Fallback,
) -> Result<Option<Value>, ConvertError> {
    let s = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(other) => return Ok(Some(other.clone())),
    };

    if s.is_empty() {
        return Ok(None);
    }
    if s.eq_ignore_ascii_case("true") {
        return Ok(Some(Value::Bool(true)));
    }
    if s.eq_ignore_ascii_case("false") {
        return Ok(Some(Value::Bool(false)));
    }

    match serde_json::from_str::<Value>(s) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => match fallback {
            Fallback::Strict => Err(ConvertError::MalformedLiteral {
                field: field.to_string(),
                value: s.clone(),
            }),
            Fallback::Absent => Ok(None),
        },
    }
}

/// Coerce a boolean flag such as `required` or `allowMultiple`.
pub fn coerce_bool(value: Option<&Value>, field: &str) -> Result<Option<bool>, ConvertError> {
    match coerce_literal(value, field, Fallback::Strict)? {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().map_or(false, |n| n != 0.0))),
        Some(other) => Err(ConvertError::MalformedLiteral {
            field: field.to_string(),
            value: format!("expected boolean, got {}", json_type_name(&other)),
        }),
    }
}

/// Coerce a numeric bound such as `minimum` or `maximum`.
pub fn coerce_number(value: Option<&Value>, field: &str) -> Result<Option<Value>, ConvertError> {
    match coerce_literal(value, field, Fallback::Strict)? {
        None => Ok(None),
        Some(n @ Value::Number(_)) => Ok(Some(n)),
        Some(other) => Err(ConvertError::MalformedLiteral {
            field: field.to_string(),
            value: format!("expected number, got {}", json_type_name(&other)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booleans_any_case() {
        let v = json!("TRUE");
        assert_eq!(
            coerce_literal(Some(&v), "required", Fallback::Strict).unwrap(),
            Some(json!(true))
        );
        let v = json!("False");
        assert_eq!(coerce_bool(Some(&v), "required").unwrap(), Some(false));
    }

    #[test]
    fn numeric_strings_parse() {
        let v = json!("0");
        assert_eq!(
            coerce_literal(Some(&v), "default", Fallback::Strict).unwrap(),
            Some(json!(0))
        );
        let v = json!("-1.5");
        assert_eq!(coerce_number(Some(&v), "minimum").unwrap(), Some(json!(-1.5)));
    }

    #[test]
    fn empty_string_is_absent() {
        let v = json!("");
        assert_eq!(coerce_bool(Some(&v), "required").unwrap(), None);
        assert_eq!(coerce_number(None, "maximum").unwrap(), None);
    }

    #[test]
    fn non_strings_pass_through() {
        let v = json!(true);
        assert_eq!(coerce_bool(Some(&v), "required").unwrap(), Some(true));
        let v = json!([1, 2]);
        assert_eq!(
            coerce_literal(Some(&v), "default", Fallback::Strict).unwrap(),
            Some(json!([1, 2]))
        );
    }

    #[test]
    fn malformed_literal_strict_errors() {
        let v = json!("yes please");
        let result = coerce_literal(Some(&v), "uniqueItems", Fallback::Strict);
        assert!(matches!(
            result,
            Err(ConvertError::MalformedLiteral { field, .. }) if field == "uniqueItems"
        ));
    }

    #[test]
    fn malformed_literal_absent_fallback() {
        let v = json!("available");
        assert_eq!(
            coerce_literal(Some(&v), "default", Fallback::Absent).unwrap(),
            None
        );
    }

    #[test]
    fn wrong_kind_for_number_errors() {
        let v = json!("true");
        assert!(matches!(
            coerce_number(Some(&v), "minimum"),
            Err(ConvertError::MalformedLiteral { .. })
        ));
    }
}
