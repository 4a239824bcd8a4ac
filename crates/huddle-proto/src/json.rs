//! Field accessors shared by the hand-written codecs.
//!
//! `null` is treated the same as an absent field everywhere.

use serde_json::{Map, Value};

use crate::error::DecodeError;

pub(crate) type Object = Map<String, Value>;

pub(crate) fn object<'a>(value: &'a Value, entity: &'static str) -> Result<&'a Object, DecodeError> {
    value.as_object().ok_or(DecodeError::NotAnObject { entity })
}

fn present<'a>(object: &'a Object, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|value| !value.is_null())
}

pub(crate) fn required_str<'a>(
    object: &'a Object,
    entity: &'static str,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    optional_str(object, entity, field)?.ok_or(DecodeError::MissingField { entity, field })
}

pub(crate) fn optional_str<'a>(
    object: &'a Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<&'a str>, DecodeError> {
    match present(object, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(DecodeError::InvalidField { entity, field, expected: "a string" }),
    }
}

pub(crate) fn required_i64(
    object: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<i64, DecodeError> {
    let value = present(object, field).ok_or(DecodeError::MissingField { entity, field })?;
    value.as_i64().ok_or(DecodeError::InvalidField { entity, field, expected: "an integer" })
}

pub(crate) fn optional_u64(
    object: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<u64>, DecodeError> {
    match present(object, field) {
        None => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or(DecodeError::InvalidField {
            entity,
            field,
            expected: "a non-negative integer",
        }),
    }
}

pub(crate) fn optional_bool(
    object: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<bool>, DecodeError> {
    match present(object, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(DecodeError::InvalidField { entity, field, expected: "a boolean" }),
    }
}

pub(crate) fn bool_or(
    object: &Object,
    entity: &'static str,
    field: &'static str,
    default: bool,
) -> Result<bool, DecodeError> {
    Ok(optional_bool(object, entity, field)?.unwrap_or(default))
}

pub(crate) fn optional_array<'a>(
    object: &'a Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<&'a Vec<Value>>, DecodeError> {
    match present(object, field) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(DecodeError::InvalidField { entity, field, expected: "an array" }),
    }
}

pub(crate) fn optional_object<'a>(
    object: &'a Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<&'a Object>, DecodeError> {
    match present(object, field) {
        None => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(_) => Err(DecodeError::InvalidField { entity, field, expected: "an object" }),
    }
}

/// Identifier given either inline (`"C1"`) or as an object carrying `id`.
///
/// Lenient: anything else reads as absent.
pub(crate) fn loose_id<'a>(object: &'a Object, field: &str) -> Option<&'a str> {
    match present(object, field)? {
        Value::String(s) => Some(s),
        Value::Object(inner) => inner.get("id").and_then(Value::as_str),
        _ => None,
    }
}
