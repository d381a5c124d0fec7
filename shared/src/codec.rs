//! Persisted collection format
//!
//! Collections are stored as `{ "schema_version": 1, "items": [...] }` with
//! ISO-8601 date strings. Older files are bare arrays in which every date
//! was wrapped as `{ "__type": "Date", "value": "..." }`; those are
//! unwrapped before typed decoding.
//!
//! Legacy support covers the date tagging only. Field names and ids must
//! already match the current schema (snake_case keys, UUID ids); anything
//! else fails typed decoding with [`CodecError::Json`].

use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Version written by [`encode_collection`]
pub const SCHEMA_VERSION: u64 = 1;

const DATE_TAG: &str = "Date";

/// Serialize items into a versioned envelope
pub fn encode_collection<T: Serialize>(items: &[T]) -> Result<Vec<u8>, CodecError> {
    let document = json!({
        "schema_version": SCHEMA_VERSION,
        "items": items,
    });
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Decode a versioned envelope or a legacy tagged array
pub fn decode_collection<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, CodecError> {
    let document: Value = serde_json::from_slice(bytes)?;

    let items = match document {
        Value::Array(_) => untag_dates(document),
        Value::Object(mut envelope) => {
            let version = envelope
                .get("schema_version")
                .and_then(Value::as_u64)
                .ok_or_else(|| CodecError::Malformed("missing schema_version".to_string()))?;
            if version != SCHEMA_VERSION {
                return Err(CodecError::UnsupportedSchema(version));
            }
            envelope
                .remove("items")
                .ok_or_else(|| CodecError::Malformed("missing items".to_string()))?
        }
        other => {
            return Err(CodecError::Malformed(format!(
                "expected an array or envelope, found {}",
                kind_of(&other)
            )))
        }
    };

    Ok(serde_json::from_value(items)?)
}

/// Replace every `{ "__type": "Date", "value": s }` with `s`
///
/// A tagged object whose `value` is not a string is kept as is.
pub fn untag_dates(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(untag_dates).collect()),
        Value::Object(mut map) => {
            let is_date = map.get("__type").and_then(Value::as_str) == Some(DATE_TAG);
            if is_date {
                match map.remove("value") {
                    Some(inner @ Value::String(_)) => return inner,
                    Some(other) => {
                        map.insert("value".to_string(), other);
                    }
                    None => {}
                }
            }
            Value::Object(map.into_iter().map(|(k, v)| (k, untag_dates(v))).collect())
        }
        other => other,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
