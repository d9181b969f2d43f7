//! Record normalization.
//!
//! Converts a decoded [`RawValue`] tree into the canonical, JSON-safe shape
//! the store accepts: every mapping key a string, every byte buffer decoded
//! to text, order and nesting preserved. Pure and stateless; safe to run
//! concurrently per record.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::RawValue;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// A mapping key was not a string. Keys are never coerced; the whole
    /// record fails.
    #[error("non-string key found: {0}")]
    NonStringKey(String),
}

/// Normalizes one record.
///
/// Scalars and already-canonical structures pass through unchanged, so the
/// operation is idempotent. Byte buffers are decoded with the platform's
/// lossy UTF-8 decode; encoding validity is the collection pipeline's
/// responsibility.
pub fn normalize(value: &RawValue) -> Result<Value, NormalizeError> {
    match value {
        RawValue::Null => Ok(Value::Null),
        RawValue::Bool(b) => Ok(Value::Bool(*b)),
        RawValue::Number(n) => Ok(Value::Number(n.clone())),
        RawValue::Text(s) => Ok(Value::String(s.clone())),
        RawValue::Bytes(b) => Ok(Value::String(String::from_utf8_lossy(b).into_owned())),
        RawValue::Sequence(items) => items
            .iter()
            .map(normalize)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        RawValue::Mapping(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, val) in entries {
                let RawValue::Text(key) = key else {
                    return Err(NormalizeError::NonStringKey(describe(key)));
                };
                out.insert(key.clone(), normalize(val)?);
            }
            Ok(Value::Object(out))
        }
    }
}

/// Renders the offending key for the error message.
fn describe(key: &RawValue) -> String {
    match key {
        RawValue::Null => "null".to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Number(n) => n.to_string(),
        RawValue::Text(s) => s.clone(),
        RawValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        RawValue::Sequence(_) => "<sequence>".to_string(),
        RawValue::Mapping(_) => "<mapping>".to_string(),
    }
}
