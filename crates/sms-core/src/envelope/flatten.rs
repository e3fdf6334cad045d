//! Flattening of nested records into envelope payloads
//!
//! Nested objects become dotted keys (`billing.price`), array items are keyed
//! by index (`tags.0`) and nulls are dropped.

use serde::Serialize;
use serde_json::Value;

use super::Payload;

/// Flatten any serializable record into a payload
pub fn flatten<T: Serialize>(record: &T) -> Result<Payload, serde_json::Error> {
    let value = serde_json::to_value(record)?;
    Ok(flatten_value(&value))
}

/// Flatten a JSON value into a payload
pub fn flatten_value(value: &Value) -> Payload {
    let mut payload = Payload::new();
    flatten_into(&mut payload, String::new(), value);
    payload
}

fn flatten_into(payload: &mut Payload, prefix: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            payload.insert(prefix, s.clone());
        }
        Value::Bool(b) => {
            payload.insert(prefix, b.to_string());
        }
        Value::Number(n) => {
            payload.insert(prefix, n.to_string());
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(payload, join_key(&prefix, &index.to_string()), item);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(payload, join_key(&prefix, key), item);
            }
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
