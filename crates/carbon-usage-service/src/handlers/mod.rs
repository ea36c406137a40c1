//! API handlers.

pub mod health;
pub mod usage;
pub mod usage_types;

use serde::de::DeserializeOwned;
use serde_json::Value;

use carbon_usage_core::ValidationErrors;

use crate::error::ApiError;

/// Require the request body to be a JSON object.
fn object(body: Value) -> Result<serde_json::Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(
            "invalid body: expected a JSON object".into(),
        )),
    }
}

/// Pull one writable field out of an object body.
///
/// Missing and `null` both mean "not supplied". A value of the wrong shape
/// records `message` against the field and yields `None`, so every bad
/// field of a request is reported in one response.
fn field<T: DeserializeOwned>(
    map: &mut serde_json::Map<String, Value>,
    name: &'static str,
    message: &'static str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match map.remove(name) {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(name, message);
                None
            }
        },
    }
}
