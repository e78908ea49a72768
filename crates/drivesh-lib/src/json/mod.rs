//! JSON helpers shared by every REST exchange.
//!
//! Google endpoints report failures as a top-level `error` field, either a
//! string (OAuth2 endpoints, with an optional `error_description`) or an
//! object carrying a `message` (Drive endpoints). Bodies are checked for that
//! field before they are deserialized into their typed schema.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{DriveshError, Result};

/// Extract `(error, description)` from a parsed body, if it carries an error.
pub fn error_object(body: &Value) -> Option<(String, Option<String>)> {
    let error = body.get("error")?;
    let description = body
        .get("error_description")
        .and_then(Value::as_str)
        .map(str::to_string);

    match error {
        Value::String(code) => Some((code.clone(), description)),
        Value::Object(obj) => {
            let message = obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            let status = obj.get("status").and_then(Value::as_str).map(str::to_string);
            Some((message, description.or(status)))
        }
        Value::Null => None,
        other => Some((other.to_string(), description)),
    }
}

/// Fail with [`DriveshError::Remote`] when `body` carries an error field.
///
/// Empty or non-JSON bodies pass; their shape is left to the caller.
pub fn check_error(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Ok(());
    }
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Ok(());
    };
    match error_object(&value) {
        Some((error, description)) => {
            match &description {
                Some(d) => tracing::error!(error = %error, description = %d, "remote error"),
                None => tracing::error!(error = %error, "remote error"),
            }
            Err(DriveshError::Remote { error, description })
        }
        None => Ok(()),
    }
}

/// Check for an error field, then deserialize into `T`.
///
/// Missing required fields surface as [`DriveshError::Protocol`] naming
/// `context`.
pub fn deserialize_response<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    check_error(body)?;
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(context, error = %e, "malformed response");
        DriveshError::Protocol(format!("{context}: {e}"))
    })
}
