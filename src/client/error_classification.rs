//! Backend error payload extraction.
//!
//! The backend describes failures in a few shapes:
//! - `{"error": {"message": "...", "type": "..."}}`
//! - `{"error": "..."}`
//! - `{"message": "...", "type": "..."}`
//!
//! optionally alongside `{"redirectTo": "..."}`. The first shape that yields a
//! message wins, in the order listed.

use crate::error::{FieldHint, NormalizedError};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<ErrorField>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    kind: Option<serde_json::Value>,
    #[serde(default, rename = "redirectTo")]
    redirect_to: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Detail {
        #[serde(default)]
        message: Option<serde_json::Value>,
        #[serde(default, rename = "type")]
        kind: Option<serde_json::Value>,
    },
    Other(#[allow(dead_code)] serde::de::IgnoredAny),
}

fn as_str(v: &Option<serde_json::Value>) -> Option<&str> {
    v.as_ref().and_then(|v| v.as_str())
}

fn hint(v: &Option<serde_json::Value>) -> FieldHint {
    as_str(v).map(FieldHint::parse).unwrap_or_default()
}

/// Build a [`NormalizedError`] from a response body, or `None` when the body is
/// not a JSON object carrying a usable message.
pub(crate) fn normalize_payload(body: &[u8]) -> Option<NormalizedError> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    if !value.is_object() {
        return None;
    }
    let payload: ErrorPayload = serde_json::from_value(value).ok()?;
    let redirect_to = as_str(&payload.redirect_to).map(str::to_string);

    let (message, field) = match &payload.error {
        Some(ErrorField::Detail { message, kind }) if as_str(message).is_some() => {
            (as_str(message)?.to_string(), hint(kind))
        }
        Some(ErrorField::Text(text)) => (text.clone(), FieldHint::General),
        _ => {
            let message = as_str(&payload.message)?;
            (message.to_string(), hint(&payload.kind))
        }
    };

    Some(NormalizedError::backend(message, field, redirect_to))
}
