use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Maximum length for error bodies written to logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates a response body before it goes into a log line.
pub fn sanitize_error_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", head)
    } else {
        body.to_string()
    }
}

/// Uniform wrapper around every backend response.
///
/// `code == 200` signals success regardless of the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Decodes an HTTP status and body into the envelope's `data`.
///
/// HTTP 401 yields `ClientError::AuthExpired`; the caller owns credential
/// invalidation.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    match status {
        200 => {
            let envelope: Envelope = serde_json::from_slice(body)
                .map_err(|_| ClientError::api(status, "invalid response body"))?;
            if envelope.code == 200 {
                Ok(serde_json::from_value(envelope.data)?)
            } else {
                let message = envelope
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "request failed".to_string());
                Err(ClientError::api(status, message))
            }
        }
        401 => Err(ClientError::AuthExpired),
        404 => Err(ClientError::api(
            status,
            error_detail(body).unwrap_or_else(|| "resource not found".to_string()),
        )),
        422 => Err(ClientError::api(
            status,
            error_detail(body).unwrap_or_else(|| "invalid parameters".to_string()),
        )),
        other => Err(ClientError::api(
            other,
            error_detail(body).unwrap_or_else(|| format!("request failed ({})", other)),
        )),
    }
}

/// Extracts the server-provided message from an error body.
///
/// FastAPI reports `{"detail": "..."}`, or a list of field errors for 422.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let message = match value.get("detail") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|f| f.as_str());
                    Some(match field {
                        Some(field) => format!("{}: {}", field, msg),
                        None => msg.to_string(),
                    })
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    };
    message
        .or_else(|| value.get("message")?.as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
}
