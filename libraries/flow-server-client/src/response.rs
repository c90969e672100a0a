//! Shared request/response plumbing for the sub-clients.

use crate::error::{Result, ServerClientError};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Map a transport failure, separating "server not there" from other errors.
pub(crate) fn send_error(e: reqwest::Error) -> ServerClientError {
    if e.is_connect() || e.is_timeout() {
        ServerClientError::ServerUnreachable(e.to_string())
    } else {
        ServerClientError::Request(e)
    }
}

/// Deserialize a successful response body.
pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    response.json().await.map_err(|e| {
        ServerClientError::ParseError(format!("Failed to parse {} response: {}", what, e))
    })
}

/// Read the body of an error response as a user-facing message.
pub(crate) async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    detail_message(&text).unwrap_or(text)
}

/// Build a `ServerError` from a non-success response.
pub(crate) async fn server_error(response: Response) -> ServerClientError {
    let status = response.status().as_u16();
    ServerClientError::ServerError {
        status,
        message: error_message(response).await,
    }
}

/// Extract `detail` from a `{"detail": ...}` error body.
///
/// Validation failures carry a list of `{"msg": ...}` objects instead of a
/// string; their messages are joined.
fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(errors) => {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        assert_eq!(
            detail_message(r#"{"detail": "Mix not found"}"#).as_deref(),
            Some("Mix not found")
        );
    }

    #[test]
    fn validation_details_are_joined() {
        let body = r#"{"detail": [
            {"loc": ["body", "nome"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error.email"}
        ]}"#;
        assert_eq!(
            detail_message(body).as_deref(),
            Some("field required; value is not a valid email address")
        );
    }

    #[test]
    fn non_json_body_has_no_detail() {
        assert_eq!(detail_message("Internal Server Error"), None);
        assert_eq!(detail_message(r#"{"error": "x"}"#), None);
    }
}
