//! Client-side errors returned by the Datadog API layer

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Error returned by every API call
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },

    /// The request never produced a response
    #[error("failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body could not be decoded
    #[error("failed to parse response JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Datadog error payload: `{"errors": ["..."]}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

impl ClientError {
    /// Build an API error from a status and the raw response body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        Self::Api {
            status,
            message: error_message(status, body),
        }
    }

    /// HTTP status of the response, when one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Extract the messages from a Datadog error body, falling back to the status reason
fn error_message(status: StatusCode, body: &str) -> String {
    let messages: Vec<String> = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| {
            parsed
                .errors
                .into_iter()
                .map(|e| match e {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("API request failed")
            .to_string()
    } else {
        messages.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_joined_from_body() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"errors": ["tag_key is required", "invalid policy"]}"#,
        );
        assert_eq!(
            err.to_string(),
            "400 Bad Request: tag_key is required; invalid policy"
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_unstructured_body_falls_back_to_reason() {
        let err = ClientError::from_response(StatusCode::NOT_FOUND, "<html>nope</html>");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "404 Not Found: Not Found");
    }

    #[test]
    fn test_decode_error_has_no_status() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::Decode(decode);
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
