//! Host-displayable diagnostics
//!
//! Every mapper operation reports failures as a [`Diagnostic`]; bulk queries
//! also return non-fatal warnings alongside their result.

use crate::datadog::ClientError;
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A message the host shows to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: Some(detail.into()),
        }
    }

    /// Wrap any error as an error diagnostic
    pub fn from_err(err: impl fmt::Display) -> Self {
        Self::error(err.to_string())
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{}: {}", label, self.summary)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n\n{}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Turn a client error into a diagnostic carrying the HTTP context
pub fn translate_client_error(err: &ClientError, context: &str) -> Diagnostic {
    let summary = format!("{}: {}", context, err);
    let hint = match err.status() {
        Some(status) => status_hint(status),
        None => match err {
            ClientError::Decode(_) => "The API returned a response the client could not decode.",
            _ => "Request failed. Check your network connection and try again.",
        },
    };

    Diagnostic::error(summary).with_detail(hint)
}

/// User-facing hint for an HTTP status
fn status_hint(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Invalid request. Check your parameters.",
        401 => "Authentication failed. Check DD_API_KEY and DD_APP_KEY.",
        403 => "Permission denied. Check the scopes of your application key.",
        404 => "Resource not found.",
        409 => "Resource conflict. The resource may already exist or be in use.",
        429 => "Rate limit exceeded. Please try again later.",
        500..=599 => "Datadog service temporarily unavailable. Please try again.",
        _ => "The API rejected the request.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_keeps_context_and_status() {
        let err = ClientError::from_response(StatusCode::FORBIDDEN, r#"{"errors": ["Forbidden"]}"#);
        let diag = translate_client_error(&err, "error creating monitor config policy");

        assert!(diag.is_error());
        assert_eq!(
            diag.summary,
            "error creating monitor config policy: 403 Forbidden: Forbidden"
        );
        assert_eq!(
            diag.detail.as_deref(),
            Some("Permission denied. Check the scopes of your application key.")
        );
    }

    #[test]
    fn test_server_errors_share_hint() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "");
        let diag = translate_client_error(&err, "error querying service level objectives");
        assert_eq!(
            diag.detail.as_deref(),
            Some("Datadog service temporarily unavailable. Please try again.")
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let diag = Diagnostic::warning("skipping", "because");
        assert_eq!(diag.to_string(), "Warning: skipping\n\nbecause");
    }
}
