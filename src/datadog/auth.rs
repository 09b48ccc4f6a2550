//! Datadog Authentication
//!
//! Every request carries an API key and an application key as headers.

use reqwest::RequestBuilder;
use std::fmt;

pub const API_KEY_HEADER: &str = "DD-API-KEY";
pub const APP_KEY_HEADER: &str = "DD-APPLICATION-KEY";

pub const API_KEY_ENV: &str = "DD_API_KEY";
pub const APP_KEY_ENV: &str = "DD_APP_KEY";

/// Datadog key pair
#[derive(Clone, PartialEq, Eq)]
pub struct DatadogCredentials {
    api_key: String,
    app_key: String,
}

impl DatadogCredentials {
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_key: app_key.into(),
        }
    }

    /// Attach the authentication headers to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .header(APP_KEY_HEADER, &self.app_key)
    }
}

// Security: never print the keys themselves
impl fmt::Debug for DatadogCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatadogCredentials")
            .field("api_key", &mask(&self.api_key))
            .field("app_key", &mask(&self.app_key))
            .finish()
    }
}

fn mask(key: &str) -> String {
    match key.get(key.len().saturating_sub(4)..) {
        Some(tail) if key.len() > 4 => format!("****{}", tail),
        _ => "****".to_string(),
    }
}
