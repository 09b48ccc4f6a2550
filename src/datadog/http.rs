//! HTTP utilities for Datadog REST API calls

use super::auth::DatadogCredentials;
use super::error::ClientError;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... [truncated, {} bytes total]", &body[..cut], body.len()),
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Datadog API calls
#[derive(Clone)]
pub struct DatadogHttpClient {
    client: Client,
}

impl DatadogHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ddmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request and decode the JSON response
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        credentials: &DatadogCredentials,
    ) -> Result<T, ClientError> {
        tracing::debug!("GET {}", url);

        let body = self.send(credentials.apply(self.client.get(url))).await?;
        decode(&body)
    }

    /// Make a POST request with a JSON body and decode the JSON response
    pub async fn post<B, T>(
        &self,
        url: &str,
        credentials: &DatadogCredentials,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);

        let request = credentials.apply(self.client.post(url)).json(body);
        let response_body = self.send(request).await?;
        decode(&response_body)
    }

    /// Make a PATCH request with a JSON body and decode the JSON response
    pub async fn patch<B, T>(
        &self,
        url: &str,
        credentials: &DatadogCredentials,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("PATCH {}", url);

        let request = credentials.apply(self.client.patch(url)).json(body);
        let response_body = self.send(request).await?;
        decode(&response_body)
    }

    /// Make a DELETE request, ignoring any response body
    pub async fn delete(&self, url: &str, credentials: &DatadogCredentials) -> Result<(), ClientError> {
        tracing::debug!("DELETE {}", url);

        self.send(credentials.apply(self.client.delete(url))).await?;
        Ok(())
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let response = request.send().await.map_err(ClientError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ClientError::Transport)?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ClientError::from_response(status, &body));
        }

        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(ClientError::Decode)
}
