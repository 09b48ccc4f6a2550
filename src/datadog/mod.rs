//! Datadog API interaction module
//!
//! This module provides everything needed to talk to the Datadog REST API:
//! credentials, the HTTP client, the typed API surface and the wire models.
//!
//! # Module Structure
//!
//! - [`auth`] - API/application key credentials
//! - [`client`] - Main Datadog client implementing the API traits over HTTP
//! - [`http`] - HTTP utilities for REST API calls
//! - [`api`] - Traits the resource mappers are written against
//! - [`models`] - Request/response payloads
//! - [`unparsed`] - Detection of response fields the models do not recognize
//!
//! # Example
//!
//! ```ignore
//! use ddmap::datadog::{DatadogClient, DatadogCredentials, MonitorsApi};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = DatadogClient::new("https://api.datadoghq.com", DatadogCredentials::new("api-key", "app-key"))?;
//!     let policies = client.list_monitor_config_policies().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod unparsed;

pub use api::{ListSlosParams, MonitorsApi, SearchSloParams, ServiceLevelObjectivesApi};
pub use auth::DatadogCredentials;
pub use client::DatadogClient;
pub use error::ClientError;
pub use unparsed::{check_for_unparsed, check_known, CheckUnparsed, Known, UnparsedError};
