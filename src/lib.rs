//! ddmap - declarative Datadog resource mapper
//!
//! Maps typed configuration trees onto Datadog API calls and back:
//!
//! - [`resource::monitor_config_policy`] - create/read/update/delete of a monitor config policy
//! - [`resource::monitor_config_policies`] - listing of every monitor config policy
//! - [`resource::service_level_objectives`] - paginated SLO search/list queries
//!
//! The [`datadog`] module holds the HTTP client, the API traits the mappers are
//! written against and the wire models. [`diag`] carries the host-displayable
//! diagnostics every mapper returns.

pub mod config;
pub mod datadog;
pub mod diag;
pub mod resource;
