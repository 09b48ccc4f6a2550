//! Datadog API payloads
//!
//! Request models serialize exactly the fields the API expects. Response
//! models decode tolerantly and implement [`CheckUnparsed`](super::CheckUnparsed)
//! so callers can decide how strict to be about schema drift.

pub mod monitor_config_policy;
pub mod service_level_objective;

pub use monitor_config_policy::*;
pub use service_level_objective::*;

use thiserror::Error;

/// A string that is not one of an enum's literals
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {kind}: expected one of {}", .allowed.join(", "))]
pub struct InvalidEnumValue {
    pub kind: &'static str,
    pub value: String,
    pub allowed: Vec<&'static str>,
}
