//! Resource and data source mappers
//!
//! Each mapper decodes a configuration tree into a typed config struct once,
//! issues its API calls through the traits in [`crate::datadog::api`] and
//! returns serializable state.
//!
//! # Architecture
//!
//! - [`schema`] - Loads the attribute schemas from embedded JSON and checks raw trees against them
//! - [`monitor_config_policy`] - CRUD mapper for a single monitor config policy
//! - [`monitor_config_policies`] - Listing of all monitor config policies
//! - [`service_level_objectives`] - Paginated SLO search/list data sources
//!
//! # Example
//!
//! ```ignore
//! use ddmap::resource::monitor_config_policy::{self, MonitorConfigPolicyConfig};
//!
//! async fn apply(client: &ddmap::datadog::DatadogClient, tree: serde_json::Value) -> anyhow::Result<()> {
//!     let config: MonitorConfigPolicyConfig = serde_json::from_value(tree)?;
//!     let state = monitor_config_policy::create(client, &config).await?;
//!     println!("created {}", state.id);
//!     Ok(())
//! }
//! ```

pub mod monitor_config_policies;
pub mod monitor_config_policy;
pub mod schema;
pub mod service_level_objectives;

use crate::diag::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Result of a data source read: the state plus any non-fatal warnings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSourceRead<T> {
    pub state: T,
    pub warnings: Vec<Diagnostic>,
}

/// Convert an untyped configuration list into strings
///
/// Scalars are rendered as text (YAML happily turns `12345` into a number),
/// nulls are dropped.
pub fn expand_string_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect()
}

/// Reject a literal that `parse` does not recognize, naming the attribute
pub fn validate_enum_value<T, E, F>(value: &str, attribute: &str, parse: F) -> Result<T, Diagnostic>
where
    F: FnOnce(&str) -> Result<T, E>,
    E: fmt::Display,
{
    parse(value).map_err(|err| {
        Diagnostic::error(format!("invalid value for `{}`", attribute)).with_detail(err.to_string())
    })
}

/// serde helper: a list attribute whose elements may be any scalar
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(expand_string_list(&values.unwrap_or_default()))
}

/// serde helper: like [`string_list`] but keeps "not set" apart from "empty"
pub(crate) fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values.map(|v| expand_string_list(&v)))
}
