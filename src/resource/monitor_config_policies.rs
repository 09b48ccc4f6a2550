//! `datadog_monitor_config_policies` data source
//!
//! One unpaginated listing; any unknown field fails the whole read.

use super::monitor_config_policy::TagPolicyState;
use crate::datadog::models::MonitorConfigPolicyListResponse;
use crate::datadog::{check_for_unparsed, MonitorsApi};
use crate::diag::{translate_client_error, Diagnostic};
use serde::Serialize;

pub const DATA_SOURCE_NAME: &str = "datadog_monitor_config_policies";

/// The listing has no filters, so its identity never changes
pub const DATA_SOURCE_ID: &str = "monitor-config-policies";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorConfigPolicyRecord {
    pub id: String,
    pub policy_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_policy: Option<TagPolicyState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorConfigPoliciesState {
    pub id: String,
    pub monitor_config_policies: Vec<MonitorConfigPolicyRecord>,
}

/// Flatten a listing response into records
pub fn flatten_policies(response: &MonitorConfigPolicyListResponse) -> Vec<MonitorConfigPolicyRecord> {
    response
        .data
        .iter()
        .map(|policy| {
            let attributes = policy.attributes.as_ref();
            MonitorConfigPolicyRecord {
                id: policy.id.clone().unwrap_or_default(),
                policy_type: attributes
                    .and_then(|a| a.policy_type())
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_default(),
                tag_policy: attributes
                    .and_then(|a| a.tag_policy())
                    .map(TagPolicyState::from),
            }
        })
        .collect()
}

pub async fn read<A: MonitorsApi>(api: &A) -> Result<MonitorConfigPoliciesState, Diagnostic> {
    let response = api
        .list_monitor_config_policies()
        .await
        .map_err(|err| translate_client_error(&err, "error querying monitor config policies"))?;
    check_for_unparsed(&response).map_err(Diagnostic::from_err)?;

    let monitor_config_policies = flatten_policies(&response);
    tracing::debug!("listed {} monitor config policies", monitor_config_policies.len());

    Ok(MonitorConfigPoliciesState {
        id: DATA_SOURCE_ID.to_string(),
        monitor_config_policies,
    })
}
