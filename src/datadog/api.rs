//! API surface the resource mappers are written against
//!
//! [`DatadogClient`](super::DatadogClient) implements these traits over HTTP;
//! tests implement them in memory.

#![allow(async_fn_in_trait)]

use super::error::ClientError;
use super::models::{
    MonitorConfigPolicyCreateRequest, MonitorConfigPolicyEditRequest,
    MonitorConfigPolicyListResponse, MonitorConfigPolicyResponse, SearchSloResponse,
    SloListResponse,
};

/// Monitor config policy endpoints (v2)
pub trait MonitorsApi {
    async fn get_monitor_config_policy(
        &self,
        policy_id: &str,
    ) -> Result<MonitorConfigPolicyResponse, ClientError>;

    async fn create_monitor_config_policy(
        &self,
        body: &MonitorConfigPolicyCreateRequest,
    ) -> Result<MonitorConfigPolicyResponse, ClientError>;

    async fn update_monitor_config_policy(
        &self,
        policy_id: &str,
        body: &MonitorConfigPolicyEditRequest,
    ) -> Result<MonitorConfigPolicyResponse, ClientError>;

    async fn delete_monitor_config_policy(&self, policy_id: &str) -> Result<(), ClientError>;

    async fn list_monitor_config_policies(
        &self,
    ) -> Result<MonitorConfigPolicyListResponse, ClientError>;
}

/// Optional parameters of `GET /api/v1/slo/search`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSloParams {
    pub query: Option<String>,
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

/// Optional parameters of `GET /api/v1/slo`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSlosParams {
    /// Comma separated SLO ids
    pub ids: Option<String>,
    /// Name filter
    pub query: Option<String>,
    pub tags_query: Option<String>,
    pub metrics_query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Service level objective endpoints (v1)
pub trait ServiceLevelObjectivesApi {
    async fn search_slo(&self, params: &SearchSloParams) -> Result<SearchSloResponse, ClientError>;

    async fn list_slos(&self, params: &ListSlosParams) -> Result<SloListResponse, ClientError>;
}
