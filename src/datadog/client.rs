//! Datadog Client
//!
//! Main client for interacting with the Datadog API, combining credentials
//! and HTTP functionality.

use super::api::{ListSlosParams, MonitorsApi, SearchSloParams, ServiceLevelObjectivesApi};
use super::auth::DatadogCredentials;
use super::error::ClientError;
use super::http::DatadogHttpClient;
use super::models::{
    MonitorConfigPolicyCreateRequest, MonitorConfigPolicyEditRequest,
    MonitorConfigPolicyListResponse, MonitorConfigPolicyResponse, SearchSloResponse,
    SloListResponse,
};
use anyhow::Result;
use url::Url;

/// API host used when no site is configured
pub const DEFAULT_API_URL: &str = "https://api.datadoghq.com";

/// Main Datadog client
#[derive(Clone)]
pub struct DatadogClient {
    pub credentials: DatadogCredentials,
    pub http: DatadogHttpClient,
    pub api_url: String,
}

impl DatadogClient {
    /// Create a new Datadog client for the given API host
    pub fn new(api_url: &str, credentials: DatadogCredentials) -> Result<Self> {
        let http = DatadogHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build a v1 API URL
    pub fn v1_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.api_url, path)
    }

    /// Build a v2 API URL
    pub fn v2_url(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.api_url, path)
    }

    /// Build the URL of one monitor config policy
    pub fn monitor_policy_url(&self, policy_id: &str) -> String {
        self.v2_url(&format!("monitor/policy/{}", urlencoding::encode(policy_id)))
    }

    /// Build the SLO search URL with its query string
    pub fn slo_search_url(&self, params: &SearchSloParams) -> Result<String, ClientError> {
        let mut url = Url::parse(&self.v1_url("slo/search"))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(query) = &params.query {
                pairs.append_pair("query", query);
            }
            if let Some(size) = params.page_size {
                pairs.append_pair("page[size]", &size.to_string());
            }
            if let Some(number) = params.page_number {
                pairs.append_pair("page[number]", &number.to_string());
            }
        }
        Ok(trim_empty_query(url))
    }

    /// Build the SLO list URL with its query string
    pub fn slo_list_url(&self, params: &ListSlosParams) -> Result<String, ClientError> {
        let mut url = Url::parse(&self.v1_url("slo"))?;
        {
            let mut pairs = url.query_pairs_mut();
            let strings = [
                ("ids", &params.ids),
                ("query", &params.query),
                ("tags_query", &params.tags_query),
                ("metrics_query", &params.metrics_query),
            ];
            for (key, value) in strings {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
            if let Some(limit) = params.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = params.offset {
                pairs.append_pair("offset", &offset.to_string());
            }
        }
        Ok(trim_empty_query(url))
    }
}

/// Drop a dangling `?` left by a query builder that appended nothing
fn trim_empty_query(url: Url) -> String {
    let rendered = url.to_string();
    rendered.strip_suffix('?').map(str::to_string).unwrap_or(rendered)
}

impl MonitorsApi for DatadogClient {
    async fn get_monitor_config_policy(
        &self,
        policy_id: &str,
    ) -> Result<MonitorConfigPolicyResponse, ClientError> {
        let url = self.monitor_policy_url(policy_id);
        self.http.get(&url, &self.credentials).await
    }

    async fn create_monitor_config_policy(
        &self,
        body: &MonitorConfigPolicyCreateRequest,
    ) -> Result<MonitorConfigPolicyResponse, ClientError> {
        let url = self.v2_url("monitor/policy");
        self.http.post(&url, &self.credentials, body).await
    }

    async fn update_monitor_config_policy(
        &self,
        policy_id: &str,
        body: &MonitorConfigPolicyEditRequest,
    ) -> Result<MonitorConfigPolicyResponse, ClientError> {
        let url = self.monitor_policy_url(policy_id);
        self.http.patch(&url, &self.credentials, body).await
    }

    async fn delete_monitor_config_policy(&self, policy_id: &str) -> Result<(), ClientError> {
        let url = self.monitor_policy_url(policy_id);
        self.http.delete(&url, &self.credentials).await
    }

    async fn list_monitor_config_policies(
        &self,
    ) -> Result<MonitorConfigPolicyListResponse, ClientError> {
        let url = self.v2_url("monitor/policy");
        self.http.get(&url, &self.credentials).await
    }
}

impl ServiceLevelObjectivesApi for DatadogClient {
    async fn search_slo(&self, params: &SearchSloParams) -> Result<SearchSloResponse, ClientError> {
        let url = self.slo_search_url(params)?;
        self.http.get(&url, &self.credentials).await
    }

    async fn list_slos(&self, params: &ListSlosParams) -> Result<SloListResponse, ClientError> {
        let url = self.slo_list_url(params)?;
        self.http.get(&url, &self.credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DatadogClient {
        DatadogClient::new(
            "https://api.datadoghq.eu/",
            DatadogCredentials::new("api", "app"),
        )
        .unwrap()
    }

    #[test]
    fn test_monitor_policy_url_encodes_id() {
        assert_eq!(
            client().monitor_policy_url("a b/c"),
            "https://api.datadoghq.eu/api/v2/monitor/policy/a%20b%2Fc"
        );
    }

    #[test]
    fn test_slo_search_url_carries_paging() {
        let url = client()
            .slo_search_url(&SearchSloParams {
                query: Some("service:web".to_string()),
                page_size: Some(100),
                page_number: Some(3),
            })
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "service:web".to_string()),
                ("page[size]".to_string(), "100".to_string()),
                ("page[number]".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_slo_list_url_skips_unset_filters() {
        let url = client()
            .slo_list_url(&ListSlosParams {
                tags_query: Some("team:core".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            url,
            "https://api.datadoghq.eu/api/v1/slo?tags_query=team%3Acore"
        );

        let bare = client().slo_list_url(&ListSlosParams::default()).unwrap();
        assert_eq!(bare, "https://api.datadoghq.eu/api/v1/slo");
    }
}
