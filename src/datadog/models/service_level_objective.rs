//! Service level objective payloads (`/api/v1/slo`, `/api/v1/slo/search`)

use super::InvalidEnumValue;
use crate::datadog::unparsed::{child_path, collect_extra, CheckUnparsed, Extra, Known};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of SLO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SloType {
    Metric,
    Monitor,
}

impl SloType {
    pub const ALL: &'static [Self] = &[Self::Metric, Self::Monitor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Monitor => "monitor",
        }
    }

    pub fn from_value(value: &str) -> Result<Self, InvalidEnumValue> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| InvalidEnumValue {
                kind: "SLOType",
                value: value.to_string(),
                allowed: Self::ALL.iter().map(|t| t.as_str()).collect(),
            })
    }
}

impl fmt::Display for SloType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Search endpoint
// =============================================================================

/// Response of `GET /api/v1/slo/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSloResponse {
    #[serde(default)]
    pub data: Option<SearchSloResponseData>,
    #[serde(default)]
    pub links: Option<Value>,
    #[serde(default)]
    pub meta: Option<SearchSloResponseMeta>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSloResponseData {
    #[serde(default)]
    pub attributes: Option<SearchSloResponseDataAttributes>,
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSloResponseDataAttributes {
    #[serde(default)]
    pub facets: Option<Value>,
    /// Hits are decoded one by one so a mistyped hit does not fail the page
    #[serde(default)]
    pub slos: Vec<Known<SearchServiceLevelObjective>>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSloResponseMeta {
    #[serde(default)]
    pub pagination: Option<SearchSloResponseMetaPage>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSloResponseMetaPage {
    #[serde(default)]
    pub first_number: Option<i64>,
    #[serde(default)]
    pub last_number: Option<i64>,
    #[serde(default)]
    pub next_number: Option<i64>,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub prev_number: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default, rename = "type")]
    pub page_type: Option<String>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

/// One search hit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchServiceLevelObjective {
    #[serde(default)]
    pub data: Option<SearchServiceLevelObjectiveData>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchServiceLevelObjectiveData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Option<SearchServiceLevelObjectiveAttributes>,
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchServiceLevelObjectiveAttributes {
    #[serde(default)]
    pub all_tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub creator: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub env_tags: Option<Vec<String>>,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    #[serde(default)]
    pub modified_at: Option<i64>,
    #[serde(default)]
    pub monitor_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overall_status: Option<Vec<Value>>,
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub service_tags: Option<Vec<String>>,
    #[serde(default)]
    pub slo_type: Option<Known<SloType>>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub team_tags: Option<Vec<String>>,
    #[serde(default)]
    pub thresholds: Option<Vec<Value>>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

impl SearchServiceLevelObjective {
    pub fn id(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.id.as_deref())
    }

    fn attributes(&self) -> Option<&SearchServiceLevelObjectiveAttributes> {
        self.data.as_ref().and_then(|d| d.attributes.as_ref())
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes().and_then(|a| a.name.as_deref())
    }

    pub fn slo_type(&self) -> Option<SloType> {
        self.attributes()
            .and_then(|a| a.slo_type.as_ref())
            .and_then(Known::value)
            .copied()
    }
}

impl SearchSloResponse {
    pub fn slos(&self) -> &[Known<SearchServiceLevelObjective>] {
        self.data
            .as_ref()
            .and_then(|d| d.attributes.as_ref())
            .map(|a| a.slos.as_slice())
            .unwrap_or_default()
    }

    pub fn last_page_number(&self) -> Option<i64> {
        self.meta
            .as_ref()
            .and_then(|m| m.pagination.as_ref())
            .and_then(|p| p.last_number)
    }
}

impl CheckUnparsed for SearchServiceLevelObjective {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.data.collect_unparsed(&child_path(path, "data"), found);
        collect_extra(&self.unparsed, path, found);
    }
}

impl CheckUnparsed for SearchServiceLevelObjectiveData {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.attributes
            .collect_unparsed(&child_path(path, "attributes"), found);
        collect_extra(&self.unparsed, path, found);
    }
}

impl CheckUnparsed for SearchServiceLevelObjectiveAttributes {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.slo_type
            .collect_unparsed(&child_path(path, "slo_type"), found);
        collect_extra(&self.unparsed, path, found);
    }
}

// =============================================================================
// List endpoint
// =============================================================================

/// Response of `GET /api/v1/slo`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SloListResponse {
    #[serde(default)]
    pub data: Vec<Known<ServiceLevelObjective>>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

/// One SLO as returned by the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceLevelObjective {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub slo_type: Option<Known<SloType>>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub creator: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    #[serde(default)]
    pub modified_at: Option<i64>,
    #[serde(default)]
    pub monitor_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub monitor_tags: Option<Vec<String>>,
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub sli_specification: Option<Value>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub target_threshold: Option<f64>,
    #[serde(default)]
    pub thresholds: Option<Vec<Value>>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub warning_threshold: Option<f64>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

impl ServiceLevelObjective {
    pub fn slo_type(&self) -> Option<SloType> {
        self.slo_type.as_ref().and_then(Known::value).copied()
    }
}

impl CheckUnparsed for ServiceLevelObjective {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.slo_type.collect_unparsed(&child_path(path, "type"), found);
        collect_extra(&self.unparsed, path, found);
    }
}
