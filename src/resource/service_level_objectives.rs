//! SLO data sources
//!
//! `datadog_service_level_objectives` and the deprecated `datadog_slos` expose
//! the same query under different attribute names. Both are resolved into one
//! [`SloQuery`], walked page by page by [`collect_slos`], and identified by a
//! SHA-256 digest of the effective filter.
//!
//! A non-empty free-text query always wins: the search endpoint is used and the
//! structured filters are ignored. Otherwise the list endpoint is queried with
//! ids/name/tags/metrics filters.

use super::{string_list, DataSourceRead};
use crate::datadog::models::{SearchServiceLevelObjective, ServiceLevelObjective};
use crate::datadog::{
    check_known, ClientError, Known, ListSlosParams, SearchSloParams, ServiceLevelObjectivesApi,
    UnparsedError,
};
use crate::diag::{translate_client_error, Diagnostic};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const DATA_SOURCE_NAME: &str = "datadog_service_level_objectives";
pub const LEGACY_DATA_SOURCE_NAME: &str = "datadog_slos";

/// Records requested per page
pub const PAGE_SIZE: i64 = 100;

pub const NO_RESULTS_MESSAGE: &str =
    "your query returned no result, please try a less specific search criteria";

// =============================================================================
// Configuration shapes
// =============================================================================

/// Filter attributes shared by every SLO data source shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SloFilterFields<'a> {
    pub ids: &'a [String],
    pub name: Option<&'a str>,
    pub tags: Option<&'a str>,
    pub metrics: Option<&'a str>,
    /// Free-text query; takes precedence over everything above
    pub query: Option<&'a str>,
}

/// A configuration shape that can drive an SLO query
pub trait SloQueryConfig {
    fn filter_fields(&self) -> SloFilterFields<'_>;
    fn error_on_no_results(&self) -> bool;
}

/// `datadog_service_level_objectives`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceLevelObjectivesConfig {
    #[serde(default, deserialize_with = "string_list")]
    pub ids: Vec<String>,
    #[serde(default)]
    pub name_query: Option<String>,
    #[serde(default)]
    pub tags_query: Option<String>,
    #[serde(default)]
    pub metrics_query: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub error_on_no_results: Option<bool>,
}

impl SloQueryConfig for ServiceLevelObjectivesConfig {
    fn filter_fields(&self) -> SloFilterFields<'_> {
        SloFilterFields {
            ids: &self.ids,
            name: self.name_query.as_deref(),
            tags: self.tags_query.as_deref(),
            metrics: self.metrics_query.as_deref(),
            query: self.q.as_deref(),
        }
    }

    fn error_on_no_results(&self) -> bool {
        self.error_on_no_results.unwrap_or(true)
    }
}

/// `datadog_slos` (deprecated)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlosConfig {
    #[serde(default, deserialize_with = "string_list")]
    pub ids: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub metrics: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub error_on_no_results: Option<bool>,
}

impl SloQueryConfig for SlosConfig {
    fn filter_fields(&self) -> SloFilterFields<'_> {
        SloFilterFields {
            ids: &self.ids,
            name: self.name.as_deref(),
            tags: self.tags.as_deref(),
            metrics: self.metrics.as_deref(),
            query: self.query.as_deref(),
        }
    }

    fn error_on_no_results(&self) -> bool {
        self.error_on_no_results.unwrap_or(true)
    }
}

// =============================================================================
// Normalized query and identity
// =============================================================================

/// The effective query after precedence resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SloQuery {
    Search { query: String },
    List(SloListFilter),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SloListFilter {
    /// Comma separated, in configuration order
    pub ids: Option<String>,
    pub name_query: Option<String>,
    pub tags_query: Option<String>,
    pub metrics_query: Option<String>,
}

/// Apply filter precedence; empty strings and empty lists count as unset
pub fn resolve_slo_query(fields: SloFilterFields<'_>) -> SloQuery {
    let set = |value: Option<&str>| value.filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(query) = set(fields.query) {
        return SloQuery::Search { query };
    }

    let ids: Vec<&str> = fields
        .ids
        .iter()
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .collect();

    SloQuery::List(SloListFilter {
        ids: (!ids.is_empty()).then(|| ids.join(",")),
        name_query: set(fields.name),
        tags_query: set(fields.tags),
        metrics_query: set(fields.metrics),
    })
}

/// Escape the key separator so field boundaries stay unambiguous
fn escape_key_field(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .replace('\\', "\\\\")
        .replace('|', "\\|")
}

impl SloQuery {
    /// Key string the identity is hashed from
    pub fn identity_key(&self) -> String {
        match self {
            Self::Search { query } => format!("q={}", escape_key_field(Some(query.as_str()))),
            Self::List(filter) => {
                let fields = [
                    &filter.ids,
                    &filter.name_query,
                    &filter.tags_query,
                    &filter.metrics_query,
                ]
                .map(|value| escape_key_field(value.as_deref()));
                format!("list={}", fields.join("|"))
            }
        }
    }

    /// Stable data source id for this query
    pub fn identity(&self) -> String {
        let key = self.identity_key();
        tracing::debug!("SLO data source identity key: {}", key);
        hash_identity(&key)
    }
}

/// Lowercase hex SHA-256 of `key`
pub fn hash_identity(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

// =============================================================================
// Pagination
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SloSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub slo_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLevelObjectivesState {
    pub id: String,
    pub slos: Vec<SloSummary>,
}

/// One page, normalized across both endpoints
struct SloPage {
    items: Vec<PageItem>,
    last_number: i64,
}

struct PageItem {
    id: String,
    summary: Result<SloSummary, UnparsedError>,
}

/// Id of an element that may not have decoded, read from the raw JSON if needed
fn item_id<'a, T>(
    item: &'a Known<T>,
    id: impl FnOnce(&'a T) -> Option<&'a str>,
    pointer: &str,
) -> String {
    match item {
        Known::Value(value) => id(value),
        Known::Unparsed(raw) => raw.pointer(pointer).and_then(Value::as_str),
    }
    .unwrap_or_default()
    .to_string()
}

impl From<&Known<SearchServiceLevelObjective>> for PageItem {
    fn from(hit: &Known<SearchServiceLevelObjective>) -> Self {
        let id = item_id(hit, SearchServiceLevelObjective::id, "/data/id");
        let summary = check_known(hit).map(|slo| SloSummary {
            id: id.clone(),
            name: slo.name().unwrap_or_default().to_string(),
            slo_type: slo.slo_type().map(|t| t.as_str()).unwrap_or_default().to_string(),
        });
        Self { id, summary }
    }
}

impl From<&Known<ServiceLevelObjective>> for PageItem {
    fn from(item: &Known<ServiceLevelObjective>) -> Self {
        let id = item_id(item, |slo| slo.id.as_deref(), "/id");
        let summary = check_known(item).map(|slo| SloSummary {
            id: id.clone(),
            name: slo.name.clone().unwrap_or_default(),
            slo_type: slo.slo_type().map(|t| t.as_str()).unwrap_or_default().to_string(),
        });
        Self { id, summary }
    }
}

/// Render the query into the request shape of its endpoint and fetch one page
async fn fetch_page<A: ServiceLevelObjectivesApi>(
    api: &A,
    query: &SloQuery,
    page_number: i64,
) -> Result<SloPage, ClientError> {
    match query {
        SloQuery::Search { query } => {
            let params = SearchSloParams {
                query: Some(query.clone()),
                page_size: Some(PAGE_SIZE),
                page_number: Some(page_number),
            };
            let response = api.search_slo(&params).await?;

            Ok(SloPage {
                items: response.slos().iter().map(PageItem::from).collect(),
                // Without pagination metadata there is nothing further to ask for
                last_number: response.last_page_number().unwrap_or(page_number),
            })
        }
        SloQuery::List(filter) => {
            let params = ListSlosParams {
                ids: filter.ids.clone(),
                query: filter.name_query.clone(),
                tags_query: filter.tags_query.clone(),
                metrics_query: filter.metrics_query.clone(),
                limit: Some(PAGE_SIZE),
                offset: Some(page_number * PAGE_SIZE),
            };
            let response = api.list_slos(&params).await?;

            // The list endpoint has no page count; a short page is the last one
            let last_number = if (response.data.len() as i64) < PAGE_SIZE {
                page_number
            } else {
                page_number + 1
            };

            Ok(SloPage {
                items: response.data.iter().map(PageItem::from).collect(),
                last_number,
            })
        }
    }
}

/// Walk every page of `query`, skipping records with unparsed fields
pub async fn collect_slos<A: ServiceLevelObjectivesApi>(
    api: &A,
    query: &SloQuery,
) -> Result<DataSourceRead<Vec<SloSummary>>, Diagnostic> {
    let mut slos = Vec::new();
    let mut warnings = Vec::new();
    let mut page_number = 0;

    loop {
        tracing::debug!("fetching SLO page {}", page_number);
        let page = fetch_page(api, query, page_number)
            .await
            .map_err(|err| translate_client_error(&err, "error querying service level objectives"))?;

        for item in page.items {
            match item.summary {
                Ok(summary) => slos.push(summary),
                Err(err) => {
                    tracing::warn!("skipping service level objective {}: {}", item.id, err);
                    warnings.push(Diagnostic::warning(
                        format!("skipping service level objective with id: {}", item.id),
                        format!("service level objective contains unparsed object: {}", err),
                    ));
                }
            }
        }

        if page.last_number <= page_number {
            break;
        }
        page_number += 1;
    }

    Ok(DataSourceRead {
        state: slos,
        warnings,
    })
}

/// Read an SLO data source through any of its configuration shapes
pub async fn read<A, C>(
    api: &A,
    config: &C,
) -> Result<DataSourceRead<ServiceLevelObjectivesState>, Diagnostic>
where
    A: ServiceLevelObjectivesApi,
    C: SloQueryConfig,
{
    let query = resolve_slo_query(config.filter_fields());
    let DataSourceRead {
        state: slos,
        warnings,
    } = collect_slos(api, &query).await?;

    if slos.is_empty() && config.error_on_no_results() {
        return Err(Diagnostic::error(NO_RESULTS_MESSAGE));
    }

    Ok(DataSourceRead {
        state: ServiceLevelObjectivesState {
            id: query.identity(),
            slos,
        },
        warnings,
    })
}
