//! Monitor config policy payloads (`/api/v2/monitor/policy`)

use super::InvalidEnumValue;
use crate::datadog::unparsed::{child_path, collect_extra, CheckUnparsed, Extra, Known};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of monitor config policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorConfigPolicyType {
    Tag,
}

impl MonitorConfigPolicyType {
    pub const ALL: &'static [Self] = &[Self::Tag];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
        }
    }

    /// Parse an enum literal, rejecting anything the client does not know
    pub fn from_value(value: &str) -> Result<Self, InvalidEnumValue> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| InvalidEnumValue {
                kind: "MonitorConfigPolicyType",
                value: value.to_string(),
                allowed: Self::ALL.iter().map(|t| t.as_str()).collect(),
            })
    }
}

impl fmt::Display for MonitorConfigPolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON:API resource type of a monitor config policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonitorConfigPolicyResourceType {
    #[default]
    #[serde(rename = "monitor-config-policy")]
    MonitorConfigPolicy,
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /api/v2/monitor/policy`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfigPolicyCreateRequest {
    pub data: MonitorConfigPolicyCreateData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfigPolicyCreateData {
    pub attributes: MonitorConfigPolicyAttributeCreateRequest,
    #[serde(rename = "type")]
    pub resource_type: MonitorConfigPolicyResourceType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfigPolicyAttributeCreateRequest {
    pub policy_type: MonitorConfigPolicyType,
    pub policy: MonitorConfigPolicyPolicyCreateRequest,
}

/// Create payload, one variant per policy type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MonitorConfigPolicyPolicyCreateRequest {
    Tag(MonitorConfigPolicyTagPolicyCreateRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfigPolicyTagPolicyCreateRequest {
    pub tag_key: String,
    pub tag_key_required: bool,
    pub valid_tag_values: Vec<String>,
}

impl MonitorConfigPolicyPolicyCreateRequest {
    pub fn policy_type(&self) -> MonitorConfigPolicyType {
        match self {
            Self::Tag(_) => MonitorConfigPolicyType::Tag,
        }
    }
}

impl MonitorConfigPolicyCreateRequest {
    /// The policy type is taken from the payload variant so the two cannot disagree
    pub fn new(policy: MonitorConfigPolicyPolicyCreateRequest) -> Self {
        Self {
            data: MonitorConfigPolicyCreateData {
                attributes: MonitorConfigPolicyAttributeCreateRequest {
                    policy_type: policy.policy_type(),
                    policy,
                },
                resource_type: MonitorConfigPolicyResourceType::MonitorConfigPolicy,
            },
        }
    }
}

/// Body of `PATCH /api/v2/monitor/policy/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfigPolicyEditRequest {
    pub data: MonitorConfigPolicyEditData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfigPolicyEditData {
    pub attributes: MonitorConfigPolicyAttributeEditRequest,
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: MonitorConfigPolicyResourceType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfigPolicyAttributeEditRequest {
    pub policy_type: MonitorConfigPolicyType,
    pub policy: MonitorConfigPolicyPolicyEditRequest,
}

/// Edit payload, one variant per policy type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MonitorConfigPolicyPolicyEditRequest {
    Tag(MonitorConfigPolicyTagPolicyEditRequest),
}

/// Only the fields that are set are sent; the server keeps the others
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorConfigPolicyTagPolicyEditRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_key_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_tag_values: Option<Vec<String>>,
}

impl MonitorConfigPolicyPolicyEditRequest {
    pub fn policy_type(&self) -> MonitorConfigPolicyType {
        match self {
            Self::Tag(_) => MonitorConfigPolicyType::Tag,
        }
    }
}

impl MonitorConfigPolicyEditRequest {
    pub fn new(id: impl Into<String>, policy: MonitorConfigPolicyPolicyEditRequest) -> Self {
        Self {
            data: MonitorConfigPolicyEditData {
                attributes: MonitorConfigPolicyAttributeEditRequest {
                    policy_type: policy.policy_type(),
                    policy,
                },
                id: id.into(),
                resource_type: MonitorConfigPolicyResourceType::MonitorConfigPolicy,
            },
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Response of get/create/update
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfigPolicyResponse {
    #[serde(default)]
    pub data: Option<MonitorConfigPolicyResponseData>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

/// Response of `GET /api/v2/monitor/policy`
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfigPolicyListResponse {
    #[serde(default)]
    pub data: Vec<MonitorConfigPolicyResponseData>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfigPolicyResponseData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<Known<MonitorConfigPolicyResourceType>>,
    #[serde(default)]
    pub attributes: Option<MonitorConfigPolicyAttributeResponse>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

/// Policy attributes; the shape of `policy` is chosen by `policy_type`
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfigPolicyAttributeResponse {
    pub policy_type: Option<Known<MonitorConfigPolicyType>>,
    pub policy: Option<MonitorConfigPolicyPolicy>,
    pub unparsed: Extra,
}

/// Decoded policy payload
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorConfigPolicyPolicy {
    Tag(MonitorConfigPolicyTagPolicy),
    /// Payload for a policy type the client does not know, or one that did not decode
    Unparsed(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonitorConfigPolicyTagPolicy {
    #[serde(default)]
    pub tag_key: Option<String>,
    #[serde(default)]
    pub tag_key_required: Option<bool>,
    #[serde(default)]
    pub valid_tag_values: Option<Vec<String>>,
    #[serde(flatten)]
    pub unparsed: Extra,
}

#[derive(Deserialize)]
struct RawAttributeResponse {
    #[serde(default)]
    policy_type: Option<Known<MonitorConfigPolicyType>>,
    #[serde(default)]
    policy: Option<Value>,
    #[serde(flatten)]
    unparsed: Extra,
}

impl From<RawAttributeResponse> for MonitorConfigPolicyAttributeResponse {
    fn from(raw: RawAttributeResponse) -> Self {
        let policy_type = raw.policy_type;
        let policy = raw.policy.map(|value| match &policy_type {
            Some(Known::Unparsed(_)) => MonitorConfigPolicyPolicy::Unparsed(value),
            Some(Known::Value(MonitorConfigPolicyType::Tag)) | None => {
                match serde_json::from_value(value.clone()) {
                    Ok(tag) => MonitorConfigPolicyPolicy::Tag(tag),
                    Err(_) => MonitorConfigPolicyPolicy::Unparsed(value),
                }
            }
        });

        Self {
            policy_type,
            policy,
            unparsed: raw.unparsed,
        }
    }
}

impl<'de> Deserialize<'de> for MonitorConfigPolicyAttributeResponse {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawAttributeResponse::deserialize(deserializer).map(Self::from)
    }
}

impl MonitorConfigPolicyAttributeResponse {
    pub fn policy_type(&self) -> Option<MonitorConfigPolicyType> {
        self.policy_type.as_ref().and_then(Known::value).copied()
    }

    pub fn tag_policy(&self) -> Option<&MonitorConfigPolicyTagPolicy> {
        match &self.policy {
            Some(MonitorConfigPolicyPolicy::Tag(tag)) => Some(tag),
            _ => None,
        }
    }
}

impl CheckUnparsed for MonitorConfigPolicyResponse {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.data.collect_unparsed(&child_path(path, "data"), found);
        collect_extra(&self.unparsed, path, found);
    }
}

impl CheckUnparsed for MonitorConfigPolicyListResponse {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.data.collect_unparsed(&child_path(path, "data"), found);
        collect_extra(&self.unparsed, path, found);
    }
}

impl CheckUnparsed for MonitorConfigPolicyResponseData {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.resource_type
            .collect_unparsed(&child_path(path, "type"), found);
        self.attributes
            .collect_unparsed(&child_path(path, "attributes"), found);
        collect_extra(&self.unparsed, path, found);
    }
}

impl CheckUnparsed for MonitorConfigPolicyAttributeResponse {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        self.policy_type
            .collect_unparsed(&child_path(path, "policy_type"), found);
        self.policy.collect_unparsed(&child_path(path, "policy"), found);
        collect_extra(&self.unparsed, path, found);
    }
}

impl CheckUnparsed for MonitorConfigPolicyPolicy {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        match self {
            Self::Tag(tag) => collect_extra(&tag.unparsed, path, found),
            Self::Unparsed(_) => found.push(path.to_string()),
        }
    }
}
