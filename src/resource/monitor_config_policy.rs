//! `datadog_monitor_config_policy` resource
//!
//! Create/read/update/delete of a single monitor config policy. Every response
//! goes through the same unparsed check and state derivation.

use super::{optional_string_list, validate_enum_value};
use crate::datadog::models::{
    MonitorConfigPolicyCreateRequest, MonitorConfigPolicyEditRequest,
    MonitorConfigPolicyPolicy, MonitorConfigPolicyPolicyCreateRequest,
    MonitorConfigPolicyPolicyEditRequest, MonitorConfigPolicyResponse,
    MonitorConfigPolicyResponseData, MonitorConfigPolicyTagPolicy,
    MonitorConfigPolicyTagPolicyCreateRequest, MonitorConfigPolicyTagPolicyEditRequest,
    MonitorConfigPolicyType,
};
use crate::datadog::{check_for_unparsed, MonitorsApi};
use crate::diag::{translate_client_error, Diagnostic};
use serde::{Deserialize, Serialize};

pub const RESOURCE_NAME: &str = "datadog_monitor_config_policy";

/// Desired state of a monitor config policy
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfigPolicyConfig {
    pub policy_type: String,
    #[serde(default)]
    pub tag_policy: Option<TagPolicyBlock>,
}

/// `tag_policy` block; unset fields stay `None` so updates can skip them
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagPolicyBlock {
    #[serde(default)]
    pub tag_key: Option<String>,
    #[serde(default)]
    pub tag_key_required: Option<bool>,
    #[serde(default, deserialize_with = "optional_string_list")]
    pub valid_tag_values: Option<Vec<String>>,
}

/// The configured policy block matching `policy_type`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyBlock<'a> {
    Tag(&'a TagPolicyBlock),
}

impl MonitorConfigPolicyConfig {
    pub fn policy_type(&self) -> Result<MonitorConfigPolicyType, Diagnostic> {
        validate_enum_value(
            &self.policy_type,
            "policy_type",
            MonitorConfigPolicyType::from_value,
        )
    }

    /// Resolve the block that belongs to the declared policy type
    pub fn policy_block(&self) -> Result<PolicyBlock<'_>, Diagnostic> {
        match self.policy_type()? {
            MonitorConfigPolicyType::Tag => self
                .tag_policy
                .as_ref()
                .map(PolicyBlock::Tag)
                .ok_or_else(|| {
                    Diagnostic::error("missing `tag_policy` block")
                        .with_detail("`tag_policy` must be set when `policy_type` is `tag`")
                }),
        }
    }

    /// Check the enum literal and the variant block without calling the API
    pub fn validate(&self) -> Result<(), Diagnostic> {
        self.policy_block().map(|_| ())
    }

    fn build_create_policy(&self) -> Result<MonitorConfigPolicyPolicyCreateRequest, Diagnostic> {
        match self.policy_block()? {
            PolicyBlock::Tag(block) => {
                let tag_key = block
                    .tag_key
                    .clone()
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| Diagnostic::error("`tag_policy.tag_key` is required"))?;

                Ok(MonitorConfigPolicyPolicyCreateRequest::Tag(
                    MonitorConfigPolicyTagPolicyCreateRequest {
                        tag_key,
                        tag_key_required: block.tag_key_required.unwrap_or(false),
                        valid_tag_values: block.valid_tag_values.clone().unwrap_or_default(),
                    },
                ))
            }
        }
    }

    fn build_edit_policy(&self) -> Result<MonitorConfigPolicyPolicyEditRequest, Diagnostic> {
        match self.policy_block()? {
            PolicyBlock::Tag(block) => Ok(MonitorConfigPolicyPolicyEditRequest::Tag(
                MonitorConfigPolicyTagPolicyEditRequest {
                    tag_key: block.tag_key.clone(),
                    tag_key_required: block.tag_key_required,
                    valid_tag_values: block.valid_tag_values.clone(),
                },
            )),
        }
    }

    /// Build the create request, or fail before any call is made
    pub fn to_create_request(&self) -> Result<MonitorConfigPolicyCreateRequest, Diagnostic> {
        self.build_create_policy()
            .map(MonitorConfigPolicyCreateRequest::new)
    }

    /// Build an edit request carrying only the fields that are set
    pub fn to_edit_request(&self, id: &str) -> Result<MonitorConfigPolicyEditRequest, Diagnostic> {
        self.build_edit_policy()
            .map(|policy| MonitorConfigPolicyEditRequest::new(id, policy))
    }
}

/// State held for a monitor config policy after an API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfigPolicyState {
    pub id: String,
    pub policy_type: MonitorConfigPolicyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_policy: Option<TagPolicyState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPolicyState {
    pub tag_key: String,
    pub tag_key_required: bool,
    pub valid_tag_values: Vec<String>,
}

impl From<&MonitorConfigPolicyTagPolicy> for TagPolicyState {
    fn from(policy: &MonitorConfigPolicyTagPolicy) -> Self {
        Self {
            tag_key: policy.tag_key.clone().unwrap_or_default(),
            tag_key_required: policy.tag_key_required.unwrap_or_default(),
            valid_tag_values: policy.valid_tag_values.clone().unwrap_or_default(),
        }
    }
}

/// Derive state from a decoded policy
pub fn state_from_response(
    data: &MonitorConfigPolicyResponseData,
) -> Result<MonitorConfigPolicyState, Diagnostic> {
    let id = data
        .id
        .clone()
        .ok_or_else(|| Diagnostic::error("monitor config policy response has no id"))?;
    let attributes = data.attributes.as_ref().ok_or_else(|| {
        Diagnostic::error(format!("monitor config policy {} has no attributes", id))
    })?;
    let policy_type = attributes.policy_type().ok_or_else(|| {
        Diagnostic::error(format!("monitor config policy {} has no known policy_type", id))
    })?;

    let tag_policy = match (policy_type, &attributes.policy) {
        (MonitorConfigPolicyType::Tag, Some(MonitorConfigPolicyPolicy::Tag(tag))) => {
            Some(TagPolicyState::from(tag))
        }
        (MonitorConfigPolicyType::Tag, Some(MonitorConfigPolicyPolicy::Unparsed(_))) => {
            return Err(Diagnostic::error(format!(
                "monitor config policy {} has a policy payload that does not match `tag`",
                id
            )));
        }
        (MonitorConfigPolicyType::Tag, None) => None,
    };

    Ok(MonitorConfigPolicyState {
        id,
        policy_type,
        tag_policy,
    })
}

/// Check a get/create/update response and derive state from it
fn checked_state(response: &MonitorConfigPolicyResponse) -> Result<MonitorConfigPolicyState, Diagnostic> {
    check_for_unparsed(response).map_err(Diagnostic::from_err)?;
    let data = response
        .data
        .as_ref()
        .ok_or_else(|| Diagnostic::error("monitor config policy response has no data"))?;
    state_from_response(data)
}

/// Create the policy; no state is returned unless the API accepted it
pub async fn create<A: MonitorsApi>(
    api: &A,
    config: &MonitorConfigPolicyConfig,
) -> Result<MonitorConfigPolicyState, Diagnostic> {
    let request = config.to_create_request()?;

    let response = api
        .create_monitor_config_policy(&request)
        .await
        .map_err(|err| translate_client_error(&err, "error creating monitor config policy"))?;

    // The policy exists remotely even if the response fails the checks below
    let created_id = response.data.as_ref().and_then(|d| d.id.as_deref());
    tracing::info!("created monitor config policy {}", created_id.unwrap_or("<no id>"));

    checked_state(&response)
}

/// Read the policy; `Ok(None)` means it no longer exists
pub async fn read<A: MonitorsApi>(
    api: &A,
    id: &str,
) -> Result<Option<MonitorConfigPolicyState>, Diagnostic> {
    match api.get_monitor_config_policy(id).await {
        Ok(response) => checked_state(&response).map(Some),
        Err(err) if err.is_not_found() => {
            tracing::warn!("monitor config policy {} not found, removing from state", id);
            Ok(None)
        }
        Err(err) => Err(translate_client_error(&err, "error getting monitor config policy")),
    }
}

/// Send the explicitly set fields and return the refreshed state
pub async fn update<A: MonitorsApi>(
    api: &A,
    id: &str,
    config: &MonitorConfigPolicyConfig,
) -> Result<MonitorConfigPolicyState, Diagnostic> {
    let request = config.to_edit_request(id)?;

    let response = api
        .update_monitor_config_policy(id, &request)
        .await
        .map_err(|err| translate_client_error(&err, "error updating monitor config policy"))?;

    let state = checked_state(&response)?;
    tracing::info!("updated monitor config policy {}", state.id);
    Ok(state)
}

pub async fn delete<A: MonitorsApi>(api: &A, id: &str) -> Result<(), Diagnostic> {
    api.delete_monitor_config_policy(id)
        .await
        .map_err(|err| translate_client_error(&err, "error deleting monitor config policy"))?;

    tracing::info!("deleted monitor config policy {}", id);
    Ok(())
}

/// Adopt an existing policy by id
pub async fn import<A: MonitorsApi>(api: &A, id: &str) -> Result<MonitorConfigPolicyState, Diagnostic> {
    read(api, id).await?.ok_or_else(|| {
        Diagnostic::error(format!("cannot import monitor config policy {}: not found", id))
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::datadog::models::MonitorConfigPolicyListResponse;
    use crate::datadog::ClientError;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// In-memory monitor config policy backend
    #[derive(Default)]
    pub(crate) struct MockMonitors {
        pub policies: RefCell<BTreeMap<String, Value>>,
        pub calls: RefCell<Vec<String>>,
        pub last_body: RefCell<Option<Value>>,
        pub next_id: RefCell<u32>,
        /// Extra keys merged into every returned `data.attributes.policy`
        pub inject_policy_fields: Option<Value>,
        pub fail_with: Option<StatusCode>,
    }

    impl MockMonitors {
        fn respond(&self, id: &str) -> Result<MonitorConfigPolicyResponse, ClientError> {
            let mut attributes = self
                .policies
                .borrow()
                .get(id)
                .cloned()
                .ok_or_else(|| ClientError::from_response(StatusCode::NOT_FOUND, ""))?;
            if let (Some(Value::Object(extra)), Some(Value::Object(policy))) =
                (&self.inject_policy_fields, attributes.get_mut("policy"))
            {
                policy.extend(extra.clone());
            }
            let body = json!({"data": {"id": id, "type": "monitor-config-policy", "attributes": attributes}});
            Ok(serde_json::from_value(body).unwrap())
        }

        fn fail(&self) -> Result<(), ClientError> {
            match self.fail_with {
                Some(status) => Err(ClientError::from_response(status, r#"{"errors": ["boom"]}"#)),
                None => Ok(()),
            }
        }
    }

    impl MonitorsApi for MockMonitors {
        async fn get_monitor_config_policy(
            &self,
            policy_id: &str,
        ) -> Result<MonitorConfigPolicyResponse, ClientError> {
            self.calls.borrow_mut().push(format!("get {}", policy_id));
            self.fail()?;
            self.respond(policy_id)
        }

        async fn create_monitor_config_policy(
            &self,
            body: &MonitorConfigPolicyCreateRequest,
        ) -> Result<MonitorConfigPolicyResponse, ClientError> {
            self.calls.borrow_mut().push("create".to_string());
            self.fail()?;
            let body = serde_json::to_value(body).unwrap();
            *self.next_id.borrow_mut() += 1;
            let id = format!("policy-{}", self.next_id.borrow());
            self.policies
                .borrow_mut()
                .insert(id.clone(), body["data"]["attributes"].clone());
            *self.last_body.borrow_mut() = Some(body);
            self.respond(&id)
        }

        async fn update_monitor_config_policy(
            &self,
            policy_id: &str,
            body: &MonitorConfigPolicyEditRequest,
        ) -> Result<MonitorConfigPolicyResponse, ClientError> {
            self.calls.borrow_mut().push(format!("update {}", policy_id));
            self.fail()?;
            let body = serde_json::to_value(body).unwrap();
            {
                let mut policies = self.policies.borrow_mut();
                let stored = policies
                    .get_mut(policy_id)
                    .ok_or_else(|| ClientError::from_response(StatusCode::NOT_FOUND, ""))?;
                if let (Some(Value::Object(patch)), Some(Value::Object(policy))) = (
                    body["data"]["attributes"].get("policy").cloned(),
                    stored.get_mut("policy"),
                ) {
                    policy.extend(patch);
                }
            }
            *self.last_body.borrow_mut() = Some(body);
            self.respond(policy_id)
        }

        async fn delete_monitor_config_policy(&self, policy_id: &str) -> Result<(), ClientError> {
            self.calls.borrow_mut().push(format!("delete {}", policy_id));
            self.fail()?;
            self.policies
                .borrow_mut()
                .remove(policy_id)
                .map(|_| ())
                .ok_or_else(|| ClientError::from_response(StatusCode::NOT_FOUND, ""))
        }

        async fn list_monitor_config_policies(
            &self,
        ) -> Result<MonitorConfigPolicyListResponse, ClientError> {
            self.calls.borrow_mut().push("list".to_string());
            self.fail()?;
            let data: Vec<Value> = self
                .policies
                .borrow()
                .iter()
                .map(|(id, attributes)| {
                    json!({"id": id, "type": "monitor-config-policy", "attributes": attributes})
                })
                .collect();
            Ok(serde_json::from_value(json!({ "data": data })).unwrap())
        }
    }

    fn tag_config() -> MonitorConfigPolicyConfig {
        serde_json::from_value(json!({
            "policy_type": "tag",
            "tag_policy": {
                "tag_key": "env",
                "tag_key_required": true,
                "valid_tag_values": ["prod", "staging"]
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_sends_tag_policy_and_round_trips() {
        let api = MockMonitors::default();

        let created = create(&api, &tag_config()).await.unwrap();

        let sent = api.last_body.borrow().clone().unwrap();
        assert_eq!(
            sent["data"]["attributes"]["policy"],
            json!({"tag_key": "env", "tag_key_required": true, "valid_tag_values": ["prod", "staging"]})
        );
        assert_eq!(sent["data"]["attributes"]["policy_type"], "tag");

        assert_eq!(created.id, "policy-1");
        assert_eq!(
            created.tag_policy,
            Some(TagPolicyState {
                tag_key: "env".to_string(),
                tag_key_required: true,
                valid_tag_values: vec!["prod".to_string(), "staging".to_string()],
            })
        );

        let read_back = read(&api, &created.id).await.unwrap();
        assert_eq!(read_back, Some(created));
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_policy_type_before_call() {
        let api = MockMonitors::default();
        let config: MonitorConfigPolicyConfig =
            serde_json::from_value(json!({"policy_type": "naming"})).unwrap();

        let err = create(&api, &config).await.unwrap_err();

        assert_eq!(err.summary, "invalid value for `policy_type`");
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_matching_block() {
        let api = MockMonitors::default();
        let config: MonitorConfigPolicyConfig =
            serde_json::from_value(json!({"policy_type": "tag"})).unwrap();

        let err = create(&api, &config).await.unwrap_err();

        assert_eq!(err.summary, "missing `tag_policy` block");
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_create_api_error_returns_no_state() {
        let api = MockMonitors {
            fail_with: Some(StatusCode::BAD_REQUEST),
            ..Default::default()
        };

        let err = create(&api, &tag_config()).await.unwrap_err();

        assert_eq!(
            err.summary,
            "error creating monitor config policy: 400 Bad Request: boom"
        );
        assert!(api.policies.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_create_response_with_unknown_field_fails() {
        let api = MockMonitors {
            inject_policy_fields: Some(json!({"case_sensitive": true})),
            ..Default::default()
        };

        let err = create(&api, &tag_config()).await.unwrap_err();

        assert!(err.summary.contains("data.attributes.policy.case_sensitive"));
    }

    #[tokio::test]
    async fn test_read_not_found_clears_identity() {
        let api = MockMonitors::default();

        let state = read(&api, "gone").await.unwrap();

        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn test_read_other_errors_are_translated() {
        let api = MockMonitors {
            fail_with: Some(StatusCode::FORBIDDEN),
            ..Default::default()
        };

        let err = read(&api, "p").await.unwrap_err();

        assert!(err.summary.starts_with("error getting monitor config policy: 403"));
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields_under_their_own_keys() {
        let api = MockMonitors::default();
        let created = create(&api, &tag_config()).await.unwrap();

        let partial: MonitorConfigPolicyConfig = serde_json::from_value(json!({
            "policy_type": "tag",
            "tag_policy": {"tag_key_required": false, "valid_tag_values": ["prod"]}
        }))
        .unwrap();
        let updated = update(&api, &created.id, &partial).await.unwrap();

        let sent = api.last_body.borrow().clone().unwrap();
        assert_eq!(sent["data"]["id"], created.id.as_str());
        assert_eq!(
            sent["data"]["attributes"]["policy"],
            json!({"tag_key_required": false, "valid_tag_values": ["prod"]})
        );

        let tag = updated.tag_policy.unwrap();
        assert_eq!(tag.tag_key, "env");
        assert!(!tag.tag_key_required);
        assert_eq!(tag.valid_tag_values, vec!["prod"]);
    }

    #[tokio::test]
    async fn test_delete_then_read_is_gone() {
        let api = MockMonitors::default();
        let created = create(&api, &tag_config()).await.unwrap();

        delete(&api, &created.id).await.unwrap();

        assert_eq!(read(&api, &created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_policy_reports_error() {
        let api = MockMonitors::default();

        let err = delete(&api, "nope").await.unwrap_err();

        assert!(err.summary.starts_with("error deleting monitor config policy: 404"));
    }

    #[tokio::test]
    async fn test_import_missing_policy_names_id() {
        let api = MockMonitors::default();

        let err = import(&api, "p-404").await.unwrap_err();

        assert_eq!(err.summary, "cannot import monitor config policy p-404: not found");
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let result = serde_json::from_value::<MonitorConfigPolicyConfig>(json!({
            "policy_type": "tag",
            "tag_policy": {"tag_key": "env", "tag_values": ["x"]}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_needs_matching_block_only() {
        let partial: MonitorConfigPolicyConfig = serde_json::from_value(json!({
            "policy_type": "tag",
            "tag_policy": {"valid_tag_values": ["prod"]}
        }))
        .unwrap();
        assert_eq!(partial.validate(), Ok(()));

        let bare: MonitorConfigPolicyConfig =
            serde_json::from_value(json!({"policy_type": "tag"})).unwrap();
        assert_eq!(bare.validate().unwrap_err().summary, "missing `tag_policy` block");
    }
}
