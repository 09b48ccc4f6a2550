//! Schema Registry - Load attribute schemas from JSON
//!
//! Every resource and data source publishes its configuration surface as JSON
//! embedded in the binary. The registry serves those definitions to the host
//! and checks raw configuration trees against them before they are decoded.

use crate::diag::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded schema JSON files (compiled into the binary)
const SCHEMA_FILES: &[&str] = &[
    include_str!("../schemas/monitor_config_policy.json"),
    include_str!("../schemas/service_level_objectives.json"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Resource,
    DataSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    List,
    Block,
}

/// Attribute definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Element type of a list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<AttributeType>,
    /// Accepted literals of an enum-like string
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<String>,
    /// Nested attributes of a block (or of a list of blocks)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeSchema>,
}

impl AttributeSchema {
    /// Only the API sets this attribute
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }
}

/// Resource or data source definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub kind: SchemaKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default)]
    pub importable: bool,
    pub attributes: BTreeMap<String, AttributeSchema>,
}

/// Root structure of schemas/*.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default)]
    pub schemas: BTreeMap<String, ResourceSchema>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static SchemaRegistry {
    REGISTRY.get_or_init(|| {
        let mut registry = SchemaRegistry::default();

        for content in SCHEMA_FILES {
            let partial: SchemaRegistry = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e));
            registry.schemas.extend(partial.schemas);
        }

        registry
    })
}

/// Get a schema by resource/data source name
pub fn get_schema(name: &str) -> Option<&'static ResourceSchema> {
    get_registry().schemas.get(name)
}

/// Get all schema names
pub fn get_all_schema_names() -> Vec<&'static str> {
    get_registry().schemas.keys().map(|s| s.as_str()).collect()
}

/// Check a raw configuration tree against a schema
///
/// Returns every problem found; warnings (deprecation) are mixed with errors,
/// callers decide with [`Diagnostic::is_error`].
pub fn check_tree(name: &str, schema: &ResourceSchema, tree: &Value) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    if let Some(message) = &schema.deprecated {
        diags.push(Diagnostic::warning(
            format!("{} is deprecated", name),
            message.clone(),
        ));
    }

    match tree {
        Value::Object(map) => check_block(&schema.attributes, map, "", &mut diags),
        Value::Null => check_block(&schema.attributes, &Default::default(), "", &mut diags),
        _ => diags.push(Diagnostic::error(format!(
            "configuration for {} must be a mapping",
            name
        ))),
    }

    diags
}

fn attribute_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn check_block(
    attributes: &BTreeMap<String, AttributeSchema>,
    values: &serde_json::Map<String, Value>,
    prefix: &str,
    diags: &mut Vec<Diagnostic>,
) {
    for (key, value) in values {
        let path = attribute_path(prefix, key);
        let Some(attribute) = attributes.get(key) else {
            diags.push(Diagnostic::error(format!("unsupported argument `{}`", path)));
            continue;
        };
        if attribute.is_computed_only() {
            diags.push(Diagnostic::error(format!(
                "`{}` is computed and cannot be set",
                path
            )));
            continue;
        }
        check_value(attribute, value, &path, diags);
    }

    for (key, attribute) in attributes {
        if attribute.required && values.get(key).map_or(true, Value::is_null) {
            diags.push(Diagnostic::error(format!(
                "missing required argument `{}`",
                attribute_path(prefix, key)
            )));
        }
    }
}

fn type_matches(attr_type: AttributeType, value: &Value) -> bool {
    match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::Int => value.is_i64() || value.is_u64(),
        AttributeType::List => value.is_array(),
        AttributeType::Block => value.is_object(),
    }
}

fn check_value(attribute: &AttributeSchema, value: &Value, path: &str, diags: &mut Vec<Diagnostic>) {
    if value.is_null() {
        return;
    }
    if !type_matches(attribute.attr_type, value) {
        diags.push(Diagnostic::error(format!(
            "`{}` must be of type {:?}",
            path, attribute.attr_type
        )));
        return;
    }

    match value {
        Value::String(s) if !attribute.valid_values.is_empty() => {
            if !attribute.valid_values.iter().any(|v| v == s) {
                diags.push(
                    Diagnostic::error(format!("invalid value for `{}`", path)).with_detail(format!(
                        "expected one of {}, got '{}'",
                        attribute.valid_values.join(", "),
                        s
                    )),
                );
            }
        }
        Value::Object(map) => check_block(&attribute.attributes, map, path, diags),
        Value::Array(items) if attribute.elem == Some(AttributeType::Block) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(map) => {
                        check_block(&attribute.attributes, map, &format!("{}[{}]", path, i), diags)
                    }
                    _ => diags.push(Diagnostic::error(format!("`{}[{}]` must be a block", path, i))),
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{monitor_config_policies, monitor_config_policy, service_level_objectives};
    use serde_json::json;

    fn errors(diags: &[Diagnostic]) -> Vec<&str> {
        diags
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.summary.as_str())
            .collect()
    }

    #[test]
    fn test_registry_loads_every_mapper() {
        for name in [
            monitor_config_policy::RESOURCE_NAME,
            monitor_config_policies::DATA_SOURCE_NAME,
            service_level_objectives::DATA_SOURCE_NAME,
            service_level_objectives::LEGACY_DATA_SOURCE_NAME,
        ] {
            assert!(get_schema(name).is_some(), "missing schema for {}", name);
        }
        assert_eq!(get_all_schema_names().len(), 4);
    }

    #[test]
    fn test_policy_schema_shape() {
        let schema = get_schema("datadog_monitor_config_policy").unwrap();
        assert_eq!(schema.kind, SchemaKind::Resource);
        assert!(schema.importable);
        assert!(schema.attributes["policy_type"].required);
        assert!(schema.attributes["id"].is_computed_only());
        assert_eq!(schema.attributes["tag_policy"].attr_type, AttributeType::Block);
    }

    #[test]
    fn test_valid_policy_tree_passes() {
        let schema = get_schema("datadog_monitor_config_policy").unwrap();
        let tree = json!({
            "policy_type": "tag",
            "tag_policy": {"tag_key": "env", "tag_key_required": true, "valid_tag_values": ["prod"]}
        });
        assert!(check_tree("datadog_monitor_config_policy", schema, &tree).is_empty());
    }

    #[test]
    fn test_policy_tree_problems_are_all_reported() {
        let schema = get_schema("datadog_monitor_config_policy").unwrap();
        let tree = json!({
            "id": "abc",
            "tag_policy": {"tag_key": 5, "color": "red"}
        });

        let diags = check_tree("datadog_monitor_config_policy", schema, &tree);

        let mut found = errors(&diags);
        found.sort_unstable();
        assert_eq!(
            found,
            vec![
                "`id` is computed and cannot be set",
                "`tag_policy.tag_key` must be of type String",
                "missing required argument `policy_type`",
                "unsupported argument `tag_policy.color`",
            ]
        );
    }

    #[test]
    fn test_invalid_enum_literal_is_rejected() {
        let schema = get_schema("datadog_monitor_config_policy").unwrap();
        let diags = check_tree(
            "datadog_monitor_config_policy",
            schema,
            &json!({"policy_type": "naming"}),
        );
        assert_eq!(errors(&diags), vec!["invalid value for `policy_type`"]);
    }

    #[test]
    fn test_legacy_slo_source_warns() {
        let schema = get_schema("datadog_slos").unwrap();
        let diags = check_tree("datadog_slos", schema, &json!({"query": "service:web"}));
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
        assert_eq!(diags[0].summary, "datadog_slos is deprecated");
    }

    #[test]
    fn test_empty_tree_is_a_valid_data_source_config() {
        let schema = get_schema("datadog_service_level_objectives").unwrap();
        assert!(check_tree("datadog_service_level_objectives", schema, &Value::Null).is_empty());
    }
}
