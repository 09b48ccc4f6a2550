//! Unparsed field detection
//!
//! Response models capture every JSON key they do not declare in a flattened
//! [`Extra`] map, and every enum value they do not know in [`Known::Unparsed`].
//! [`check_for_unparsed`] walks a decoded model and reports those paths, so a
//! newer server schema is noticed instead of silently dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Keys present in a response object that the model does not declare
pub type Extra = BTreeMap<String, Value>;

/// A value that is either one the client understands or the raw JSON it could not map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Known<T> {
    Value(T),
    Unparsed(Value),
}

impl<T> Known<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unparsed(_) => None,
        }
    }
}

/// Decoded object that may carry fields the client could not map
pub trait CheckUnparsed {
    /// Push the path of every unmapped field below `path` into `found`
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("object contains unparsed element(s): {}", .paths.join(", "))]
pub struct UnparsedError {
    pub paths: Vec<String>,
}

/// Fail when the decoder observed any field it could not map
pub fn check_for_unparsed<T: CheckUnparsed + ?Sized>(value: &T) -> Result<(), UnparsedError> {
    let mut paths = Vec::new();
    value.collect_unparsed("", &mut paths);
    if paths.is_empty() {
        Ok(())
    } else {
        Err(UnparsedError { paths })
    }
}

/// Path reported for an element that did not decode at all
pub const WHOLE_OBJECT: &str = "(entire object)";

/// Check an element decoded through [`Known`]
///
/// A raw fallback is unparsed as a whole; a decoded element is checked field by field.
pub fn check_known<T: CheckUnparsed>(item: &Known<T>) -> Result<&T, UnparsedError> {
    match item {
        Known::Value(value) => check_for_unparsed(value).map(|()| value),
        Known::Unparsed(_) => Err(UnparsedError {
            paths: vec![WHOLE_OBJECT.to_string()],
        }),
    }
}

/// Join a parent path and a field name
pub fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Report every key of a captured [`Extra`] map
pub fn collect_extra(extra: &Extra, path: &str, found: &mut Vec<String>) {
    found.extend(extra.keys().map(|key| child_path(path, key)));
}

impl<T> CheckUnparsed for Known<T> {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        if let Self::Unparsed(_) = self {
            found.push(path.to_string());
        }
    }
}

impl<T: CheckUnparsed> CheckUnparsed for Option<T> {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        if let Some(inner) = self {
            inner.collect_unparsed(path, found);
        }
    }
}

impl<T: CheckUnparsed> CheckUnparsed for Vec<T> {
    fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
        for (i, item) in self.iter().enumerate() {
            item.collect_unparsed(&format!("{}[{}]", path, i), found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Color {
        Red,
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        color: Option<Known<Color>>,
        #[serde(flatten)]
        extra: Extra,
    }

    impl CheckUnparsed for Sample {
        fn collect_unparsed(&self, path: &str, found: &mut Vec<String>) {
            self.color.collect_unparsed(&child_path(path, "color"), found);
            collect_extra(&self.extra, path, found);
        }
    }

    #[test]
    fn test_known_object_passes() {
        let sample: Sample = serde_json::from_value(json!({"color": "red"})).unwrap();
        assert!(check_for_unparsed(&sample).is_ok());
        assert!(matches!(sample.color, Some(Known::Value(Color::Red))));
    }

    #[test]
    fn test_unknown_enum_value_is_reported() {
        let sample: Sample = serde_json::from_value(json!({"color": "blue"})).unwrap();
        let err = check_for_unparsed(&sample).unwrap_err();
        assert_eq!(err.paths, vec!["color".to_string()]);
    }

    #[test]
    fn test_unknown_keys_are_reported_with_index() {
        let samples: Vec<Sample> =
            serde_json::from_value(json!([{"color": "red"}, {"shade": 3}])).unwrap();
        let err = check_for_unparsed(&samples).unwrap_err();
        assert_eq!(err.paths, vec!["[1].shade".to_string()]);
        assert!(err.to_string().contains("[1].shade"));
    }

    #[test]
    fn test_check_known_flags_raw_elements() {
        let samples: Vec<Known<Sample>> =
            serde_json::from_value(json!([{"color": "red"}, {"color": 7}, {"shade": 3}])).unwrap();

        assert!(check_known(&samples[0]).is_ok());
        assert!(matches!(samples[1], Known::Unparsed(_)));
        assert_eq!(check_known(&samples[1]).unwrap_err().paths, vec![WHOLE_OBJECT.to_string()]);
        assert_eq!(check_known(&samples[2]).unwrap_err().paths, vec!["shade".to_string()]);
    }
}
