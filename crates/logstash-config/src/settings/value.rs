//! Tagged configuration value
//!
//! Merge semantics per variant pairing:
//!
//! | existing \ incoming | Mapping      | Sequence      | scalar        |
//! |---------------------|--------------|---------------|---------------|
//! | Mapping             | key-wise     | conflict      | conflict      |
//! | Sequence            | conflict     | concatenation | conflict      |
//! | scalar              | conflict     | conflict      | incoming wins |
//!
//! `Null` is a scalar. Equality is structural; values of different variants
//! are never equal.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use logstash_common::Error;

/// A configuration value
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConfigValue {
    /// Explicit null / empty value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or float
    Number(Number),
    /// String
    String(String),
    /// Ordered list
    Sequence(Vec<ConfigValue>),
    /// Key/value mapping; rendered in key order
    Mapping(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Variant name, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// True for Sequence and Mapping
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Textual form of a scalar (`true`, `9600`, ...). `Null` reads as the
    /// empty string; containers have no textual form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Sequence(_) | Self::Mapping(_) => None,
        }
    }

    /// The inner mapping, if this is one
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Convert a JSON value verbatim; keys are not split on dots.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Merge `incoming` into `self` at the dotted key `path`
    pub fn merge(&mut self, incoming: &ConfigValue, path: &str) -> Result<(), Error> {
        match (self, incoming) {
            (Self::Mapping(target), Self::Mapping(source)) => merge_mappings(target, source, path),
            (Self::Sequence(target), Self::Sequence(source)) => {
                target.extend(source.iter().cloned());
                Ok(())
            }
            (existing, incoming) if existing.is_container() || incoming.is_container() => {
                Err(Error::merge(
                    display_path(path),
                    format!(
                        "cannot merge {} with {}",
                        existing.kind(),
                        incoming.kind()
                    ),
                ))
            }
            (existing, incoming) => {
                *existing = incoming.clone();
                Ok(())
            }
        }
    }
}

/// Merge every key of `source` into `target` below `path`
pub(crate) fn merge_mappings(
    target: &mut BTreeMap<String, ConfigValue>,
    source: &BTreeMap<String, ConfigValue>,
    path: &str,
) -> Result<(), Error> {
    for (key, incoming) in source {
        let key_path = join_path(path, key);
        match target.get_mut(key) {
            Some(existing) => existing.merge(incoming, &key_path)?,
            None => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
    Ok(())
}

pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(items) => items.serialize(serializer),
            Self::Mapping(map) => map.serialize(serializer),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        Self::Sequence(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logstash_common::ErrorKind;
    use serde_json::json;

    fn mapping(entries: &[(&str, ConfigValue)]) -> ConfigValue {
        ConfigValue::Mapping(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn scalars_last_writer_wins() {
        let mut value = ConfigValue::from("a");
        value.merge(&ConfigValue::from(true), "x").unwrap();
        assert_eq!(value, ConfigValue::Bool(true));

        value.merge(&ConfigValue::Null, "x").unwrap();
        assert_eq!(value, ConfigValue::Null);
    }

    #[test]
    fn sequences_concatenate_lower_first() {
        let mut value = ConfigValue::from(vec!["a".into(), "b".into()]);
        value
            .merge(&ConfigValue::from(vec!["c".into()]), "list")
            .unwrap();
        assert_eq!(
            value,
            ConfigValue::from(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn mappings_merge_key_wise() {
        let mut value = mapping(&[("a", 1.into()), ("b", 2.into())]);
        value
            .merge(&mapping(&[("b", 3.into()), ("c", 4.into())]), "")
            .unwrap();
        assert_eq!(
            value,
            mapping(&[("a", 1.into()), ("b", 3.into()), ("c", 4.into())])
        );
    }

    #[test]
    fn mapping_against_scalar_conflicts() {
        let mut value = mapping(&[("a", 1.into())]);
        let err = value.merge(&ConfigValue::from("flat"), "api").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Merge);
        assert!(err.to_string().contains("'api'"));
        assert!(err.to_string().contains("mapping with string"));

        let mut value = ConfigValue::from("flat");
        assert!(value.merge(&mapping(&[("a", 1.into())]), "api").is_err());
    }

    #[test]
    fn sequence_against_non_sequence_conflicts() {
        let mut value = ConfigValue::from(vec!["a".into()]);
        assert!(value.merge(&ConfigValue::from("b"), "list").is_err());

        let mut value = ConfigValue::from(vec!["a".into()]);
        assert!(value.merge(&mapping(&[]), "list").is_err());

        let mut value = ConfigValue::Null;
        assert!(value
            .merge(&ConfigValue::from(vec!["a".into()]), "list")
            .is_err());
    }

    #[test]
    fn conflict_path_points_at_nested_key() {
        let mut value = mapping(&[("api", mapping(&[("http", mapping(&[]))]))]);
        let incoming = mapping(&[("api", mapping(&[("http", "x".into())]))]);
        let err = value.merge(&incoming, "").unwrap_err();
        assert!(err.to_string().contains("'api.http'"), "{err}");
    }

    #[test]
    fn mismatched_kinds_are_unequal() {
        assert_ne!(ConfigValue::from("1"), ConfigValue::from(1));
        assert_ne!(ConfigValue::from("true"), ConfigValue::from(true));
        assert_ne!(ConfigValue::Null, ConfigValue::from(""));
        assert_ne!(ConfigValue::Sequence(vec![]), ConfigValue::Mapping(BTreeMap::new()));
    }

    #[test]
    fn text_form_of_scalars() {
        assert_eq!(ConfigValue::from(true).as_text().as_deref(), Some("true"));
        assert_eq!(ConfigValue::from(9600).as_text().as_deref(), Some("9600"));
        assert_eq!(ConfigValue::Null.as_text().as_deref(), Some(""));
        assert_eq!(mapping(&[]).as_text(), None);
    }

    #[test]
    fn from_json_keeps_dotted_keys() {
        let value = ConfigValue::from_json(&json!({"pipeline.id": "main", "workers": [1, 2]}));
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("pipeline.id"), Some(&ConfigValue::from("main")));
        assert_eq!(
            map.get("workers"),
            Some(&ConfigValue::from(vec![1.into(), 2.into()]))
        );
    }
}
