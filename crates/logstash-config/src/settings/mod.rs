//! Hierarchical settings tree for `logstash.yml`
//!
//! Dotted keys are canonicalised into nested mappings on construction, so
//! `api.http.host: x` and `api: {http: {host: x}}` build the same tree. The
//! tree renders with sorted keys: logically equal trees always produce the
//! same bytes, which the change-detection digest relies on.

mod value;

use std::collections::BTreeMap;

use serde_json::Value;

use logstash_common::yaml::parse_yaml_bytes;
use logstash_common::{Error, CONFIG_FILE_NAME};

pub use value::ConfigValue;
use value::{join_path, merge_mappings};

/// Canonical settings tree
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalConfig {
    root: BTreeMap<String, ConfigValue>,
}

impl CanonicalConfig {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a JSON value (e.g. the inline `spec.config`).
    ///
    /// `null` yields an empty tree; any other non-mapping is a parse error.
    pub fn from_json(origin: &str, value: &Value) -> Result<Self, Error> {
        Self::from_value(origin, &ConfigValue::from_json(value))
    }

    /// Build a tree from a config value, splitting dotted keys
    pub fn from_value(origin: &str, value: &ConfigValue) -> Result<Self, Error> {
        match canonicalize(origin, value)? {
            ConfigValue::Null => Ok(Self::new()),
            ConfigValue::Mapping(root) => Ok(Self { root }),
            other => Err(Error::parse(
                origin,
                format!("expected a mapping at the top level, found {}", other.kind()),
            )),
        }
    }

    /// Parse `logstash.yml` content
    pub fn parse(yaml: &[u8]) -> Result<Self, Error> {
        let value = parse_yaml_bytes(CONFIG_FILE_NAME, yaml)?;
        Self::from_json(CONFIG_FILE_NAME, &value)
    }

    /// Builder form of [`CanonicalConfig::set`]
    pub fn with(mut self, dotted_key: &str, value: impl Into<ConfigValue>) -> Self {
        self.set(dotted_key, value);
        self
    }

    /// Set `dotted_key` to `value`, replacing whatever is on the path
    pub fn set(&mut self, dotted_key: &str, value: impl Into<ConfigValue>) {
        let mut segments = dotted_key.split('.').peekable();
        let mut node = &mut self.root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                node.insert(segment.to_string(), value.into());
                return;
            }
            let child = node
                .entry(segment.to_string())
                .or_insert_with(|| ConfigValue::Mapping(BTreeMap::new()));
            if !matches!(child, ConfigValue::Mapping(_)) {
                *child = ConfigValue::Mapping(BTreeMap::new());
            }
            let ConfigValue::Mapping(map) = child else {
                return;
            };
            node = map;
        }
    }

    /// Merge `sources` into this tree, left to right; later sources win.
    ///
    /// `None` sources are skipped. On error the tree is left unchanged.
    pub fn merge_with(&mut self, sources: &[Option<&CanonicalConfig>]) -> Result<(), Error> {
        let mut merged = self.root.clone();
        for source in sources.iter().flatten() {
            merge_mappings(&mut merged, &source.root, "")?;
        }
        self.root = merged;
        Ok(())
    }

    /// Look up a dotted key
    pub fn lookup(&self, dotted_key: &str) -> Option<&ConfigValue> {
        let mut segments = dotted_key.split('.');
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |node, segment| {
            node.as_mapping().and_then(|map| map.get(segment))
        })
    }

    /// Look up a dotted key and return its scalar value as text
    pub fn lookup_string(&self, dotted_key: &str) -> Option<String> {
        self.lookup(dotted_key).and_then(ConfigValue::as_text)
    }

    /// True if the tree holds no settings
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Render the tree as YAML with sorted keys
    pub fn render(&self) -> Result<Vec<u8>, Error> {
        serde_yaml::to_string(&self.root)
            .map(String::into_bytes)
            .map_err(|e| Error::render(CONFIG_FILE_NAME, e.to_string()))
    }
}

/// Split dotted keys into nested mappings, recursively
fn canonicalize(origin: &str, value: &ConfigValue) -> Result<ConfigValue, Error> {
    match value {
        ConfigValue::Mapping(map) => {
            let mut out: BTreeMap<String, ConfigValue> = BTreeMap::new();
            for (key, child) in map {
                let child = canonicalize(origin, child)?;
                let mut segments = key.split('.').collect::<Vec<_>>();
                let head = segments.remove(0);
                let nested = segments.iter().rev().fold(child, |acc, segment| {
                    ConfigValue::Mapping(BTreeMap::from([(segment.to_string(), acc)]))
                });
                match out.get_mut(head) {
                    Some(existing) => existing
                        .merge(&nested, &join_path("", head))
                        .map_err(|e| Error::parse(origin, format!("duplicate setting: {}", e)))?,
                    None => {
                        out.insert(head.to_string(), nested);
                    }
                }
            }
            Ok(ConfigValue::Mapping(out))
        }
        ConfigValue::Sequence(items) => items
            .iter()
            .map(|item| canonicalize(origin, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigValue::Sequence),
        scalar => Ok(scalar.clone()),
    }
}
