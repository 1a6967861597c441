//! Ordered pipeline definitions for `pipelines.yml`
//!
//! Unlike the settings tree, pipeline definitions keep dotted keys flat
//! (`pipeline.id` is a single key) and order is significant: merging
//! concatenates and rendering preserves the outer sequence.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use logstash_common::yaml::parse_yaml_bytes;
use logstash_common::{Error, PIPELINES_FILE_NAME};

use crate::settings::ConfigValue;

/// A single pipeline's settings
pub type PipelineDefinition = BTreeMap<String, ConfigValue>;

/// Ordered list of pipeline definitions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelinesConfig {
    definitions: Vec<PipelineDefinition>,
}

/// How two pipeline sets differ
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelinesDiff {
    /// The sets hold a different number of pipelines
    #[error("pipeline count differs: {left} vs {right}")]
    Length {
        /// Pipelines on the left side
        left: usize,
        /// Pipelines on the right side
        right: usize,
    },

    /// Same count, but some pipelines differ
    #[error("pipelines differ at indices {indices:?}")]
    Content {
        /// Every index whose definitions are not deep-equal
        indices: Vec<usize>,
        /// The differing definitions as (left, right) pairs, in index order
        mismatches: Vec<(PipelineDefinition, PipelineDefinition)>,
    },
}

impl PipelinesConfig {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-built definitions
    pub fn from_definitions(definitions: Vec<PipelineDefinition>) -> Self {
        Self { definitions }
    }

    /// Build from a JSON sequence of mappings; `null` yields an empty set
    pub fn from_json(origin: &str, value: &Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| definition_from_json(origin, index, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::from_definitions),
            other => Err(Error::parse(
                origin,
                format!(
                    "expected a sequence of pipelines, found {}",
                    ConfigValue::from_json(other).kind()
                ),
            )),
        }
    }

    /// Parse `pipelines.yml` content
    pub fn parse(yaml: &[u8]) -> Result<Self, Error> {
        let value = parse_yaml_bytes(PIPELINES_FILE_NAME, yaml)?;
        Self::from_json(PIPELINES_FILE_NAME, &value)
    }

    /// The definitions, in order
    pub fn definitions(&self) -> &[PipelineDefinition] {
        &self.definitions
    }

    /// Number of pipelines
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True if no pipelines are defined
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Append every source's pipelines, left to right. `None` sources are skipped.
    pub fn merge_with(&mut self, sources: &[Option<&PipelinesConfig>]) {
        for source in sources.iter().flatten() {
            self.definitions.extend(source.definitions.iter().cloned());
        }
    }

    /// Render as a top-level YAML sequence, keys sorted within each pipeline
    pub fn render(&self) -> Result<Vec<u8>, Error> {
        serde_yaml::to_string(&self.definitions)
            .map(String::into_bytes)
            .map_err(|e| Error::render(PIPELINES_FILE_NAME, e.to_string()))
    }

    /// Compare against `other` element by element
    pub fn diff(&self, other: &PipelinesConfig) -> Result<(), PipelinesDiff> {
        if self.len() != other.len() {
            return Err(PipelinesDiff::Length {
                left: self.len(),
                right: other.len(),
            });
        }
        let (indices, mismatches): (Vec<_>, Vec<_>) = self
            .definitions
            .iter()
            .zip(&other.definitions)
            .enumerate()
            .filter(|(_, (left, right))| left != right)
            .map(|(index, (left, right))| (index, (left.clone(), right.clone())))
            .unzip();
        if indices.is_empty() {
            Ok(())
        } else {
            Err(PipelinesDiff::Content {
                indices,
                mismatches,
            })
        }
    }
}

fn definition_from_json(
    origin: &str,
    index: usize,
    item: &Value,
) -> Result<PipelineDefinition, Error> {
    match ConfigValue::from_json(item) {
        ConfigValue::Mapping(map) => Ok(map),
        other => Err(Error::parse(
            origin,
            format!("pipeline {} must be a mapping, found {}", index, other.kind()),
        )),
    }
}
