//! YAML parsing utilities using yaml-rust2
//!
//! Settings and pipeline sources arrive as YAML (from a referenced Secret or a
//! manifest file). They are parsed into `serde_json::Value` so inline spec
//! values and Secret-held values share one conversion path downstream.

use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

use crate::Error;

/// Parse YAML bytes coming from `origin` into a `serde_json::Value`.
///
/// For multi-document YAML, returns only the first document.
/// Returns `Value::Null` for empty input.
pub fn parse_yaml_bytes(origin: &str, input: &[u8]) -> Result<Value, Error> {
    let text = std::str::from_utf8(input)
        .map_err(|e| Error::parse(origin, format!("invalid UTF-8: {}", e)))?;
    parse_yaml(origin, text)
}

/// Parse a YAML string into a `serde_json::Value`.
///
/// For multi-document YAML, returns only the first document.
/// Returns `Value::Null` for empty input.
pub fn parse_yaml(origin: &str, input: &str) -> Result<Value, Error> {
    let docs = YamlLoader::load_from_str(input).map_err(|e| Error::parse(origin, e.to_string()))?;
    match docs.into_iter().next() {
        Some(doc) => yaml_to_json(origin, doc),
        None => Ok(Value::Null),
    }
}

/// Parse a multi-document YAML string into a Vec of `serde_json::Value`s.
///
/// Each YAML document separated by `---` becomes a separate Value. Empty
/// documents are dropped.
pub fn parse_yaml_multi(origin: &str, input: &str) -> Result<Vec<Value>, Error> {
    let docs = YamlLoader::load_from_str(input).map_err(|e| Error::parse(origin, e.to_string()))?;
    docs.into_iter()
        .map(|doc| yaml_to_json(origin, doc))
        .filter(|doc| !matches!(doc, Ok(Value::Null)))
        .collect()
}

fn yaml_to_json(origin: &str, yaml: Yaml) -> Result<Value, Error> {
    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Boolean(b) => Ok(Value::Bool(b)),
        Yaml::Integer(i) => Ok(Value::Number(i.into())),
        Yaml::Real(s) => {
            let f: f64 = s
                .parse()
                .map_err(|e: std::num::ParseFloatError| Error::parse(origin, e.to_string()))?;
            Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| Error::parse(origin, format!("non-finite number: {}", s)))
        }
        Yaml::String(s) => Ok(Value::String(s)),
        Yaml::Array(arr) => arr
            .into_iter()
            .map(|v| yaml_to_json(origin, v))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Hash(map) => map
            .into_iter()
            .map(|(k, v)| {
                let key = match k {
                    Yaml::String(s) => s,
                    Yaml::Integer(i) => i.to_string(),
                    Yaml::Real(r) => r,
                    Yaml::Boolean(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    _ => return Err(Error::parse(origin, "unsupported YAML key type")),
                };
                yaml_to_json(origin, v).map(|v| (key, v))
            })
            .collect::<Result<Map<String, Value>, _>>()
            .map(Value::Object),
        Yaml::Alias(_) => Err(Error::parse(origin, "YAML aliases not supported")),
        Yaml::BadValue => Err(Error::parse(origin, "bad YAML value")),
    }
}
