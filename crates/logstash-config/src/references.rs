//! Access to the ConfigMaps and Secrets a Logstash resource references
//!
//! [`ReferenceClient`] abstracts where referenced objects come from so a
//! reconcile pass can run against a live cluster ([`KubeReferenceClient`]) or
//! against manifests loaded from disk ([`StaticReferences`]).

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{Client, ResourceExt};
use serde_json::Value;
use tracing::debug;

use logstash_common::crd::DEFAULT_NAMESPACE;
use logstash_common::kube_utils::{
    get_config_map_data, get_secret_data, secret_string_data, CONFIG_MAP_KIND, SECRET_KIND,
};
use logstash_common::yaml::parse_yaml_multi;
use logstash_common::Error;

/// String data of a ConfigMap or Secret
pub type ReferenceData = BTreeMap<String, String>;

/// Reads referenced ConfigMaps and Secrets.
///
/// A missing object is an error, never an empty map.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceClient: Send + Sync {
    /// Read the `data` of a ConfigMap
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ReferenceData, Error>;

    /// Read the decoded data of a Secret
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<ReferenceData, Error>;
}

/// Reads references from the Kubernetes API
#[derive(Clone)]
pub struct KubeReferenceClient {
    client: Client,
}

impl KubeReferenceClient {
    /// Wrap a kube client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReferenceClient for KubeReferenceClient {
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ReferenceData, Error> {
        get_config_map_data(&self.client, namespace, name).await
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<ReferenceData, Error> {
        get_secret_data(&self.client, namespace, name).await
    }
}

type ObjectKey = (String, String);

/// In-memory references, typically loaded from a multi-document manifest
#[derive(Clone, Debug, Default)]
pub struct StaticReferences {
    config_maps: HashMap<ObjectKey, ReferenceData>,
    secrets: HashMap<ObjectKey, ReferenceData>,
}

impl StaticReferences {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every ConfigMap and Secret from a multi-document YAML manifest.
    ///
    /// Documents of other kinds are skipped. Objects without a namespace land
    /// in `default`.
    pub fn from_manifests(origin: &str, yaml: &str) -> Result<Self, Error> {
        let mut references = Self::new();
        for doc in parse_yaml_multi(origin, yaml)? {
            let kind = doc.get("kind").and_then(Value::as_str).unwrap_or_default();
            match kind {
                SECRET_KIND => {
                    let secret: Secret = serde_json::from_value(doc)
                        .map_err(|e| Error::parse(origin, format!("invalid Secret: {}", e)))?;
                    let namespace = secret
                        .namespace()
                        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
                    let data = secret_string_data(&secret);
                    references.insert_secret(namespace, secret.name_any(), data);
                }
                CONFIG_MAP_KIND => {
                    let config_map: ConfigMap = serde_json::from_value(doc)
                        .map_err(|e| Error::parse(origin, format!("invalid ConfigMap: {}", e)))?;
                    let namespace = config_map
                        .namespace()
                        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
                    let name = config_map.name_any();
                    references.insert_config_map(
                        namespace,
                        name,
                        config_map.data.unwrap_or_default(),
                    );
                }
                other => debug!(origin, kind = other, "skipping manifest document"),
            }
        }
        Ok(references)
    }

    /// Add or replace a Secret
    pub fn insert_secret(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: ReferenceData,
    ) {
        self.secrets.insert((namespace.into(), name.into()), data);
    }

    /// Add or replace a ConfigMap
    pub fn insert_config_map(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: ReferenceData,
    ) {
        self.config_maps.insert((namespace.into(), name.into()), data);
    }

    /// Builder form of [`StaticReferences::insert_secret`]
    pub fn with_secret(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        self.insert_secret(namespace, name, to_data(data));
        self
    }

    /// Builder form of [`StaticReferences::insert_config_map`]
    pub fn with_config_map(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        self.insert_config_map(namespace, name, to_data(data));
        self
    }

    fn lookup(
        objects: &HashMap<ObjectKey, ReferenceData>,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> Result<ReferenceData, Error> {
        objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::reference(kind, namespace, name, "not found"))
    }
}

fn to_data(pairs: &[(&str, &str)]) -> ReferenceData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[async_trait]
impl ReferenceClient for StaticReferences {
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ReferenceData, Error> {
        Self::lookup(&self.config_maps, CONFIG_MAP_KIND, namespace, name)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<ReferenceData, Error> {
        Self::lookup(&self.secrets, SECRET_KIND, namespace, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logstash_common::ErrorKind;

    const MANIFESTS: &str = r#"
apiVersion: v1
kind: Secret
metadata:
  name: ls-keystore
  namespace: observability
data:
  KS_PASS: czNjcjN0
---
apiVersion: v1
kind: Secret
metadata:
  name: ls-env
stringData:
  USER: elastic
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: ls-vars
  namespace: observability
data:
  LOG_LEVEL: debug
---
apiVersion: v1
kind: Service
metadata:
  name: ignored
"#;

    #[tokio::test]
    async fn manifests_load_secrets_and_config_maps() {
        let refs = StaticReferences::from_manifests("refs.yaml", MANIFESTS).unwrap();

        let keystore = refs.get_secret("observability", "ls-keystore").await.unwrap();
        assert_eq!(keystore.get("KS_PASS").map(String::as_str), Some("s3cr3t"));

        let env = refs.get_secret(DEFAULT_NAMESPACE, "ls-env").await.unwrap();
        assert_eq!(env.get("USER").map(String::as_str), Some("elastic"));

        let vars = refs.get_config_map("observability", "ls-vars").await.unwrap();
        assert_eq!(vars.get("LOG_LEVEL").map(String::as_str), Some("debug"));
    }

    #[tokio::test]
    async fn missing_reference_names_kind_and_object() {
        let refs = StaticReferences::new().with_secret("ns", "present", &[("a", "b")]);

        let err = refs.get_secret("ns", "absent").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert!(err.to_string().contains("Secret ns/absent"));

        // A Secret of the same name does not satisfy a ConfigMap lookup
        let err = refs.get_config_map("ns", "present").await.unwrap_err();
        assert!(err.to_string().contains("ConfigMap ns/present"));
    }

    #[test]
    fn malformed_manifest_is_parse_error() {
        let err = StaticReferences::from_manifests("refs.yaml", "kind: Secret\ndata: [").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("refs.yaml"));
    }
}
