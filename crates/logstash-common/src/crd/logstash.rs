//! Logstash CRD
//!
//! A Logstash resource describes one managed Logstash deployment. Only the
//! fields feeding configuration resolution are modelled here; the pod template
//! is carried through opaquely except for the `logstash` container's env.

use k8s_openapi::api::core::v1::{Container, PodTemplateSpec};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{ConfigSource, LogstashPhase, LogstashService, SecretSource};
use crate::{
    Error, API_SERVICE_NAME, CONFIG_SECRET_SUFFIX, LOGSTASH_CONTAINER_NAME,
    PIPELINES_SECRET_SUFFIX,
};

/// Namespace assumed for resources read from manifests without one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Logstash defines the desired state of a managed Logstash deployment.
///
/// Example:
/// ```yaml
/// apiVersion: logstash.k8s.elastic.co/v1alpha1
/// kind: Logstash
/// metadata:
///   name: quickstart
/// spec:
///   version: 8.12.0
///   config:
///     api.http.host: 0.0.0.0
///     api.ssl.keystore.password: "${KS_PASS:ch@ng3m3}"
///   pipelines:
///     - pipeline.id: main
///       config.string: "input { beats { port => 5044 } }"
///   secureSettings:
///     - secretName: ls-keystore
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "logstash.k8s.elastic.co",
    version = "v1alpha1",
    kind = "Logstash",
    namespaced,
    status = "LogstashStatus",
    shortname = "ls",
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LogstashSpec {
    /// Logstash version
    #[serde(default)]
    pub version: String,

    /// Container image override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Inline `logstash.yml` settings. Exclusive with `configRef`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,

    /// Secret holding `logstash.yml`. Exclusive with `config`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_ref: Option<ConfigSource>,

    /// Inline pipeline definitions. Exclusive with `pipelinesRef`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipelines: Option<Vec<serde_json::Value>>,

    /// Secret holding `pipelines.yml`. Exclusive with `pipelines`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipelines_ref: Option<ConfigSource>,

    /// Secrets whose keys are loaded into the Logstash keystore
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secure_settings: Vec<SecretSource>,

    /// Pod template for the Logstash pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_template: Option<PodTemplateSpec>,

    /// Services fronting Logstash ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<LogstashService>,
}

/// Logstash status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogstashStatus {
    /// Current phase
    #[serde(default)]
    pub phase: LogstashPhase,

    /// Human-readable message; carries the error text verbatim when degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Digest of the configuration last rolled out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    /// Generation observed by the last reconcile pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl LogstashStatus {
    /// Status after a successful pass
    pub fn ready(config_hash: impl Into<String>) -> Self {
        Self {
            phase: LogstashPhase::Ready,
            message: None,
            config_hash: Some(config_hash.into()),
            observed_generation: None,
        }
    }

    /// Status after a failed pass, surfacing the error text verbatim
    pub fn degraded(error: &Error) -> Self {
        Self {
            phase: LogstashPhase::Degraded,
            message: Some(format!("{}: {}", error.kind(), error)),
            config_hash: None,
            observed_generation: None,
        }
    }

    /// Record the observed generation
    pub fn observed(mut self, generation: Option<i64>) -> Self {
        self.observed_generation = generation;
        self
    }
}

impl Logstash {
    /// Namespace of the resource, falling back to `default`
    pub fn namespace_or_default(&self) -> String {
        self.namespace()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    /// Name of the generated Secret holding `logstash.yml`
    pub fn config_secret_name(&self) -> String {
        format!("{}-{}", self.name_any(), CONFIG_SECRET_SUFFIX)
    }

    /// Name of the generated Secret holding `pipelines.yml`
    pub fn pipelines_secret_name(&self) -> String {
        format!("{}-{}", self.name_any(), PIPELINES_SECRET_SUFFIX)
    }

    /// The `logstash` container of the pod template, if declared
    pub fn logstash_container(&self) -> Option<&Container> {
        self.spec
            .pod_template
            .as_ref()
            .and_then(|t| t.spec.as_ref())
            .and_then(|s| s.containers.iter().find(|c| c.name == LOGSTASH_CONTAINER_NAME))
    }

    /// Whether the API service terminates TLS. Defaults to true when no
    /// `api` service is declared.
    pub fn api_uses_tls(&self) -> bool {
        self.spec
            .services
            .iter()
            .find(|s| s.name == API_SERVICE_NAME)
            .map(|s| s.tls.enabled())
            .unwrap_or(true)
    }

    /// Secrets designated as keystore sources
    pub fn secure_settings(&self) -> &[SecretSource] {
        &self.spec.secure_settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn parse(yaml: &str) -> Logstash {
        serde_yaml::from_str(yaml).expect("valid Logstash manifest")
    }

    #[test]
    fn full_manifest_yaml() {
        let ls = parse(
            r#"
apiVersion: logstash.k8s.elastic.co/v1alpha1
kind: Logstash
metadata:
  name: quickstart
  namespace: observability
spec:
  version: 8.12.0
  config:
    api.http.host: 0.0.0.0
  pipelines:
    - pipeline.id: main
      pipeline.workers: 2
  secureSettings:
    - secretName: ls-keystore
  services:
    - name: api
      tls:
        selfSignedCertificate:
          disabled: true
  podTemplate:
    spec:
      containers:
        - name: logstash
          env:
            - name: KS_PASS
              value: from-env
          envFrom:
            - secretRef:
                name: ls-env
"#,
        );

        assert_eq!(ls.namespace_or_default(), "observability");
        assert_eq!(ls.config_secret_name(), "quickstart-ls-config");
        assert_eq!(ls.pipelines_secret_name(), "quickstart-ls-pipeline");
        assert!(!ls.api_uses_tls());
        assert_eq!(ls.secure_settings().len(), 1);
        assert_eq!(ls.spec.pipelines.as_ref().map(Vec::len), Some(1));

        let container = ls.logstash_container().expect("logstash container");
        assert_eq!(container.env.as_ref().map(Vec::len), Some(1));
        assert_eq!(container.env_from.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn defaults_when_fields_absent() {
        let ls = parse(
            r#"
apiVersion: logstash.k8s.elastic.co/v1alpha1
kind: Logstash
metadata:
  name: bare
spec: {}
"#,
        );
        assert_eq!(ls.namespace_or_default(), DEFAULT_NAMESPACE);
        assert!(ls.api_uses_tls());
        assert!(ls.logstash_container().is_none());
        assert!(ls.spec.config.is_none());
        assert!(ls.spec.pipelines.is_none());
    }

    #[test]
    fn other_containers_are_ignored() {
        let ls = parse(
            r#"
apiVersion: logstash.k8s.elastic.co/v1alpha1
kind: Logstash
metadata:
  name: sidecars
spec:
  podTemplate:
    spec:
      containers:
        - name: filebeat
"#,
        );
        assert!(ls.logstash_container().is_none());
    }

    #[test]
    fn status_surfaces_error_text() {
        let err = Error::reference("Secret", "ns", "missing", "not found");
        let status = LogstashStatus::degraded(&err).observed(Some(3));
        assert_eq!(status.phase, LogstashPhase::Degraded);
        let message = status.message.expect("message set");
        assert!(message.starts_with(&ErrorKind::Reference.to_string()));
        assert!(message.contains("ns/missing"));
        assert_eq!(status.observed_generation, Some(3));

        let status = LogstashStatus::ready("0123456789abcdef");
        assert_eq!(status.phase, LogstashPhase::Ready);
        assert_eq!(status.config_hash.as_deref(), Some("0123456789abcdef"));
    }
}
