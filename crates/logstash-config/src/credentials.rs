//! Credential map used to resolve placeholders
//!
//! Sources, lowest precedence first:
//! 1. `env` of the `logstash` container
//! 2. `envFrom` entries in list order; within one entry the ConfigMap is
//!    applied before the Secret
//! 3. `spec.secureSettings` Secrets in list order
//!
//! A later source overwrites an earlier one on key collision. Every
//! referenced object must exist; a dangling reference fails the pass.

use std::collections::BTreeMap;

use kube::ResourceExt;
use tracing::{debug, instrument};

use logstash_common::crd::Logstash;
use logstash_common::Error;

use crate::references::{ReferenceClient, ReferenceData};

/// Name to value map of every credential visible to Logstash
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `name`, if any source defines it
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no source contributed anything
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set one value, overwriting a lower-precedence one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Apply a whole source on top of the current values
    pub fn overlay(&mut self, source: ReferenceData) {
        self.values.extend(source);
    }
}

// Values are never printed.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Build the credential map for `logstash` from all sources
#[instrument(skip_all, fields(logstash = %logstash.name_any()))]
pub async fn collect_credentials(
    logstash: &Logstash,
    client: &dyn ReferenceClient,
) -> Result<Credentials, Error> {
    let namespace = logstash.namespace_or_default();
    let mut credentials = Credentials::new();

    if let Some(container) = logstash.logstash_container() {
        for env in container.env.iter().flatten() {
            // valueFrom entries are not dereferenced
            credentials.insert(env.name.clone(), env.value.clone().unwrap_or_default());
        }

        for env_from in container.env_from.iter().flatten() {
            if let Some(config_map_ref) = &env_from.config_map_ref {
                let data = client
                    .get_config_map(&namespace, &config_map_ref.name)
                    .await?;
                debug!(config_map = %config_map_ref.name, keys = data.len(), "imported env from config map");
                credentials.overlay(data);
            }
            if let Some(secret_ref) = &env_from.secret_ref {
                let data = client.get_secret(&namespace, &secret_ref.name).await?;
                debug!(secret = %secret_ref.name, keys = data.len(), "imported env from secret");
                credentials.overlay(data);
            }
        }
    }

    for source in logstash.secure_settings() {
        let data = client.get_secret(&namespace, &source.secret_name).await?;
        debug!(secret = %source.secret_name, keys = data.len(), "imported keystore secret");
        credentials.overlay(data);
    }

    debug!(names = credentials.len(), "collected credentials");
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::{MockReferenceClient, StaticReferences};
    use logstash_common::ErrorKind;
    use mockall::predicate::eq;

    fn logstash(yaml: &str) -> Logstash {
        serde_yaml::from_str(yaml).expect("valid Logstash manifest")
    }

    const WITH_ALL_SOURCES: &str = r#"
apiVersion: logstash.k8s.elastic.co/v1alpha1
kind: Logstash
metadata:
  name: ls
  namespace: ns
spec:
  secureSettings:
    - secretName: keystore
  podTemplate:
    spec:
      containers:
        - name: logstash
          env:
            - name: KS_PASS
              value: from-env
            - name: ONLY_ENV
              value: env
            - name: FROM_FIELD
              valueFrom:
                fieldRef:
                  fieldPath: metadata.name
          envFrom:
            - configMapRef:
                name: vars
            - secretRef:
                name: env-secret
"#;

    /// Story: a keystore secret overrides the same name coming from envFrom
    #[tokio::test]
    async fn story_keystore_beats_env_from_secret() {
        let refs = StaticReferences::new()
            .with_config_map("ns", "vars", &[("KS_PASS", "from-config-map"), ("ONLY_CM", "cm")])
            .with_secret("ns", "env-secret", &[("KS_PASS", "from-env-secret"), ("ONLY_SECRET", "s")])
            .with_secret("ns", "keystore", &[("KS_PASS", "s3cr3t")]);

        let credentials = collect_credentials(&logstash(WITH_ALL_SOURCES), &refs)
            .await
            .unwrap();

        assert_eq!(credentials.get("KS_PASS"), Some("s3cr3t"));
        assert_eq!(credentials.get("ONLY_ENV"), Some("env"));
        assert_eq!(credentials.get("ONLY_CM"), Some("cm"));
        assert_eq!(credentials.get("ONLY_SECRET"), Some("s"));
        assert_eq!(credentials.get("FROM_FIELD"), Some(""));
    }

    /// Story: without a keystore, an envFrom secret beats the literal env
    #[tokio::test]
    async fn story_env_from_beats_literal_env() {
        let refs = StaticReferences::new()
            .with_config_map("ns", "vars", &[])
            .with_secret("ns", "env-secret", &[("KS_PASS", "from-env-secret")])
            .with_secret("ns", "keystore", &[]);

        let credentials = collect_credentials(&logstash(WITH_ALL_SOURCES), &refs)
            .await
            .unwrap();
        assert_eq!(credentials.get("KS_PASS"), Some("from-env-secret"));
    }

    #[tokio::test]
    async fn env_from_entries_apply_in_list_order() {
        let ls = logstash(
            r#"
apiVersion: logstash.k8s.elastic.co/v1alpha1
kind: Logstash
metadata:
  name: ls
  namespace: ns
spec:
  podTemplate:
    spec:
      containers:
        - name: logstash
          envFrom:
            - secretRef:
                name: first
            - configMapRef:
                name: second
            - configMapRef:
                name: both
              secretRef:
                name: both
"#,
        );
        let refs = StaticReferences::new()
            .with_secret("ns", "first", &[("A", "secret"), ("B", "secret")])
            .with_config_map("ns", "second", &[("A", "config-map")])
            .with_config_map("ns", "both", &[("B", "config-map"), ("C", "config-map")])
            .with_secret("ns", "both", &[("C", "secret")]);

        let credentials = collect_credentials(&ls, &refs).await.unwrap();
        assert_eq!(credentials.get("A"), Some("config-map"));
        assert_eq!(credentials.get("B"), Some("config-map"));
        assert_eq!(credentials.get("C"), Some("secret"));
    }

    #[tokio::test]
    async fn dangling_reference_fails() {
        let refs = StaticReferences::new()
            .with_config_map("ns", "vars", &[])
            .with_secret("ns", "env-secret", &[]);

        let err = collect_credentials(&logstash(WITH_ALL_SOURCES), &refs)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert!(err.to_string().contains("ns/keystore"));
    }

    #[tokio::test]
    async fn no_container_reads_only_keystore() {
        let ls = logstash(
            r#"
apiVersion: logstash.k8s.elastic.co/v1alpha1
kind: Logstash
metadata:
  name: ls
spec:
  secureSettings:
    - secretName: keystore
"#,
        );
        let mut client = MockReferenceClient::new();
        client.expect_get_config_map().never();
        client
            .expect_get_secret()
            .with(eq("default"), eq("keystore"))
            .times(1)
            .returning(|_, _| Ok(BTreeMap::from([("KS_PASS".to_string(), "s3cr3t".to_string())])));

        let credentials = collect_credentials(&ls, &client).await.unwrap();
        assert_eq!(credentials.get("KS_PASS"), Some("s3cr3t"));
        assert_eq!(credentials.len(), 1);
    }

    #[test]
    fn debug_hides_values() {
        let mut credentials = Credentials::new();
        credentials.insert("KS_PASS", "s3cr3t");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("KS_PASS"));
        assert!(!rendered.contains("s3cr3t"));
    }
}
