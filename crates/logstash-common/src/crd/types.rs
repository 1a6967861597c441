//! Supporting types for the Logstash CRD

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a Secret holding a configuration file under a fixed key
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    /// Name of the Secret in the Logstash namespace
    pub secret_name: String,
}

/// Reference to a Secret used as a keystore source
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretSource {
    /// Name of the Secret in the Logstash namespace
    pub secret_name: String,

    /// Keys to project into the keystore. All keys are used when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<KeyToPath>,
}

/// Projection of a single Secret key
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyToPath {
    /// Key in the Secret
    pub key: String,

    /// Name of the keystore entry (defaults to the key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Service fronting a Logstash port
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogstashService {
    /// Service name; `api` designates the Logstash API service
    pub name: String,

    /// TLS options for the service
    #[serde(default)]
    pub tls: TlsOptions,
}

/// TLS options for a Logstash service
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TlsOptions {
    /// Self-signed certificate settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_signed_certificate: Option<SelfSignedCertificate>,
}

impl TlsOptions {
    /// TLS is on unless the self-signed certificate is explicitly disabled
    pub fn enabled(&self) -> bool {
        !self
            .self_signed_certificate
            .as_ref()
            .is_some_and(|cert| cert.disabled)
    }
}

/// Self-signed certificate settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelfSignedCertificate {
    /// Disable the self-signed certificate, serving plain HTTP
    #[serde(default)]
    pub disabled: bool,
}

/// Lifecycle phase of a Logstash instance
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum LogstashPhase {
    /// Not reconciled yet
    #[default]
    Pending,
    /// Configuration resolved and applied
    Ready,
    /// The last reconcile pass failed; see the status message
    Degraded,
}

impl std::fmt::Display for LogstashPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Ready => write!(f, "Ready"),
            Self::Degraded => write!(f, "Degraded"),
        }
    }
}
