//! Error types for the Logstash configuration engine
//!
//! Every variant carries the names and values an operator needs to fix the
//! problem from the resource status alone (secret names, keys, settings).
//! All of them abort the current reconcile pass; retrying is left to the
//! surrounding control loop.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for configuration resolution
#[derive(Debug, Error)]
pub enum Error {
    /// A settings or pipelines source could not be parsed
    #[error("failed to parse {origin}: {message}")]
    Parse {
        /// Where the malformed input came from (e.g. "logstash.yml", "spec.config")
        origin: String,
        /// Description of what's malformed
        message: String,
    },

    /// Two merge operands have incompatible shapes at the same key
    #[error("cannot merge setting '{key}': {message}")]
    Merge {
        /// Dotted path of the conflicting key
        key: String,
        /// Description of the conflict
        message: String,
    },

    /// A referenced ConfigMap or Secret could not be read
    #[error("failed to read {kind} {namespace}/{name}: {message}")]
    Reference {
        /// Resource kind ("Secret" or "ConfigMap")
        kind: String,
        /// Namespace of the referenced resource
        namespace: String,
        /// Name of the referenced resource
        name: String,
        /// Description of what failed
        message: String,
    },

    /// The API service TLS state disagrees with `api.ssl.enabled`
    #[error(
        "API Service `spec.services.tls.selfSignedCertificate.disabled` is set to `{}`, but logstash config `api.ssl.enabled` is set to `{}`",
        tls_disabled(.desired_tls),
        .ssl_enabled
    )]
    Consistency {
        /// Whether the fronting service terminates TLS
        desired_tls: bool,
        /// Resolved `api.ssl.enabled` value
        ssl_enabled: String,
    },

    /// Serialization of a rendered artifact failed
    #[error("failed to render {artifact}: {message}")]
    Render {
        /// The artifact being rendered ("logstash.yml", "pipelines.yml")
        artifact: String,
        /// Description of what failed
        message: String,
    },

    /// The resource spec is invalid (e.g. mutually exclusive fields set)
    #[error("validation error for {instance}: {message}")]
    Validation {
        /// Name of the Logstash instance
        instance: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g. "spec.configRef")
        field: Option<String>,
    },

    /// Kubernetes client construction error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },
}

fn tls_disabled(desired_tls: &bool) -> bool {
    !*desired_tls
}

/// Coarse classification of an [`Error`], used for status reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source
    Parse,
    /// Structurally incompatible merge operands
    Merge,
    /// Unreachable or missing referenced ConfigMap/Secret
    Reference,
    /// TLS posture mismatch
    Consistency,
    /// Serialization failure
    Render,
    /// Invalid spec
    Validation,
    /// Cluster client failure
    Kube,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Parse => "ParseError",
            Self::Merge => "MergeError",
            Self::Reference => "ReferenceError",
            Self::Consistency => "ConsistencyError",
            Self::Render => "RenderError",
            Self::Validation => "ValidationError",
            Self::Kube => "KubeError",
        };
        write!(f, "{}", s)
    }
}

impl Error {
    /// Create a parse error for the given origin
    pub fn parse(origin: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: msg.into(),
        }
    }

    /// Create a merge error at the given dotted key path
    pub fn merge(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Merge {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Create a reference error for a referenced resource
    pub fn reference(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Reference {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create a TLS consistency error
    pub fn consistency(desired_tls: bool, ssl_enabled: impl Into<String>) -> Self {
        Self::Consistency {
            desired_tls,
            ssl_enabled: ssl_enabled.into(),
        }
    }

    /// Create a render error for the given artifact
    pub fn render(artifact: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Render {
            artifact: artifact.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error without instance context
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            instance: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with instance context and field path
    pub fn validation_for_field(
        instance: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            instance: instance.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Merge { .. } => ErrorKind::Merge,
            Error::Reference { .. } => ErrorKind::Reference,
            Error::Consistency { .. } => ErrorKind::Consistency,
            Error::Render { .. } => ErrorKind::Render,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Kube { .. } => ErrorKind::Kube,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: errors an operator reads off the resource status
    // ==========================================================================

    /// Story: A dangling secret reference names the secret and its namespace
    #[test]
    fn story_missing_secret_is_diagnosable() {
        let err = Error::reference("Secret", "observability", "ls-keystore", "not found");
        let msg = err.to_string();
        assert!(msg.contains("Secret"));
        assert!(msg.contains("observability/ls-keystore"));
        assert!(msg.contains("not found"));
        assert_eq!(err.kind(), ErrorKind::Reference);
    }

    /// Story: A TLS mismatch shows both the service flag and the setting
    #[test]
    fn story_tls_mismatch_names_both_values() {
        let err = Error::consistency(true, "false");
        let msg = err.to_string();
        assert!(msg.contains("selfSignedCertificate.disabled` is set to `false`"));
        assert!(msg.contains("`api.ssl.enabled` is set to `false`"));

        let err = Error::consistency(false, "true");
        let msg = err.to_string();
        assert!(msg.contains("selfSignedCertificate.disabled` is set to `true`"));
        assert!(msg.contains("`api.ssl.enabled` is set to `true`"));
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[test]
    fn merge_error_names_key() {
        let err = Error::merge("api.http", "cannot merge mapping with string");
        assert!(err.to_string().contains("'api.http'"));
        assert_eq!(err.kind(), ErrorKind::Merge);
    }

    #[test]
    fn parse_and_render_errors_name_origin() {
        let err = Error::parse("logstash.yml", "did not find expected key");
        assert!(err.to_string().starts_with("failed to parse logstash.yml"));
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = Error::render("pipelines.yml", "boom");
        assert!(err.to_string().contains("pipelines.yml"));
        assert_eq!(err.kind(), ErrorKind::Render);
    }

    #[test]
    fn validation_error_carries_field() {
        match Error::validation_for_field("ls", "spec.configRef", "config and configRef are exclusive") {
            Error::Validation {
                instance, field, ..
            } => {
                assert_eq!(instance, "ls");
                assert_eq!(field.as_deref(), Some("spec.configRef"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(Error::validation("bad")
            .to_string()
            .contains(UNKNOWN_CONTEXT));
    }

    #[test]
    fn kind_display_matches_taxonomy() {
        assert_eq!(ErrorKind::Parse.to_string(), "ParseError");
        assert_eq!(ErrorKind::Merge.to_string(), "MergeError");
        assert_eq!(ErrorKind::Reference.to_string(), "ReferenceError");
        assert_eq!(ErrorKind::Consistency.to_string(), "ConsistencyError");
        assert_eq!(ErrorKind::Render.to_string(), "RenderError");
    }
}
