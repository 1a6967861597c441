//! Configuration resolution for Logstash resources
//!
//! Builds the final `logstash.yml` and `pipelines.yml` for a Logstash
//! resource from layered sources, resolves `${VAR}` placeholders in the API
//! settings against env and keystore secrets, checks the TLS posture, and
//! computes the digest that triggers a rollout when configuration changes.

#![deny(missing_docs)]

pub mod api_server;
pub mod credentials;
pub mod digest;
pub mod pipelines;
pub mod placeholder;
pub mod reconcile;
pub mod references;
pub mod settings;
pub mod tls;

pub use api_server::{ApiField, ApiServer, RESOLVABLE_FIELDS};
pub use credentials::{collect_credentials, Credentials};
pub use digest::ConfigDigest;
pub use pipelines::{PipelineDefinition, PipelinesConfig, PipelinesDiff};
pub use placeholder::{resolve_api_server, Placeholder};
pub use reconcile::{
    reconcile, reconcile_config, reconcile_pipelines, ConfigSecretData, ReconcileParams,
    ReconciledConfig, ReconciledPipelines, ReconciledSettings,
};
pub use references::{KubeReferenceClient, ReferenceClient, StaticReferences};
pub use settings::{CanonicalConfig, ConfigValue};
pub use tls::{check_tls_config, probe_scheme};
