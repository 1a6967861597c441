//! One configuration pass for a Logstash resource
//!
//! A pass builds the settings tree (defaults, then TLS settings, then the
//! user's settings), resolves the API security descriptor, checks it against
//! the service TLS posture, renders `logstash.yml` and `pipelines.yml`, and
//! folds both into the digest that drives pod rollouts. Every failure aborts
//! the pass; nothing is cached between passes.

use std::collections::BTreeMap;

use kube::ResourceExt;
use serde_json::Value;
use tracing::{debug, info, instrument};

use logstash_common::crd::{ConfigSource, Logstash};
use logstash_common::kube_utils::SECRET_KIND;
use logstash_common::{
    api_keystore_path, Error, API_KEYSTORE_DEFAULT_PASS, API_KEYSTORE_PASS_ENV,
    CONFIG_FILE_NAME, CONFIG_HASH_ANNOTATION, PIPELINES_FILE_NAME,
};

use crate::api_server::ApiServer;
use crate::digest::ConfigDigest;
use crate::pipelines::PipelinesConfig;
use crate::placeholder::resolve_api_server;
use crate::references::ReferenceClient;
use crate::settings::CanonicalConfig;
use crate::tls::{check_tls_config, probe_scheme};

/// Inputs of a pass
#[derive(Clone, Copy)]
pub struct ReconcileParams<'a> {
    /// The resource being reconciled
    pub logstash: &'a Logstash,
    /// Source of referenced ConfigMaps and Secrets
    pub client: &'a dyn ReferenceClient,
    /// Whether the API service terminates TLS
    pub use_tls: bool,
}

impl<'a> ReconcileParams<'a> {
    /// Params with the TLS posture taken from the resource's `api` service
    pub fn new(logstash: &'a Logstash, client: &'a dyn ReferenceClient) -> Self {
        Self {
            logstash,
            client,
            use_tls: logstash.api_uses_tls(),
        }
    }

    /// Override the TLS posture
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    fn instance(&self) -> String {
        self.logstash.name_any()
    }

    fn namespace(&self) -> String {
        self.logstash.namespace_or_default()
    }
}

/// Content of a generated Secret
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigSecretData {
    /// Secret name
    pub name: String,
    /// Secret data, stored verbatim
    pub data: BTreeMap<String, Vec<u8>>,
}

/// Outcome of the settings half of a pass
#[derive(Clone, Debug)]
pub struct ReconciledSettings {
    /// Merged settings tree
    pub config: CanonicalConfig,
    /// Resolved API security descriptor
    pub api_server: ApiServer,
    /// Rendered `logstash.yml`
    pub rendered: Vec<u8>,
    /// Generated settings Secret
    pub secret: ConfigSecretData,
}

/// Outcome of the pipelines half of a pass
#[derive(Clone, Debug)]
pub struct ReconciledPipelines {
    /// Pipeline definitions
    pub pipelines: PipelinesConfig,
    /// Rendered `pipelines.yml`
    pub rendered: Vec<u8>,
    /// Generated pipelines Secret
    pub secret: ConfigSecretData,
}

/// Outcome of a full pass
#[derive(Clone, Debug)]
pub struct ReconciledConfig {
    /// Settings half
    pub settings: ReconciledSettings,
    /// Pipelines half
    pub pipelines: ReconciledPipelines,
    /// Readiness probe scheme
    pub probe_scheme: &'static str,
    /// Digest of both rendered artifacts
    pub digest: ConfigDigest,
}

impl ReconciledConfig {
    /// Pod template annotations carrying the digest
    pub fn annotations(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            CONFIG_HASH_ANNOTATION.to_string(),
            self.digest.to_string(),
        )])
    }
}

/// Settings every Logstash gets unless overridden
pub fn default_config() -> CanonicalConfig {
    CanonicalConfig::new()
        .with("api.http.host", "0.0.0.0")
        .with("config.reload.automatic", true)
}

/// Settings enabling TLS on the API, or `None` when the service is plain HTTP
pub fn tls_config(use_tls: bool) -> Option<CanonicalConfig> {
    use_tls.then(|| {
        CanonicalConfig::new()
            .with("api.ssl.enabled", true)
            .with("api.ssl.keystore.path", api_keystore_path())
            .with("api.ssl.keystore.password", API_KEYSTORE_DEFAULT_PASS)
    })
}

/// Run the settings half of a pass
#[instrument(skip_all, fields(logstash = %params.instance(), use_tls = params.use_tls))]
pub async fn reconcile_config(params: &ReconcileParams<'_>) -> Result<ReconciledSettings, Error> {
    let user = user_config(params).await?;

    let mut config = default_config();
    let tls = tls_config(params.use_tls);
    config.merge_with(&[tls.as_ref(), user.as_ref()])?;

    let api_server =
        resolve_api_server(ApiServer::from_config(&config), params.logstash, params.client).await?;
    check_tls_config(&api_server, params.use_tls)?;

    let rendered = config.render()?;
    let mut data = BTreeMap::from([(CONFIG_FILE_NAME.to_string(), rendered.clone())]);
    if params.use_tls {
        data.insert(
            API_KEYSTORE_PASS_ENV.to_string(),
            api_server.keystore_password.clone().into_bytes(),
        );
    }
    debug!(bytes = rendered.len(), "rendered settings");

    Ok(ReconciledSettings {
        config,
        api_server,
        rendered,
        secret: ConfigSecretData {
            name: params.logstash.config_secret_name(),
            data,
        },
    })
}

/// Run the pipelines half of a pass
#[instrument(skip_all, fields(logstash = %params.instance()))]
pub async fn reconcile_pipelines(
    params: &ReconcileParams<'_>,
) -> Result<ReconciledPipelines, Error> {
    let spec = &params.logstash.spec;
    let pipelines = match (&spec.pipelines, &spec.pipelines_ref) {
        (Some(_), Some(_)) => {
            return Err(Error::validation_for_field(
                params.instance(),
                "spec.pipelinesRef",
                "pipelines and pipelinesRef are mutually exclusive",
            ))
        }
        (Some(inline), None) => {
            PipelinesConfig::from_json("spec.pipelines", &Value::Array(inline.clone()))?
        }
        (None, Some(source)) => {
            let content = read_ref(params, source, PIPELINES_FILE_NAME).await?;
            PipelinesConfig::parse(content.as_bytes())?
        }
        (None, None) => PipelinesConfig::new(),
    };

    let rendered = pipelines.render()?;
    debug!(pipelines = pipelines.len(), bytes = rendered.len(), "rendered pipelines");

    Ok(ReconciledPipelines {
        secret: ConfigSecretData {
            name: params.logstash.pipelines_secret_name(),
            data: BTreeMap::from([(PIPELINES_FILE_NAME.to_string(), rendered.clone())]),
        },
        pipelines,
        rendered,
    })
}

/// Run a full pass: settings, then pipelines, then the digest
#[instrument(skip_all, fields(logstash = %params.instance()))]
pub async fn reconcile(params: &ReconcileParams<'_>) -> Result<ReconciledConfig, Error> {
    let settings = reconcile_config(params).await?;
    let pipelines = reconcile_pipelines(params).await?;
    let digest = ConfigDigest::fold(&[&settings.rendered, &pipelines.rendered]);

    info!(
        namespace = %params.namespace(),
        digest = %digest,
        pipelines = pipelines.pipelines.len(),
        "configuration resolved"
    );

    Ok(ReconciledConfig {
        settings,
        pipelines,
        probe_scheme: probe_scheme(params.use_tls),
        digest,
    })
}

/// The user's settings: inline, from a Secret, or none
async fn user_config(params: &ReconcileParams<'_>) -> Result<Option<CanonicalConfig>, Error> {
    let spec = &params.logstash.spec;
    match (&spec.config, &spec.config_ref) {
        (Some(_), Some(_)) => Err(Error::validation_for_field(
            params.instance(),
            "spec.configRef",
            "config and configRef are mutually exclusive",
        )),
        (Some(inline), None) => CanonicalConfig::from_json("spec.config", inline).map(Some),
        (None, Some(source)) => {
            let content = read_ref(params, source, CONFIG_FILE_NAME).await?;
            CanonicalConfig::parse(content.as_bytes()).map(Some)
        }
        (None, None) => Ok(None),
    }
}

/// Read `key` from the Secret named by `source`
async fn read_ref(
    params: &ReconcileParams<'_>,
    source: &ConfigSource,
    key: &str,
) -> Result<String, Error> {
    let namespace = params.namespace();
    let mut data = params
        .client
        .get_secret(&namespace, &source.secret_name)
        .await?;
    data.remove(key).ok_or_else(|| {
        Error::reference(
            SECRET_KIND,
            &namespace,
            &source.secret_name,
            format!("missing key {}", key),
        )
    })
}
