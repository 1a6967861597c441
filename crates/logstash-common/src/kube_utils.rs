//! Shared Kubernetes utilities using kube-rs
//!
//! Client construction and the ConfigMap/Secret reads the configuration
//! engine needs. Every read failure on a referenced object is reported as
//! [`Error::Reference`] naming the object, 404s included.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::Api;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::Error;

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Resource kind used in errors for Secret reads
pub const SECRET_KIND: &str = "Secret";
/// Resource kind used in errors for ConfigMap reads
pub const CONFIG_MAP_KIND: &str = "ConfigMap";

/// Create a kube client from optional kubeconfig path with default timeouts
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| Error::validation(format!("failed to read kubeconfig: {}", e)))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| Error::validation(format!("failed to load kubeconfig: {}", e)))?
        }
        None => Config::infer()
            .await
            .map_err(|e| Error::validation(format!("failed to infer kube config: {}", e)))?,
    };
    config.connect_timeout = Some(DEFAULT_CONNECT_TIMEOUT);
    config.read_timeout = Some(DEFAULT_READ_TIMEOUT);
    Ok(Client::try_from(config)?)
}

/// Read a Secret and return its data decoded as strings
pub async fn get_secret_data(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<BTreeMap<String, String>, Error> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret = secrets
        .get(name)
        .await
        .map_err(|e| Error::reference(SECRET_KIND, namespace, name, describe_kube_error(&e)))?;
    let data = secret_string_data(&secret);
    debug!(namespace, name, keys = data.len(), "read secret");
    Ok(data)
}

/// Read a ConfigMap and return its `data`
pub async fn get_config_map_data(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<BTreeMap<String, String>, Error> {
    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let config_map = config_maps.get(name).await.map_err(|e| {
        Error::reference(CONFIG_MAP_KIND, namespace, name, describe_kube_error(&e))
    })?;
    let data = config_map.data.unwrap_or_default();
    debug!(namespace, name, keys = data.len(), "read config map");
    Ok(data)
}

/// Decode a Secret's values as strings.
///
/// `stringData` overrides `data` on key collision, matching how the API
/// server folds the two on write. Secrets read back from the API only carry
/// `data`; manifests read from disk may carry either.
pub fn secret_string_data(secret: &Secret) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = secret
        .data
        .iter()
        .flatten()
        .map(|(k, v)| (k.clone(), String::from_utf8_lossy(&v.0).into_owned()))
        .collect();
    if let Some(string_data) = &secret.string_data {
        out.extend(string_data.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    out
}

fn describe_kube_error(err: &kube::Error) -> String {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => "not found".to_string(),
        other => other.to_string(),
    }
}
