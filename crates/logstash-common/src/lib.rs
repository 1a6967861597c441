//! Common types for the Logstash configuration engine: CRD, errors, and utilities

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod telemetry;
pub mod yaml;

pub use error::{Error, ErrorKind};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Name of the Logstash container inside the pod template
pub const LOGSTASH_CONTAINER_NAME: &str = "logstash";

/// Settings file name, also the key holding it in a `configRef` Secret
pub const CONFIG_FILE_NAME: &str = "logstash.yml";

/// Pipelines file name, also the key holding it in a `pipelinesRef` Secret
pub const PIPELINES_FILE_NAME: &str = "pipelines.yml";

/// Directory the settings Secret is mounted into
pub const CONFIG_MOUNT_PATH: &str = "/usr/share/logstash/config";

/// File name of the API server keystore generated from the HTTP certificate
pub const API_KEYSTORE_FILE_NAME: &str = "api_keystore.p12";

/// Password the API keystore is created with unless the user overrides it
pub const API_KEYSTORE_DEFAULT_PASS: &str = "ch@ng3m3";

/// Key in the settings Secret carrying the resolved keystore password
pub const API_KEYSTORE_PASS_ENV: &str = "API_KEYSTORE_PASS";

/// Pod template annotation holding the configuration digest
pub const CONFIG_HASH_ANNOTATION: &str = "logstash.k8s.elastic.co/config-hash";

/// Name of the service fronting the Logstash API
pub const API_SERVICE_NAME: &str = "api";

/// Port the Logstash API listens on
pub const HTTP_PORT: u16 = 9600;

/// Suffix of the generated settings Secret (`<name>-ls-config`)
pub const CONFIG_SECRET_SUFFIX: &str = "ls-config";

/// Suffix of the generated pipelines Secret (`<name>-ls-pipeline`)
pub const PIPELINES_SECRET_SUFFIX: &str = "ls-pipeline";

/// Full path of the API keystore inside the container
pub fn api_keystore_path() -> String {
    format!("{}/{}", CONFIG_MOUNT_PATH, API_KEYSTORE_FILE_NAME)
}
