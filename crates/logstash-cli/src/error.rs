//! Error types for the CLI

use std::path::PathBuf;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid Logstash manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("{0}")]
    Engine(#[from] logstash_common::Error),

    #[error("logging setup failed: {0}")]
    Telemetry(#[from] logstash_common::telemetry::TelemetryError),

    #[error("{0}")]
    PipelinesDiffer(#[from] logstash_config::PipelinesDiff),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::InvalidManifest {
            path: path.into(),
            message: message.into(),
        }
    }
}
