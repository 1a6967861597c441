//! Custom Resource Definitions consumed by the configuration engine

mod logstash;
mod types;

pub use logstash::{Logstash, LogstashSpec, LogstashStatus, DEFAULT_NAMESPACE};
pub use types::{
    ConfigSource, KeyToPath, LogstashPhase, LogstashService, SecretSource, SelfSignedCertificate,
    TlsOptions,
};
