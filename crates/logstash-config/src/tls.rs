//! Consistency between the API service TLS posture and `api.ssl.enabled`

use logstash_common::Error;

use crate::api_server::ApiServer;

/// Readiness probe scheme for a plain HTTP API
pub const SCHEME_HTTP: &str = "HTTP";
/// Readiness probe scheme for a TLS API
pub const SCHEME_HTTPS: &str = "HTTPS";

/// Check that the resolved `api.ssl.enabled` agrees with the service.
///
/// An unset `api.ssl.enabled` is accepted only when the service serves
/// plain HTTP.
pub fn check_tls_config(api: &ApiServer, desired_tls: bool) -> Result<(), Error> {
    let ssl_enabled = api.ssl_enabled.as_str();
    if ssl_enabled == desired_tls.to_string() || (!desired_tls && ssl_enabled.is_empty()) {
        return Ok(());
    }
    Err(Error::consistency(desired_tls, ssl_enabled))
}

/// Scheme the readiness probe uses against the API port
pub fn probe_scheme(desired_tls: bool) -> &'static str {
    if desired_tls {
        SCHEME_HTTPS
    } else {
        SCHEME_HTTP
    }
}
