//! Security descriptor of the Logstash API server
//!
//! Each field holds the textual form of one `api.*` setting, either a
//! literal or (before resolution) a `${NAME:default}` placeholder. The set
//! of fields placeholders are resolved in is [`RESOLVABLE_FIELDS`].

use std::fmt;

use crate::settings::CanonicalConfig;

/// A resolvable `api.*` setting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiField {
    /// `api.ssl.enabled`
    SslEnabled,
    /// `api.ssl.keystore.password`
    KeystorePassword,
    /// `api.auth.type`
    AuthType,
    /// `api.auth.basic.username`
    Username,
    /// `api.auth.basic.password`
    Password,
}

/// Fields scanned for placeholders, in scan order
pub const RESOLVABLE_FIELDS: &[ApiField] = &[
    ApiField::SslEnabled,
    ApiField::KeystorePassword,
    ApiField::AuthType,
    ApiField::Username,
    ApiField::Password,
];

impl ApiField {
    /// Dotted settings key the field is read from
    pub fn setting(self) -> &'static str {
        match self {
            Self::SslEnabled => "api.ssl.enabled",
            Self::KeystorePassword => "api.ssl.keystore.password",
            Self::AuthType => "api.auth.type",
            Self::Username => "api.auth.basic.username",
            Self::Password => "api.auth.basic.password",
        }
    }

    /// Whether the value must be kept out of logs
    pub fn is_sensitive(self) -> bool {
        matches!(self, Self::KeystorePassword | Self::Password)
    }
}

impl fmt::Display for ApiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.setting())
    }
}

/// Resolved API server settings
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiServer {
    /// `api.ssl.enabled`
    pub ssl_enabled: String,
    /// `api.ssl.keystore.password`
    pub keystore_password: String,
    /// `api.auth.type`
    pub auth_type: String,
    /// `api.auth.basic.username`
    pub username: String,
    /// `api.auth.basic.password`
    pub password: String,
}

impl ApiServer {
    /// Read every resolvable field from a merged settings tree.
    ///
    /// Missing keys and container values read as `""`.
    pub fn from_config(config: &CanonicalConfig) -> Self {
        let mut api = Self::default();
        for field in RESOLVABLE_FIELDS {
            *api.slot(*field) = config.lookup_string(field.setting()).unwrap_or_default();
        }
        api
    }

    /// Current value of `field`
    pub fn get(&self, field: ApiField) -> &str {
        match field {
            ApiField::SslEnabled => &self.ssl_enabled,
            ApiField::KeystorePassword => &self.keystore_password,
            ApiField::AuthType => &self.auth_type,
            ApiField::Username => &self.username,
            ApiField::Password => &self.password,
        }
    }

    /// Mutable slot for `field`
    pub fn slot(&mut self, field: ApiField) -> &mut String {
        match field {
            ApiField::SslEnabled => &mut self.ssl_enabled,
            ApiField::KeystorePassword => &mut self.keystore_password,
            ApiField::AuthType => &mut self.auth_type,
            ApiField::Username => &mut self.username,
            ApiField::Password => &mut self.password,
        }
    }

    /// True when `api.ssl.enabled` resolved to `true`
    pub fn ssl_enabled(&self) -> bool {
        self.ssl_enabled == "true"
    }
}

// Passwords are redacted so the descriptor can be logged safely.
impl fmt::Debug for ApiServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &str| if value.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ApiServer")
            .field("ssl_enabled", &self.ssl_enabled)
            .field("keystore_password", &redact(&self.keystore_password))
            .field("auth_type", &self.auth_type)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_text_form_of_settings() {
        let config = CanonicalConfig::from_json(
            "test",
            &json!({
                "api.ssl.enabled": true,
                "api.ssl.keystore.password": "${KS_PASS:ch@ng3m3}",
                "api": {"auth": {"type": "basic", "basic": {"username": "elastic"}}}
            }),
        )
        .unwrap();
        let api = ApiServer::from_config(&config);
        assert_eq!(api.ssl_enabled, "true");
        assert!(api.ssl_enabled());
        assert_eq!(api.keystore_password, "${KS_PASS:ch@ng3m3}");
        assert_eq!(api.auth_type, "basic");
        assert_eq!(api.username, "elastic");
        assert_eq!(api.password, "");
    }

    #[test]
    fn missing_settings_read_empty() {
        let api = ApiServer::from_config(&CanonicalConfig::new());
        assert_eq!(api, ApiServer::default());
        assert!(!api.ssl_enabled());
    }

    #[test]
    fn every_field_has_distinct_setting_and_slot() {
        let mut api = ApiServer::default();
        for (i, field) in RESOLVABLE_FIELDS.iter().enumerate() {
            *api.slot(*field) = i.to_string();
        }
        for (i, field) in RESOLVABLE_FIELDS.iter().enumerate() {
            assert_eq!(api.get(*field), i.to_string());
            assert!(field.setting().starts_with("api."));
        }
    }

    #[test]
    fn debug_redacts_passwords() {
        let api = ApiServer {
            keystore_password: "s3cr3t".into(),
            password: "hunter2".into(),
            username: "elastic".into(),
            ..Default::default()
        };
        let rendered = format!("{api:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("elastic"));
        assert!(ApiField::Password.is_sensitive());
        assert!(!ApiField::Username.is_sensitive());
    }
}
