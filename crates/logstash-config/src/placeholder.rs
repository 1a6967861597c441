//! `${NAME}` / `${NAME:default}` placeholders in API settings
//!
//! Resolution is two-phase. [`extract_placeholders`] replaces every
//! placeholder field with its default and records which variable it wants;
//! [`apply_credentials`] then overwrites the recorded fields whose variable
//! the credential map defines. Only whole-value placeholders are recognised.

use std::sync::LazyLock;

use kube::ResourceExt;
use regex::Regex;
use tracing::{debug, instrument};

use logstash_common::crd::Logstash;
use logstash_common::Error;

use crate::api_server::{ApiField, ApiServer, RESOLVABLE_FIELDS};
use crate::credentials::{collect_credentials, Credentials};
use crate::references::ReferenceClient;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{([A-Za-z0-9_]+)(?::(.*?))?\}$").expect("placeholder regex is valid")
});

/// A parsed placeholder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    /// Variable name
    pub name: String,
    /// Fallback value, empty when omitted
    pub default: String,
}

impl Placeholder {
    /// Parse `value` if the whole of it is a placeholder
    pub fn parse(value: &str) -> Option<Self> {
        let captures = PLACEHOLDER_REGEX.captures(value)?;
        Some(Self {
            name: captures.get(1)?.as_str().to_string(),
            default: captures
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
    }
}

/// A field waiting for a credential
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingField {
    /// Variable the field references
    pub name: String,
    /// Field to overwrite once the variable is known
    pub field: ApiField,
}

/// Replace every placeholder in `api` with its default and record it
pub fn extract_placeholders(api: &mut ApiServer) -> Vec<PendingField> {
    RESOLVABLE_FIELDS
        .iter()
        .filter_map(|field| {
            let placeholder = Placeholder::parse(api.get(*field))?;
            *api.slot(*field) = placeholder.default;
            Some(PendingField {
                name: placeholder.name,
                field: *field,
            })
        })
        .collect()
}

/// Overwrite pending fields whose variable `credentials` defines.
///
/// Fields whose variable is undefined keep their default.
pub fn apply_credentials(api: &mut ApiServer, pending: &[PendingField], credentials: &Credentials) {
    for entry in pending {
        match credentials.get(&entry.name) {
            Some(value) => {
                *api.slot(entry.field) = value.to_string();
                debug!(field = %entry.field, variable = %entry.name, "resolved placeholder");
            }
            None => {
                debug!(field = %entry.field, variable = %entry.name, "variable undefined, keeping default");
            }
        }
    }
}

/// Resolve every placeholder in `api` against the credential sources of
/// `logstash`. The sources are only read if a placeholder is present.
#[instrument(skip_all, fields(logstash = %logstash.name_any()))]
pub async fn resolve_api_server(
    mut api: ApiServer,
    logstash: &Logstash,
    client: &dyn ReferenceClient,
) -> Result<ApiServer, Error> {
    let pending = extract_placeholders(&mut api);
    if pending.is_empty() {
        return Ok(api);
    }
    let credentials = collect_credentials(logstash, client).await?;
    apply_credentials(&mut api, &pending, &credentials);
    Ok(api)
}
