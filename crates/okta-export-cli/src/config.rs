//! Run configuration
//!
//! The export request comes from `INPUT_JSON` or a JSON file. Directory
//! credentials and upload settings come from environment variables, read
//! through the `config` crate from an explicit variable set so callers can
//! pass something other than the process environment.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use okta_export_core::{ExportError, ExportRequest, Result};
use okta_export_jira::{JiraSettings, UploadMode};

pub const DEFAULT_SCOPE: &str = "okta.groups.read okta.users.read okta.apps.read";
pub use okta_export_jira::DEFAULT_SERVICE_DESK_ID;

/// Read the export request, preferring inline JSON over the file.
pub fn load_request(inline: Option<&str>, path: &Path) -> Result<ExportRequest> {
    if let Some(json) = inline.filter(|s| !s.trim().is_empty()) {
        debug!("Reading export request from INPUT_JSON");
        return ExportRequest::from_json(json);
    }

    debug!("Reading export request from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ExportError::config(format!(
                "No export request: INPUT_JSON is not set and {} does not exist",
                path.display()
            ))
        } else {
            ExportError::config(format!("Failed to read {}: {}", path.display(), e))
        }
    })?;

    ExportRequest::from_json(&text)
}

// =============================================================================
// Directory credentials
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct OktaVars {
    domain: Option<String>,
    client_id: Option<String>,
    key_pem_base64: Option<String>,
    scope: Option<String>,
}

/// Credentials for the directory token exchange
#[derive(Clone)]
pub struct OktaSettings {
    pub domain: String,
    pub client_id: String,
    /// Decoded PEM text of the signing key
    pub private_key_pem: String,
    pub scope: String,
}

impl OktaSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build from `OKTA_*` variables. Every missing name is reported at once.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: OktaVars = config::Config::builder()
            .set_default("scope", DEFAULT_SCOPE)
            .and_then(|b| b.add_source(prefixed(vars, "OKTA")).build())
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ExportError::config(format!("Failed to read Okta settings: {}", e)))?;

        let mut missing = Vec::new();
        let domain = required(raw.domain, "OKTA_DOMAIN", &mut missing);
        let client_id = required(raw.client_id, "OKTA_CLIENT_ID", &mut missing);
        let key = required(raw.key_pem_base64, "OKTA_KEY_PEM_BASE64", &mut missing);

        if !missing.is_empty() {
            return Err(ExportError::config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            domain,
            client_id,
            private_key_pem: decode_key(&key)?,
            scope: raw
                .scope
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
        })
    }
}

impl fmt::Debug for OktaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OktaSettings")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("private_key_pem", &"***")
            .field("scope", &self.scope)
            .finish()
    }
}

fn decode_key(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ExportError::config(format!("OKTA_KEY_PEM_BASE64 is not valid base64: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|_| ExportError::config("OKTA_KEY_PEM_BASE64 does not decode to PEM text"))
}

// =============================================================================
// Upload settings
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct JiraVars {
    domain: Option<String>,
    user_email: Option<String>,
    pat: Option<String>,
    issue_key: Option<String>,
    upload_mode: Option<String>,
    service_desk_id: Option<String>,
}

/// Upload target from `JIRA_*` and `SERVICE_DESK_ID`.
///
/// Failures are upload errors; the caller downgrades them to a warning.
pub fn jira_settings_from_env() -> Result<JiraSettings> {
    jira_settings_from_vars(std::env::vars())
}

pub fn jira_settings_from_vars<I>(vars: I) -> Result<JiraSettings>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: Vec<(String, String)> = vars.into_iter().collect();
    let desk: config::Map<String, String> = vars
        .iter()
        .filter(|(k, _)| k == "SERVICE_DESK_ID")
        .cloned()
        .collect();

    let raw: JiraVars = config::Config::builder()
        .set_default("service_desk_id", DEFAULT_SERVICE_DESK_ID)
        .and_then(|b| {
            b.add_source(prefixed(vars, "JIRA"))
                .add_source(config::Environment::default().source(Some(desk)))
                .build()
        })
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ExportError::upload(format!("Failed to read Jira settings: {}", e)))?;

    let mut missing = Vec::new();
    let domain = required(raw.domain, "JIRA_DOMAIN", &mut missing);
    let user_email = required(raw.user_email, "JIRA_USER_EMAIL", &mut missing);
    let pat = required(raw.pat, "JIRA_PAT", &mut missing);
    let issue_key = required(raw.issue_key, "JIRA_ISSUE_KEY", &mut missing);

    if !missing.is_empty() {
        return Err(ExportError::upload(format!(
            "Missing upload settings: {}",
            missing.join(", ")
        )));
    }

    let mode = match raw.upload_mode.filter(|m| !m.trim().is_empty()) {
        Some(mode) => mode.parse::<UploadMode>()?,
        None => UploadMode::default(),
    };

    Ok(JiraSettings::new(domain, user_email, pat, issue_key)
        .with_service_desk_id(
            raw.service_desk_id
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_DESK_ID.to_string()),
        )
        .with_mode(mode))
}

// =============================================================================
// Helpers
// =============================================================================

/// Environment source over the variables carrying `prefix`
fn prefixed<I>(vars: I, prefix: &str) -> config::Environment
where
    I: IntoIterator<Item = (String, String)>,
{
    let marker = format!("{}_", prefix);
    let source: config::Map<String, String> = vars
        .into_iter()
        .filter(|(k, _)| k.starts_with(&marker))
        .collect();
    config::Environment::with_prefix(prefix).source(Some(source))
}

fn required(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            missing.push(name);
            String::new()
        }
    }
}
