//! Ticket attachment upload
//!
//! Two contracts are supported and exactly one is used per run:
//! - [`UploadMode::ServiceDesk`]: stage the file as a temporary attachment on
//!   the service desk, then attach the staged ids to the request with a
//!   public comment.
//! - [`UploadMode::Issue`]: single multipart POST to the issue attachments
//!   endpoint.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error, info, instrument};

use okta_export_core::{ExportError, Result};

/// Service desk used when none is configured
pub const DEFAULT_SERVICE_DESK_ID: &str = "2";

/// Which Jira contract to upload through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    #[default]
    ServiceDesk,
    Issue,
}

impl FromStr for UploadMode {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "service_desk" | "service-desk" | "servicedesk" => Ok(Self::ServiceDesk),
            "issue" => Ok(Self::Issue),
            other => Err(ExportError::upload(format!(
                "Unknown upload mode '{}', expected 'service_desk' or 'issue'",
                other
            ))),
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceDesk => write!(f, "service_desk"),
            Self::Issue => write!(f, "issue"),
        }
    }
}

/// Connection and target settings for one upload
#[derive(Clone)]
pub struct JiraSettings {
    pub domain: String,
    pub user_email: String,
    pub api_token: String,
    pub issue_key: String,
    pub service_desk_id: String,
    pub mode: UploadMode,
}

impl JiraSettings {
    pub fn new(
        domain: impl Into<String>,
        user_email: impl Into<String>,
        api_token: impl Into<String>,
        issue_key: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            user_email: user_email.into(),
            api_token: api_token.into(),
            issue_key: issue_key.into(),
            service_desk_id: DEFAULT_SERVICE_DESK_ID.to_string(),
            mode: UploadMode::default(),
        }
    }

    pub fn with_service_desk_id(mut self, id: impl Into<String>) -> Self {
        self.service_desk_id = id.into();
        self
    }

    pub fn with_mode(mut self, mode: UploadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Site base URL; bare hosts get `https://`
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        }
    }

    fn temporary_file_url(&self) -> String {
        format!(
            "{}/rest/servicedeskapi/servicedesk/{}/attachTemporaryFile",
            self.base_url(),
            self.service_desk_id
        )
    }

    fn request_attachment_url(&self) -> String {
        format!(
            "{}/rest/servicedeskapi/request/{}/attachment",
            self.base_url(),
            self.issue_key
        )
    }

    fn issue_attachments_url(&self) -> String {
        format!(
            "{}/rest/api/3/issue/{}/attachments",
            self.base_url(),
            self.issue_key
        )
    }
}

impl fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("domain", &self.domain)
            .field("user_email", &self.user_email)
            .field("api_token", &"***")
            .field("issue_key", &self.issue_key)
            .field("service_desk_id", &self.service_desk_id)
            .field("mode", &self.mode)
            .finish()
    }
}

/// What the upload left on the ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub issue_key: String,
    pub file_name: String,
    /// Staged attachment ids; empty for the issue contract
    pub temporary_attachment_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemporaryAttachments {
    #[serde(default)]
    temporary_attachments: Vec<TemporaryAttachment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemporaryAttachment {
    #[serde(default)]
    temporary_attachment_id: Option<String>,
}

/// Uploads files to one ticket
pub struct AttachmentUploader {
    http: Client,
    settings: JiraSettings,
}

impl AttachmentUploader {
    pub fn new(settings: JiraSettings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("okta-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExportError::http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(http, settings))
    }

    pub fn with_client(http: Client, settings: JiraSettings) -> Self {
        Self { http, settings }
    }

    #[instrument(skip(self), fields(issue = %self.settings.issue_key, mode = %self.settings.mode))]
    pub async fn upload(&self, path: &Path) -> Result<UploadReceipt> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ExportError::upload(format!("Not a file: {}", path.display())))?
            .to_string();

        let data = tokio::fs::read(path).await.map_err(|e| {
            ExportError::upload(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let receipt = match self.settings.mode {
            UploadMode::ServiceDesk => self.upload_service_desk(&file_name, data).await?,
            UploadMode::Issue => self.upload_issue(&file_name, data).await?,
        };

        info!("Uploaded {} to {}", receipt.file_name, receipt.issue_key);
        Ok(receipt)
    }

    async fn upload_service_desk(&self, file_name: &str, data: Vec<u8>) -> Result<UploadReceipt> {
        let url = self.settings.temporary_file_url();
        debug!("Staging {} at {}", file_name, url);

        let response = self
            .authorized(self.http.post(&url))
            .multipart(file_form(file_name, data)?)
            .send()
            .await
            .map_err(|e| ExportError::upload(format!("Temporary upload failed: {}", e)))?;
        let body = accepted(response, "Temporary upload").await?;

        let staged: TemporaryAttachments = serde_json::from_str(&body).map_err(|e| {
            ExportError::upload(format!("Unexpected temporary upload response: {}", e))
        })?;
        let ids: Vec<String> = staged
            .temporary_attachments
            .into_iter()
            .filter_map(|a| a.temporary_attachment_id)
            .collect();

        if ids.is_empty() {
            error!("Temporary upload returned no attachment ids");
            return Err(ExportError::upload(
                "Temporary upload returned no attachment ids",
            ));
        }

        let url = self.settings.request_attachment_url();
        debug!("Attaching {} staged file(s) at {}", ids.len(), url);

        let payload = json!({
            "temporaryAttachmentIds": ids,
            "public": true,
            "additionalComment": {
                "body": format!("{} has been attached. Please review the file.", file_name)
            }
        });

        let response = self
            .authorized(self.http.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ExportError::upload(format!("Attach to request failed: {}", e)))?;
        accepted(response, "Attach to request").await?;

        Ok(UploadReceipt {
            issue_key: self.settings.issue_key.clone(),
            file_name: file_name.to_string(),
            temporary_attachment_ids: ids,
        })
    }

    async fn upload_issue(&self, file_name: &str, data: Vec<u8>) -> Result<UploadReceipt> {
        let url = self.settings.issue_attachments_url();
        debug!("Uploading {} to {}", file_name, url);

        let response = self
            .authorized(self.http.post(&url))
            .multipart(file_form(file_name, data)?)
            .send()
            .await
            .map_err(|e| ExportError::upload(format!("Issue upload failed: {}", e)))?;
        accepted(response, "Issue upload").await?;

        Ok(UploadReceipt {
            issue_key: self.settings.issue_key.clone(),
            file_name: file_name.to_string(),
            temporary_attachment_ids: Vec::new(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.settings.user_email, Some(&self.settings.api_token))
            .header("X-Atlassian-Token", "no-check")
    }
}

fn file_form(file_name: &str, data: Vec<u8>) -> Result<Form> {
    let part = Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_str("application/octet-stream")
        .map_err(|e| ExportError::upload(format!("Invalid attachment part: {}", e)))?;
    Ok(Form::new().part("file", part))
}

/// Read the body, failing unless the status is 200 or 201
async fn accepted(response: Response, step: &str) -> Result<String> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::OK || status == StatusCode::CREATED {
        Ok(body)
    } else {
        error!("{} returned HTTP {}: {}", step, status.as_u16(), body);
        Err(ExportError::upload(format!(
            "{} returned HTTP {}: {}",
            step,
            status.as_u16(),
            body
        )))
    }
}
