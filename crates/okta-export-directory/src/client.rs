//! Authenticated client for the Okta management API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use tracing::instrument;

use okta_export_core::{DirectorySource, ExportError, Result};

use crate::pagination;

/// Bearer credential for the directory API. Held in memory for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Build the shared HTTP client.
///
/// No timeout is configured; every call runs to completion or fails.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("okta-export/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ExportError::http(format!("Failed to create HTTP client: {}", e)))
}

/// Turn an Okta domain into a base URL.
///
/// `acme.okta.com` becomes `https://acme.okta.com`; a value that already
/// carries a scheme is kept. Trailing slashes are dropped.
pub fn base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

/// Directory API client bound to one base URL and one access token
#[derive(Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: String,
    auth_header: String,
}

impl DirectoryClient {
    pub fn new(domain: &str, token: &AccessToken) -> Result<Self> {
        Ok(Self::with_client(http_client()?, domain, token))
    }

    pub fn with_client(http: Client, domain: &str, token: &AccessToken) -> Self {
        Self {
            http,
            base_url: base_url(domain),
            auth_header: format!("Bearer {}", token.as_str()),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}

impl fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DirectorySource for DirectoryClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_all(&self, path: &str) -> Result<Vec<Value>> {
        pagination::fetch_all(&self.http, &self.url(path), &self.auth_header).await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_one(&self, path: &str) -> Result<Value> {
        pagination::fetch_one(&self.http, &self.url(path), &self.auth_header).await
    }
}
