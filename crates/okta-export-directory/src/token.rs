//! Client-credentials token exchange with a signed JWT assertion
//!
//! Okta service apps authenticate with `private_key_jwt`: the client signs a
//! short-lived assertion with its RSA key and trades it at the org token
//! endpoint for a bearer access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use okta_export_core::{ExportError, Result};

use crate::client::{base_url, http_client, AccessToken};

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Lifetime of the signed assertion
const ASSERTION_TTL_SECS: i64 = 300;

/// Claims of the client assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

/// Org authorization server token endpoint for a domain
pub fn token_endpoint(domain: &str) -> String {
    format!("{}/oauth2/v1/token", base_url(domain))
}

/// Build and sign the RS256 client assertion.
///
/// Fails with an authentication error when the key is not a readable RSA
/// PEM; no request is made in that case.
pub fn build_assertion(client_id: &str, audience: &str, private_key_pem: &str) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
        error!("Failed to load private key: {}", e);
        ExportError::auth(format!("Failed to load private key: {}", e))
    })?;

    let now = Utc::now();
    let claims = AssertionClaims {
        iss: client_id.to_string(),
        sub: client_id.to_string(),
        aud: audience.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
    };

    encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| {
        ExportError::auth(format!(
            "Failed to sign client assertion with private key: {}",
            e
        ))
    })
}

/// Exchange a signed assertion for an access token.
///
/// One attempt only: any status other than 200 is an authentication error
/// carrying the response body.
#[instrument(skip(private_key_pem))]
pub async fn acquire_token(
    client_id: &str,
    domain: &str,
    private_key_pem: &str,
    scope: &str,
) -> Result<AccessToken> {
    acquire_token_with(&http_client()?, client_id, domain, private_key_pem, scope).await
}

/// Same as [`acquire_token`] with a caller-provided HTTP client
pub async fn acquire_token_with(
    http: &Client,
    client_id: &str,
    domain: &str,
    private_key_pem: &str,
    scope: &str,
) -> Result<AccessToken> {
    let token_url = token_endpoint(domain);
    let assertion = build_assertion(client_id, &token_url, private_key_pem)?;

    let params = [
        ("grant_type", "client_credentials"),
        ("scope", scope),
        ("client_assertion_type", CLIENT_ASSERTION_TYPE),
        ("client_assertion", assertion.as_str()),
    ];

    debug!("Requesting access token from {}", token_url);
    let response = http
        .post(&token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| ExportError::auth(format!("Token request to {} failed: {}", token_url, e)))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() != 200 {
        error!("Failed to get token: {}", body);
        return Err(ExportError::auth(format!("Failed to get token: {}", body)));
    }

    let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        ExportError::auth(format!("Failed to parse token response: {}", e))
    })?;

    let access_token = token_response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ExportError::auth("Token response did not contain an access_token"))?;

    info!(
        "Access token acquired (type: {}, expires in: {}s, scope: {})",
        token_response.token_type.as_deref().unwrap_or("Bearer"),
        token_response.expires_in.unwrap_or_default(),
        token_response.scope.as_deref().unwrap_or(scope)
    );

    Ok(AccessToken::new(access_token))
}
