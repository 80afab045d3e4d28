//! Link-header pagination over a directory collection

use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, error, info};

use okta_export_core::{ExportError, Result};

/// Fetch every page of a collection, starting at `start_url`.
///
/// Each page must be a JSON array. Records are returned in the order the
/// server emitted them, page by page, without de-duplication. A non-2xx
/// response on any page fails the whole fetch and discards earlier pages.
///
/// There is no page limit: a server that always advertises a `next` link
/// keeps this loop running.
pub async fn fetch_all(client: &Client, start_url: &str, auth_header: &str) -> Result<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut url = start_url.to_string();
    let mut pages = 0usize;

    loop {
        let response = get(client, &url, auth_header).await?;
        pages += 1;

        let next = response_next_link(&response);
        let body: Value = response
            .json()
            .await
            .map_err(|e| ExportError::json(format!("Failed to parse page from {}: {}", url, e)))?;

        match body {
            Value::Array(items) => {
                debug!("Page {} returned {} records", pages, items.len());
                all_items.extend(items);
            }
            other => {
                return Err(ExportError::json(format!(
                    "Expected a JSON array from {}, got {}",
                    url,
                    json_kind(&other)
                )));
            }
        }

        match next {
            Some(next) => url = next,
            None => break,
        }
    }

    info!(
        "Fetched {} records over {} page(s) from {}",
        all_items.len(),
        pages,
        start_url
    );
    Ok(all_items)
}

/// Fetch a single record
pub async fn fetch_one(client: &Client, url: &str, auth_header: &str) -> Result<Value> {
    let response = get(client, url, auth_header).await?;
    response
        .json()
        .await
        .map_err(|e| ExportError::json(format!("Failed to parse record from {}: {}", url, e)))
}

async fn get(client: &Client, url: &str, auth_header: &str) -> Result<Response> {
    let response = client
        .get(url)
        .header(AUTHORIZATION, auth_header)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| ExportError::http(format!("GET {} failed: {}", url, e)))?;

    let status = response.status();
    info!("URL: {} Status: {}", url, status.as_u16());

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Request to {} failed: {}", url, body);
        return Err(ExportError::fetch(status.as_u16(), body));
    }

    Ok(response)
}

fn response_next_link(response: &Response) -> Option<String> {
    let joined = response
        .headers()
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");

    next_link(&joined)
}

/// Extract the `rel="next"` target from a Link header value.
///
/// The URL is the text between the first `<` and `>` of the matching entry.
/// An entry without that pair yields `None`.
pub fn next_link(header: &str) -> Option<String> {
    let entry = header.split(',').find(|part| part.contains("rel=\"next\""))?;
    let start = entry.find('<')?;
    let end = entry.find('>')?;
    if end <= start {
        return None;
    }
    Some(entry[start + 1..end].trim().to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
