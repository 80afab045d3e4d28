//! Core traits for okta-export

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Read access to the directory API
///
/// Paths are relative to the directory base URL and may carry a query
/// string, e.g. `/api/v1/users?limit=200`.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Fetch every page of a collection, in server order
    async fn fetch_all(&self, path: &str) -> Result<Vec<Value>>;

    /// Fetch a single record
    async fn fetch_one(&self, path: &str) -> Result<Value>;
}
