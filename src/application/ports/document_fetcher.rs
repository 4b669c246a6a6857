//! Output document fetcher port interface

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Document fetch errors
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Document is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Unsupported document location: {0}")]
    InvalidLocation(String),
}

/// Port for downloading a job's output document
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch and decode the JSON document at `uri`
    async fn fetch(&self, uri: &str) -> Result<Value, FetchError>;
}
