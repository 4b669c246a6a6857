//! HTTP output document fetcher

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::application::ports::{DocumentFetcher, FetchError};

/// Fetches documents with a plain GET, e.g. presigned result URLs
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
}

impl HttpDocumentFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpDocumentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, uri: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
        debug!(uri, size = bytes.len(), "downloaded document");

        serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }
}
