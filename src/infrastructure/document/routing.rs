//! Picks S3 or HTTP per document location

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::{DocumentFetcher, FetchError};
use crate::infrastructure::storage::{parse_s3_location, S3Storage};

use super::HttpDocumentFetcher;

/// S3 locations go through GetObject with credentials, anything else over HTTP
pub struct RoutingDocumentFetcher {
    s3: S3Storage,
    http: HttpDocumentFetcher,
}

impl RoutingDocumentFetcher {
    pub fn new(s3: S3Storage, http: HttpDocumentFetcher) -> Self {
        Self { s3, http }
    }
}

#[async_trait]
impl DocumentFetcher for RoutingDocumentFetcher {
    async fn fetch(&self, uri: &str) -> Result<Value, FetchError> {
        if let Some(location) = parse_s3_location(uri) {
            return self.s3.get_json(&location).await;
        }
        if uri.starts_with("https://") || uri.starts_with("http://") {
            return self.http.fetch(uri).await;
        }
        Err(FetchError::InvalidLocation(uri.to_string()))
    }
}
