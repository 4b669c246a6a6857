//! Object storage port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::media::MediaObject;

/// Object storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Access denied to bucket: {0}")]
    AccessDenied(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),
}

/// Port for enumerating objects in a bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object under a prefix, following pagination.
    ///
    /// # Arguments
    /// * `bucket` - The bucket to list
    /// * `prefix` - Key prefix to restrict the listing ("" for the whole bucket)
    ///
    /// # Returns
    /// Objects in listing order. Entries that are not files (e.g. folder
    /// markers) are left out.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<MediaObject>, StorageError>;
}
