//! Media object entity

use chrono::{DateTime, Utc};

use super::MediaFormat;
use crate::domain::error::RecordValidationError;

/// An audio object found in object storage.
/// Identity is the object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaObject {
    key: String,
    name: String,
    size: u64,
    last_modified: Option<DateTime<Utc>>,
}

impl MediaObject {
    /// Create a media object from a storage listing entry.
    /// The name is the last `/`-separated segment of the key.
    pub fn new(
        key: impl Into<String>,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
    ) -> Result<Self, RecordValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RecordValidationError {
                record: "media object",
                field: "key",
            });
        }

        let name = file_name_of(&key).to_string();
        if name.is_empty() {
            return Err(RecordValidationError {
                record: "media object",
                field: "name",
            });
        }

        Ok(Self {
            key,
            name,
            size,
            last_modified,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Audio format, if the name carries a supported extension
    pub fn format(&self) -> Option<MediaFormat> {
        MediaFormat::from_file_name(&self.name)
    }

    /// Whether the object looks like a transcribable audio file
    pub fn is_audio(&self) -> bool {
        self.format().is_some()
    }

    /// Storage URI of the object in the given bucket
    pub fn uri(&self, bucket: &str) -> String {
        format!("s3://{}/{}", bucket, self.key)
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size;
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

/// Final path segment of an object key
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Split an `s3://bucket/key` URI into its object key
pub fn key_from_uri(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("s3://")?;
    let (_bucket, key) = rest.split_once('/')?;
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}
