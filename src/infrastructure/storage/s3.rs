//! S3 adapters: object listing and output document download

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::application::ports::{FetchError, ObjectStore, StorageError};
use crate::domain::media::MediaObject;
use crate::infrastructure::aws::AwsSettings;

/// Bucket and key of an S3 object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

/// Parse an S3 object location.
///
/// Accepts `s3://bucket/key`, path-style `https://s3.<region>.amazonaws.com/bucket/key`
/// and virtual-hosted `https://bucket.s3.<region>.amazonaws.com/key`. Presigned URLs
/// are not S3 locations: they are fetched over plain HTTP.
pub fn parse_s3_location(uri: &str) -> Option<S3Location> {
    let url = Url::parse(uri).ok()?;

    let location = |bucket: &str, key: &str| {
        (!bucket.is_empty() && !key.is_empty()).then(|| S3Location {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    };

    if url.scheme() == "s3" {
        let bucket = url.host_str()?;
        return location(bucket, url.path().trim_start_matches('/'));
    }

    if !matches!(url.scheme(), "http" | "https") || is_presigned(&url) {
        return None;
    }

    let host = url.host_str()?;
    if !host.ends_with(".amazonaws.com") {
        return None;
    }

    let path = url.path().trim_start_matches('/');
    if host.starts_with("s3.") || host.starts_with("s3-") {
        let (bucket, key) = path.split_once('/')?;
        location(bucket, key)
    } else {
        let (bucket, _) = host.split_once(".s3.")?;
        location(bucket, path)
    }
}

fn is_presigned(url: &Url) -> bool {
    url.query_pairs()
        .any(|(name, _)| name.eq_ignore_ascii_case("X-Amz-Signature"))
}

fn to_chrono(time: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

/// S3 client wrapper
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(settings: &AwsSettings) -> Self {
        let credentials = Credentials::new(
            &settings.credentials.access_key_id,
            &settings.credentials.secret_access_key,
            settings.credentials.session_token.clone(),
            None,
            "environment",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(region = %settings.region, endpoint = ?settings.endpoint_url, "S3 client ready");

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Download an object and decode it as JSON
    pub async fn get_json(&self, location: &S3Location) -> Result<Value, FetchError> {
        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .is_some_and(|se| se.is_no_such_key());
                if missing {
                    FetchError::Status {
                        status: 404,
                        message: format!("s3://{}/{}", location.bucket, location.key),
                    }
                } else {
                    FetchError::RequestFailed(DisplayErrorContext(&e).to_string())
                }
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?
            .into_bytes();

        debug!(bucket = %location.bucket, key = %location.key, size = bytes.len(), "downloaded document");

        serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<MediaObject>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| listing_error(bucket, e))?;

            for object in page.contents() {
                let Some(key) = object.key() else {
                    continue;
                };
                let size = object.size().unwrap_or(0).max(0) as u64;
                let last_modified = object.last_modified().and_then(to_chrono);

                match MediaObject::new(key, size, last_modified) {
                    Ok(media) => objects.push(media),
                    Err(e) => debug!(key, error = %e, "skipping object"),
                }
            }
        }

        debug!(bucket, prefix, count = objects.len(), "listed objects");
        Ok(objects)
    }
}

fn listing_error<E, R>(bucket: &str, error: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = error.as_service_error().and_then(|se| se.code());
    match code {
        Some("NoSuchBucket") => StorageError::BucketNotFound(bucket.to_string()),
        Some("AccessDenied") => StorageError::AccessDenied(bucket.to_string()),
        _ => {
            let message = DisplayErrorContext(&error).to_string();
            warn!(bucket, error = %message, "listing failed");
            StorageError::ListFailed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(bucket: &str, key: &str) -> Option<S3Location> {
        Some(S3Location {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    #[test]
    fn parses_s3_scheme() {
        assert_eq!(
            parse_s3_location("s3://my-audio-files/call-recordings/a.mp3"),
            loc("my-audio-files", "call-recordings/a.mp3")
        );
    }

    #[test]
    fn parses_path_style_url() {
        assert_eq!(
            parse_s3_location(
                "https://s3.us-east-1.amazonaws.com/my-transcribe-output/transcribe_a_mp3_1.json"
            ),
            loc("my-transcribe-output", "transcribe_a_mp3_1.json")
        );
    }

    #[test]
    fn parses_virtual_hosted_url() {
        assert_eq!(
            parse_s3_location("https://my-transcribe-output.s3.eu-west-1.amazonaws.com/out/j.json"),
            loc("my-transcribe-output", "out/j.json")
        );
    }

    #[test]
    fn presigned_and_foreign_urls_are_not_s3() {
        assert!(parse_s3_location(
            "https://s3.amazonaws.com/aws-transcribe-us-east-1-prod/j.json?X-Amz-Signature=abc"
        )
        .is_none());
        assert!(parse_s3_location("https://example.com/bucket/j.json").is_none());
        assert!(parse_s3_location("s3://bucket-only").is_none());
        assert!(parse_s3_location("not a url").is_none());
    }
}
