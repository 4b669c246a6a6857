//! AWS connection settings shared by the S3 and Transcribe adapters

use std::env;

use thiserror::Error;

use crate::domain::config::AppConfig;

pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";

#[derive(Debug, Error)]
#[error("Missing AWS credentials. Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY")]
pub struct MissingCredentials;

/// Static credentials read from the environment
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl StaticCredentials {
    pub fn from_env() -> Result<Self, MissingCredentials> {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        Ok(Self {
            access_key_id: non_empty(ACCESS_KEY_ENV).ok_or(MissingCredentials)?,
            secret_access_key: non_empty(SECRET_KEY_ENV).ok_or(MissingCredentials)?,
            session_token: non_empty(SESSION_TOKEN_ENV),
        })
    }
}

/// Region, endpoint and credentials for building SDK clients
#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub region: String,
    /// Custom endpoint, e.g. LocalStack or MinIO. Forces path-style S3 addressing.
    pub endpoint_url: Option<String>,
    pub credentials: StaticCredentials,
}

impl AwsSettings {
    /// Settings from resolved config plus credentials from the environment
    pub fn from_config(config: &AppConfig) -> Result<Self, MissingCredentials> {
        Ok(Self {
            region: config.region_or_default().to_string(),
            endpoint_url: config.endpoint_url().map(str::to_string),
            credentials: StaticCredentials::from_env()?,
        })
    }
}
