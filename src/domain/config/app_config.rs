//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::job::{DiarizationSettings, DEFAULT_MAX_SPEAKER_LABELS};
use crate::domain::time::Duration;

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default transcription language
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Default consecutive transient status failures before a job is given up
pub const DEFAULT_STATUS_QUERY_RETRIES: u32 = 3;

/// AWS connection settings.
/// Credentials are never stored here; they come from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: Option<String>,
    /// Custom endpoint, e.g. a local S3-compatible store
    pub endpoint_url: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub audio_bucket: Option<String>,
    pub audio_prefix: Option<String>,
    pub output_bucket: Option<String>,
    pub language_code: Option<String>,
    pub max_speaker_labels: Option<u32>,
    pub results_dir: Option<String>,
    pub max_wait: Option<String>,
    pub poll_interval: Option<String>,
    pub submit_delay: Option<String>,
    pub status_query_retries: Option<u32>,
    pub aws: Option<AwsConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            audio_bucket: None,
            audio_prefix: Some(String::new()),
            output_bucket: None,
            language_code: Some(DEFAULT_LANGUAGE_CODE.to_string()),
            max_speaker_labels: Some(DEFAULT_MAX_SPEAKER_LABELS),
            results_dir: None,
            max_wait: Some(Duration::default_max_wait().to_string()),
            poll_interval: Some(Duration::default_poll_interval().to_string()),
            submit_delay: Some(Duration::default_submit_delay().to_string()),
            status_query_retries: Some(DEFAULT_STATUS_QUERY_RETRIES),
            aws: Some(AwsConfig {
                region: Some(DEFAULT_REGION.to_string()),
                endpoint_url: None,
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            audio_bucket: other.audio_bucket.or(self.audio_bucket),
            audio_prefix: other.audio_prefix.or(self.audio_prefix),
            output_bucket: other.output_bucket.or(self.output_bucket),
            language_code: other.language_code.or(self.language_code),
            max_speaker_labels: other.max_speaker_labels.or(self.max_speaker_labels),
            results_dir: other.results_dir.or(self.results_dir),
            max_wait: other.max_wait.or(self.max_wait),
            poll_interval: other.poll_interval.or(self.poll_interval),
            submit_delay: other.submit_delay.or(self.submit_delay),
            status_query_retries: other.status_query_retries.or(self.status_query_retries),
            aws: Self::merge_aws_config(self.aws, other.aws),
        }
    }

    /// Merge AWS config sections
    fn merge_aws_config(base: Option<AwsConfig>, other: Option<AwsConfig>) -> Option<AwsConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(AwsConfig {
                region: o.region.or(b.region),
                endpoint_url: o.endpoint_url.or(b.endpoint_url),
            }),
        }
    }

    /// Get the audio prefix, or "" to list the whole bucket
    pub fn audio_prefix_or_default(&self) -> &str {
        self.audio_prefix.as_deref().unwrap_or("")
    }

    /// Get the language code, or "en-US" if not set
    pub fn language_code_or_default(&self) -> &str {
        self.language_code
            .as_deref()
            .unwrap_or(DEFAULT_LANGUAGE_CODE)
    }

    /// Get the transient status failure budget, or 3 if not set
    pub fn status_query_retries_or_default(&self) -> u32 {
        self.status_query_retries
            .unwrap_or(DEFAULT_STATUS_QUERY_RETRIES)
    }

    /// Diarization settings for new jobs
    pub fn diarization(&self) -> DiarizationSettings {
        DiarizationSettings {
            max_speaker_labels: self
                .max_speaker_labels
                .unwrap_or(DEFAULT_MAX_SPEAKER_LABELS),
            ..Default::default()
        }
    }

    /// Get the AWS region, or "us-east-1" if not set
    pub fn region_or_default(&self) -> &str {
        self.aws
            .as_ref()
            .and_then(|a| a.region.as_deref())
            .unwrap_or(DEFAULT_REGION)
    }

    /// Get the custom AWS endpoint, if any
    pub fn endpoint_url(&self) -> Option<&str> {
        self.aws.as_ref().and_then(|a| a.endpoint_url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.audio_bucket.is_none());
        assert!(config.output_bucket.is_none());
        assert_eq!(config.language_code, Some("en-US".to_string()));
        assert_eq!(config.max_wait, Some("30m".to_string()));
        assert_eq!(config.poll_interval, Some("30s".to_string()));
        assert_eq!(config.submit_delay, Some("500ms".to_string()));
        assert_eq!(config.status_query_retries, Some(3));
        assert_eq!(config.region_or_default(), "us-east-1");
        assert!(config.endpoint_url().is_none());
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.audio_bucket.is_none());
        assert!(config.max_wait.is_none());
        assert!(config.aws.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            audio_bucket: Some("base-bucket".to_string()),
            max_wait: Some("10m".to_string()),
            language_code: Some("en-US".to_string()),
            ..Default::default()
        };

        let other = AppConfig {
            audio_bucket: Some("other-bucket".to_string()),
            max_wait: None, // Should not override
            language_code: Some("es-US".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.audio_bucket, Some("other-bucket".to_string()));
        assert_eq!(merged.max_wait, Some("10m".to_string())); // Kept from base
        assert_eq!(merged.language_code, Some("es-US".to_string()));
    }

    #[test]
    fn merge_aws_section_field_by_field() {
        let base = AppConfig {
            aws: Some(AwsConfig {
                region: Some("eu-west-1".to_string()),
                endpoint_url: Some("http://localhost:4566".to_string()),
            }),
            ..Default::default()
        };
        let other = AppConfig {
            aws: Some(AwsConfig {
                region: Some("us-west-2".to_string()),
                endpoint_url: None,
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.region_or_default(), "us-west-2");
        assert_eq!(merged.endpoint_url(), Some("http://localhost:4566"));
    }

    #[test]
    fn scalar_defaults_on_empty() {
        let config = AppConfig::empty();
        assert_eq!(config.audio_prefix_or_default(), "");
        assert_eq!(config.language_code_or_default(), "en-US");
        assert_eq!(config.status_query_retries_or_default(), 3);
        assert_eq!(config.region_or_default(), "us-east-1");
    }

    #[test]
    fn diarization_uses_configured_speaker_limit() {
        let config = AppConfig {
            max_speaker_labels: Some(4),
            ..Default::default()
        };
        let settings = config.diarization();
        assert_eq!(settings.max_speaker_labels, 4);
        assert!(settings.show_speaker_labels);
        assert_eq!(AppConfig::empty().diarization().max_speaker_labels, 10);
    }
}
