//! Config command handler

use url::Url;

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, AwsConfig};
use crate::domain::error::ConfigError;
use crate::domain::time::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

/// Speaker label limits accepted by the transcription service
const SPEAKER_LABELS_RANGE: std::ops::RangeInclusive<u32> = 2..=30;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;

    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(get_value(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, get_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Current value of a key, as text
fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "audio_bucket" => config.audio_bucket.clone(),
        "audio_prefix" => config.audio_prefix.clone(),
        "output_bucket" => config.output_bucket.clone(),
        "language_code" => config.language_code.clone(),
        "max_speaker_labels" => config.max_speaker_labels.map(|n| n.to_string()),
        "results_dir" => config.results_dir.clone(),
        "max_wait" => config.max_wait.clone(),
        "poll_interval" => config.poll_interval.clone(),
        "submit_delay" => config.submit_delay.clone(),
        "status_query_retries" => config.status_query_retries.map(|n| n.to_string()),
        "aws.region" => config.aws.as_ref().and_then(|a| a.region.clone()),
        "aws.endpoint_url" => config.aws.as_ref().and_then(|a| a.endpoint_url.clone()),
        _ => None,
    }
}

/// Validate and store a value
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let text = || Some(value.to_string());

    match key {
        "audio_bucket" | "output_bucket" => {
            if value.is_empty() || value.contains('/') {
                return Err(invalid(key, "Expected a bucket name without slashes"));
            }
            if key == "audio_bucket" {
                config.audio_bucket = text();
            } else {
                config.output_bucket = text();
            }
        }
        "audio_prefix" => config.audio_prefix = text(),
        "language_code" => {
            if !is_language_code(value) {
                return Err(invalid(key, "Expected a language code like en-US"));
            }
            config.language_code = text();
        }
        "max_speaker_labels" => {
            let n = parse_u32(key, value)?;
            if !SPEAKER_LABELS_RANGE.contains(&n) {
                return Err(invalid(
                    key,
                    format!(
                        "Must be between {} and {}",
                        SPEAKER_LABELS_RANGE.start(),
                        SPEAKER_LABELS_RANGE.end()
                    ),
                ));
            }
            config.max_speaker_labels = Some(n);
        }
        "results_dir" => config.results_dir = text(),
        "max_wait" | "poll_interval" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            if key == "max_wait" {
                config.max_wait = text();
            } else {
                config.poll_interval = text();
            }
        }
        "submit_delay" => {
            Duration::parse_delay(value).map_err(|e| invalid(key, e.to_string()))?;
            config.submit_delay = text();
        }
        "status_query_retries" => {
            let n = parse_u32(key, value)?;
            if n == 0 {
                return Err(invalid(key, "Must be at least 1"));
            }
            config.status_query_retries = Some(n);
        }
        "aws.region" | "aws.endpoint_url" => {
            let aws = config.aws.get_or_insert_with(AwsConfig::default);
            if key == "aws.region" {
                if value.is_empty() {
                    return Err(invalid(key, "Region cannot be empty"));
                }
                aws.region = text();
            } else {
                Url::parse(value).map_err(|e| invalid(key, e.to_string()))?;
                aws.endpoint_url = text();
            }
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .map_err(|_| invalid(key, "Expected a whole number"))
}

/// `ll-CC` shape, e.g. en-US or en-AB
fn is_language_code(value: &str) -> bool {
    let Some((lang, region)) = value.split_once('-') else {
        return false;
    };
    (2..=3).contains(&lang.len())
        && lang.chars().all(|c| c.is_ascii_lowercase())
        && region.len() == 2
        && region.chars().all(|c| c.is_ascii_uppercase())
}
