//! XDG config store adapter
//!
//! The config file holds bucket names and tuning knobs only. Credentials are
//! read from the environment and never written here.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const INIT_HEADER: &str = "\
# batch-scribe configuration
# AWS credentials come from AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY, not this file.

";

/// XDG-compliant config store
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Store at `$XDG_CONFIG_HOME/batch-scribe/config.toml`
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("batch-scribe");

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    /// Write through a sibling temp file so a failed write keeps the old config
    async fn write_file(&self, content: String) -> Result<(), ConfigError> {
        let write_error = |e: std::io::Error| ConfigError::WriteError(e.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content).await.map_err(write_error)?;
        fs::rename(&tmp, &self.path).await.map_err(write_error)?;

        debug!(path = %self.path.display(), "config written");
        Ok(())
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppConfig::empty()),
            Err(e) => Err(ConfigError::ReadError(e.to_string())),
        }
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.write_file(Self::to_toml(config)?).await
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        let body = Self::to_toml(&AppConfig::defaults())?;
        self.write_file(format!("{}{}", INIT_HEADER, body)).await
    }
}
