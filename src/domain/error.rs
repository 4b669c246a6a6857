//! Domain error types

use thiserror::Error;

use super::job::JobStatus;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected <number><unit> with units h, m, s or ms (e.g., 500ms, 30s, 1m, 1h30m)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a record is built from incomplete data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {record}: {field} must not be empty")]
pub struct RecordValidationError {
    pub record: &'static str,
    pub field: &'static str,
}

/// Error when a job status change is not allowed
#[derive(Debug, Clone, Error)]
#[error("Invalid status transition for job {job_name}: {from} -> {to}")]
pub struct InvalidStatusTransition {
    pub job_name: String,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
