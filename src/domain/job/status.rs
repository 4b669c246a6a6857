//! Transcription job status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Job lifecycle states
///
/// State machine:
///   SUBMITTED -> IN_PROGRESS | COMPLETED | FAILED | ERROR
///   IN_PROGRESS -> IN_PROGRESS | COMPLETED | FAILED | ERROR
///   COMPLETED, FAILED, ERROR are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[default]
    Submitted,
    InProgress,
    Completed,
    Failed,
    Error,
}

impl JobStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
        }
    }

    /// No further transition occurs from a terminal state
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Error)
    }

    /// Whether moving from `self` to `next` is allowed
    pub const fn can_transition_to(&self, next: JobStatus) -> bool {
        match self {
            Self::Submitted | Self::InProgress => !matches!(next, Self::Submitted),
            Self::Completed | Self::Failed | Self::Error => false,
        }
    }

    /// Map a status string reported by the transcription service.
    /// Queued jobs have been accepted but not started, which is still in progress here.
    pub fn from_service(value: &str) -> Option<Self> {
        match value {
            "QUEUED" | "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMITTED" => Ok(Self::Submitted),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}
