//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default wall-clock budget for polling (30 minutes)
pub const DEFAULT_MAX_WAIT_SECS: u64 = 30 * 60;

/// Default pause between poll rounds (30 seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default pause between job submissions (500 milliseconds)
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 500;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default polling budget
    pub const fn default_max_wait() -> Self {
        Self::from_secs(DEFAULT_MAX_WAIT_SECS)
    }

    /// Default poll interval
    pub const fn default_poll_interval() -> Self {
        Self::from_secs(DEFAULT_POLL_INTERVAL_SECS)
    }

    /// Default delay between submissions
    pub const fn default_submit_delay() -> Self {
        Self::from_millis(DEFAULT_SUBMIT_DELAY_MS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }

    fn unit_millis(unit: &str) -> Option<u64> {
        match unit {
            "h" => Some(3_600_000),
            "m" => Some(60_000),
            "s" => Some(1_000),
            "ms" => Some(1),
            _ => None,
        }
    }

    /// Parse a pause that may be switched off with `0s` or `0ms`
    pub fn parse_delay(s: &str) -> Result<Self, DurationParseError> {
        Self::parse_millis(s).map(Self::from_millis)
    }

    fn parse_millis(s: &str) -> Result<u64, DurationParseError> {
        let invalid = || DurationParseError { input: s.to_string() };
        let input = s.trim().to_lowercase();

        let mut total_ms: u64 = 0;
        let mut current_num = String::new();
        let mut current_unit = String::new();
        let mut found_any = false;

        let mut flush = |num: &mut String, unit: &mut String| -> Result<(), DurationParseError> {
            let value: u64 = num.parse().map_err(|_| invalid())?;
            let factor = Self::unit_millis(unit).ok_or_else(invalid)?;
            total_ms = value
                .checked_mul(factor)
                .and_then(|ms| total_ms.checked_add(ms))
                .ok_or_else(invalid)?;
            num.clear();
            unit.clear();
            Ok(())
        };

        for ch in input.chars() {
            if ch.is_ascii_digit() {
                if !current_unit.is_empty() {
                    flush(&mut current_num, &mut current_unit)?;
                    found_any = true;
                }
                current_num.push(ch);
            } else if ch.is_ascii_alphabetic() && !current_num.is_empty() {
                current_unit.push(ch);
            } else {
                return Err(invalid());
            }
        }

        // A bare trailing number has no unit
        if !current_num.is_empty() {
            if current_unit.is_empty() {
                return Err(invalid());
            }
            flush(&mut current_num, &mut current_unit)?;
            found_any = true;
        }

        if !found_any {
            return Err(invalid());
        }
        Ok(total_ms)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string into a Duration value object.
    /// Supported formats: "500ms", "30s", "1m", "2m30s", "1h", "1h30m". Zero is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_millis(s)? {
            0 => Err(DurationParseError {
                input: s.to_string(),
            }),
            ms => Ok(Self::from_millis(ms)),
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds % 1000 != 0 {
            return write!(f, "{}ms", self.milliseconds);
        }

        let total_secs = self.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        let mut out = String::new();
        if hours > 0 {
            out.push_str(&format!("{}h", hours));
        }
        if minutes > 0 {
            out.push_str(&format!("{}m", minutes));
        }
        if seconds > 0 || out.is_empty() {
            out.push_str(&format!("{}s", seconds));
        }
        write!(f, "{}", out)
    }
}

impl From<Duration> for StdDuration {
    fn from(d: Duration) -> Self {
        d.as_std()
    }
}
