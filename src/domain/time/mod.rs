//! Time value objects

mod duration;

pub use duration::{
    Duration, DEFAULT_MAX_WAIT_SECS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SUBMIT_DELAY_MS,
};
