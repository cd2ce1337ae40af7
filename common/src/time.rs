//! Time utilities and constants for RateWidget.

use chrono::{DateTime, Duration, Utc};

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// Upper bound on a single rate request (10 seconds).
    pub fn request_timeout() -> Duration {
        Duration::seconds(10)
    }

    /// Age after which a snapshot is reported as stale (1 hour).
    pub fn stale_after() -> Duration {
        Duration::hours(1)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Time elapsed since `then`, clamped at zero for timestamps in the future.
pub fn age_at(then: Timestamp, at: Timestamp) -> Duration {
    let age = at - then;
    if age < Duration::zero() {
        Duration::zero()
    } else {
        age
    }
}

/// Duration extensions for convenient conversion.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
