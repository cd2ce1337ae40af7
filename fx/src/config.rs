//! Rate store configuration.

use std::time::Duration;

use ratewidget_common::{constants, CurrencyCode, DurationExt};

/// Public endpoint quoting the latest reference rates.
pub const DEFAULT_ENDPOINT: &str = "https://api.frankfurter.app/latest";

/// Configuration for fetching and presenting rates.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Rate endpoint, queried as `GET <endpoint>?base=<pivot>`.
    pub endpoint: String,
    /// Upper bound on one request, connect through body.
    pub request_timeout: Duration,
    /// Age after which a snapshot is reported as stale.
    pub stale_after: Duration,
    /// Pivot currency requested on refresh.
    pub pivot: CurrencyCode,
    /// Base currency of the reference-rate table.
    pub display_base: CurrencyCode,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: constants::request_timeout().as_std(),
            stale_after: constants::stale_after().as_std(),
            pivot: CurrencyCode::usd(),
            display_base: CurrencyCode::cny(),
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("RATE_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Some(secs) = lookup("RATE_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(secs) = lookup("RATE_STALE_AFTER_SECS") {
            if let Ok(secs) = secs.parse() {
                config.stale_after = Duration::from_secs(secs);
            }
        }

        if let Some(pivot) = lookup("RATE_PIVOT") {
            if let Ok(pivot) = pivot.parse() {
                config.pivot = pivot;
            }
        }

        if let Some(base) = lookup("RATE_DISPLAY_BASE") {
            if let Ok(base) = base.parse() {
                config.display_base = base;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("Rate endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!("Rate endpoint must be an http(s) URL: {}", self.endpoint));
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        if self.stale_after.is_zero() {
            return Err("Staleness window cannot be zero".to_string());
        }

        Ok(())
    }

    /// Staleness window as a chrono duration.
    pub fn stale_after_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.stale_after)
            .unwrap_or_else(|_| chrono::Duration::weeks(52 * 100))
    }
}
