//! Rate store and conversion error types.

use ratewidget_common::CurrencyCode;
use thiserror::Error;

/// Errors that can occur while refreshing rates.
///
/// Every variant leaves the previously published snapshot in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Transport-level failure: DNS, connect, reset or timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Rate source answered with a non-success status.
    #[error("Rate source returned HTTP {0}")]
    HttpStatus(u16),

    /// Response body did not have the expected shape.
    #[error("Malformed rate response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Check if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::HttpStatus(code) => *code == 429 || *code >= 500,
            FetchError::MalformedResponse(_) => false,
        }
    }

    /// Get a stable error code for display.
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "NETWORK_ERROR",
            FetchError::HttpStatus(_) => "HTTP_STATUS",
            FetchError::MalformedResponse(_) => "MALFORMED_RESPONSE",
        }
    }
}

/// Errors that can occur converting an amount.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Amount is zero, negative, NaN or infinite.
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// Currency has no rate in the snapshot.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(CurrencyCode),

    /// Currency has a rate that is zero, negative or not finite.
    #[error("Unusable rate {rate} for {currency}")]
    UnusableRate { currency: CurrencyCode, rate: f64 },

    /// Result overflowed to infinity or underflowed to zero.
    #[error("Converted amount {amount_out} is out of range")]
    OutOfRange { amount_out: f64 },
}

impl ConversionError {
    /// Get a stable error code for display.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConversionError::InvalidAmount(_) => "INVALID_AMOUNT",
            ConversionError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            ConversionError::UnusableRate { .. } => "UNUSABLE_RATE",
            ConversionError::OutOfRange { .. } => "OUT_OF_RANGE",
        }
    }
}

/// Result type for refresh operations.
pub type FetchResult<T> = Result<T, FetchError>;
