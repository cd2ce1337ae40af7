//! Error types shared across RateWidget crates.

use thiserror::Error;

/// Error parsing a currency code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyCodeError {
    /// Not three ASCII letters.
    #[error("Invalid currency code: {0:?}")]
    Invalid(String),
}
