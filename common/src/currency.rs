//! Currency codes and pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurrencyCodeError;

/// ISO 4217-style three-letter currency code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code.
    ///
    /// Surrounding whitespace is trimmed and letters are uppercased, so
    /// `" eur"` and `"EUR"` produce the same code.
    pub fn new(code: &str) -> Result<Self, CurrencyCodeError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyCodeError::Invalid(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Human-readable name for the currencies the widget offers.
    pub fn display_name(&self) -> Option<&'static str> {
        let name = match self.0.as_str() {
            "USD" => "US Dollar",
            "EUR" => "Euro",
            "JPY" => "Japanese Yen",
            "GBP" => "British Pound",
            "CNY" => "Chinese Yuan",
            "CAD" => "Canadian Dollar",
            "AUD" => "Australian Dollar",
            "CHF" => "Swiss Franc",
            "HKD" => "Hong Kong Dollar",
            "SGD" => "Singapore Dollar",
            _ => return None,
        };
        Some(name)
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    pub fn gbp() -> Self {
        Self("GBP".to_string())
    }

    pub fn jpy() -> Self {
        Self("JPY".to_string())
    }

    pub fn cny() -> Self {
        Self("CNY".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Currencies the widget lets a user pick from.
pub const WIDGET_CURRENCIES: [&str; 10] = [
    "USD", "EUR", "JPY", "GBP", "CNY", "CAD", "AUD", "CHF", "HKD", "SGD",
];

/// Currencies listed in the reference-rate table.
pub const MAJOR_CURRENCIES: [&str; 6] = ["USD", "EUR", "JPY", "GBP", "CAD", "AUD"];

/// Parse a list of literal codes known to be valid.
pub fn codes(list: &[&str]) -> Vec<CurrencyCode> {
    list.iter().filter_map(|c| CurrencyCode::new(c).ok()).collect()
}

/// A source/target pair for a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being converted from.
    pub from: CurrencyCode,
    /// Currency being converted to.
    pub to: CurrencyCode,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    /// Whether both sides are the same currency.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}
