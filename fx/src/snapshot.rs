//! Immutable rate snapshots.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use ratewidget_common::{age_at, CurrencyCode, Timestamp};
use serde::Serialize;

use crate::error::ConversionError;

/// A fully populated set of rates quoted against one pivot currency.
///
/// `rates[code]` is how many units of `code` one unit of the pivot buys.
/// The pivot always maps to exactly `1.0`. Fields are private so a published
/// snapshot cannot be modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    pivot: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
    fetched_at: Timestamp,
    as_of: Option<NaiveDate>,
}

impl RateSnapshot {
    /// Build a snapshot, forcing the pivot's own rate to `1.0`.
    pub fn new(
        pivot: CurrencyCode,
        mut rates: BTreeMap<CurrencyCode, f64>,
        fetched_at: Timestamp,
    ) -> Self {
        rates.insert(pivot.clone(), 1.0);
        Self {
            pivot,
            rates,
            fetched_at,
            as_of: None,
        }
    }

    /// Attach the publication date reported by the rate source.
    pub fn with_as_of(mut self, as_of: Option<NaiveDate>) -> Self {
        self.as_of = as_of;
        self
    }

    /// Currency all rates are quoted against.
    pub fn pivot(&self) -> &CurrencyCode {
        &self.pivot
    }

    /// When the snapshot was fetched.
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Publication date reported by the source, if any.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// All rates, ordered by currency code.
    pub fn rates(&self) -> &BTreeMap<CurrencyCode, f64> {
        &self.rates
    }

    /// Raw rate for a currency, usable or not.
    pub fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    /// Rate for a currency, rejecting absent and non-positive/non-finite values.
    pub fn usable_rate(&self, currency: &CurrencyCode) -> Result<f64, ConversionError> {
        let rate = self
            .rate(currency)
            .ok_or_else(|| ConversionError::UnknownCurrency(currency.clone()))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConversionError::UnusableRate {
                currency: currency.clone(),
                rate,
            });
        }

        Ok(rate)
    }

    /// Check whether a currency is quoted.
    pub fn contains(&self, currency: &CurrencyCode) -> bool {
        self.rates.contains_key(currency)
    }

    /// Quoted currencies, ordered by code.
    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    /// Number of quoted currencies, pivot included.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Always false; the pivot is always present.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Age of the snapshot at `now`.
    pub fn age(&self, now: Timestamp) -> Duration {
        age_at(self.fetched_at, now)
    }

    /// Whether the snapshot is older than `max_age` at `now`.
    pub fn is_stale(&self, now: Timestamp, max_age: Duration) -> bool {
        self.age(now) > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratewidget_common::now;

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    #[test]
    fn test_pivot_forced_to_one() {
        let mut rates = BTreeMap::new();
        rates.insert(code("EUR"), 0.9);
        rates.insert(code("USD"), 0.5);

        let snapshot = RateSnapshot::new(code("USD"), rates, now());

        assert_eq!(snapshot.rate(&code("USD")), Some(1.0));
        assert_eq!(snapshot.rate(&code("EUR")), Some(0.9));
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_serialized_snapshot_keeps_pivot_at_one() {
        let mut rates = BTreeMap::new();
        rates.insert(code("USD"), 2.0);
        rates.insert(code("EUR"), 0.9);
        let snapshot = RateSnapshot::new(code("USD"), rates, now());

        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["pivot"], "USD");
        assert_eq!(json["rates"]["USD"], 1.0);
        assert_eq!(json["rates"]["EUR"], 0.9);
    }

    #[test]
    fn test_pivot_added_when_missing() {
        let snapshot = RateSnapshot::new(code("CNY"), BTreeMap::new(), now());

        assert!(snapshot.contains(&code("CNY")));
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_usable_rate() {
        let mut rates = BTreeMap::new();
        rates.insert(code("EUR"), 0.9);
        rates.insert(code("BAD"), -1.0);
        rates.insert(code("NUL"), 0.0);
        rates.insert(code("INF"), f64::INFINITY);
        let snapshot = RateSnapshot::new(code("USD"), rates, now());

        assert_eq!(snapshot.usable_rate(&code("EUR")), Ok(0.9));
        assert!(matches!(
            snapshot.usable_rate(&code("BAD")),
            Err(ConversionError::UnusableRate { .. })
        ));
        assert!(matches!(
            snapshot.usable_rate(&code("NUL")),
            Err(ConversionError::UnusableRate { .. })
        ));
        assert!(matches!(
            snapshot.usable_rate(&code("INF")),
            Err(ConversionError::UnusableRate { .. })
        ));
        assert_eq!(
            snapshot.usable_rate(&code("XYZ")),
            Err(ConversionError::UnknownCurrency(code("XYZ")))
        );
    }

    #[test]
    fn test_staleness() {
        let fetched = now() - Duration::minutes(90);
        let snapshot = RateSnapshot::new(code("USD"), BTreeMap::new(), fetched);

        assert!(snapshot.is_stale(now(), Duration::hours(1)));
        assert!(!snapshot.is_stale(now(), Duration::hours(2)));
        assert!(snapshot.age(now()) >= Duration::minutes(90));
    }
}
