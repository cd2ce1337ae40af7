//! Converter session: the input state behind the widget.

use std::sync::Arc;

use chrono::Duration;
use ratewidget_common::{now, CurrencyCode, CurrencyCodeError, CurrencyPair};
use ratewidget_fx::{
    convert, reference_rates, ConversionError, ConversionResult, FetchError, RateSnapshot,
    ReferenceRate, SharedRateStore,
};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to the user by the widget.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No refresh has succeeded yet.
    #[error("Exchange rates are not loaded yet, try refreshing")]
    NoRates,

    /// Amount input is not a number.
    #[error("Not a number: {0:?}")]
    AmountInput(String),

    #[error(transparent)]
    Currency(#[from] CurrencyCodeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Amount and currency selection, bound to a shared rate store.
pub struct ConverterSession {
    store: SharedRateStore,
    pivot: CurrencyCode,
    stale_after: Duration,
    amount: f64,
    pair: CurrencyPair,
}

impl ConverterSession {
    /// Start a session converting 100 USD into CNY.
    pub fn new(store: SharedRateStore, pivot: CurrencyCode, stale_after: Duration) -> Self {
        Self {
            store,
            pivot,
            stale_after,
            amount: 100.0,
            pair: CurrencyPair::new(CurrencyCode::usd(), CurrencyCode::cny()),
        }
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// Parse and set the amount. Positivity is checked on conversion.
    pub fn set_amount(&mut self, input: &str) -> Result<(), SessionError> {
        let amount = input
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|_| SessionError::AmountInput(input.to_string()))?;
        self.amount = amount;
        Ok(())
    }

    pub fn set_from(&mut self, code: &str) -> Result<(), SessionError> {
        self.pair.from = code.parse()?;
        Ok(())
    }

    pub fn set_to(&mut self, code: &str) -> Result<(), SessionError> {
        self.pair.to = code.parse()?;
        Ok(())
    }

    /// Exchange source and target currencies.
    pub fn swap(&mut self) {
        self.pair = self.pair.inverse();
        debug!(pair = %self.pair, "Swapped currencies");
    }

    /// Fetch fresh rates for the session pivot.
    pub async fn refresh(&self) -> Result<Arc<RateSnapshot>, SessionError> {
        Ok(self.store.refresh(&self.pivot).await?)
    }

    /// Snapshot currently published by the store.
    pub fn snapshot(&self) -> Result<Arc<RateSnapshot>, SessionError> {
        self.store.current().ok_or(SessionError::NoRates)
    }

    /// Convert the current amount with the current selection.
    pub fn convert(&self) -> Result<ConversionResult, SessionError> {
        let snapshot = self.snapshot()?;
        Ok(convert(self.amount, &self.pair.from, &self.pair.to, &snapshot)?)
    }

    /// Reference rates of one unit of `base` into each of `targets`.
    pub fn reference_table(
        &self,
        base: &CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<Vec<ReferenceRate>, SessionError> {
        let snapshot = self.snapshot()?;
        Ok(reference_rates(&snapshot, base, targets))
    }

    /// Age of the published snapshot when it exceeds the staleness window.
    pub fn staleness(&self) -> Option<Duration> {
        let snapshot = self.store.current()?;
        let at = now();
        snapshot
            .is_stale(at, self.stale_after)
            .then(|| snapshot.age(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratewidget_common::{codes, MAJOR_CURRENCIES};
    use ratewidget_fx::{MockRateSource, RateQuote, RateStore};
    use std::collections::BTreeMap;

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    fn setup_session() -> (Arc<MockRateSource>, ConverterSession) {
        let source = Arc::new(MockRateSource::new("test"));
        let store = Arc::new(RateStore::new(source.clone()));
        let session = ConverterSession::new(store, code("USD"), Duration::hours(1));
        (source, session)
    }

    fn sample_quote() -> RateQuote {
        let mut rates = BTreeMap::new();
        rates.insert(code("EUR"), 0.9);
        rates.insert(code("JPY"), 150.0);
        rates.insert(code("CNY"), 7.2);
        RateQuote::new(rates)
    }

    #[test]
    fn test_convert_without_rates() {
        let (_, session) = setup_session();

        assert!(matches!(session.convert(), Err(SessionError::NoRates)));
        assert!(session.staleness().is_none());
    }

    #[tokio::test]
    async fn test_refresh_then_convert() {
        let (source, mut session) = setup_session();
        source.push_response(Ok(sample_quote()));

        session.refresh().await.unwrap();
        session.set_amount("100").unwrap();
        session.set_from("eur").unwrap();
        session.set_to("JPY").unwrap();

        let result = session.convert().unwrap();
        assert!((result.amount_out - 16666.666666666668).abs() < 1e-6);
        assert!(session.staleness().is_none());
    }

    #[tokio::test]
    async fn test_swap_inverts_conversion() {
        let (source, mut session) = setup_session();
        source.push_response(Ok(sample_quote()));
        session.refresh().await.unwrap();

        let forward = session.convert().unwrap();
        session.swap();
        let backward = session.convert().unwrap();

        assert_eq!(session.pair().from, code("CNY"));
        assert_eq!(session.pair().to, code("USD"));
        assert!((forward.rate * backward.rate - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_rates() {
        let (source, session) = setup_session();
        source.push_response(Ok(sample_quote()));
        source.push_response(Err(FetchError::HttpStatus(500)));

        session.refresh().await.unwrap();
        let err = session.refresh().await.unwrap_err();

        assert!(matches!(err, SessionError::Fetch(FetchError::HttpStatus(500))));
        assert!(session.convert().is_ok());
    }

    #[tokio::test]
    async fn test_input_errors() {
        let (source, mut session) = setup_session();
        source.push_response(Ok(sample_quote()));
        session.refresh().await.unwrap();

        assert!(matches!(
            session.set_amount("abc"),
            Err(SessionError::AmountInput(_))
        ));
        assert!(matches!(session.set_from("EURO"), Err(SessionError::Currency(_))));

        session.set_amount("-5").unwrap();
        assert!(matches!(
            session.convert(),
            Err(SessionError::Conversion(ConversionError::InvalidAmount(_)))
        ));

        session.set_amount("1,000").unwrap();
        assert_eq!(session.convert().unwrap().amount_in, 1000.0);
        session.set_to("XYZ").unwrap();
        assert!(matches!(
            session.convert(),
            Err(SessionError::Conversion(ConversionError::UnknownCurrency(_)))
        ));
    }

    #[tokio::test]
    async fn test_reference_table() {
        let (source, session) = setup_session();
        source.push_response(Ok(sample_quote()));
        session.refresh().await.unwrap();

        let table = session
            .reference_table(&code("CNY"), &codes(&MAJOR_CURRENCIES))
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table[0].pair.to, code("USD"));
    }
}
