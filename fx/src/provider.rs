//! Rate source trait and the HTTP implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use ratewidget_common::CurrencyCode;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Rates as returned by a source, before they become a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    /// Base currency echoed by the source, if it reports one.
    pub base: Option<CurrencyCode>,
    /// Publication date reported by the source.
    pub date: Option<NaiveDate>,
    /// Units of each currency per unit of the requested pivot.
    pub rates: BTreeMap<CurrencyCode, f64>,
}

impl RateQuote {
    /// Quote with rates only.
    pub fn new(rates: BTreeMap<CurrencyCode, f64>) -> Self {
        Self {
            base: None,
            date: None,
            rates,
        }
    }
}

/// Trait for exchange rate sources.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch every rate quoted against `pivot`. Issues exactly one request.
    async fn fetch(&self, pivot: &CurrencyCode) -> FetchResult<RateQuote>;
}

#[derive(Debug, Deserialize)]
struct LatestRatesBody {
    #[serde(default)]
    base: Option<CurrencyCode>,
    #[serde(default, deserialize_with = "de_lenient_date")]
    date: Option<NaiveDate>,
    #[serde(deserialize_with = "de_unique_rates")]
    rates: BTreeMap<CurrencyCode, f64>,
}

/// `date` is informational: anything but an ISO `YYYY-MM-DD` string is `None`.
fn de_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

/// Rate map whose keys must stay distinct after code normalization.
fn de_unique_rates<'de, D>(deserializer: D) -> Result<BTreeMap<CurrencyCode, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueRates;

    impl<'de> Visitor<'de> for UniqueRates {
        type Value = BTreeMap<CurrencyCode, f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of currency codes to rates")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut rates = BTreeMap::new();
            while let Some((key, rate)) = access.next_entry::<String, f64>()? {
                let code = CurrencyCode::new(&key).map_err(de::Error::custom)?;
                if rates.insert(code, rate).is_some() {
                    return Err(de::Error::custom(format!("duplicate rate for {}", key)));
                }
            }
            Ok(rates)
        }
    }

    deserializer.deserialize_map(UniqueRates)
}

/// Parse a `latest` response body requested for `pivot`.
///
/// The body must be an object whose `rates` field maps currency codes to
/// numbers. A reported `base` must match the requested pivot.
pub fn parse_quote(body: &str, pivot: &CurrencyCode) -> FetchResult<RateQuote> {
    let parsed: LatestRatesBody = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    if let Some(base) = &parsed.base {
        if base != pivot {
            return Err(FetchError::MalformedResponse(format!(
                "requested base {} but response is quoted in {}",
                pivot, base
            )));
        }
    }

    Ok(RateQuote {
        base: parsed.base,
        date: parsed.date,
        rates: parsed.rates,
    })
}

/// Rate source backed by a `GET <endpoint>?base=<pivot>` REST API.
pub struct HttpRateSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRateSource {
    /// Create a source for `endpoint` with a bounded per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch(&self, pivot: &CurrencyCode) -> FetchResult<RateQuote> {
        debug!(endpoint = %self.endpoint, pivot = %pivot, "Requesting rates");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("base", pivot.code())])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        debug!(pivot = %pivot, bytes = body.len(), "Received rate response");

        parse_quote(&body, pivot)
    }
}

/// Scripted rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    name: String,
    responses: parking_lot::Mutex<std::collections::VecDeque<(Duration, FetchResult<RateQuote>)>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    /// Create a mock source with no scripted responses.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Queue a response returned immediately.
    pub fn push_response(&self, response: FetchResult<RateQuote>) {
        self.push_delayed(Duration::ZERO, response);
    }

    /// Queue a response returned after `delay`.
    pub fn push_delayed(&self, delay: Duration, response: FetchResult<RateQuote>) {
        self.responses.lock().push_back((delay, response));
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _pivot: &CurrencyCode) -> FetchResult<RateQuote> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let next = self.responses.lock().pop_front();

        match next {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Err(FetchError::Network("no scripted response".to_string())),
        }
    }
}
