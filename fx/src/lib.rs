//! RateWidget FX Core
//!
//! Exchange rate store and conversion engine.
//!
//! # Features
//!
//! - One published rate snapshot, replaced atomically on refresh
//! - HTTP rate source with a bounded request timeout
//! - Cross-currency conversion through the snapshot's pivot currency
//! - Staleness checks and a reference-rate table
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ratewidget_common::CurrencyCode;
//! use ratewidget_fx::{convert, FxConfig, HttpRateSource, RateStore};
//!
//! let config = FxConfig::default();
//! let source = HttpRateSource::new(&config.endpoint, config.request_timeout)?;
//! let store = RateStore::new(Arc::new(source));
//!
//! let snapshot = store.refresh(&CurrencyCode::usd()).await?;
//! let result = convert(100.0, &CurrencyCode::eur(), &CurrencyCode::jpy(), &snapshot)?;
//! ```

pub mod config;
pub mod conversion;
pub mod error;
pub mod provider;
pub mod snapshot;
pub mod store;

pub use config::FxConfig;
pub use conversion::{convert, format_amount, reference_rates, ConversionResult, ReferenceRate};
pub use error::{ConversionError, FetchError, FetchResult};
pub use provider::{HttpRateSource, RateQuote, RateSource};
pub use snapshot::RateSnapshot;
pub use store::{RateStore, RateStoreStats, SharedRateStore};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateSource;
