//! Currency conversion through the snapshot's pivot currency.

use std::fmt;

use ratewidget_common::{CurrencyCode, CurrencyPair};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ConversionError;
use crate::snapshot::RateSnapshot;

/// Outcome of a conversion, at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Amount in the source currency.
    pub amount_in: f64,
    /// Amount in the target currency.
    pub amount_out: f64,
    /// Effective rate, `amount_out / amount_in`.
    pub rate: f64,
    /// Source currency.
    pub from: CurrencyCode,
    /// Target currency.
    pub to: CurrencyCode,
}

impl ConversionResult {
    /// Get the currency pair.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.from.clone(), self.to.clone())
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {} {} at rate {:.4}",
            format_amount(self.amount_in, 2, 4),
            self.from,
            format_amount(self.amount_out, 2, 4),
            self.to,
            self.rate
        )
    }
}

/// Convert `amount` of `from` into `to` using `snapshot`.
///
/// Rates are quoted against the snapshot pivot, so a cross between two
/// non-pivot currencies divides out the source rate and multiplies in the
/// target rate. Never performs I/O.
#[instrument(level = "debug", skip(snapshot), fields(pivot = %snapshot.pivot()))]
pub fn convert(
    amount: f64,
    from: &CurrencyCode,
    to: &CurrencyCode,
    snapshot: &RateSnapshot,
) -> Result<ConversionResult, ConversionError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ConversionError::InvalidAmount(amount));
    }

    if from == to {
        return Ok(ConversionResult {
            amount_in: amount,
            amount_out: amount,
            rate: 1.0,
            from: from.clone(),
            to: to.clone(),
        });
    }

    let from_rate = snapshot.usable_rate(from)?;
    let to_rate = snapshot.usable_rate(to)?;
    let pivot = snapshot.pivot();

    let amount_out = if from == pivot {
        amount * to_rate
    } else if to == pivot {
        amount / from_rate
    } else {
        (amount / from_rate) * to_rate
    };

    if !amount_out.is_finite() || amount_out <= 0.0 {
        return Err(ConversionError::OutOfRange { amount_out });
    }

    let rate = amount_out / amount;
    debug!(amount_out, rate, "Converted amount");

    Ok(ConversionResult {
        amount_in: amount,
        amount_out,
        rate,
        from: from.clone(),
        to: to.clone(),
    })
}

/// One row of the reference-rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRate {
    /// `base/target`.
    pub pair: CurrencyPair,
    /// Units of target per unit of base.
    pub rate: f64,
}

/// Rates of one unit of `base` into each of `targets`.
///
/// The base itself and targets without a usable rate are skipped.
pub fn reference_rates(
    snapshot: &RateSnapshot,
    base: &CurrencyCode,
    targets: &[CurrencyCode],
) -> Vec<ReferenceRate> {
    targets
        .iter()
        .filter(|target| *target != base)
        .filter_map(|target| {
            convert(1.0, base, target, snapshot)
                .ok()
                .map(|result| ReferenceRate {
                    pair: result.pair(),
                    rate: result.rate,
                })
        })
        .collect()
}

/// Format an amount with thousands separators and between
/// `min_fraction_digits` and `max_fraction_digits` fractional digits.
pub fn format_amount(value: f64, min_fraction_digits: usize, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let max_fraction_digits = max_fraction_digits.max(min_fraction_digits);
    let fixed = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_fraction_digits {
        frac.push('0');
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}
