//! Plain-text rendering of conversion results and rate tables.

use chrono::Duration;
use ratewidget_common::CurrencyCode;
use ratewidget_fx::{format_amount, ConversionResult, RateSnapshot, ReferenceRate};

fn label(code: &CurrencyCode) -> String {
    match code.display_name() {
        Some(name) => format!("{} ({})", code, name),
        None => code.to_string(),
    }
}

/// Result line plus the effective rate line.
pub fn conversion(result: &ConversionResult) -> String {
    format!(
        "{} {} = {} {}\nRate: 1 {} = {:.4} {}\n",
        format_amount(result.amount_in, 2, 4),
        result.from,
        format_amount(result.amount_out, 2, 4),
        label(&result.to),
        result.from,
        result.rate,
        result.to,
    )
}

/// When the snapshot was fetched, and the source's own date if known.
pub fn updated_at(snapshot: &RateSnapshot) -> String {
    let fetched = snapshot.fetched_at().format("%Y-%m-%d %H:%M:%S UTC");
    match snapshot.as_of() {
        Some(date) => format!(
            "Rates updated: {} (published {}, pivot {})\n",
            fetched,
            date,
            snapshot.pivot()
        ),
        None => format!("Rates updated: {} (pivot {})\n", fetched, snapshot.pivot()),
    }
}

pub fn stale_warning(age: Duration) -> String {
    format!(
        "Warning: rates are {} minutes old, refresh for current values\n",
        age.num_minutes()
    )
}

/// Reference table, one `BASE/CODE  rate` row per entry.
pub fn reference_table(rows: &[ReferenceRate]) -> String {
    if rows.is_empty() {
        return "No reference rates available\n".to_string();
    }

    let mut output = String::new();
    for row in rows {
        output.push_str(&format!("{:<9}{:>14.4}\n", row.pair.to_string(), row.rate));
    }
    output
}
