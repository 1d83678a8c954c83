//! Monthly sales aggregation.
//!
//! Turns an article's sale events into the `(period, quantity)` series a
//! chart plots. Periods are `YYYY-MM` keys; because the year is zero-padded to
//! four digits, lexicographic key order is chronological order. Months without
//! sales are left out rather than filled with zeros.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Sale;

/// Quantity sold in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`.
    pub period: String,
    pub quantity: i64,
}

/// Buckets sales by calendar month and sums their quantities, ascending by
/// period. Empty input gives an empty series.
///
/// Stored sales are capped at [`MAX_SALE_QUANTITY`](crate::models::MAX_SALE_QUANTITY);
/// sums saturate at `i64::MAX` for rows written around that check.
pub fn monthly_totals(sales: &[Sale]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for sale in sales {
        let sum = buckets.entry(period_key(sale)).or_insert(0);
        *sum = sum.saturating_add(sale.quantity);
    }

    buckets
        .into_iter()
        .map(|(period, quantity)| MonthlyTotal { period, quantity })
        .collect()
}

/// Sum over a series, shown under the chart.
pub fn total_quantity(series: &[MonthlyTotal]) -> i64 {
    series
        .iter()
        .fold(0i64, |acc, m| acc.saturating_add(m.quantity))
}

fn period_key(sale: &Sale) -> String {
    sale.date.format("%Y-%m").to_string()
}
