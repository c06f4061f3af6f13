//! KPI aggregation over a filtered transaction collection.
//!
//! Two snapshot shapes coexist deliberately: the dashboard KPI cards use the
//! median-based [KpiSnapshot], while the performance report and the period
//! comparator use the profit-based [ProfitKpis]. They are kept as separate
//! types rather than merged into one schema because the two surfaces disagree
//! on their fifth metric.

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// The scalar metrics shown on the dashboard KPI cards.
///
/// An empty collection aggregates to the all-zero snapshot; the fields are
/// always finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    /// How many transactions are in the collection.
    pub total_transactions: usize,
    /// The sum of all transacted prices.
    pub total_sales_volume: f64,
    /// The arithmetic mean of price per square foot.
    pub average_price_psf: f64,
    /// The median price per square foot.
    pub median_price_psf: f64,
    /// The largest single transacted price.
    pub highest_transaction: f64,
}

/// The scalar metrics used by the performance report and period comparator.
///
/// Identical to [KpiSnapshot] except the median is replaced by the average
/// profit over profitable transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitKpis {
    /// How many transactions are in the collection.
    pub total_transactions: usize,
    /// The sum of all transacted prices.
    pub total_sales_volume: f64,
    /// The arithmetic mean of price per square foot.
    pub average_price_psf: f64,
    /// The mean profit over transactions that made a profit. Loss-making
    /// transactions are excluded from the denominator, not counted as zero.
    pub average_profit: f64,
    /// The largest single transacted price.
    pub highest_transaction: f64,
}

/// Aggregates a transaction collection into the median-variant snapshot.
pub fn kpi_snapshot(transactions: &[Transaction]) -> KpiSnapshot {
    if transactions.is_empty() {
        return KpiSnapshot::default();
    }

    let count = transactions.len();
    let unit_prices: Vec<f64> = transactions.iter().map(|t| t.unit_price_psf).collect();

    KpiSnapshot {
        total_transactions: count,
        total_sales_volume: transactions.iter().map(|t| t.transacted_price).sum(),
        average_price_psf: unit_prices.iter().sum::<f64>() / count as f64,
        median_price_psf: median(unit_prices),
        highest_transaction: highest_transaction(transactions),
    }
}

/// Aggregates a transaction collection into the profit-variant snapshot.
pub fn profit_kpis(transactions: &[Transaction]) -> ProfitKpis {
    if transactions.is_empty() {
        return ProfitKpis::default();
    }

    let count = transactions.len();

    ProfitKpis {
        total_transactions: count,
        total_sales_volume: transactions.iter().map(|t| t.transacted_price).sum(),
        average_price_psf: transactions.iter().map(|t| t.unit_price_psf).sum::<f64>()
            / count as f64,
        average_profit: average_profit(transactions),
        highest_transaction: highest_transaction(transactions),
    }
}

/// The mean profit over profitable transactions, 0 when there are none.
fn average_profit(transactions: &[Transaction]) -> f64 {
    let profits: Vec<f64> = transactions
        .iter()
        .map(|t| t.profit)
        .filter(|&profit| profit > 0.0)
        .collect();

    if profits.is_empty() {
        0.0
    } else {
        profits.iter().sum::<f64>() / profits.len() as f64
    }
}

fn highest_transaction(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|t| t.transacted_price)
        .fold(0.0, f64::max)
}

/// The median of `values`: the middle value for odd counts, the mean of the
/// two middle values for even counts. Callers guarantee non-empty input.
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
