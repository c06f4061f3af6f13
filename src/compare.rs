//! Period-over-period KPI comparison.
//!
//! The report is anchored on the latest sale date present in the filtered
//! collection: from it the current calendar month, quarter, and year are
//! derived, and the profit-variant KPI aggregator is re-run over each
//! current/previous sub-collection pair. A sub-period with zero transactions
//! yields `None` rather than a zero-valued snapshot so the consumer can tell
//! "no data for this period" apart from "zero-value KPIs".

use serde::{Deserialize, Serialize};

use crate::{
    calendar::{
        DateRange, month_bounds, previous_month, previous_quarter, quarter_bounds, quarter_of,
        year_bounds,
    },
    kpi::{ProfitKpis, profit_kpis},
    transaction::Transaction,
};

/// Percentage change per KPI metric between a current and previous period.
///
/// A metric is `None` whenever either snapshot is missing, the previous
/// value is zero, or the division is otherwise non-finite; the consumer must
/// render nothing in those cases rather than a garbage percentage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiTrends {
    /// Change in transaction count, percent.
    pub total_transactions: Option<f64>,
    /// Change in total sales volume, percent.
    pub total_sales_volume: Option<f64>,
    /// Change in average price per square foot, percent.
    pub average_price_psf: Option<f64>,
    /// Change in average profit, percent.
    pub average_profit: Option<f64>,
    /// Change in the highest transacted price, percent.
    pub highest_transaction: Option<f64>,
}

impl KpiTrends {
    fn between(current: Option<&ProfitKpis>, previous: Option<&ProfitKpis>) -> Self {
        let (Some(current), Some(previous)) = (current, previous) else {
            return Self::default();
        };

        Self {
            total_transactions: trend_percentage(
                current.total_transactions as f64,
                previous.total_transactions as f64,
            ),
            total_sales_volume: trend_percentage(
                current.total_sales_volume,
                previous.total_sales_volume,
            ),
            average_price_psf: trend_percentage(
                current.average_price_psf,
                previous.average_price_psf,
            ),
            average_profit: trend_percentage(current.average_profit, previous.average_profit),
            highest_transaction: trend_percentage(
                current.highest_transaction,
                previous.highest_transaction,
            ),
        }
    }
}

/// A current/previous KPI pair for one calendar period, with trends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiComparison {
    /// KPIs for the current period, `None` if it had no transactions.
    pub current: Option<ProfitKpis>,
    /// KPIs for the previous period, `None` if it had no transactions.
    pub previous: Option<ProfitKpis>,
    /// Percentage deltas between the two periods.
    pub trends: KpiTrends,
}

/// The full period-over-period report derived from a filtered collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    /// Latest calendar month vs the month before it.
    pub month: KpiComparison,
    /// Latest quarter vs the quarter before it.
    pub quarter: KpiComparison,
    /// January 1 through the latest sale date vs the full prior year.
    pub year_to_date: KpiComparison,
    /// The latest full calendar year vs the year before it.
    pub year: KpiComparison,
}

/// Builds the period report for a filtered collection.
///
/// An empty collection produces a report whose four comparisons are all
/// `None`/`None` with empty trends.
pub fn build_period_report(transactions: &[Transaction]) -> PeriodReport {
    let Some(anchor) = transactions.iter().map(|t| t.sale_date).max() else {
        return PeriodReport::default();
    };

    let (previous_month_year, previous_month) = previous_month(anchor.year(), anchor.month());
    let month = compare_ranges(
        transactions,
        month_bounds(anchor.year(), anchor.month()),
        month_bounds(previous_month_year, previous_month),
    );

    let current_quarter = quarter_of(anchor.month());
    let (previous_quarter_year, previous_quarter) =
        previous_quarter(anchor.year(), current_quarter);
    let quarter = compare_ranges(
        transactions,
        quarter_bounds(anchor.year(), current_quarter),
        quarter_bounds(previous_quarter_year, previous_quarter),
    );

    let year_to_date = compare_ranges(
        transactions,
        DateRange {
            start: year_bounds(anchor.year()).start,
            end: anchor,
        },
        year_bounds(anchor.year() - 1),
    );

    let year = compare_ranges(
        transactions,
        year_bounds(anchor.year()),
        year_bounds(anchor.year() - 1),
    );

    PeriodReport {
        month,
        quarter,
        year_to_date,
        year,
    }
}

fn compare_ranges(
    transactions: &[Transaction],
    current_range: DateRange,
    previous_range: DateRange,
) -> KpiComparison {
    let current = kpis_in_range(transactions, current_range);
    let previous = kpis_in_range(transactions, previous_range);
    let trends = KpiTrends::between(current.as_ref(), previous.as_ref());

    KpiComparison {
        current,
        previous,
        trends,
    }
}

/// Runs the profit-variant aggregator over the transactions in `range`,
/// returning `None` when the sub-period is empty.
fn kpis_in_range(transactions: &[Transaction], range: DateRange) -> Option<ProfitKpis> {
    let subset: Vec<Transaction> = transactions
        .iter()
        .filter(|t| range.contains(t.sale_date))
        .cloned()
        .collect();

    if subset.is_empty() {
        None
    } else {
        Some(profit_kpis(&subset))
    }
}

fn trend_percentage(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }

    let percent = (current - previous) / previous * 100.0;
    percent.is_finite().then_some(percent)
}
