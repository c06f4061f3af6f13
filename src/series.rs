//! Time-bucketed chart data for the dashboard's charts.
//!
//! Buckets cover every calendar period between the earliest and latest sale
//! date in the filtered set, including periods with no transactions, so line
//! and bar charts never silently skip a quiet month. Every property type
//! observed in the filtered set is pre-seeded at zero in every bucket, which
//! gives stacked charts a consistent key set across all periods.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
    calendar::{add_months, first_of_month, month_number, quarter_of},
    transaction::Transaction,
};

/// The calendar unit a time series is bucketed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// One bucket per calendar month, keyed `YYYY-MM`.
    #[default]
    Month,
    /// One bucket per quarter, keyed `YYYY-Q1` through `YYYY-Q4`.
    Quarter,
    /// One bucket per calendar year, keyed `YYYY`.
    Year,
}

impl Granularity {
    /// The bucket key for a date. Key components are zero-padded so that
    /// lexicographic order is chronological order.
    pub fn bucket_key(self, date: Date) -> String {
        match self {
            Self::Month => format!("{:04}-{:02}", date.year(), month_number(date.month())),
            Self::Quarter => format!("{:04}-Q{}", date.year(), quarter_of(date.month())),
            Self::Year => format!("{:04}", date.year()),
        }
    }

    /// The first day of the period containing `date`.
    fn period_start(self, date: Date) -> Date {
        let month_start = first_of_month(date);
        match self {
            Self::Month => month_start,
            Self::Quarter => {
                let months_into_quarter = (month_number(date.month()) - 1) % 3;
                // Walking back to the quarter's first month keeps the cursor
                // aligned so stepping by 3 never overshoots the last bucket.
                Date::from_calendar_date(
                    date.year(),
                    Month::try_from(month_number(date.month()) - months_into_quarter)
                        .expect("quarter start is a valid month"),
                    1,
                )
                .expect("first of month is always valid")
            }
            Self::Year => Date::from_calendar_date(date.year(), Month::January, 1)
                .expect("january 1 is always valid"),
        }
    }

    /// Steps a period-start cursor forward by one unit.
    fn advance(self, cursor: Date) -> Date {
        match self {
            Self::Month => add_months(cursor, 1),
            Self::Quarter => add_months(cursor, 3),
            Self::Year => add_months(cursor, 12),
        }
    }
}

/// One period of the time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesBucket {
    /// The period label, e.g. "2025-03", "2025-Q1", or "2025".
    pub period: String,
    /// How many transactions fell in this period.
    pub transactions: usize,
    /// The mean price per square foot in this period, 0 when empty.
    pub avg_price_psf: f64,
    /// The mean profit over profitable transactions in this period, 0 when
    /// none were profitable.
    pub avg_profit: f64,
    /// Transaction count per property type. Every type observed in the
    /// filtered set is present, quiet periods carry explicit zeros.
    pub property_types: BTreeMap<String, usize>,
}

/// A property type (or other category) with its transaction count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category label.
    pub name: String,
    /// How many transactions carry it.
    pub value: usize,
}

/// Everything the chart panel needs: the bucketed time series plus the
/// property-type distribution over the whole filtered set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Buckets in ascending period order, gap-free between the first and
    /// last sale date. Empty when the filtered set is empty.
    pub time_series: Vec<TimeSeriesBucket>,
    /// Transaction count per property type over the whole filtered set,
    /// independent of granularity, sorted by name.
    pub property_type_distribution: Vec<CategoryCount>,
}

/// Derives chart data from a filtered collection at the given granularity.
pub fn chart_data(transactions: &[Transaction], granularity: Granularity) -> ChartData {
    let mut distribution_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for transaction in transactions {
        *distribution_counts
            .entry(transaction.property_type.as_str())
            .or_insert(0) += 1;
    }

    let property_type_distribution: Vec<CategoryCount> = distribution_counts
        .iter()
        .map(|(&name, &value)| CategoryCount {
            name: name.to_owned(),
            value,
        })
        .collect();

    let dates: Vec<Date> = transactions.iter().map(|t| t.sale_date).collect();
    let (Some(&first), Some(&last)) = (dates.iter().min(), dates.iter().max()) else {
        return ChartData {
            time_series: Vec::new(),
            property_type_distribution,
        };
    };

    let observed_types: Vec<&str> = distribution_counts.keys().copied().collect();

    // One zeroed bucket per period between the first and last sale date,
    // stepping a period-start cursor so empty periods still exist.
    let mut buckets: BTreeMap<String, BucketAccumulator> = BTreeMap::new();
    let mut cursor = granularity.period_start(first);
    let end = granularity.period_start(last);
    while cursor <= end {
        buckets
            .entry(granularity.bucket_key(cursor))
            .or_insert_with(|| BucketAccumulator::seeded(&observed_types));
        cursor = granularity.advance(cursor);
    }

    for transaction in transactions {
        if let Some(bucket) = buckets.get_mut(&granularity.bucket_key(transaction.sale_date)) {
            bucket.add(transaction);
        }
    }

    // BTreeMap iteration gives ascending lexicographic key order, which the
    // zero-padded key formats make chronological.
    let time_series = buckets
        .into_iter()
        .map(|(period, bucket)| bucket.finish(period))
        .collect();

    ChartData {
        time_series,
        property_type_distribution,
    }
}

#[derive(Debug, Default)]
struct BucketAccumulator {
    count: usize,
    psf_total: f64,
    profit_total: f64,
    profit_count: usize,
    property_types: BTreeMap<String, usize>,
}

impl BucketAccumulator {
    fn seeded(property_types: &[&str]) -> Self {
        Self {
            property_types: property_types
                .iter()
                .map(|&name| (name.to_owned(), 0))
                .collect(),
            ..Default::default()
        }
    }

    fn add(&mut self, transaction: &Transaction) {
        self.count += 1;
        self.psf_total += transaction.unit_price_psf;
        if transaction.profit > 0.0 {
            self.profit_total += transaction.profit;
            self.profit_count += 1;
        }
        *self
            .property_types
            .entry(transaction.property_type.clone())
            .or_insert(0) += 1;
    }

    fn finish(self, period: String) -> TimeSeriesBucket {
        TimeSeriesBucket {
            period,
            transactions: self.count,
            avg_price_psf: if self.count == 0 {
                0.0
            } else {
                self.psf_total / self.count as f64
            },
            avg_profit: if self.profit_count == 0 {
                0.0
            } else {
                self.profit_total / self.profit_count as f64
            },
            property_types: self.property_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{Granularity, chart_data};
    use crate::transaction::test_utils::create_test_transaction;

    #[test]
    fn bucket_keys_are_zero_padded_per_granularity() {
        assert_eq!(Granularity::Month.bucket_key(date!(2025 - 03 - 09)), "2025-03");
        assert_eq!(Granularity::Quarter.bucket_key(date!(2025 - 03 - 09)), "2025-Q1");
        assert_eq!(Granularity::Year.bucket_key(date!(2025 - 03 - 09)), "2025");
    }

    #[test]
    fn empty_collection_yields_empty_series_and_distribution() {
        let data = chart_data(&[], Granularity::Month);

        assert!(data.time_series.is_empty());
        assert!(data.property_type_distribution.is_empty());
    }

    #[test]
    fn monthly_series_includes_empty_intermediate_months() {
        let transactions = vec![
            create_test_transaction(date!(2025 - 01 - 15), 2_000_000.0, 1000.0, "Terrace"),
            create_test_transaction(date!(2025 - 04 - 02), 3_000_000.0, 2000.0, "Terrace"),
        ];

        let data = chart_data(&transactions, Granularity::Month);

        let periods: Vec<&str> = data.time_series.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2025-01", "2025-02", "2025-03", "2025-04"]);

        let february = &data.time_series[1];
        assert_eq!(february.transactions, 0);
        assert_eq!(february.avg_price_psf, 0.0);
        assert_eq!(february.property_types["Terrace"], 0);
    }

    #[test]
    fn quarterly_series_rolls_across_year_boundaries() {
        let transactions = vec![
            create_test_transaction(date!(2024 - 11 - 10), 1.0, 1000.0, "Terrace"),
            create_test_transaction(date!(2025 - 05 - 10), 1.0, 2000.0, "Terrace"),
        ];

        let data = chart_data(&transactions, Granularity::Quarter);

        let periods: Vec<&str> = data.time_series.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-Q4", "2025-Q1", "2025-Q2"]);
    }

    #[test]
    fn quarter_buckets_exist_even_when_the_span_starts_late_in_a_quarter() {
        let transactions = vec![
            create_test_transaction(date!(2025 - 03 - 28), 1.0, 1000.0, "Terrace"),
            create_test_transaction(date!(2025 - 04 - 03), 1.0, 2000.0, "Terrace"),
        ];

        let data = chart_data(&transactions, Granularity::Quarter);

        let periods: Vec<&str> = data.time_series.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2025-Q1", "2025-Q2"]);
        assert_eq!(data.time_series[1].transactions, 1);
    }

    #[test]
    fn yearly_series_spans_min_to_max_year() {
        let transactions = vec![
            create_test_transaction(date!(2023 - 09 - 01), 1.0, 1000.0, "Terrace"),
            create_test_transaction(date!(2025 - 08 - 01), 1.0, 2000.0, "Terrace"),
        ];

        let data = chart_data(&transactions, Granularity::Year);

        let periods: Vec<&str> = data.time_series.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2023", "2024", "2025"]);
    }

    #[test]
    fn buckets_average_price_and_profit() {
        let mut first = create_test_transaction(date!(2025 - 06 - 05), 1.0, 1000.0, "Terrace");
        first.profit = 100_000.0;
        let mut second = create_test_transaction(date!(2025 - 06 - 20), 1.0, 3000.0, "Detached");
        second.profit = -40_000.0;

        let data = chart_data(&[first, second], Granularity::Month);

        assert_eq!(data.time_series.len(), 1);
        let bucket = &data.time_series[0];
        assert_eq!(bucket.transactions, 2);
        assert_eq!(bucket.avg_price_psf, 2000.0);
        // The loss is excluded from the profit mean, not averaged in.
        assert_eq!(bucket.avg_profit, 100_000.0);
    }

    #[test]
    fn every_bucket_carries_every_observed_property_type() {
        let transactions = vec![
            create_test_transaction(date!(2025 - 01 - 15), 1.0, 1000.0, "Terrace"),
            create_test_transaction(date!(2025 - 03 - 10), 1.0, 2000.0, "Detached"),
        ];

        let data = chart_data(&transactions, Granularity::Month);

        for bucket in &data.time_series {
            assert!(bucket.property_types.contains_key("Terrace"));
            assert!(bucket.property_types.contains_key("Detached"));
        }
        assert_eq!(data.time_series[0].property_types["Terrace"], 1);
        assert_eq!(data.time_series[0].property_types["Detached"], 0);
    }

    #[test]
    fn distribution_counts_the_whole_filtered_set() {
        let transactions = vec![
            create_test_transaction(date!(2025 - 01 - 15), 1.0, 1000.0, "Terrace"),
            create_test_transaction(date!(2025 - 02 - 15), 1.0, 1000.0, "Terrace"),
            create_test_transaction(date!(2025 - 03 - 10), 1.0, 2000.0, "Detached"),
        ];

        let monthly = chart_data(&transactions, Granularity::Month);
        let yearly = chart_data(&transactions, Granularity::Year);

        // Independent of granularity.
        assert_eq!(monthly.property_type_distribution, yearly.property_type_distribution);

        let terrace = monthly
            .property_type_distribution
            .iter()
            .find(|c| c.name == "Terrace")
            .unwrap();
        assert_eq!(terrace.value, 2);
    }
}
