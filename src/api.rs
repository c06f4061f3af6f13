//! The JSON request handlers for the derived dashboard views.
//!
//! Each handler recomputes its view from the immutable dataset on every
//! request: filter, then aggregate. Nothing is cached, so a changed filter
//! configuration can never observe a stale derived value.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    app_state::AppState,
    calendar::DateRange,
    compare::{PeriodReport, build_period_report},
    filter::{FilterConfig, filter_transactions},
    kpi::{KpiSnapshot, kpi_snapshot},
    series::{ChartData, Granularity, chart_data},
    transaction::Transaction,
};

/// The filter and aggregation configuration as it arrives on the query
/// string, e.g. `?start_date=2025-01-01&property_types=Terrace,Detached`.
///
/// Category lists are comma-separated; blank entries are dropped so a
/// trailing comma is harmless. `granularity` is only read by the chart-data
/// handler and ignored elsewhere.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The earliest sale date to include, `YYYY-MM-DD`.
    pub start_date: Option<Date>,
    /// The latest sale date to include, `YYYY-MM-DD`.
    pub end_date: Option<Date>,
    /// Comma-separated allowed property types.
    pub property_types: Option<String>,
    /// Comma-separated allowed tenures.
    pub tenures: Option<String>,
    /// Comma-separated allowed street names.
    pub street_names: Option<String>,
    /// The time-series bucket size: `month`, `quarter`, or `year`.
    pub granularity: Option<Granularity>,
}

impl DashboardQuery {
    fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            start_date: self.start_date,
            end_date: self.end_date,
            property_types: split_list(self.property_types.as_deref()),
            tenures: split_list(self.tenures.as_deref()),
            street_names: split_list(self.street_names.as_deref()),
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect()
}

/// The payload for the options endpoint: everything the filter UI needs to
/// populate its dropdowns and initial date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOptions {
    /// Sorted unique property types.
    pub property_types: Vec<String>,
    /// Sorted unique tenures.
    pub tenures: Vec<String>,
    /// Sorted unique street names.
    pub street_names: Vec<String>,
    /// The earliest and latest sale date in the dataset.
    pub date_range: Option<DateRange>,
    /// How many transactions the full dataset holds.
    pub total_transactions: usize,
}

/// Returns the transactions matching the query's filter configuration.
pub async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<Vec<Transaction>> {
    Json(filter_transactions(
        &state.dataset.transactions,
        &query.filter_config(),
    ))
}

/// Returns the KPI snapshot over the filtered set.
pub async fn get_kpis(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<KpiSnapshot> {
    let filtered = filter_transactions(&state.dataset.transactions, &query.filter_config());

    Json(kpi_snapshot(&filtered))
}

/// Returns the period-over-period performance report over the filtered set.
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<PeriodReport> {
    let filtered = filter_transactions(&state.dataset.transactions, &query.filter_config());

    Json(build_period_report(&filtered))
}

/// Returns chart data over the filtered set at the requested granularity
/// (monthly by default).
pub async fn get_chart_data(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<ChartData> {
    let filtered = filter_transactions(&state.dataset.transactions, &query.filter_config());

    Json(chart_data(&filtered, query.granularity.unwrap_or_default()))
}

/// Returns the filter dropdown options and dataset date range.
pub async fn get_options(State(state): State<AppState>) -> Json<DatasetOptions> {
    let dataset = &state.dataset;

    Json(DatasetOptions {
        property_types: dataset.property_types.clone(),
        tenures: dataset.tenures.clone(),
        street_names: dataset.street_names.clone(),
        date_range: dataset.date_range,
        total_transactions: dataset.transactions.len(),
    })
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use time::macros::date;

    use super::DatasetOptions;
    use crate::{
        app_state::AppState,
        compare::PeriodReport,
        dataset::Dataset,
        endpoints,
        kpi::KpiSnapshot,
        routing::build_router,
        series::ChartData,
        transaction::{Transaction, test_utils::create_test_transaction},
    };

    fn test_server() -> TestServer {
        let mut january = create_test_transaction(date!(2025 - 01 - 10), 2_000_000.0, 1000.0, "Terrace");
        january.profit = 150_000.0;
        let mut march = create_test_transaction(date!(2025 - 03 - 22), 4_000_000.0, 2000.0, "Detached");
        march.tenure = "99-year Leasehold".to_owned();
        march.profit = -20_000.0;
        let april = create_test_transaction(date!(2025 - 04 - 05), 3_000_000.0, 1500.0, "Terrace");

        let state = AppState::new(Dataset::from_transactions(vec![january, march, april]));
        let app = build_router(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn get_transactions_applies_date_filters() {
        let server = test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("start_date", "2025-03-01")
            .add_query_param("end_date", "2025-03-22")
            .await;

        response.assert_status_ok();
        let transactions = response.json::<Vec<Transaction>>();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].sale_date, date!(2025 - 03 - 22));
    }

    #[tokio::test]
    async fn get_transactions_applies_comma_separated_category_filters() {
        let server = test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("property_types", "Terrace,Detached")
            .add_query_param("tenures", "Freehold")
            .await;

        response.assert_status_ok();
        let transactions = response.json::<Vec<Transaction>>();
        assert_eq!(transactions.len(), 2);
        assert!(transactions.iter().all(|t| t.tenure == "Freehold"));
    }

    #[tokio::test]
    async fn get_kpis_matches_the_pure_aggregator() {
        let server = test_server();

        let response = server.get(endpoints::KPIS).await;

        response.assert_status_ok();
        let snapshot = response.json::<KpiSnapshot>();
        assert_eq!(snapshot.total_transactions, 3);
        assert_eq!(snapshot.total_sales_volume, 9_000_000.0);
        assert_eq!(snapshot.median_price_psf, 1500.0);
        assert_eq!(snapshot.highest_transaction, 4_000_000.0);
    }

    #[tokio::test]
    async fn get_kpis_over_an_excluding_filter_is_the_zero_snapshot() {
        let server = test_server();

        let response = server
            .get(endpoints::KPIS)
            .add_query_param("street_names", "Nowhere Lane")
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<KpiSnapshot>(), KpiSnapshot::default());
    }

    #[tokio::test]
    async fn get_report_anchors_on_the_latest_filtered_date() {
        let server = test_server();

        let response = server.get(endpoints::REPORT).await;

        response.assert_status_ok();
        let report = response.json::<PeriodReport>();
        // April is the anchor month; it has one transaction, March has one.
        let current = report.month.current.expect("April has a transaction");
        assert_eq!(current.total_transactions, 1);
        assert!(report.month.previous.is_some());
        assert_eq!(report.year_to_date.previous, None);
    }

    #[tokio::test]
    async fn get_chart_data_defaults_to_monthly_buckets() {
        let server = test_server();

        let response = server.get(endpoints::CHART_DATA).await;

        response.assert_status_ok();
        let data = response.json::<ChartData>();
        let periods: Vec<&str> = data.time_series.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2025-01", "2025-02", "2025-03", "2025-04"]);
    }

    #[tokio::test]
    async fn get_chart_data_accepts_quarter_granularity() {
        let server = test_server();

        let response = server
            .get(endpoints::CHART_DATA)
            .add_query_param("granularity", "quarter")
            .await;

        response.assert_status_ok();
        let data = response.json::<ChartData>();
        let periods: Vec<&str> = data.time_series.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2025-Q1", "2025-Q2"]);
    }

    #[tokio::test]
    async fn get_chart_data_rejects_unknown_granularity() {
        let server = test_server();

        let response = server
            .get(endpoints::CHART_DATA)
            .add_query_param("granularity", "fortnight")
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn get_options_lists_dropdown_values_and_date_range() {
        let server = test_server();

        let response = server.get(endpoints::OPTIONS).await;

        response.assert_status_ok();
        let options = response.json::<DatasetOptions>();
        assert_eq!(options.property_types, vec!["Detached", "Terrace"]);
        assert_eq!(options.total_transactions, 3);

        let range = options.date_range.expect("dataset has transactions");
        assert_eq!(range.start, date!(2025 - 01 - 10));
        assert_eq!(range.end, date!(2025 - 04 - 05));
    }
}
