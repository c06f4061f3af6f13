//! The API endpoint URIs.

/// The route for the filtered transaction list.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the KPI snapshot over the filtered set.
pub const KPIS: &str = "/api/kpis";
/// The route for the period-over-period performance report.
pub const REPORT: &str = "/api/report";
/// The route for time-series and distribution chart data.
pub const CHART_DATA: &str = "/api/chart-data";
/// The route for filter dropdown options and the dataset date range.
pub const OPTIONS: &str = "/api/options";
