//! Landed Dashboard serves derived analytics over real-estate transaction
//! records for a single district.
//!
//! Raw records from a spreadsheet-backed endpoint are normalized into a
//! strict [Transaction] model once at startup; the library then exposes four
//! pure derived views over the collection — filtered transactions, KPI
//! snapshots, a period-over-period performance report, and time-bucketed
//! chart data — plus a JSON API serving them to the browser dashboard.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod api;
mod app_state;
mod calendar;
mod compare;
mod dataset;
mod endpoints;
mod filter;
mod kpi;
mod normalize;
mod routing;
mod series;
mod transaction;

pub use api::DatasetOptions;
pub use app_state::AppState;
pub use calendar::DateRange;
pub use compare::{KpiComparison, KpiTrends, PeriodReport, build_period_report};
pub use dataset::{Dataset, load_dataset};
pub use filter::{FilterConfig, filter_transactions};
pub use kpi::{KpiSnapshot, ProfitKpis, kpi_snapshot, profit_kpis};
pub use normalize::{RawRecord, normalize, parse_payload};
pub use routing::build_router;
pub use series::{CategoryCount, ChartData, Granularity, TimeSeriesBucket, chart_data};
pub use transaction::Transaction;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then tells the dashboard API server to shut
/// down gracefully.
///
/// `handle` is the `axum_server` handle the server was bound with.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Per-record normalization problems never reach this type; they are
/// recovered locally by dropping the offending row. Only whole-payload
/// failures surface, so the caller can distinguish "the data source is
/// broken" from "the data source has zero rows".
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The raw payload source could not be read at all.
    #[error("could not read transaction data from {path}: {reason}")]
    DataRead {
        /// The path that was being read.
        path: String,
        /// The underlying I/O error, as a string.
        reason: String,
    },

    /// The raw payload body is not valid JSON.
    #[error("transaction payload is not valid JSON: {0}")]
    InvalidPayload(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("an unexpected error occurred: {self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "The transaction data source is unavailable, check the server logs for more details.",
            })),
        )
            .into_response()
    }
}
