//! Loading and indexing of the full transaction collection.
//!
//! A [Dataset] is built once at startup from the raw upstream payload and is
//! immutable afterwards; every request recomputes its derived views from it
//! in full, so there is no cross-request state to invalidate.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    calendar::DateRange,
    normalize::{normalize, parse_payload},
    transaction::Transaction,
};

/// The normalized transaction collection plus the indexes the filter UI
/// needs: sorted unique dropdown options and the overall date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// All normalized transactions, in source order.
    pub transactions: Vec<Transaction>,
    /// Sorted unique property types, for the filter dropdown.
    pub property_types: Vec<String>,
    /// Sorted unique tenures, for the filter dropdown.
    pub tenures: Vec<String>,
    /// Sorted unique street names, for the filter dropdown.
    pub street_names: Vec<String>,
    /// The earliest and latest sale date present, `None` for an empty
    /// dataset. Used as the initial filter bounds.
    pub date_range: Option<DateRange>,
}

impl Dataset {
    /// Indexes a normalized transaction collection.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let property_types = sorted_unique(transactions.iter().map(|t| &t.property_type));
        let tenures = sorted_unique(transactions.iter().map(|t| &t.tenure));
        let street_names = sorted_unique(transactions.iter().map(|t| &t.street_name));

        let date_range = match (
            transactions.iter().map(|t| t.sale_date).min(),
            transactions.iter().map(|t| t.sale_date).max(),
        ) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };

        Self {
            transactions,
            property_types,
            tenures,
            street_names,
            date_range,
        }
    }
}

/// Reads and normalizes the raw payload at `path`.
///
/// A file that cannot be read is a transport-level [Error::DataRead]; a file
/// that is not JSON is [Error::InvalidPayload]. Both are distinguishable
/// from the benign zero-row dataset a non-array JSON payload produces.
pub fn load_dataset(path: &Path) -> Result<Dataset, Error> {
    let text = std::fs::read_to_string(path).map_err(|error| Error::DataRead {
        path: path.display().to_string(),
        reason: error.to_string(),
    })?;

    let records = parse_payload(&text)?;
    let transactions = normalize(records);
    tracing::info!("normalized {} transactions from {}", transactions.len(), path.display());

    Ok(Dataset::from_transactions(transactions))
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut unique: Vec<String> = values.cloned().collect();
    unique.sort();
    unique.dedup();
    unique
}
