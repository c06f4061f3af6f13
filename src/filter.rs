//! The filter engine applied to the normalized transaction collection.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::transaction::Transaction;

/// The filter configuration owned by the presentation layer.
///
/// Date bounds are inclusive calendar dates; `None` means unbounded on that
/// side. The three allow-lists are OR within a list and AND across lists; an
/// empty list places no restriction on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// The earliest sale date to include.
    pub start_date: Option<Date>,
    /// The latest sale date to include.
    pub end_date: Option<Date>,
    /// Allowed property sub-types; empty = all.
    #[serde(default)]
    pub property_types: Vec<String>,
    /// Allowed tenures; empty = all.
    #[serde(default)]
    pub tenures: Vec<String>,
    /// Allowed street names; empty = all.
    #[serde(default)]
    pub street_names: Vec<String>,
}

/// Returns the transactions matching `filters`, preserving relative order.
///
/// Pure: the input slice is never mutated, and re-running with the same
/// arguments yields an identical result.
pub fn filter_transactions(transactions: &[Transaction], filters: &FilterConfig) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| matches_filters(transaction, filters))
        .cloned()
        .collect()
}

fn matches_filters(transaction: &Transaction, filters: &FilterConfig) -> bool {
    if let Some(start) = filters.start_date
        && transaction.sale_date < start
    {
        return false;
    }

    if let Some(end) = filters.end_date
        && transaction.sale_date > end
    {
        return false;
    }

    if !filters.property_types.is_empty()
        && !filters.property_types.contains(&transaction.property_type)
    {
        return false;
    }

    if !filters.tenures.is_empty() && !filters.tenures.contains(&transaction.tenure) {
        return false;
    }

    if !filters.street_names.is_empty() && !filters.street_names.contains(&transaction.street_name)
    {
        return false;
    }

    true
}
