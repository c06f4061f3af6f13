//! The transaction domain model.
//!
//! A [Transaction] is the strict internal record produced once by the
//! normalizer and never mutated afterwards. Every derived view (filtered
//! sets, KPIs, period reports, chart buckets) is a pure function over a
//! slice of these.

use serde::{Deserialize, Serialize};
use time::Date;

/// A single property sale, normalized from a raw upstream record.
///
/// Numeric fields are coerced at the normalization boundary and are always
/// finite; missing or unparseable source values become `0`, never an error.
/// `sale_date` is always valid: rows whose date could not be parsed are
/// dropped before a `Transaction` is ever constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The calendar date of the sale, in UTC. All filtering and bucketing
    /// keys off this field.
    pub sale_date: Date,
    /// The date string as it appeared in the source, kept for table display.
    pub original_sale_date: String,
    /// The sale price in dollars.
    pub transacted_price: f64,
    /// The floor area in square feet.
    pub area_sqft: f64,
    /// The sale price per square foot.
    pub unit_price_psf: f64,
    /// The full address string from the source.
    pub full_address: String,
    /// The street name, derived from `full_address` by stripping the leading
    /// house-number token.
    pub street_name: String,
    /// The property sub-type, e.g. "Terrace" or "Detached". Opaque and
    /// case-sensitive; used as a filter and grouping key.
    pub property_type: String,
    /// The land tenure, e.g. "Freehold". Opaque and case-sensitive.
    pub tenure: String,
    /// The seller's profit on the sale. May be negative for a loss; only
    /// positive values participate in profit averages.
    pub profit: f64,
    /// The price the seller originally paid.
    pub purchase_price: f64,
    /// The original purchase price per square foot.
    pub purchase_psf: f64,
}

#[cfg(test)]
pub(crate) mod test_utils {
    use time::Date;

    use super::Transaction;

    /// Creates a transaction with the given date, price, unit price and
    /// property type. The remaining fields get fixed filler values.
    pub(crate) fn create_test_transaction(
        sale_date: Date,
        transacted_price: f64,
        unit_price_psf: f64,
        property_type: &str,
    ) -> Transaction {
        Transaction {
            sale_date,
            original_sale_date: sale_date.to_string(),
            transacted_price,
            area_sqft: 1600.0,
            unit_price_psf,
            full_address: "12 Example Road".to_owned(),
            street_name: "Example Road".to_owned(),
            property_type: property_type.to_owned(),
            tenure: "Freehold".to_owned(),
            profit: 0.0,
            purchase_price: 0.0,
            purchase_psf: 0.0,
        }
    }
}
