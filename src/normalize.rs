//! The parse-or-drop boundary between raw upstream records and the strict
//! [Transaction] model.
//!
//! The upstream data source is a spreadsheet-backed endpoint, so field
//! presence and types are not guaranteed: numbers arrive as strings with
//! currency symbols or thousands separators, dates arrive in two different
//! shapes, and placeholder cells contain `"-"`. Numeric problems coerce to
//! zero; date problems drop the record (logged, never fatal). Only a payload
//! that is not JSON at all surfaces as an error.

use serde::Deserialize;
use serde_json::Value;
use time::{Date, Month, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use crate::{Error, transaction::Transaction};

/// A single row as it arrives from the upstream data source.
///
/// Every field is a raw [Value] because the source does not guarantee types:
/// the same column may hold a number in one row and a string like `"$1,234"`
/// or `"-"` in the next. Missing columns default to [Value::Null].
#[derive(Debug, Default, Deserialize)]
pub struct RawRecord {
    /// The full address, e.g. "527B Bedok Road".
    #[serde(rename = "Address", default)]
    pub address: Value,
    /// The sale date, either RFC 3339 or compact `DD-Mon-YY`.
    #[serde(rename = "Sale Date", default)]
    pub sale_date: Value,
    /// The sale price in dollars.
    #[serde(rename = "Sale Price", default)]
    pub sale_price: Value,
    /// The floor area in square feet.
    #[serde(rename = "Area (sqft)", default)]
    pub area_sqft: Value,
    /// The sale price per square foot.
    #[serde(rename = "Sale PSF", default)]
    pub sale_psf: Value,
    /// The property sub-type, e.g. "Terrace".
    #[serde(rename = "Sub Type", default)]
    pub sub_type: Value,
    /// The land tenure, e.g. "Freehold".
    #[serde(rename = "Tenure", default)]
    pub tenure: Value,
    /// The seller's profit on the sale, negative for a loss.
    #[serde(rename = "Profit", default)]
    pub profit: Value,
    /// The price the seller originally paid.
    #[serde(rename = "Purchase Price", default)]
    pub purchase_price: Value,
    /// The original purchase price per square foot.
    #[serde(rename = "Purchase PSF", default)]
    pub purchase_psf: Value,
}

/// Parses the top-level upstream payload into raw records.
///
/// The endpoint serves either a bare JSON array or an object wrapping the
/// array in a `data` member. Any other valid-JSON shape yields zero rows
/// (logged) so the caller can show an empty dashboard; a body that is not
/// JSON at all returns [Error::InvalidPayload] so the caller can show an
/// error state instead.
///
/// Array elements that are not objects are dropped with a warning.
pub fn parse_payload(text: &str) -> Result<Vec<RawRecord>, Error> {
    let payload: Value = serde_json::from_str(text)
        .map_err(|error| Error::InvalidPayload(error.to_string()))?;

    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => {
                tracing::warn!("payload object has no 'data' array, treating as zero rows");
                return Ok(Vec::new());
            }
        },
        other => {
            tracing::warn!("payload is not an array of records, treating as zero rows: {other}");
            return Ok(Vec::new());
        }
    };

    let records = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<RawRecord>(row) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!("dropping row that is not a record object: {error}");
                None
            }
        })
        .collect();

    Ok(records)
}

/// Converts raw records into [Transaction]s, dropping rows whose sale date
/// is missing, blank, a `"-"` placeholder, or unparseable.
///
/// Output order matches input order; no sort is applied.
pub fn normalize(records: Vec<RawRecord>) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(records.len());

    for record in records {
        let Some(date_string) = record.sale_date.as_str() else {
            tracing::warn!("dropping row with non-string sale date: {}", record.sale_date);
            continue;
        };

        let Some(sale_date) = parse_sale_date(date_string) else {
            tracing::warn!("dropping row with unparseable sale date {date_string:?}");
            continue;
        };

        let full_address = record.address.as_str().unwrap_or_default().to_owned();

        transactions.push(Transaction {
            sale_date,
            original_sale_date: date_string.to_owned(),
            transacted_price: coerce_number(&record.sale_price),
            area_sqft: coerce_number(&record.area_sqft),
            unit_price_psf: coerce_number(&record.sale_psf),
            street_name: extract_street_name(&full_address),
            full_address,
            property_type: record.sub_type.as_str().unwrap_or_default().to_owned(),
            tenure: record.tenure.as_str().unwrap_or_default().to_owned(),
            profit: coerce_number(&record.profit),
            purchase_price: coerce_number(&record.purchase_price),
            purchase_psf: coerce_number(&record.purchase_psf),
        });
    }

    transactions
}

/// Coerces a loosely-typed numeric cell to a float.
///
/// Strings are trimmed and stripped of `$` and `,`; the empty string and the
/// `"-"` placeholder become 0, as does anything that still fails to parse.
/// Null and non-numeric JSON types become 0. Never errors.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "-" {
                return 0.0;
            }

            let cleaned: String = trimmed
                .chars()
                .filter(|&character| character != '$' && character != ',')
                .collect();

            cleaned.parse().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Parses the sale date column.
///
/// Two shapes are accepted: a full RFC 3339 timestamp (reduced to its UTC
/// calendar date), or the compact spreadsheet forms `DD-Mon-YY` and `Mon-YY`
/// with a case-insensitive 3-letter month and a 2-digit year taken as
/// `2000 + YY`. Returns `None` for anything else, including the blank and
/// `"-"` placeholders.
pub fn parse_sale_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    if trimmed.contains('T') {
        return OffsetDateTime::parse(trimmed, &Rfc3339)
            .ok()
            .map(|timestamp| timestamp.to_offset(UtcOffset::UTC).date());
    }

    let parts: Vec<&str> = trimmed.split('-').collect();
    let (day, month_part, year_part) = match parts.as_slice() {
        [day, month, year] => (day.parse::<u8>().ok()?, *month, *year),
        // Month-only dates resolve to the first of the month.
        [month, year] => (1, *month, *year),
        _ => return None,
    };

    let month = month_from_abbreviation(month_part)?;
    let year: i32 = year_part.parse().ok()?;
    let year = if year < 100 { 2000 + year } else { year };

    Date::from_calendar_date(year, month, day).ok()
}

fn month_from_abbreviation(text: &str) -> Option<Month> {
    let abbreviation: String = text.chars().take(3).collect::<String>().to_lowercase();

    let month = match abbreviation.as_str() {
        "jan" => Month::January,
        "feb" => Month::February,
        "mar" => Month::March,
        "apr" => Month::April,
        "may" => Month::May,
        "jun" => Month::June,
        "jul" => Month::July,
        "aug" => Month::August,
        "sep" => Month::September,
        "oct" => Month::October,
        "nov" => Month::November,
        "dec" => Month::December,
        _ => return None,
    };

    Some(month)
}

/// Derives a display street name from a full address by stripping one
/// leading house-number token (digits optionally followed by uppercase
/// letters, e.g. `"527B"`) and surrounding whitespace.
///
/// An empty address yields `"N/A"`.
pub fn extract_street_name(full_address: &str) -> String {
    if full_address.is_empty() {
        return "N/A".to_owned();
    }

    strip_house_number(full_address).trim().to_owned()
}

fn strip_house_number(address: &str) -> &str {
    let digits_end = address
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(address.len());
    if digits_end == 0 {
        return address;
    }

    let after_digits = &address[digits_end..];
    let letters_end = after_digits
        .find(|character: char| !character.is_ascii_uppercase())
        .unwrap_or(after_digits.len());
    let after_letters = &after_digits[letters_end..];

    // The token only counts as a house number when whitespace separates it
    // from the street name; "1A" alone stays untouched.
    if after_letters.starts_with(char::is_whitespace) {
        after_letters
    } else {
        address
    }
}
