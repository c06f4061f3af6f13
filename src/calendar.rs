//! Calendar arithmetic shared by the period comparator and the bucketizer.
//!
//! All arithmetic is on plain calendar dates (no clock time, no timezone),
//! so results are identical regardless of where the server or viewer sits.

use serde::{Deserialize, Serialize};
use time::{Date, Month};

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first date in the range.
    pub start: Date,
    /// The last date in the range.
    pub end: Date,
}

impl DateRange {
    /// Whether `date` falls within this range, bounds included.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Returns the first and last day of the given month.
pub fn month_bounds(year: i32, month: Month) -> DateRange {
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    DateRange { start, end }
}

/// Returns the month preceding the given one, rolling the year back across
/// a January boundary.
pub fn previous_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        month => (year, month.previous()),
    }
}

/// The 1-based quarter a month belongs to (Jan-Mar = 1).
pub fn quarter_of(month: Month) -> u8 {
    (month_number(month) - 1) / 3 + 1
}

/// Returns the first and last day of the given 1-based quarter.
pub fn quarter_bounds(year: i32, quarter: u8) -> DateRange {
    let start_month = month_from_number((quarter - 1) * 3 + 1);
    let end_month = month_from_number(quarter * 3);

    DateRange {
        start: Date::from_calendar_date(year, start_month, 1).expect("invalid quarter start date"),
        end: Date::from_calendar_date(year, end_month, last_day_of_month(year, end_month))
            .expect("invalid quarter end date"),
    }
}

/// Returns the quarter preceding the given one, rolling the year back when
/// stepping from Q1 to Q4.
pub fn previous_quarter(year: i32, quarter: u8) -> (i32, u8) {
    if quarter == 1 {
        (year - 1, 4)
    } else {
        (year, quarter - 1)
    }
}

/// Returns January 1 through December 31 of the given year.
pub fn year_bounds(year: i32) -> DateRange {
    DateRange {
        start: Date::from_calendar_date(year, Month::January, 1).expect("invalid year start date"),
        end: Date::from_calendar_date(year, Month::December, 31).expect("invalid year end date"),
    }
}

/// Replaces the day component with 1.
pub fn first_of_month(date: Date) -> Date {
    date.replace_day(1).expect("day 1 is valid for every month")
}

/// Steps a first-of-month date forward by `months` whole months.
pub fn add_months(date: Date, months: u8) -> Date {
    let mut year = date.year();
    let mut month = month_number(date.month()) + months;

    while month > 12 {
        month -= 12;
        year += 1;
    }

    Date::from_calendar_date(year, month_from_number(month), 1)
        .expect("first of month is always valid")
}

/// The 1-based month number.
pub fn month_number(month: Month) -> u8 {
    u8::from(month)
}

fn month_from_number(month: u8) -> Month {
    Month::try_from(month).unwrap_or_else(|_| panic!("invalid month number {month}"))
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use super::{
        DateRange, add_months, first_of_month, month_bounds, previous_month, previous_quarter,
        quarter_bounds, quarter_of, year_bounds,
    };

    #[test]
    fn month_bounds_covers_leap_february() {
        let range = month_bounds(2024, Month::February);

        assert_eq!(range.start, date!(2024 - 02 - 01));
        assert_eq!(range.end, date!(2024 - 02 - 29));
    }

    #[test]
    fn month_bounds_covers_non_leap_february() {
        let range = month_bounds(2025, Month::February);

        assert_eq!(range.end, date!(2025 - 02 - 28));
    }

    #[test]
    fn previous_month_rolls_year_back_from_january() {
        assert_eq!(previous_month(2025, Month::January), (2024, Month::December));
        assert_eq!(previous_month(2025, Month::March), (2025, Month::February));
    }

    #[test]
    fn quarter_of_maps_months_to_quarters() {
        assert_eq!(quarter_of(Month::January), 1);
        assert_eq!(quarter_of(Month::March), 1);
        assert_eq!(quarter_of(Month::April), 2);
        assert_eq!(quarter_of(Month::December), 4);
    }

    #[test]
    fn quarter_bounds_covers_whole_quarter() {
        let range = quarter_bounds(2025, 2);

        assert_eq!(range.start, date!(2025 - 04 - 01));
        assert_eq!(range.end, date!(2025 - 06 - 30));
    }

    #[test]
    fn previous_quarter_rolls_year_back_from_q1() {
        assert_eq!(previous_quarter(2025, 1), (2024, 4));
        assert_eq!(previous_quarter(2025, 3), (2025, 2));
    }

    #[test]
    fn year_bounds_covers_whole_year() {
        let range = year_bounds(2025);

        assert_eq!(range.start, date!(2025 - 01 - 01));
        assert_eq!(range.end, date!(2025 - 12 - 31));
    }

    #[test]
    fn add_months_rolls_over_december() {
        assert_eq!(add_months(date!(2024 - 11 - 01), 3), date!(2025 - 02 - 01));
        assert_eq!(add_months(date!(2024 - 03 - 01), 1), date!(2024 - 04 - 01));
    }

    #[test]
    fn date_range_contains_is_inclusive() {
        let range = DateRange {
            start: date!(2025 - 01 - 01),
            end: date!(2025 - 01 - 31),
        };

        assert!(range.contains(date!(2025 - 01 - 01)));
        assert!(range.contains(date!(2025 - 01 - 31)));
        assert!(!range.contains(date!(2025 - 02 - 01)));
    }

    #[test]
    fn first_of_month_resets_day() {
        assert_eq!(first_of_month(date!(2025 - 09 - 27)), date!(2025 - 09 - 01));
    }
}
