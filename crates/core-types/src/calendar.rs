//! Business-day and calendar-month helpers.
//!
//! Business days are Monday through Friday. Exchange holidays are not modelled;
//! padding a price window by business days only needs to over-cover the event
//! range, and the price source decides which of those dates actually traded.

use crate::error::CoreError;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Returns `true` for Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Moves `date` by `periods` business days (negative moves backwards).
///
/// A weekend start counts the first business day reached as one step, so
/// Saturday minus one business day is the preceding Friday.
pub fn offset_business_days(date: NaiveDate, periods: i64) -> Result<NaiveDate, CoreError> {
    let mut current = date;
    let mut remaining = periods.unsigned_abs();

    while remaining > 0 {
        current = if periods > 0 {
            current.checked_add_days(Days::new(1))
        } else {
            current.checked_sub_days(Days::new(1))
        }
        .ok_or(CoreError::DateOverflow(current))?;

        if is_business_day(current) {
            remaining -= 1;
        }
    }

    Ok(current)
}

/// The last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> Result<NaiveDate, CoreError> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .ok_or(CoreError::DateOverflow(date))
}

/// Formats a date as a year-month label, e.g. "2024-03".
pub fn year_month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
