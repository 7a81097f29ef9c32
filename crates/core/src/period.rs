use chrono::{Datelike, NaiveDate};

/// First day of the month containing `date`.
///
/// Used as the default start-date cutoff: by default only transactions
/// from the current month onwards are converted.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}
