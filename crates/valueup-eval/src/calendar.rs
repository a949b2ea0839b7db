//! Business-day calendar.
//!
//! The index is evaluated on weekdays. Exchange holidays are not modelled
//! here; a weekday with no market data is simply skipped by the
//! calculators.

use chrono::{Datelike, Weekday};
use valueup_traits::Date;

/// Whether `date` falls on Monday to Friday.
#[must_use]
pub fn is_business_day(date: Date) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All business days from `start` to `end`, inclusive.
///
/// Returns an empty vector when `start > end`.
pub fn business_days(start: Date, end: Date) -> Vec<Date> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_business_days_skip_weekends() {
        // 2024-01-05 is a Friday
        let days = business_days(d(2024, 1, 5), d(2024, 1, 9));
        assert_eq!(days, vec![d(2024, 1, 5), d(2024, 1, 8), d(2024, 1, 9)]);
    }

    #[test]
    fn test_empty_range() {
        assert!(business_days(d(2024, 1, 9), d(2024, 1, 5)).is_empty());
    }

    #[test]
    fn test_is_business_day() {
        assert!(!is_business_day(d(2024, 1, 6)));
        assert!(!is_business_day(d(2024, 1, 7)));
        assert!(is_business_day(d(2024, 1, 8)));
    }
}
