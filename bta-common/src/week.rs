//! ISO-8601 week helpers
//!
//! Pure calendar-date math. Partition keys pair these week numbers with
//! the requested calendar year, so everything here stays timezone-naive.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// ISO-8601 week number of a calendar date (week 1 contains the year's
/// first Thursday).
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Monday of the given ISO week, or `None` for an out-of-range week.
pub fn monday_of_iso_week(week: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

/// Distinct ISO week numbers overlapping the calendar days of a month,
/// in day order. January can start with week 52/53 of the previous
/// year and December can end with week 1 of the next; both stay in the
/// list because partitions are keyed by the requested calendar year.
pub fn weeks_in_month(year: i32, month: u32) -> Vec<u32> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut weeks = Vec::new();
    let mut day = first;
    while day.month() == month {
        let week = iso_week_number(day);
        if weeks.last() != Some(&week) {
            weeks.push(week);
        }
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_one_contains_first_thursday() {
        assert_eq!(iso_week_number(d(2024, 1, 1)), 1);
        assert_eq!(iso_week_number(d(2024, 1, 4)), 1);
        assert_eq!(iso_week_number(d(2024, 1, 8)), 2);
    }

    #[test]
    fn long_years_have_week_53() {
        assert_eq!(iso_week_number(d(2020, 12, 31)), 53);
        assert_eq!(iso_week_number(d(2021, 1, 1)), 53);
    }

    #[test]
    fn year_boundary_days_belong_to_neighbouring_week_years() {
        // 2022-01-01 is a Saturday in week 52 of ISO year 2021
        assert_eq!(iso_week_number(d(2022, 1, 1)), 52);
        // 2019-12-30 is a Monday in week 1 of ISO year 2020
        assert_eq!(iso_week_number(d(2019, 12, 30)), 1);
    }

    #[test]
    fn monday_of_week_one() {
        assert_eq!(monday_of_iso_week(1, 2024), Some(d(2024, 1, 1)));
        assert_eq!(monday_of_iso_week(3, 2024), Some(d(2024, 1, 15)));
        // Week 1 of 2020 starts in December 2019
        assert_eq!(monday_of_iso_week(1, 2020), Some(d(2019, 12, 30)));
    }

    #[test]
    fn monday_rejects_out_of_range_weeks() {
        assert_eq!(monday_of_iso_week(54, 2024), None);
        // 2021 has no week 53
        assert_eq!(monday_of_iso_week(53, 2021), None);
    }

    #[test]
    fn weeks_in_month_covers_partial_edge_weeks() {
        assert_eq!(weeks_in_month(2024, 1), vec![1, 2, 3, 4, 5]);
        // January 2022 opens in week 52 of the previous ISO year
        assert_eq!(weeks_in_month(2022, 1), vec![52, 1, 2, 3, 4, 5]);
        // December 2024 closes in week 1 of the next ISO year
        assert_eq!(weeks_in_month(2024, 12), vec![48, 49, 50, 51, 52, 1]);
    }

    #[test]
    fn weeks_in_month_rejects_invalid_month() {
        assert!(weeks_in_month(2024, 13).is_empty());
    }
}
