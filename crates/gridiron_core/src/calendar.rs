//! In-simulation calendar.
//!
//! Seasons are identified by the year they kick off in. The Super Bowl of
//! season `S` is played in February of `S + 1`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{DynastyError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Second Sunday of February following the season.
pub fn super_bowl_date(season: u32) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(season as i32 + 1, 2, Weekday::Sun, 2)
        .unwrap_or_else(|| fallback_date(season as i32 + 1, 2, 9))
}

/// Thursday after Labor Day (first Monday of September).
pub fn regular_season_start(season: u32) -> NaiveDate {
    let labor_day = NaiveDate::from_weekday_of_month_opt(season as i32, 9, Weekday::Mon, 1)
        .unwrap_or_else(|| fallback_date(season as i32, 9, 1));
    labor_day + Duration::days(3)
}

/// Tuesday of week 9.
pub fn trade_deadline(season: u32) -> NaiveDate {
    regular_season_start(season) + Duration::days(7 * 8 - 2)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| DynastyError::InvalidParameter(format!("invalid date '{}': {}", value, e)))
}

fn fallback_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Simulation clock. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    current: NaiveDate,
}

impl Calendar {
    pub fn new(start: NaiveDate) -> Self {
        Self { current: start }
    }

    pub fn current(&self) -> NaiveDate {
        self.current
    }

    pub fn advance_day(&mut self) -> NaiveDate {
        self.advance_days(1)
    }

    pub fn advance_days(&mut self, days: u32) -> NaiveDate {
        self.current += Duration::days(days as i64);
        self.current
    }

    /// Signed day count from today to `other`.
    pub fn days_until(&self, other: NaiveDate) -> i64 {
        (other - self.current).num_days()
    }

    pub fn is_after(&self, other: NaiveDate) -> bool {
        self.current > other
    }

    pub fn year(&self) -> i32 {
        self.current.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_bowl_is_second_sunday() {
        assert_eq!(super_bowl_date(2024), NaiveDate::from_ymd_opt(2025, 2, 9).unwrap());
        assert_eq!(super_bowl_date(2023), NaiveDate::from_ymd_opt(2024, 2, 11).unwrap());
        assert_eq!(super_bowl_date(2025).weekday(), Weekday::Sun);
    }

    #[test]
    fn test_season_start_and_deadline() {
        let start = regular_season_start(2025);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 9, 4).unwrap());
        assert_eq!(start.weekday(), Weekday::Thu);
        assert_eq!(trade_deadline(2025).weekday(), Weekday::Tue);
        assert!(trade_deadline(2025) > start);
    }

    #[test]
    fn test_calendar_advances() {
        let mut cal = Calendar::new(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(cal.advance_day(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        cal.advance_days(30);
        assert_eq!(cal.days_until(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()), 1);
        assert!(cal.is_after(NaiveDate::from_ymd_opt(2025, 3, 30).unwrap()));
    }

    #[test]
    fn test_date_parse_format() {
        let date = parse_date("2026-03-11").unwrap();
        assert_eq!(format_date(date), "2026-03-11");
        assert!(parse_date("03/11/2026").is_err());
    }
}
