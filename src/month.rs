use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde_with::SerializeDisplay;

use crate::error::ValidationError;

/// Calendar month, represented by its first day.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, SerializeDisplay)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    pub const fn first_day(self) -> NaiveDate {
        self.0
    }

    pub fn last_day(self) -> NaiveDate {
        self.succ().0 - Days::new(1)
    }

    #[must_use]
    pub fn pred(self) -> Self {
        self.minus(1)
    }

    #[must_use]
    pub fn succ(self) -> Self {
        Self(self.0 + Months::new(1))
    }

    #[must_use]
    pub fn minus(self, n_months: u32) -> Self {
        Self(self.0 - Months::new(n_months))
    }

    /// The same month one year earlier.
    #[must_use]
    pub fn year_before(self) -> Self {
        self.minus(12)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::Month(s.to_owned()))
    }
}

/// Consecutive months, oldest first.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MonthWindow {
    pub first: Month,
    pub last: Month,
}

impl MonthWindow {
    /// The `n_months` complete months before `today`'s month.
    pub fn last_complete(today: NaiveDate, n_months: u32) -> Self {
        let last = Month::of(today).pred();
        Self { first: last.minus(n_months.saturating_sub(1)), last }
    }

    /// The same window with `n_months` more months in front of it.
    #[must_use]
    pub fn extended_back(self, n_months: u32) -> Self {
        Self { first: self.first.minus(n_months), last: self.last }
    }

    pub fn months(self) -> impl Iterator<Item = Month> {
        std::iter::successors(Some(self.first), |month| Some(month.succ()))
            .take_while(move |month| *month <= self.last)
    }
}

/// Inclusive range of calendar days.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from <= to {
            Ok(Self { from, to })
        } else {
            Err(ValidationError::DateRange { from, to })
        }
    }

    pub fn month(month: Month) -> Self {
        Self { from: month.first_day(), to: month.last_day() }
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_month_of() {
        assert_eq!(Month::of(date(2025, 3, 31)), Month::new(2025, 3).unwrap());
    }

    #[test]
    fn test_last_day() {
        assert_eq!(Month::new(2024, 2).unwrap().last_day(), date(2024, 2, 29));
        assert_eq!(Month::new(2025, 12).unwrap().last_day(), date(2025, 12, 31));
    }

    #[test]
    fn test_pred_and_year_before() {
        let january = Month::new(2025, 1).unwrap();
        assert_eq!(january.pred(), Month::new(2024, 12).unwrap());
        assert_eq!(january.year_before(), Month::new(2024, 1).unwrap());
    }

    #[test]
    fn test_parse_and_display() -> Result<(), ValidationError> {
        let month: Month = "2026-01".parse()?;
        assert_eq!(month.to_string(), "2026-01");
        assert_eq!(month.first_day(), date(2026, 1, 1));
        assert_eq!("2026-13".parse::<Month>(), Err(ValidationError::Month("2026-13".to_owned())));
        Ok(())
    }

    #[test]
    fn test_serialize_as_label() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&Month::new(2025, 3).unwrap())?, r#""2025-03""#);
        Ok(())
    }

    #[test]
    fn test_last_complete_window() {
        let window = MonthWindow::last_complete(date(2026, 1, 15), 24);
        assert_eq!(window.first, Month::new(2024, 1).unwrap());
        assert_eq!(window.last, Month::new(2025, 12).unwrap());
        let months = window.months().collect_vec();
        assert_eq!(months.len(), 24);
        assert!(months.iter().is_sorted());
    }

    #[test]
    fn test_single_month_window() {
        let window = MonthWindow::last_complete(date(2026, 3, 1), 1);
        assert_eq!(window.months().collect_vec(), vec![Month::new(2026, 2).unwrap()]);
    }

    #[test]
    fn test_extended_back() {
        let window = MonthWindow::last_complete(date(2026, 1, 15), 24).extended_back(12);
        assert_eq!(window.first, Month::new(2023, 1).unwrap());
        assert_eq!(window.months().count(), 36);
    }

    #[test]
    fn test_date_range() {
        assert!(DateRange::new(date(2025, 1, 1), date(2025, 1, 31)).is_ok());
        assert_eq!(
            DateRange::new(date(2025, 2, 1), date(2025, 1, 31)),
            Err(ValidationError::DateRange { from: date(2025, 2, 1), to: date(2025, 1, 31) })
        );
        let march = DateRange::month(Month::new(2025, 3).unwrap());
        assert_eq!(march.to_string(), "2025-03-01 to 2025-03-31");
    }
}
