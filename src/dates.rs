//! Calendar and day-of-year arithmetic.
//!
//! The archive stores days as `YEAR/DDD` directories, so everything the
//! catalog does with dates goes through [`YearDay`].

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::CatalogError;

/// A 1-based day-of-year within a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearDay {
    pub year: i32,
    pub day: u16,
}

impl YearDay {
    pub fn new(year: i32, day: u16) -> Self {
        Self { year, day }
    }
}

impl fmt::Display for YearDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:03}", self.year, self.day)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) { 366 } else { 365 }
}

pub fn calendar_to_day_of_year(date: NaiveDate) -> YearDay {
    YearDay::new(date.year(), date.ordinal() as u16)
}

pub fn day_of_year_to_calendar(year: i32, day_of_year: u16) -> Result<NaiveDate, CatalogError> {
    check_day_of_year(year, day_of_year)?;
    NaiveDate::from_yo_opt(year, day_of_year as u32).ok_or_else(|| {
        CatalogError::validation(format!("year {} is outside the supported range", year))
    })
}

pub fn check_day_of_year(year: i32, day_of_year: u16) -> Result<(), CatalogError> {
    let last = days_in_year(year);
    if day_of_year == 0 || day_of_year > last {
        return Err(CatalogError::validation(format!(
            "day of year {} is out of range 1..={} for {}",
            day_of_year, last, year
        )));
    }
    Ok(())
}

/// Parses the canonical `YYYY-MM-DD` form.
pub fn parse_date(input: &str) -> Result<NaiveDate, CatalogError> {
    let invalid = || CatalogError::validation(format!("'{}' is not a YYYY-MM-DD date", input));

    let parts: Vec<&str> = input.trim().split('-').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let widths = [4, 2, 2];
    let all_digits = parts
        .iter()
        .zip(widths)
        .all(|(part, width)| part.len() == width && part.bytes().all(|b| b.is_ascii_digit()));
    if !all_digits {
        return Err(invalid());
    }

    let year: i32 = parts[0].parse().map_err(|_| invalid())?;
    let month: u32 = parts[1].parse().map_err(|_| invalid())?;
    let day: u32 = parts[2].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Inclusive, calendar-ordered sequence of days between two dates.
///
/// Cloning yields an independent iterator starting again at `start`.
#[derive(Debug, Clone)]
pub struct DateRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateRange {
    type Item = YearDay;

    fn next(&mut self) -> Option<YearDay> {
        let current = self.next?;
        self.next = if current < self.end {
            current.checked_add_days(Days::new(1))
        } else {
            None
        };
        Some(calendar_to_day_of_year(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|d| (self.end - d).num_days() as usize + 1)
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateRange {}

pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange, CatalogError> {
    if end < start {
        return Err(CatalogError::validation(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }

    Ok(DateRange {
        next: Some(start),
        end,
    })
}
