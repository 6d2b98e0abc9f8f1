//! Month grid layout and schedule membership.
//!
//! The grid starts with `weekday mod 7` blank cells, where the weekday is the
//! ISO number of the first day (Monday = 1 .. Sunday = 7). A month starting on
//! Sunday therefore has no blanks and a month starting on Monday has one.

use crate::{Error, RecordStore, Result, ScheduleMark};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A calendar month
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// A month whose first day and whose following month are both
    /// representable as dates
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidInput(format!("month out of range: {}", month)));
        }
        let year_month = Self { year, month };
        if NaiveDate::from_ymd_opt(year, month, 1).is_none()
            || year_month.first_of_next_month().is_none()
        {
            return Err(Error::InvalidInput(format!("year out of range: {}", year)));
        }
        Ok(year_month)
    }

    pub fn from_date(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), date.month())
    }

    /// The month containing today's local date
    pub fn current() -> Result<Self> {
        Self::from_date(Local::now().date_naive())
    }

    /// Parse `YYYY-MM`
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("invalid year-month '{}', expected YYYY-MM", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated in the constructors
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last date of the month
    pub fn last_day(&self) -> NaiveDate {
        self.date_of(self.length_of_month()).unwrap_or_else(|| self.first_day())
    }

    pub fn length_of_month(&self) -> u32 {
        self.first_of_next_month()
            .and_then(|next| u32::try_from((next - self.first_day()).num_days()).ok())
            .unwrap_or(0)
    }

    fn first_of_next_month(&self) -> Option<NaiveDate> {
        let (year, month) = if self.month == 12 {
            (self.year.checked_add(1)?, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
    }

    /// The month before; fails below the earliest representable month
    pub fn previous(&self) -> Result<Self> {
        if self.month == 1 {
            let year = self
                .year
                .checked_sub(1)
                .ok_or_else(|| Error::InvalidInput(format!("year out of range: {}", self.year)))?;
            Self::new(year, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The month after; fails past the latest representable month
    pub fn next(&self) -> Result<Self> {
        if self.month == 12 {
            let year = self
                .year
                .checked_add(1)
                .ok_or_else(|| Error::InvalidInput(format!("year out of range: {}", self.year)))?;
            Self::new(year, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The date of `day` in this month, if it exists
    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Leading blank cells before day 1 in the month grid
    pub fn leading_blank_cells(&self) -> u32 {
        self.first_day().weekday().number_from_monday() % 7
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Derived layout of one month, with the days marked in the schedule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarMonth {
    pub year_month: YearMonth,
    pub days_in_month: u32,
    pub leading_blank_cells: u32,
    pub marked_days: BTreeSet<u32>,
}

impl CalendarMonth {
    /// Lay out `year_month`, marking days with an `is_marked` schedule entry
    pub fn build(year_month: YearMonth, marks: &[ScheduleMark]) -> Self {
        let marked_days = marks
            .iter()
            .filter(|mark| mark.is_marked && year_month.contains(mark.date))
            .map(|mark| mark.date.day())
            .collect();

        Self {
            year_month,
            days_in_month: year_month.length_of_month(),
            leading_blank_cells: year_month.leading_blank_cells(),
            marked_days,
        }
    }

    pub fn is_marked(&self, day: u32) -> bool {
        self.marked_days.contains(&day)
    }

    /// Grid cells in order; `None` for leading blanks, `Some(day)` otherwise
    pub fn cells(&self) -> Vec<Option<u32>> {
        (0..self.leading_blank_cells)
            .map(|_| None)
            .chain((1..=self.days_in_month).map(Some))
            .collect()
    }

    /// Number of seven-cell rows needed for the grid
    pub fn week_rows(&self) -> u32 {
        (self.days_in_month + self.leading_blank_cells + 6) / 7
    }
}

/// Flip the schedule mark for `day` in `year_month`
///
/// Marks the day if it is not currently marked, otherwise removes its mark.
/// Returns the new marked state.
pub fn toggle_day(store: &RecordStore, year_month: YearMonth, day: u32) -> Result<bool> {
    let date = year_month.date_of(day).ok_or_else(|| {
        Error::InvalidInput(format!("{} has no day {}", year_month, day))
    })?;
    store.toggle_schedule_mark(date)
}
