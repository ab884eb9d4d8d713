use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// The plan's date span as handed over by the host, in ISO form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRange {
    pub start_date: String,
    pub end_date: String,
}

impl CalendarRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// First and last calendar year covered by this range.
    pub fn year_span(&self) -> Result<(i32, i32)> {
        let start = parse_iso_date(&self.start_date)?;
        let end = parse_iso_date(&self.end_date)?;
        if end.year() < start.year() {
            return Err(TimelineError::invalid_window(format!(
                "end {} is before start {}",
                self.end_date, self.start_date
            )));
        }
        Ok((start.year(), end.year()))
    }
}

/// The visible multi-year calendar: a start date, a day count and a zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    start: NaiveDate,
    total_days: usize,
    px_per_day: u32,
}

impl CalendarWindow {
    pub fn new(start: NaiveDate, total_days: usize, px_per_day: u32) -> Result<Self> {
        if total_days == 0 {
            return Err(TimelineError::invalid_window("window must span at least one day"));
        }
        if px_per_day == 0 {
            return Err(TimelineError::invalid_window("px_per_day must be greater than 0"));
        }
        Ok(Self {
            start,
            total_days,
            px_per_day,
        })
    }

    /// Expand a host range to whole calendar years: Jan 1 of the first year
    /// through Dec 31 of the last.
    pub fn from_range(range: &CalendarRange, px_per_day: u32) -> Result<Self> {
        let (first, last) = range.year_span()?;
        Self::for_years(first, last, px_per_day)
    }

    pub fn for_years(first_year: i32, last_year: i32, px_per_day: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(first_year, 1, 1)
            .ok_or_else(|| TimelineError::invalid_window(format!("year {first_year} out of range")))?;
        let end = NaiveDate::from_ymd_opt(last_year, 12, 31)
            .ok_or_else(|| TimelineError::invalid_window(format!("year {last_year} out of range")))?;
        let days = (end - start).num_days() + 1;
        let total_days = usize::try_from(days)
            .map_err(|_| TimelineError::invalid_window("end year precedes start year"))?;
        Self::new(start, total_days, px_per_day)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last visible day (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.start + chrono::Days::new(self.total_days as u64 - 1)
    }

    pub fn total_days(&self) -> usize {
        self.total_days
    }

    pub fn px_per_day(&self) -> u32 {
        self.px_per_day
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    pub fn year_span(&self) -> (i32, i32) {
        (self.start.year(), self.end().year())
    }

    /// Width of the whole calendar in pixels.
    pub fn total_width(&self) -> f32 {
        self.total_days as f32 * self.px_per_day as f32
    }
}

pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| TimelineError::InvalidDate {
        value: value.to_string(),
    })
}
