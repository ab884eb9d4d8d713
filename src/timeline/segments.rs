//! Weekday-only sub-segments of a bar, for rendering.
//!
//! The phase's stored dates stay continuous; only the painted color skips
//! Saturdays and Sundays.

use chrono::{Datelike, NaiveDate};

use super::mapper::DayRange;

/// Contiguous weekday runs inside `[offset, offset + len)`, in order.
///
/// `window_start` is the date of day index 0.
pub fn weekday_segments(window_start: NaiveDate, offset: usize, len: usize) -> Vec<DayRange> {
    let mut segments = Vec::new();
    if len == 0 {
        return segments;
    }

    let first = window_start + chrono::Days::new(offset as u64);
    let mut weekday = first.weekday().num_days_from_monday();
    let mut run_start: Option<usize> = None;

    for index in offset..offset + len {
        if weekday >= 5 {
            if let Some(start) = run_start.take() {
                segments.push(DayRange::new(start, index - start));
            }
        } else if run_start.is_none() {
            run_start = Some(index);
        }
        weekday = (weekday + 1) % 7;
    }
    if let Some(start) = run_start {
        segments.push(DayRange::new(start, offset + len - start));
    }
    segments
}

pub fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 5
}
