//! Day index ↔ date ↔ pixel conversions for one calendar window.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::model::CalendarWindow;

/// A half-open run of days `[start, start + length)`, in day indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayRange {
    pub start: usize,
    pub length: usize,
}

impl DayRange {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Range covering `a..=b` regardless of argument order.
    pub fn spanning(a: usize, b: usize) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self::new(lo, hi - lo + 1)
    }

    /// Last day of the range, inclusive. Equals `start` for empty ranges.
    pub fn last(&self) -> usize {
        self.start + self.length.saturating_sub(1)
    }

    /// One past the last day.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// `clamp(floor(offset_x / px_per_day), 0, day_count - 1)`.
///
/// NaN lands on day 0.
pub fn day_index_for_offset(offset_x: f32, px_per_day: u32, day_count: usize) -> usize {
    let last = day_count.saturating_sub(1);
    let raw = (offset_x / px_per_day.max(1) as f32).floor();
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    if raw >= last as f32 {
        return last;
    }
    raw as usize
}

#[derive(Debug, Clone, Copy)]
struct CachedOffset {
    left: f32,
    read_at: Instant,
}

/// Short-lived memo of the content's left edge in client coordinates.
///
/// A stale value can put the pointer a few pixels off while the content
/// scrolls under a drag; keep the lifetime around one frame.
#[derive(Debug, Clone)]
pub struct OffsetCache {
    ttl: Duration,
    cached: Option<CachedOffset>,
}

impl OffsetCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, cached: None }
    }

    pub fn get_or_read(&mut self, now: Instant, read: impl FnOnce() -> f32) -> f32 {
        if let Some(cached) = self.cached {
            if now.saturating_duration_since(cached.read_at) < self.ttl {
                return cached.left;
            }
        }
        let left = read();
        self.cached = Some(CachedOffset { left, read_at: now });
        left
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

/// Converts between day indices, dates and pixels, and lays out lanes.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    window: CalendarWindow,
    track_height: f32,
    lane_gap: f32,
    offset_cache: OffsetCache,
}

impl CoordinateMapper {
    pub fn new(window: CalendarWindow, track_height: f32, lane_gap: f32, offset_ttl: Duration) -> Self {
        Self {
            window,
            track_height,
            lane_gap,
            offset_cache: OffsetCache::new(offset_ttl),
        }
    }

    pub fn window(&self) -> &CalendarWindow {
        &self.window
    }

    pub fn set_window(&mut self, window: CalendarWindow) {
        self.window = window;
        self.offset_cache.invalidate();
    }

    pub fn day_count(&self) -> usize {
        self.window.total_days()
    }

    pub fn px_per_day(&self) -> f32 {
        self.window.px_per_day() as f32
    }

    pub fn track_height(&self) -> f32 {
        self.track_height
    }

    /// Day under a client-space x coordinate. `read_left` is only called when
    /// the cached content offset has expired.
    pub fn day_index_from_x(
        &mut self,
        client_x: f32,
        now: Instant,
        read_left: impl FnOnce() -> f32,
    ) -> usize {
        let left = self.offset_cache.get_or_read(now, read_left);
        self.day_index_at(client_x - left)
    }

    /// Day under a content-space x coordinate.
    pub fn day_index_at(&self, content_x: f32) -> usize {
        day_index_for_offset(content_x, self.window.px_per_day(), self.day_count())
    }

    pub fn invalidate_offset(&mut self) {
        self.offset_cache.invalidate();
    }

    pub fn lane_top(&self, index: usize) -> f32 {
        self.lane_gap + index as f32 * (self.track_height + self.lane_gap)
    }

    /// Lane whose band contains `y`. Lane `i` owns its track plus the gap
    /// above it.
    pub fn lane_at(&self, y: f32) -> Option<usize> {
        let pitch = self.track_height + self.lane_gap;
        if !(y >= 0.0) || pitch <= 0.0 {
            return None;
        }
        Some((y / pitch).floor() as usize)
    }

    /// Total height taken by `lane_count` lanes, including the trailing gap.
    pub fn lanes_height(&self, lane_count: usize) -> f32 {
        self.lane_top(lane_count)
    }

    pub fn index_to_date(&self, index: usize) -> NaiveDate {
        self.window.start() + chrono::Days::new(index as u64)
    }

    /// Signed offset of `date` from the window start. Outside the window the
    /// result is negative or `>= day_count`.
    pub fn date_to_index(&self, date: NaiveDate) -> i64 {
        (date - self.window.start()).num_days()
    }

    pub fn clamp_index(&self, index: i64) -> usize {
        let last = self.day_count() as i64 - 1;
        index.clamp(0, last) as usize
    }

    pub fn index_to_x(&self, index: usize) -> f32 {
        index as f32 * self.px_per_day()
    }

    /// Inclusive date range clipped to the window. `None` when reversed or
    /// entirely outside.
    pub fn range_for_dates(&self, start: NaiveDate, end: NaiveDate) -> Option<DayRange> {
        if end < start {
            return None;
        }
        let first = self.date_to_index(start);
        let last = self.date_to_index(end);
        if last < 0 || first >= self.day_count() as i64 {
            return None;
        }
        let first = self.clamp_index(first);
        let last = self.clamp_index(last);
        Some(DayRange::new(first, last - first + 1))
    }

    /// Inclusive `(start, end)` dates of a day range.
    pub fn range_to_dates(&self, range: DayRange) -> (NaiveDate, NaiveDate) {
        (self.index_to_date(range.start), self.index_to_date(range.last()))
    }
}
