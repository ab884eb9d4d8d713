use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::model::CalendarWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Immediate,
}

/// Day index of `today`, or `None` when it falls outside the window.
pub fn today_index(window: &CalendarWindow, today: NaiveDate) -> Option<usize> {
    if !window.contains(today) {
        return None;
    }
    usize::try_from((today - window.start()).num_days()).ok()
}

/// Horizontal scroll offset that centers `date` in a viewport of
/// `viewport_width`. Dates outside the window are pinned to its edges.
pub fn scroll_offset_for(window: &CalendarWindow, date: NaiveDate, viewport_width: f32) -> f32 {
    let last = window.total_days() as i64 - 1;
    let index = (date - window.start()).num_days().clamp(0, last);
    let x = index as f32 * window.px_per_day() as f32;
    (x - viewport_width.max(0.0) / 2.0).max(0.0)
}

/// One-shot "center on today" after each calendar window change.
#[derive(Debug, Clone)]
pub struct ScrollController {
    auto_center_delay: Duration,
    auto_center_at: Option<Instant>,
}

impl ScrollController {
    pub fn new(auto_center_delay: Duration) -> Self {
        Self {
            auto_center_delay,
            auto_center_at: None,
        }
    }

    /// Arm the auto-center for a freshly laid out window.
    pub fn window_changed(&mut self, now: Instant) {
        self.auto_center_at = Some(now + self.auto_center_delay);
    }

    pub fn is_armed(&self) -> bool {
        self.auto_center_at.is_some()
    }

    /// True exactly once per arming, when the delay has elapsed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.auto_center_at {
            Some(at) if now >= at => {
                self.auto_center_at = None;
                true
            }
            _ => false,
        }
    }
}
