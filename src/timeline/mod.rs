//! The drag-and-drop timeline engine.
//!
//! [`TimelineEngine`] owns everything a gesture touches: the coordinate
//! mapper, the single gesture slot, the click disambiguator, the preview
//! surface and the rendering backend. The host feeds it pointer events and a
//! per-frame callback and receives [`TimelineAction`]s back.

pub mod click;
pub mod gesture;
pub mod mapper;
pub mod preview;
pub mod segments;
pub mod today;

use std::time::Instant;

use chrono::NaiveDate;
use egui::{Color32, Pos2, Rect, Vec2};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{CalendarRange, CalendarWindow, Phase};

pub use click::{ClickDisambiguator, ClickState, PressOutcome};
pub use gesture::{EditMode, Gesture, GestureState, GestureStateMachine};
pub use mapper::{CoordinateMapper, DayRange};
pub use preview::{PreviewHandle, PreviewRect, PreviewSurface};
pub use segments::weekday_segments;
pub use today::{today_index, ScrollBehavior, ScrollController};

/// What the engine needs from the environment that draws it.
pub trait RenderBackend {
    type Surface: PreviewHandle;

    /// Create the preview surface. `None` while its container is not mounted.
    fn mount_preview(&mut self) -> Option<Self::Surface>;
    /// Left edge of the scrolled content, in the same space as pointer x.
    fn content_left(&self) -> f32;
    fn viewport_width(&self) -> f32;
    /// Ask for one call to [`TimelineEngine::on_frame`] soon.
    fn request_frame(&mut self);
    fn request_scroll(&mut self, offset_x: f32, behavior: ScrollBehavior);
}

/// Events for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineAction {
    /// A gesture committed a new inclusive date range for a phase.
    PhaseRangeChanged {
        phase_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// A bar was double-clicked.
    EditPhase(Uuid),
}

/// What sits under the pointer in a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    EmptyLane,
    Bar { mode: EditMode, range: DayRange },
}

/// Where and how to paint one phase's bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub lane_index: usize,
    pub phase_id: Uuid,
    pub range: DayRange,
    /// Content coordinates.
    pub rect: Rect,
    pub color: Color32,
    /// Weekday-only runs to fill with `color`.
    pub segments: Vec<DayRange>,
}

/// A bar press waiting out the drag-start delay.
#[derive(Debug, Clone, Copy)]
struct PendingPress {
    phase_id: Uuid,
    lane_index: usize,
    mode: EditMode,
    original: DayRange,
    pointer_index: usize,
    latest_x: Option<f32>,
}

/// A finished edit whose first click may still turn into a double-click.
#[derive(Debug, Clone, Copy)]
struct HeldCommit {
    phase_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    due: Instant,
}

impl HeldCommit {
    fn into_action(self) -> TimelineAction {
        TimelineAction::PhaseRangeChanged {
            phase_id: self.phase_id,
            start: self.start,
            end: self.end,
        }
    }
}

pub struct TimelineEngine<B: RenderBackend> {
    config: EngineConfig,
    backend: B,
    mapper: CoordinateMapper,
    phases: Vec<Phase>,
    gestures: GestureStateMachine,
    clicks: ClickDisambiguator,
    pending_press: Option<PendingPress>,
    held_commit: Option<HeldCommit>,
    preview: PreviewSurface<B::Surface>,
    scroll: ScrollController,
    today: NaiveDate,
}

impl<B: RenderBackend> std::fmt::Debug for TimelineEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineEngine")
            .field("window", self.mapper.window())
            .field("phases", &self.phases.len())
            .field("gesture", &self.gestures.state())
            .field("held_commit", &self.held_commit.is_some())
            .field("preview_mounted", &self.preview.is_mounted())
            .finish()
    }
}

impl<B: RenderBackend> TimelineEngine<B> {
    /// `today` places the today marker; the host keeps it current through
    /// [`set_today`](Self::set_today).
    pub fn new(
        config: EngineConfig,
        mut backend: B,
        range: &CalendarRange,
        phases: Vec<Phase>,
        today: NaiveDate,
        now: Instant,
    ) -> Result<Self> {
        config.validate()?;
        let window = CalendarWindow::from_range(range, config.px_per_day)?;
        let mapper = CoordinateMapper::new(
            window,
            config.track_height,
            config.lane_gap,
            config.offset_cache_ttl(),
        );
        let mut preview =
            PreviewSurface::new(config.preview_mount_attempts, config.preview_mount_interval());
        preview.poll_mount(now, || backend.mount_preview());
        let mut scroll = ScrollController::new(config.auto_center_delay());
        scroll.window_changed(now);

        debug!(
            start = %window.start(),
            days = window.total_days(),
            phases = phases.len(),
            "timeline engine created"
        );

        Ok(Self {
            gestures: GestureStateMachine::new(window.total_days()),
            clicks: ClickDisambiguator::new(
                config.double_click_threshold(),
                config.drag_start_delay(),
            ),
            config,
            backend,
            mapper,
            phases,
            pending_press: None,
            held_commit: None,
            preview,
            scroll,
            today,
        })
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn window(&self) -> &CalendarWindow {
        self.mapper.window()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn preview(&self) -> &PreviewSurface<B::Surface> {
        &self.preview
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    pub fn active_gesture(&self) -> Option<&Gesture> {
        self.gestures.active()
    }

    /// Range the running gesture would commit right now.
    pub fn candidate(&self) -> Option<DayRange> {
        self.gestures.candidate()
    }

    /// Whether an edit commit is waiting out the double-click window. The
    /// host must keep calling [`tick`](Self::tick) until it is released.
    pub fn has_held_commit(&self) -> bool {
        self.held_commit.is_some()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_index(&self) -> Option<usize> {
        today_index(self.mapper.window(), self.today)
    }

    // ── Host inputs ─────────────────────────────────────────────

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    /// Replace the phase list. A running gesture keeps the bounds it captured.
    pub fn set_phases(&mut self, phases: Vec<Phase>) {
        self.phases = phases;
    }

    /// Update the plan's date span. The window is only rebuilt when the span
    /// covers different years; returns whether that happened.
    pub fn set_calendar_range(&mut self, range: &CalendarRange, now: Instant) -> Result<bool> {
        if range.year_span()? == self.mapper.window().year_span() {
            return Ok(false);
        }
        let window = CalendarWindow::from_range(range, self.config.px_per_day)?;
        self.abort_gesture();
        self.mapper.set_window(window);
        self.gestures = GestureStateMachine::new(window.total_days());
        self.scroll.window_changed(now);
        debug!(start = %window.start(), days = window.total_days(), "calendar window rebuilt");
        Ok(true)
    }

    /// Layout of every phase that has a bar inside the window.
    pub fn bars(&self) -> Vec<BarLayout> {
        self.phases
            .iter()
            .enumerate()
            .filter_map(|(lane, phase)| {
                let range = self.bar_range(lane)?;
                Some(BarLayout {
                    lane_index: lane,
                    phase_id: phase.id,
                    range,
                    rect: self.range_rect(lane, range),
                    color: phase.color_or_palette(lane),
                    segments: weekday_segments(
                        self.mapper.window().start(),
                        range.start,
                        range.length,
                    ),
                })
            })
            .collect()
    }

    /// Clamped day range of the bar in `lane`, if it has one.
    pub fn bar_range(&self, lane: usize) -> Option<DayRange> {
        let phase = self.phases.get(lane)?;
        let Some((start, end)) = phase.date_range() else {
            trace!(phase = %phase.id, "phase has no usable dates");
            return None;
        };
        self.mapper.range_for_dates(start, end)
    }

    /// Classify a content-space x position inside `lane`.
    pub fn hit_test(&self, lane: usize, content_x: f32) -> HitTarget {
        let Some(range) = self.bar_range(lane) else {
            return HitTarget::EmptyLane;
        };
        let left = self.mapper.index_to_x(range.start);
        let right = self.mapper.index_to_x(range.end());
        if content_x < left || content_x >= right {
            return HitTarget::EmptyLane;
        }
        let zone = self.config.edge_hit_zone.min((right - left) / 3.0);
        let mode = if content_x < left + zone {
            EditMode::ResizeLeft
        } else if content_x >= right - zone {
            EditMode::ResizeRight
        } else {
            EditMode::Move
        };
        HitTarget::Bar { mode, range }
    }

    // ── Pointer events ──────────────────────────────────────────

    /// Primary button pressed at client `x` over `lane`.
    ///
    /// A held commit is dropped when this press double-clicks its bar and is
    /// returned otherwise, before the new press takes effect.
    pub fn pointer_down(&mut self, client_x: f32, lane: usize, now: Instant) -> Option<TimelineAction> {
        self.promote_due(now);
        let held = self.held_commit.take();
        if held.is_some() {
            self.preview.hide();
        }
        match (held, self.press(client_x, lane, now)) {
            (Some(commit), Some(TimelineAction::EditPhase(id))) if commit.phase_id == id => {
                debug!(phase = %id, "double-click dropped held commit");
                Some(TimelineAction::EditPhase(id))
            }
            (Some(commit), None) => {
                debug!(phase = %commit.phase_id, "held commit released by next press");
                Some(commit.into_action())
            }
            (held, outcome) => {
                self.held_commit = held;
                outcome
            }
        }
    }

    fn press(&mut self, client_x: f32, lane: usize, now: Instant) -> Option<TimelineAction> {
        let phase_id = self.phases.get(lane)?.id;
        let busy = self.gestures.is_active() || self.pending_press.is_some();

        if !busy {
            self.mapper.invalidate_offset();
        }
        let content_x = client_x - self.backend.content_left();
        let index = self.mapper.day_index_at(content_x);

        match self.hit_test(lane, content_x) {
            HitTarget::Bar { mode, range } => match self.clicks.press(phase_id, now) {
                PressOutcome::DoubleClick {
                    target,
                    revert_gesture,
                } => {
                    self.pending_press = None;
                    let owns_gesture = self
                        .gestures
                        .active()
                        .is_some_and(|g| g.phase_id() == target);
                    if revert_gesture || owns_gesture {
                        self.gestures.cancel();
                        self.preview.hide();
                        debug!(phase = %target, "double-click reverted drag");
                    }
                    debug!(phase = %target, "double-click, opening editor");
                    Some(TimelineAction::EditPhase(target))
                }
                PressOutcome::Pending if busy => {
                    self.clicks.reset();
                    None
                }
                PressOutcome::Pending => {
                    self.pending_press = Some(PendingPress {
                        phase_id,
                        lane_index: lane,
                        mode,
                        original: range,
                        pointer_index: index,
                        latest_x: None,
                    });
                    None
                }
                PressOutcome::Ignored => None,
            },
            HitTarget::EmptyLane => {
                if busy {
                    return None;
                }
                self.clicks.reset();
                if self.gestures.begin_select(phase_id, lane, index) {
                    debug!(phase = %phase_id, lane, index, "selection started");
                    self.schedule_preview();
                }
                None
            }
        }
    }

    pub fn pointer_move(&mut self, client_x: f32, now: Instant) {
        self.promote_due(now);
        if let Some(press) = self.pending_press.as_mut() {
            press.latest_x = Some(client_x);
            return;
        }
        if !self.gestures.is_active() {
            return;
        }
        let index = self
            .mapper
            .day_index_from_x(client_x, now, || self.backend.content_left());
        if self.gestures.update(index).is_some() {
            self.schedule_preview();
        }
    }

    /// Primary button released. Ends the gesture and returns its commit, or
    /// holds an edit commit until [`tick`](Self::tick) rules out a
    /// double-click.
    pub fn pointer_up(&mut self, now: Instant) -> Option<TimelineAction> {
        // A drag released before any tick still counts once its delay is over.
        self.promote_due(now);
        self.clicks.release();
        if self.pending_press.take().is_some() {
            trace!("bar released before drag start");
            return None;
        }
        let done = self.gestures.finish()?;
        if !done.changed {
            self.preview.hide();
            debug!(phase = %done.phase_id, "gesture ended without change");
            return None;
        }
        let (start, end) = self.mapper.range_to_dates(done.range);
        let deadline = self.clicks.double_click_deadline().filter(|due| now <= *due);
        let commit = HeldCommit {
            phase_id: done.phase_id,
            start,
            end,
            due: deadline.unwrap_or(now),
        };

        // A quick drag may be the first half of a double-click; the preview
        // stays up until the second click is ruled out.
        if deadline.is_some() {
            debug!(phase = %done.phase_id, %start, %end, "commit held for double-click window");
            self.held_commit = Some(commit);
            return None;
        }
        self.preview.hide();
        debug!(phase = %done.phase_id, %start, %end, "gesture committed");
        Some(commit.into_action())
    }

    // ── Time ────────────────────────────────────────────────────

    /// Advance timers (drag promotion, preview mounting, auto-centering) and
    /// release a held commit once no double-click can follow it.
    pub fn tick(&mut self, now: Instant) -> Option<TimelineAction> {
        self.advance_timers(now);
        match self.held_commit {
            Some(commit) if now > commit.due => {
                self.held_commit = None;
                self.preview.hide();
                debug!(phase = %commit.phase_id, "held commit released");
                Some(commit.into_action())
            }
            _ => None,
        }
    }

    /// Per-frame callback. Applies at most one preview mutation; returns
    /// whether it did. Held commits only come out of [`tick`](Self::tick).
    pub fn on_frame(&mut self, now: Instant) -> bool {
        self.advance_timers(now);
        self.preview.flush()
    }

    pub fn scroll_to_date(&mut self, date: NaiveDate, behavior: ScrollBehavior) {
        let offset =
            today::scroll_offset_for(self.mapper.window(), date, self.backend.viewport_width());
        self.mapper.invalidate_offset();
        self.backend.request_scroll(offset, behavior);
    }

    /// Drop every transient: gesture, pending press, click history, preview.
    pub fn teardown(&mut self) {
        self.abort_gesture();
        self.held_commit = None;
        debug!("timeline engine torn down");
    }

    // ── Internals ───────────────────────────────────────────────

    fn advance_timers(&mut self, now: Instant) {
        self.promote_due(now);
        self.preview
            .poll_mount(now, || self.backend.mount_preview());
        if self.scroll.take_due(now) && self.today_index().is_some() {
            self.scroll_to_date(self.today, ScrollBehavior::Immediate);
        }
    }

    fn abort_gesture(&mut self) {
        self.gestures.cancel();
        self.pending_press = None;
        self.clicks.reset();
        self.preview.hide();
    }

    fn promote_due(&mut self, now: Instant) {
        let Some(target) = self.clicks.poll(now) else {
            return;
        };
        let Some(press) = self.pending_press.take() else {
            return;
        };
        if press.phase_id != target {
            return;
        }
        if !self.gestures.begin_edit(
            press.phase_id,
            press.lane_index,
            press.mode,
            press.original,
            press.pointer_index,
        ) {
            return;
        }
        debug!(phase = %press.phase_id, mode = ?press.mode, "drag started");
        if let Some(x) = press.latest_x {
            let index = self
                .mapper
                .day_index_from_x(x, now, || self.backend.content_left());
            self.gestures.update(index);
        }
        self.schedule_preview();
    }

    fn schedule_preview(&mut self) {
        let (Some(gesture), Some(range)) = (self.gestures.active(), self.gestures.candidate()) else {
            return;
        };
        let rect = self.range_rect(gesture.lane_index(), range);
        let rect = PreviewRect {
            left: rect.min.x,
            top: rect.min.y,
            width: rect.width(),
            height: rect.height(),
        };
        if self.preview.schedule(rect) {
            self.backend.request_frame();
        }
    }

    fn range_rect(&self, lane: usize, range: DayRange) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.mapper.index_to_x(range.start), self.mapper.lane_top(lane)),
            Vec2::new(
                range.length as f32 * self.mapper.px_per_day(),
                self.mapper.track_height(),
            ),
        )
    }
}
