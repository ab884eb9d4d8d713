//! The single-slot gesture state machine.
//!
//! ```text
//! Idle ──begin_select──▶ Selecting ─────┐
//!  │                                    │ finish / cancel
//!  └──begin_edit──▶ Moving              ├──▶ Idle
//!                   ResizingLeft        │
//!                   ResizingRight ──────┘
//! ```
//!
//! A gesture is mutated in place on every pointer move; nothing is
//! allocated between `begin_*` and `finish`. All arithmetic is clamped, so
//! no pointer position can produce an empty range or one that leaves the
//! calendar.

use uuid::Uuid;

use super::mapper::DayRange;

/// What dragging a bar does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Move,
    ResizeLeft,
    ResizeRight,
}

/// Observable state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Selecting,
    Moving,
    ResizingLeft,
    ResizingRight,
}

/// Drag over an empty part of a lane, creating a new range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSelection {
    pub phase_id: Uuid,
    pub lane_index: usize,
    pub start_index: usize,
    pub current_index: usize,
}

/// Move or resize of an existing bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditGesture {
    pub phase_id: Uuid,
    pub lane_index: usize,
    pub mode: EditMode,
    /// Pointer day at gesture start for moves; the dragged edge for resizes.
    pub anchor_index: usize,
    pub current_index: usize,
    pub original_start_index: usize,
    pub original_length: usize,
}

impl EditGesture {
    fn original(&self) -> DayRange {
        DayRange::new(self.original_start_index, self.original_length)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    Select(DragSelection),
    Edit(EditGesture),
}

impl Gesture {
    pub fn phase_id(&self) -> Uuid {
        match self {
            Gesture::Select(s) => s.phase_id,
            Gesture::Edit(e) => e.phase_id,
        }
    }

    pub fn lane_index(&self) -> usize {
        match self {
            Gesture::Select(s) => s.lane_index,
            Gesture::Edit(e) => e.lane_index,
        }
    }
}

/// A finished gesture's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completed {
    pub phase_id: Uuid,
    pub lane_index: usize,
    pub range: DayRange,
    /// False when an edit ended exactly where it started.
    pub changed: bool,
}

/// Candidate range for a selection between `anchor` and `current`.
pub fn select_range(anchor: usize, current: usize) -> DayRange {
    DayRange::spanning(anchor, current)
}

/// Candidate range while moving `original` by `current - anchor` days.
pub fn move_range(original: DayRange, anchor: usize, current: usize, day_count: usize) -> DayRange {
    let length = original.length.clamp(1, day_count.max(1));
    let max_start = day_count.saturating_sub(length) as i64;
    let delta = current as i64 - anchor as i64;
    let start = (original.start as i64 + delta).clamp(0, max_start) as usize;
    DayRange::new(start, length)
}

/// Candidate range while dragging the left edge of `original` to `current`.
pub fn resize_left_range(original: DayRange, current: usize) -> DayRange {
    let right = original.last();
    let start = current.min(right);
    DayRange::new(start, (right + 1 - start).max(1))
}

/// Candidate range while dragging the right edge of `original` to `current`.
pub fn resize_right_range(original: DayRange, current: usize, day_count: usize) -> DayRange {
    let end = current.max(original.start);
    let room = day_count.saturating_sub(original.start).max(1);
    DayRange::new(original.start, (end - original.start + 1).clamp(1, room))
}

/// Owns the one gesture slot.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    day_count: usize,
    active: Option<Gesture>,
}

impl GestureStateMachine {
    pub fn new(day_count: usize) -> Self {
        Self {
            day_count: day_count.max(1),
            active: None,
        }
    }

    pub fn state(&self) -> GestureState {
        match &self.active {
            None => GestureState::Idle,
            Some(Gesture::Select(_)) => GestureState::Selecting,
            Some(Gesture::Edit(e)) => match e.mode {
                EditMode::Move => GestureState::Moving,
                EditMode::ResizeLeft => GestureState::ResizingLeft,
                EditMode::ResizeRight => GestureState::ResizingRight,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Gesture> {
        self.active.as_ref()
    }

    /// Start a selection. Returns false, changing nothing, if a gesture is
    /// already running.
    pub fn begin_select(&mut self, phase_id: Uuid, lane_index: usize, index: usize) -> bool {
        if self.active.is_some() {
            return false;
        }
        let index = self.clamp(index);
        self.active = Some(Gesture::Select(DragSelection {
            phase_id,
            lane_index,
            start_index: index,
            current_index: index,
        }));
        true
    }

    /// Start a move or resize of the bar occupying `original`.
    ///
    /// `pointer_index` anchors a move; resizes anchor on the dragged edge.
    pub fn begin_edit(
        &mut self,
        phase_id: Uuid,
        lane_index: usize,
        mode: EditMode,
        original: DayRange,
        pointer_index: usize,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        let start = self.clamp(original.start);
        let length = original.length.clamp(1, self.day_count - start);
        let original = DayRange::new(start, length);
        let pointer_index = self.clamp(pointer_index);
        let anchor_index = match mode {
            EditMode::Move => pointer_index,
            EditMode::ResizeLeft => original.start,
            EditMode::ResizeRight => original.last(),
        };
        self.active = Some(Gesture::Edit(EditGesture {
            phase_id,
            lane_index,
            mode,
            anchor_index,
            current_index: pointer_index,
            original_start_index: original.start,
            original_length: original.length,
        }));
        true
    }

    /// Record the pointer's day and return the new candidate range.
    pub fn update(&mut self, index: usize) -> Option<DayRange> {
        let index = self.clamp(index);
        match self.active.as_mut()? {
            Gesture::Select(s) => s.current_index = index,
            Gesture::Edit(e) => e.current_index = index,
        }
        self.candidate()
    }

    pub fn candidate(&self) -> Option<DayRange> {
        let range = match self.active.as_ref()? {
            Gesture::Select(s) => select_range(s.start_index, s.current_index),
            Gesture::Edit(e) => match e.mode {
                EditMode::Move => {
                    move_range(e.original(), e.anchor_index, e.current_index, self.day_count)
                }
                EditMode::ResizeLeft => resize_left_range(e.original(), e.current_index),
                EditMode::ResizeRight => {
                    resize_right_range(e.original(), e.current_index, self.day_count)
                }
            },
        };
        Some(range)
    }

    /// End the gesture, returning its last candidate range.
    pub fn finish(&mut self) -> Option<Completed> {
        let range = self.candidate()?;
        let gesture = self.active.take()?;
        let changed = match &gesture {
            Gesture::Select(_) => true,
            Gesture::Edit(e) => range != e.original(),
        };
        Some(Completed {
            phase_id: gesture.phase_id(),
            lane_index: gesture.lane_index(),
            range,
            changed,
        })
    }

    /// Drop the gesture without producing a result.
    pub fn cancel(&mut self) -> Option<Gesture> {
        self.active.take()
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.day_count - 1)
    }
}
