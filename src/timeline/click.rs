//! Press-vs-double-click arbitration for bars.
//!
//! A press on a bar does not start a drag immediately: it waits
//! `drag_start_delay` for a possible second press. A second press on the same
//! bar within `double_click_threshold` of the first is a double-click, which
//! cancels the pending drag (or reverts one that already started).
//!
//! Time is passed in by the caller, so the race between the promotion timer
//! and the second press is deterministic.
//!
//! | state              | press, same target ≤ threshold | press, otherwise          | poll, delay elapsed | release            |
//! |--------------------|--------------------------------|---------------------------|---------------------|--------------------|
//! | `Idle`             | –                              | `PendingDragStart`        | –                   | –                  |
//! | `PendingDragStart` | `Cancelled` + double-click     | ignored                   | `Promoted`          | `Armed`            |
//! | `Promoted`         | `Cancelled` + double-click     | ignored                   | –                   | `Armed`            |
//! | `Armed`            | `Cancelled` + double-click     | `PendingDragStart`        | –                   | –                  |
//! | `Cancelled`        | ignored                        | ignored                   | –                   | `Idle`             |

use std::time::{Duration, Instant};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickState {
    Idle,
    /// Pressed, waiting for the drag delay.
    PendingDragStart { target: Uuid, pressed_at: Instant },
    /// Pressed long enough; a drag gesture is running.
    Promoted { target: Uuid, pressed_at: Instant },
    /// Released; a second press may still make a double-click.
    Armed { target: Uuid, pressed_at: Instant },
    /// Double-click fired; everything is ignored until release.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Press recorded; the caller holds the drag start until `poll` promotes it.
    Pending,
    /// Second press on the same target. `revert_gesture` is set when the first
    /// press had already been promoted to a drag.
    DoubleClick { target: Uuid, revert_gesture: bool },
    /// A button is already held (or a double-click is still being released).
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ClickDisambiguator {
    double_click_threshold: Duration,
    drag_start_delay: Duration,
    state: ClickState,
}

impl ClickDisambiguator {
    pub fn new(double_click_threshold: Duration, drag_start_delay: Duration) -> Self {
        Self {
            double_click_threshold,
            drag_start_delay,
            state: ClickState::Idle,
        }
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    pub fn press(&mut self, target: Uuid, now: Instant) -> PressOutcome {
        let previous = match self.state {
            ClickState::Cancelled => return PressOutcome::Ignored,
            ClickState::Idle => None,
            ClickState::PendingDragStart { target, pressed_at } => Some((target, pressed_at, false)),
            ClickState::Promoted { target, pressed_at } => Some((target, pressed_at, true)),
            ClickState::Armed { target, pressed_at } => Some((target, pressed_at, false)),
        };

        if let Some((prev_target, pressed_at, promoted)) = previous {
            let within = now.saturating_duration_since(pressed_at) <= self.double_click_threshold;
            if prev_target == target && within {
                self.state = ClickState::Cancelled;
                return PressOutcome::DoubleClick {
                    target,
                    revert_gesture: promoted,
                };
            }
        }

        match self.state {
            ClickState::PendingDragStart { .. } | ClickState::Promoted { .. } => PressOutcome::Ignored,
            _ => {
                self.state = ClickState::PendingDragStart {
                    target,
                    pressed_at: now,
                };
                PressOutcome::Pending
            }
        }
    }

    /// Promote a pending press whose delay has elapsed. Returns its target.
    pub fn poll(&mut self, now: Instant) -> Option<Uuid> {
        if let ClickState::PendingDragStart { target, pressed_at } = self.state {
            if now.saturating_duration_since(pressed_at) >= self.drag_start_delay {
                self.state = ClickState::Promoted { target, pressed_at };
                return Some(target);
            }
        }
        None
    }

    pub fn release(&mut self) {
        self.state = match self.state {
            ClickState::PendingDragStart { target, pressed_at }
            | ClickState::Promoted { target, pressed_at } => ClickState::Armed { target, pressed_at },
            ClickState::Cancelled => ClickState::Idle,
            other => other,
        };
    }

    /// End of the window in which a second press still makes a double-click.
    /// Only set once the first press has been released.
    pub fn double_click_deadline(&self) -> Option<Instant> {
        match self.state {
            ClickState::Armed { pressed_at, .. } => Some(pressed_at + self.double_click_threshold),
            _ => None,
        }
    }

    /// Forget any press history, e.g. after a press somewhere that is not a bar.
    pub fn reset(&mut self) {
        self.state = ClickState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn disambiguator() -> ClickDisambiguator {
        ClickDisambiguator::new(ms(300), ms(100))
    }

    #[test]
    fn press_promotes_after_delay() {
        let mut c = disambiguator();
        let bar = Uuid::new_v4();
        let t0 = Instant::now();
        assert_eq!(c.press(bar, t0), PressOutcome::Pending);
        assert_eq!(c.poll(t0 + ms(99)), None);
        assert_eq!(c.poll(t0 + ms(100)), Some(bar));
        assert_eq!(c.poll(t0 + ms(150)), None);
        assert!(matches!(c.state(), ClickState::Promoted { .. }));
    }

    #[test]
    fn quick_click_pair_is_a_double_click() {
        let mut c = disambiguator();
        let bar = Uuid::new_v4();
        let t0 = Instant::now();
        c.press(bar, t0);
        c.release();
        assert_eq!(
            c.press(bar, t0 + ms(180)),
            PressOutcome::DoubleClick {
                target: bar,
                revert_gesture: false
            }
        );
        // The pending start was cancelled, so nothing is ever promoted.
        assert_eq!(c.poll(t0 + ms(500)), None);
        c.release();
        assert_eq!(c.state(), ClickState::Idle);
    }

    #[test]
    fn double_click_after_promotion_asks_for_revert() {
        let mut c = disambiguator();
        let bar = Uuid::new_v4();
        let t0 = Instant::now();
        c.press(bar, t0);
        assert_eq!(c.poll(t0 + ms(120)), Some(bar));
        assert_eq!(
            c.press(bar, t0 + ms(250)),
            PressOutcome::DoubleClick {
                target: bar,
                revert_gesture: true
            }
        );
    }

    #[test]
    fn slow_second_press_starts_a_new_pending_drag() {
        let mut c = disambiguator();
        let bar = Uuid::new_v4();
        let t0 = Instant::now();
        c.press(bar, t0);
        c.release();
        assert_eq!(c.press(bar, t0 + ms(301)), PressOutcome::Pending);
    }

    #[test]
    fn press_on_another_bar_is_not_a_double_click() {
        let mut c = disambiguator();
        let t0 = Instant::now();
        c.press(Uuid::new_v4(), t0);
        c.release();
        assert_eq!(c.press(Uuid::new_v4(), t0 + ms(50)), PressOutcome::Pending);
    }

    #[test]
    fn deadline_runs_from_the_first_press_once_released() {
        let mut c = disambiguator();
        let bar = Uuid::new_v4();
        let t0 = Instant::now();
        c.press(bar, t0);
        assert_eq!(c.double_click_deadline(), None);
        c.poll(t0 + ms(150));
        c.release();
        assert_eq!(c.double_click_deadline(), Some(t0 + ms(300)));
        c.press(bar, t0 + ms(200));
        assert_eq!(c.double_click_deadline(), None);
    }

    #[test]
    fn presses_while_held_or_cancelled_are_ignored() {
        let mut c = disambiguator();
        let bar = Uuid::new_v4();
        let t0 = Instant::now();
        c.press(bar, t0);
        assert_eq!(c.press(Uuid::new_v4(), t0 + ms(10)), PressOutcome::Ignored);
        c.press(bar, t0 + ms(20));
        assert_eq!(c.press(bar, t0 + ms(30)), PressOutcome::Ignored);
        c.reset();
        assert_eq!(c.state(), ClickState::Idle);
    }
}
