//! The one retained surface that shows an in-progress gesture.
//!
//! Bars are redrawn from the host's phase list; the preview is not. It is a
//! handle obtained once and then mutated through [`PreviewHandle`] at most
//! once per frame, so a drag costs O(1) per frame no matter how many bars or
//! days are on screen.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Position and size of the preview, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreviewRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Narrow mutation interface over a backend-owned drawable.
pub trait PreviewHandle {
    fn set_rect(&mut self, rect: PreviewRect);
    fn set_visible(&mut self, visible: bool);
}

#[derive(Debug)]
enum Mount<H> {
    Waiting {
        attempts: u32,
        next_attempt: Option<Instant>,
    },
    Mounted {
        handle: H,
        visible: bool,
    },
    Abandoned,
}

#[derive(Debug)]
pub struct PreviewSurface<H> {
    mount: Mount<H>,
    max_attempts: u32,
    retry_interval: Duration,
    pending: Option<PreviewRect>,
}

impl<H: PreviewHandle> PreviewSurface<H> {
    pub fn new(max_attempts: u32, retry_interval: Duration) -> Self {
        Self {
            mount: Mount::Waiting {
                attempts: 0,
                next_attempt: None,
            },
            max_attempts,
            retry_interval,
            pending: None,
        }
    }

    /// Try to obtain the handle if it is due. `mount` returns `None` while the
    /// hosting container does not exist yet.
    pub fn poll_mount(&mut self, now: Instant, mount: impl FnOnce() -> Option<H>) {
        let Mount::Waiting {
            attempts,
            next_attempt,
        } = self.mount
        else {
            return;
        };
        if next_attempt.is_some_and(|at| now < at) {
            return;
        }

        match mount() {
            Some(mut handle) => {
                handle.set_visible(false);
                debug!("preview surface mounted after {} attempt(s)", attempts + 1);
                self.mount = Mount::Mounted {
                    handle,
                    visible: false,
                };
            }
            None if attempts + 1 >= self.max_attempts => {
                debug!("preview container never appeared; continuing without preview");
                self.mount = Mount::Abandoned;
            }
            None => {
                self.mount = Mount::Waiting {
                    attempts: attempts + 1,
                    next_attempt: Some(now + self.retry_interval),
                };
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.mount, Mount::Mounted { .. })
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self.mount, Mount::Abandoned)
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.mount, Mount::Mounted { visible: true, .. })
    }

    pub fn handle(&self) -> Option<&H> {
        match &self.mount {
            Mount::Mounted { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// Queue `rect` for the next frame. Returns true if this is the first
    /// update queued since the last frame, i.e. the caller should request one.
    pub fn schedule(&mut self, rect: PreviewRect) -> bool {
        if self.is_abandoned() {
            return false;
        }
        self.pending.replace(rect).is_none()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Frame callback: apply the latest queued rect, showing the surface if
    /// needed. Returns whether the surface was mutated.
    pub fn flush(&mut self) -> bool {
        let Some(rect) = self.pending.take() else {
            return false;
        };
        let Mount::Mounted { handle, visible } = &mut self.mount else {
            return false;
        };
        handle.set_rect(rect);
        if !*visible {
            handle.set_visible(true);
            *visible = true;
        }
        trace!(?rect, "preview updated");
        true
    }

    /// Drop any queued update and hide the surface. The handle is kept.
    pub fn hide(&mut self) {
        self.pending = None;
        if let Mount::Mounted { handle, visible } = &mut self.mount {
            if *visible {
                handle.set_visible(false);
                *visible = false;
            }
        }
    }
}
