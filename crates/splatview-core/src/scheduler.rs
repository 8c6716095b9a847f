//! Render-on-demand scheduling
//!
//! Any number of event sources may ask for a redraw. The scheduler keeps at
//! most one refresh callback registered with the environment at a time, so
//! all requests made before the next display refresh collapse into a single
//! frame render.

use tracing::trace;

/// The environment's display-refresh registration primitive.
///
/// `register_frame` arranges for exactly one frame callback on the next
/// refresh opportunity. It is single-shot: the scheduler registers again only
/// after the previous callback has started running.
pub trait RefreshSource {
    fn register_frame(&mut self);
}

/// Coalesces redraw requests into at most one pending frame
#[derive(Debug, Default, Clone)]
pub struct RedrawScheduler {
    pending: bool,
    /// Number of refresh callbacks registered so far
    registrations: u64,
    /// Number of frames started so far
    frames: u64,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame is registered and has not started yet
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn registrations(&self) -> u64 {
        self.registrations
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Request a redraw, registering with `source` if none is pending.
    ///
    /// Returns true when this call registered a new refresh callback.
    pub fn request_redraw(&mut self, source: &mut (impl RefreshSource + ?Sized)) -> bool {
        self.request_redraw_with(|| source.register_frame())
    }

    /// Like [`request_redraw`](Self::request_redraw) but with the registration
    /// supplied as a closure, for engines where the primitive is not an object.
    pub fn request_redraw_with(&mut self, register: impl FnOnce()) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        self.registrations += 1;
        trace!(registrations = self.registrations, "Redraw registered");
        register();
        true
    }

    /// Mark the start of a frame render.
    ///
    /// Clears the pending flag before the renderer runs, so a request issued
    /// while rendering schedules the following frame. Returns whether the
    /// frame had been requested.
    pub fn begin_frame(&mut self) -> bool {
        let was_pending = std::mem::replace(&mut self.pending, false);
        if was_pending {
            self.frames += 1;
        }
        was_pending
    }
}

/// Deterministic refresh source for headless runs and tests.
///
/// Registrations accumulate until [`fire`](Self::fire) is called, which
/// plays the part of the display refresh.
#[derive(Debug, Default, Clone)]
pub struct ManualRefresh {
    queued: usize,
}

impl ManualRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next refresh
    pub fn queued(&self) -> usize {
        self.queued
    }

    /// Take all waiting callbacks, returning how many were queued
    pub fn fire(&mut self) -> usize {
        std::mem::take(&mut self.queued)
    }
}

impl RefreshSource for ManualRefresh {
    fn register_frame(&mut self) {
        self.queued += 1;
    }
}
