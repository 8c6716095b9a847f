//! Event sources feeding the viewer
//!
//! The window, the orbit controls and the splat layer each notify the viewer
//! independently. They are modelled as a stream of [`ViewerEvent`]s pulled
//! from an [`EventSource`], so headless runs can inject synthetic events.

use std::collections::VecDeque;

use glam::Vec2;

use crate::overlay::Bounds;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// Window resized to the given pixel size
    Resized { width: u32, height: u32 },
    /// Pointer pressed at a screen position, timestamp in milliseconds
    PointerDown { position: Vec2, time_ms: f64 },
    /// Orbit controls moved the camera
    ControlsChanged,
    /// Splat layer has new content to show
    SplatUpdated,
    /// Splat layer streaming progress
    SplatLoaded { total_loaded: u64, num_displayed: u64 },
    /// Mesh model finished loading with the given world bounds
    ModelLoaded(Bounds),
    /// Mesh model failed to load
    ModelLoadFailed(String),
}

/// Anything that can hand the viewer its next pending event
pub trait EventSource {
    fn next_event(&mut self) -> Option<ViewerEvent>;
}

/// FIFO of events pushed by callbacks and drained once per dispatch
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: VecDeque<ViewerEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ViewerEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for EventQueue {
    fn next_event(&mut self) -> Option<ViewerEvent> {
        self.events.pop_front()
    }
}

impl Extend<ViewerEvent> for EventQueue {
    fn extend<T: IntoIterator<Item = ViewerEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
