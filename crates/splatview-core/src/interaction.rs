//! Double-click detection for the recenter gesture
//!
//! Pointer-down timestamps are in milliseconds, as reported by the
//! environment's monotonic clock (`performance.now()` in the browser).

/// Maximum gap between two pointer-downs that still counts as a double-click
pub const DOUBLE_CLICK_THRESHOLD_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClickState {
    /// No recent pointer-down
    Idle,
    /// One pointer-down seen at the given time
    Armed { at_ms: f64 },
}

/// Result of feeding a pointer-down into [`DoubleClick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// First click of a possible double-click (or the previous one timed out)
    Armed,
    /// Second click inside the threshold: the caller should hit-test
    DoubleClick,
}

/// Two-state machine recognising double-clicks
#[derive(Debug, Clone)]
pub struct DoubleClick {
    state: ClickState,
    threshold_ms: f64,
}

impl Default for DoubleClick {
    fn default() -> Self {
        Self::new()
    }
}

impl DoubleClick {
    pub fn new() -> Self {
        Self {
            state: ClickState::Idle,
            threshold_ms: DOUBLE_CLICK_THRESHOLD_MS,
        }
    }

    /// Whether one click has been seen and a second is awaited
    pub fn is_armed(&self) -> bool {
        matches!(self.state, ClickState::Armed { .. })
    }

    /// Time of the last recorded pointer-down, if any
    pub fn last_press_ms(&self) -> Option<f64> {
        match self.state {
            ClickState::Armed { at_ms } => Some(at_ms),
            ClickState::Idle => None,
        }
    }

    /// Feed a pointer-down observed at `now_ms`.
    ///
    /// The timestamp is recorded on every press and never cleared, so a third
    /// press inside the threshold of the second is another double-click.
    pub fn pointer_down(&mut self, now_ms: f64) -> ClickOutcome {
        let outcome = match self.state {
            ClickState::Armed { at_ms } if now_ms - at_ms < self.threshold_ms => {
                ClickOutcome::DoubleClick
            }
            _ => ClickOutcome::Armed,
        };
        self.state = ClickState::Armed { at_ms: now_ms };
        outcome
    }
}
