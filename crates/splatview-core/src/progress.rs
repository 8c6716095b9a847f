//! Splat streaming progress

/// Splats displayed after which the cloud counts as usable regardless of size
pub const DISPLAYED_THRESHOLD: u64 = 1_000_000;

/// Counters reported by the splat layer while it streams data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    /// Total number of splats in the cloud, once known
    pub total_size: u64,
    pub total_loaded: u64,
    pub num_displayed: u64,
}

impl LoadProgress {
    pub fn new(total_size: u64) -> Self {
        Self {
            total_size,
            ..Default::default()
        }
    }

    /// Record a `loaded` notification
    pub fn update(&mut self, total_loaded: u64, num_displayed: u64) {
        self.total_loaded = total_loaded;
        self.num_displayed = num_displayed;
    }

    /// Whether enough has arrived to take the loading spinner down
    pub fn is_usable(&self) -> bool {
        self.total_loaded > self.total_size / 2 || self.num_displayed > DISPLAYED_THRESHOLD
    }

    pub fn spinner_visible(&self) -> bool {
        !self.is_usable()
    }
}
