//! Viewport dimensions

use glam::Vec2;

/// Current drawing surface size in pixels.
///
/// Only the resize handler mutates this. Both dimensions are kept at least 1
/// so the aspect ratio is always finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    width: u32,
    height: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { width: 1, height: 1 }
    }
}

impl ViewportState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Record new window dimensions. Returns true if anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let next = Self::new(width, height);
        let changed = next != *self;
        *self = next;
        changed
    }

    /// Map normalized device x/y (-1..1, y up) to pixel coordinates (y down)
    pub fn ndc_to_pixels(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.width as f32,
            (-ndc.y * 0.5 + 0.5) * self.height as f32,
        )
    }
}
