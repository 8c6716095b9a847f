//! Viewer orchestration over an abstract rendering backend
//!
//! [`Viewer`] owns the per-instance state (viewport, redraw scheduler,
//! double-click detector, load progress) and drives a [`ViewerBackend`] and
//! [`OrbitControls`] through the event and frame flow. Engines that cannot
//! hand out a backend object, such as an ECS, use the same building blocks
//! directly.

use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, error, info};

use crate::events::{EventSource, ViewerEvent};
use crate::interaction::{ClickOutcome, DoubleClick};
use crate::overlay::{Bounds, DepthRange, OverlayPlacement};
use crate::progress::LoadProgress;
use crate::scheduler::{RedrawScheduler, RefreshSource};
use crate::viewport::ViewportState;

/// Rendering collaborators: scene renderer, splat layer, camera and overlay
pub trait ViewerBackend {
    /// Resize the drawing surface and update the camera aspect and projection
    fn resize(&mut self, viewport: &ViewportState);
    /// Current camera clip-from-world matrix
    fn clip_from_world(&self) -> Mat4;
    /// Depth convention of [`clip_from_world`](Self::clip_from_world)
    fn depth_range(&self) -> DepthRange {
        DepthRange::NegOneToOne
    }
    /// Draw the conventional scene
    fn render_scene(&mut self);
    /// Draw the splat layer over the scene, with the same camera
    fn render_splats(&mut self, orbit_target: Vec3);
    /// Nearest splat point under a screen position
    fn hit_test(&self, screen: Vec2) -> Option<Vec3>;
    /// Move the orbit target marker
    fn set_marker(&mut self, position: Vec3);
    fn place_overlay(&mut self, placement: OverlayPlacement);
    /// World bounds of the loaded model, if any
    fn model_bounds(&self) -> Option<Bounds>;
    /// Total splats expected from the splat layer
    fn splat_total_size(&self) -> u64;
    fn set_spinner_visible(&mut self, _visible: bool) {}
}

/// Camera orbit controls
pub trait OrbitControls {
    fn target(&self) -> Vec3;
    fn set_target(&mut self, target: Vec3);
    /// Advance damping by `dt` seconds. Returns whether the view moved.
    fn update(&mut self, dt: f32) -> bool;
}

pub struct Viewer<B, C, R> {
    backend: B,
    controls: C,
    refresh: R,
    viewport: ViewportState,
    scheduler: RedrawScheduler,
    clicks: DoubleClick,
    progress: LoadProgress,
    model_loaded: bool,
}

impl<B, C, R> Viewer<B, C, R>
where
    B: ViewerBackend,
    C: OrbitControls,
    R: RefreshSource,
{
    pub fn new(backend: B, controls: C, refresh: R) -> Self {
        Self {
            backend,
            controls,
            refresh,
            viewport: ViewportState::default(),
            scheduler: RedrawScheduler::new(),
            clicks: DoubleClick::new(),
            progress: LoadProgress::default(),
            model_loaded: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    pub fn refresh_mut(&mut self) -> &mut R {
        &mut self.refresh
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }

    pub fn has_model(&self) -> bool {
        self.model_loaded
    }

    /// Ask for a frame on the next display refresh
    pub fn request_redraw(&mut self) -> bool {
        self.scheduler.request_redraw(&mut self.refresh)
    }

    /// Initial sizing and first frame request
    pub fn start(&mut self, width: u32, height: u32) {
        self.resize(width, height);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
        self.backend.resize(&self.viewport);
        debug!(width, height, aspect = self.viewport.aspect_ratio(), "Viewport resized");
        self.request_redraw();
    }

    /// Handle a pointer-down. Returns the new orbit target on a recenter.
    pub fn pointer_down(&mut self, position: Vec2, time_ms: f64) -> Option<Vec3> {
        if self.clicks.pointer_down(time_ms) != ClickOutcome::DoubleClick {
            return None;
        }
        let point = self.backend.hit_test(position)?;
        debug!(x = point.x, y = point.y, z = point.z, "Recentering orbit target");
        self.controls.set_target(point);
        self.backend.set_marker(point);
        self.request_redraw();
        Some(point)
    }

    pub fn handle_event(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::Resized { width, height } => self.resize(width, height),
            ViewerEvent::PointerDown { position, time_ms } => {
                self.pointer_down(position, time_ms);
            }
            ViewerEvent::ControlsChanged | ViewerEvent::SplatUpdated => {
                self.request_redraw();
            }
            ViewerEvent::SplatLoaded {
                total_loaded,
                num_displayed,
            } => {
                self.progress.total_size = self.backend.splat_total_size();
                self.progress.update(total_loaded, num_displayed);
                self.backend.set_spinner_visible(self.progress.spinner_visible());
            }
            ViewerEvent::ModelLoaded(bounds) => {
                info!(size = ?bounds.size(), "Model loaded");
                self.model_loaded = true;
                self.request_redraw();
            }
            ViewerEvent::ModelLoadFailed(reason) => {
                error!("Error loading model: {}", reason);
                self.model_loaded = false;
                self.backend.place_overlay(OverlayPlacement::hidden());
            }
        }
    }

    /// Dispatch every event the source has pending
    pub fn pump(&mut self, source: &mut impl EventSource) -> usize {
        let mut handled = 0;
        while let Some(event) = source.next_event() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Render one frame. This is the scheduled unit of work.
    pub fn render_frame(&mut self, dt: f32) {
        self.scheduler.begin_frame();

        self.backend.render_scene();
        self.backend.render_splats(self.controls.target());

        if self.model_loaded {
            if let Some(bounds) = self.backend.model_bounds() {
                let placement = OverlayPlacement::for_bounds(
                    &bounds,
                    &self.backend.clip_from_world(),
                    &self.viewport,
                    self.backend.depth_range(),
                );
                self.backend.place_overlay(placement);
            }
        }

        if self.controls.update(dt) {
            self.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualRefresh;

    #[derive(Default)]
    struct NullBackend {
        resized: Option<ViewportState>,
    }

    impl ViewerBackend for NullBackend {
        fn resize(&mut self, viewport: &ViewportState) {
            self.resized = Some(*viewport);
        }
        fn clip_from_world(&self) -> Mat4 {
            Mat4::IDENTITY
        }
        fn render_scene(&mut self) {}
        fn render_splats(&mut self, _orbit_target: Vec3) {}
        fn hit_test(&self, _screen: Vec2) -> Option<Vec3> {
            None
        }
        fn set_marker(&mut self, _position: Vec3) {}
        fn place_overlay(&mut self, _placement: OverlayPlacement) {}
        fn model_bounds(&self) -> Option<Bounds> {
            None
        }
        fn splat_total_size(&self) -> u64 {
            0
        }
    }

    struct StillControls;

    impl OrbitControls for StillControls {
        fn target(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn set_target(&mut self, _target: Vec3) {}
        fn update(&mut self, _dt: f32) -> bool {
            false
        }
    }

    #[test]
    fn test_start_requests_first_frame() {
        let mut viewer = Viewer::new(NullBackend::default(), StillControls, ManualRefresh::new());
        viewer.start(1280, 720);
        assert_eq!(viewer.backend().resized, Some(ViewportState::new(1280, 720)));
        assert!(viewer.scheduler().is_pending());
        assert_eq!(viewer.refresh_mut().fire(), 1);
        viewer.render_frame(0.016);
        assert!(!viewer.scheduler().is_pending());
    }
}
