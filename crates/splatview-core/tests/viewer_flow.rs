//! End-to-end frame scheduling and interaction through a recording backend

use glam::{Mat4, Vec2, Vec3};
use splatview_core::{
    Bounds, EventQueue, ManualRefresh, OrbitControls, OverlayPlacement, Viewer, ViewerBackend,
    ViewerEvent, ViewportState,
};

#[derive(Default)]
struct RecordingBackend {
    calls: Vec<&'static str>,
    viewport: Option<ViewportState>,
    hit: Option<Vec3>,
    marker: Option<Vec3>,
    overlay: Option<OverlayPlacement>,
    bounds: Option<Bounds>,
    spinner_visible: Option<bool>,
}

impl ViewerBackend for RecordingBackend {
    fn resize(&mut self, viewport: &ViewportState) {
        self.viewport = Some(*viewport);
        self.calls.push("resize");
    }

    // NDC equals world position, w = 1
    fn clip_from_world(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    fn render_scene(&mut self) {
        self.calls.push("scene");
    }

    fn render_splats(&mut self, _orbit_target: Vec3) {
        self.calls.push("splats");
    }

    fn hit_test(&self, _screen: Vec2) -> Option<Vec3> {
        self.hit
    }

    fn set_marker(&mut self, position: Vec3) {
        self.marker = Some(position);
    }

    fn place_overlay(&mut self, placement: OverlayPlacement) {
        self.overlay = Some(placement);
    }

    fn model_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn splat_total_size(&self) -> u64 {
        1000
    }

    fn set_spinner_visible(&mut self, visible: bool) {
        self.spinner_visible = Some(visible);
    }
}

#[derive(Default)]
struct DampedControls {
    target: Vec3,
    /// Frames the damping keeps moving for
    settling_frames: u32,
}

impl OrbitControls for DampedControls {
    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn update(&mut self, _dt: f32) -> bool {
        if self.settling_frames > 0 {
            self.settling_frames -= 1;
            true
        } else {
            false
        }
    }
}

type TestViewer = Viewer<RecordingBackend, DampedControls, ManualRefresh>;

fn viewer() -> TestViewer {
    Viewer::new(
        RecordingBackend::default(),
        DampedControls::default(),
        ManualRefresh::new(),
    )
}

/// Fire the display refresh and render every frame it delivers
fn refresh(viewer: &mut TestViewer) -> usize {
    let frames = viewer.refresh_mut().fire();
    for _ in 0..frames {
        viewer.render_frame(1.0 / 60.0);
    }
    frames
}

fn rendered_frames(viewer: &TestViewer) -> usize {
    viewer
        .backend()
        .calls
        .iter()
        .filter(|c| **c == "scene")
        .count()
}

#[test]
fn test_many_requests_render_once() {
    let mut viewer = viewer();
    for _ in 0..25 {
        viewer.request_redraw();
    }
    assert_eq!(refresh(&mut viewer), 1);
    assert_eq!(rendered_frames(&viewer), 1);
    assert!(!viewer.scheduler().is_pending());

    // Nothing left for the next refresh
    assert_eq!(refresh(&mut viewer), 0);
}

#[test]
fn test_scene_renders_before_splats() {
    let mut viewer = viewer();
    viewer.request_redraw();
    refresh(&mut viewer);
    assert_eq!(viewer.backend().calls, vec!["scene", "splats"]);
}

#[test]
fn test_request_from_inside_render_schedules_one_more() {
    let mut viewer = Viewer::new(
        RecordingBackend::default(),
        DampedControls {
            target: Vec3::ZERO,
            settling_frames: 1,
        },
        ManualRefresh::new(),
    );
    viewer.request_redraw();

    assert_eq!(refresh(&mut viewer), 1);
    // Damping moved the view during that frame
    assert!(viewer.scheduler().is_pending());
    assert_eq!(viewer.refresh_mut().queued(), 1);

    assert_eq!(refresh(&mut viewer), 1);
    assert!(!viewer.scheduler().is_pending());
    assert_eq!(refresh(&mut viewer), 0);
    assert_eq!(rendered_frames(&viewer), 2);
}

#[test]
fn test_resize_burst_coalesces() {
    let mut viewer = viewer();
    let mut events = EventQueue::new();
    for _ in 0..3 {
        events.push(ViewerEvent::Resized {
            width: 800,
            height: 600,
        });
    }
    assert_eq!(viewer.pump(&mut events), 3);

    assert_eq!(viewer.viewport().aspect_ratio(), 800.0 / 600.0);
    assert_eq!(viewer.backend().viewport, Some(ViewportState::new(800, 600)));
    assert!(viewer.scheduler().is_pending());
    assert_eq!(viewer.refresh_mut().queued(), 1);
}

#[test]
fn test_double_click_recenters() {
    let mut viewer = viewer();
    viewer.backend_mut().hit = Some(Vec3::new(1.0, 2.0, 3.0));

    assert_eq!(viewer.pointer_down(Vec2::new(10.0, 10.0), 0.0), None);
    assert!(!viewer.scheduler().is_pending());

    let target = viewer.pointer_down(Vec2::new(10.0, 10.0), 200.0);
    assert_eq!(target, Some(Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(viewer.controls().target(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(viewer.backend().marker, Some(Vec3::new(1.0, 2.0, 3.0)));
    assert!(viewer.scheduler().is_pending());
}

#[test]
fn test_triple_click_recenters_twice() {
    let mut viewer = viewer();
    viewer.backend_mut().hit = Some(Vec3::new(1.0, 2.0, 3.0));

    let recentered: Vec<bool> = [0.0, 100.0, 200.0]
        .into_iter()
        .map(|t| viewer.pointer_down(Vec2::new(10.0, 10.0), t).is_some())
        .collect();
    assert_eq!(recentered, vec![false, true, true]);
}

#[test]
fn test_slow_clicks_do_not_recenter() {
    let mut viewer = viewer();
    viewer.backend_mut().hit = Some(Vec3::new(1.0, 2.0, 3.0));

    let mut events = EventQueue::new();
    events.push(ViewerEvent::PointerDown {
        position: Vec2::new(10.0, 10.0),
        time_ms: 0.0,
    });
    events.push(ViewerEvent::PointerDown {
        position: Vec2::new(10.0, 10.0),
        time_ms: 500.0,
    });
    viewer.pump(&mut events);

    assert_eq!(viewer.controls().target(), Vec3::ZERO);
    assert_eq!(viewer.backend().marker, None);
    assert!(!viewer.scheduler().is_pending());
}

#[test]
fn test_double_click_miss_requests_nothing() {
    let mut viewer = viewer();
    viewer.pointer_down(Vec2::ZERO, 0.0);
    assert_eq!(viewer.pointer_down(Vec2::ZERO, 100.0), None);
    assert!(!viewer.scheduler().is_pending());
}

#[test]
fn test_overlay_follows_anchor_depth() {
    let mut viewer = viewer();
    viewer.start(800, 600);
    refresh(&mut viewer);

    // Top-centre at z = 1.5 is past the far plane in GL depth
    let beyond = Bounds::new(Vec3::new(-0.1, -0.2, 1.4), Vec3::new(0.1, 0.0, 1.6));
    viewer.backend_mut().bounds = Some(beyond);
    viewer.handle_event(ViewerEvent::ModelLoaded(beyond));
    refresh(&mut viewer);
    let placement = viewer.backend().overlay.unwrap();
    assert!(!placement.visible);

    let inside = Bounds::new(Vec3::new(-0.1, -0.2, -0.1), Vec3::new(0.1, 0.0, 0.1));
    viewer.backend_mut().bounds = Some(inside);
    viewer.request_redraw();
    refresh(&mut viewer);
    let placement = viewer.backend().overlay.unwrap();
    assert!(placement.visible);
    assert_eq!(placement.position, Vec2::new(400.0, 300.0));
}

#[test]
fn test_no_overlay_without_model() {
    let mut viewer = viewer();
    viewer.backend_mut().bounds = Some(Bounds::new(Vec3::ZERO, Vec3::ONE));
    viewer.handle_event(ViewerEvent::ModelLoadFailed("404 Not Found".into()));
    viewer.request_redraw();
    refresh(&mut viewer);

    assert!(!viewer.has_model());
    assert_eq!(viewer.backend().overlay, Some(OverlayPlacement::hidden()));
}

#[test]
fn test_change_notifications_request_redraw() {
    let mut viewer = viewer();
    let mut events = EventQueue::new();
    events.extend([ViewerEvent::ControlsChanged, ViewerEvent::SplatUpdated]);
    viewer.pump(&mut events);
    assert_eq!(viewer.refresh_mut().queued(), 1);
}

#[test]
fn test_loaded_notification_hides_spinner() {
    let mut viewer = viewer();
    viewer.handle_event(ViewerEvent::SplatLoaded {
        total_loaded: 100,
        num_displayed: 100,
    });
    assert_eq!(viewer.backend().spinner_visible, Some(true));

    viewer.handle_event(ViewerEvent::SplatLoaded {
        total_loaded: 600,
        num_displayed: 600,
    });
    assert_eq!(viewer.backend().spinner_visible, Some(false));
    assert_eq!(viewer.progress().total_size, 1000);
}
