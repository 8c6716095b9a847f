//! Camera controls and orbit navigation

use bevy::camera::CameraProjection;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use splatview_core::config::{CameraConfig, ControlsConfig};
use splatview_core::{DepthRange, OrbitControls};
use std::f32::consts::TAU;

use crate::redraw::{NeedsRedraw, Viewport};
use crate::ViewerSettings;

/// Motion below this is treated as settled
const SETTLE_EPSILON: f32 = 1e-4;

/// Bevy perspective projections use reverse-Z with depth in 0..1
pub const DEPTH_RANGE: DepthRange = DepthRange::ZeroToOne;

/// Orbit controller state (Y up)
#[derive(Debug, Clone, Resource)]
pub struct OrbitCamera {
    pub distance: f32,
    pub target_distance: f32, // For smooth zoom
    pub azimuth: f32,
    pub target_azimuth: f32,
    pub elevation: f32,
    pub target_elevation: f32,
    /// Current pivot
    pub target: Vec3,
    /// Pivot being approached, set by recentering
    pub target_focus: Vec3,
    /// Radians per pixel of vertical drag is `TAU / height * rotate_speed`
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Per-60Hz-frame approach factor; 1.0 disables damping
    pub smooth_factor: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), &ControlsConfig::default())
    }
}

impl OrbitCamera {
    /// Orbit around the origin from the configured camera position
    pub fn from_config(camera: &CameraConfig, controls: &ControlsConfig) -> Self {
        let offset = Vec3::from(camera.position);
        let distance = offset.length().max(0.01);
        let azimuth = offset.z.atan2(offset.x);
        let elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
        Self {
            distance,
            target_distance: distance,
            azimuth,
            target_azimuth: azimuth,
            elevation,
            target_elevation: elevation,
            target: Vec3::ZERO,
            target_focus: Vec3::ZERO,
            rotate_speed: controls.rotate_speed,
            zoom_speed: controls.zoom_speed,
            smooth_factor: if controls.enable_damping {
                controls.damping_factor
            } else {
                1.0
            },
        }
    }

    /// Camera position for the current orbit state
    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.azimuth.cos() * self.elevation.cos();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.azimuth.sin() * self.elevation.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Apply a drag of `delta` pixels in a viewport `height` pixels tall
    pub fn rotate(&mut self, delta: Vec2, height: f32) {
        let per_pixel = TAU / height.max(1.0) * self.rotate_speed;
        self.target_azimuth += delta.x * per_pixel;
        self.target_elevation = (self.target_elevation + delta.y * per_pixel).clamp(-1.5, 1.5);
    }

    /// Zoom by scroll amount; positive scrolls in
    pub fn zoom(&mut self, scroll: f32) {
        let zoom_factor = 1.0 - scroll * self.zoom_speed;
        self.target_distance = (self.target_distance * zoom_factor).clamp(0.1, 500.0);
    }

    fn lerp_factor(&self, dt: f32) -> f32 {
        if self.smooth_factor >= 1.0 {
            1.0
        } else {
            1.0 - (1.0 - self.smooth_factor).powf(60.0 * dt)
        }
    }
}

impl OrbitControls for OrbitCamera {
    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target_focus = target;
    }

    fn update(&mut self, dt: f32) -> bool {
        let t = self.lerp_factor(dt);
        let before = (self.eye(), self.target);

        self.distance += (self.target_distance - self.distance) * t;
        self.azimuth += (self.target_azimuth - self.azimuth) * t;
        self.elevation += (self.target_elevation - self.elevation) * t;
        self.target += (self.target_focus - self.target) * t;

        // Snap once settled so damping stops requesting frames
        if (self.target_distance - self.distance).abs() < SETTLE_EPSILON
            && (self.target_azimuth - self.azimuth).abs() < SETTLE_EPSILON
            && (self.target_elevation - self.elevation).abs() < SETTLE_EPSILON
            && self.target.distance(self.target_focus) < SETTLE_EPSILON
        {
            self.distance = self.target_distance;
            self.azimuth = self.target_azimuth;
            self.elevation = self.target_elevation;
            self.target = self.target_focus;
        }

        before.0 != self.eye() || before.1 != self.target
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Clip-from-world matrix of a camera. Bevy keeps the projection's aspect
/// ratio in step with the render target.
pub fn clip_from_world(projection: &Projection, transform: &GlobalTransform) -> Mat4 {
    projection.get_clip_from_view() * Mat4::from(transform.affine()).inverse()
}

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, init_orbit)
            .add_systems(Update, update_camera);
    }
}

fn init_orbit(mut commands: Commands, settings: Res<ViewerSettings>) {
    commands.insert_resource(OrbitCamera::from_config(
        &settings.0.camera,
        &settings.0.controls,
    ));
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut orbit: ResMut<OrbitCamera>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    viewport: Res<Viewport>,
    time: Res<Time>,
    mut redraw: MessageWriter<NeedsRedraw>,
) {
    let height = viewport.0.height() as f32;
    let mut changed = false;

    // Collect mouse motion delta
    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    if total_motion != Vec2::ZERO {
        // Orbit with left mouse drag
        if mouse_button.pressed(MouseButton::Left) {
            orbit.rotate(total_motion, height);
            changed = true;
        }

        // Pan with right mouse drag in the camera plane
        if mouse_button.pressed(MouseButton::Right) {
            if let Ok(transform) = camera_query.single() {
                let pan_speed = orbit.distance * 0.002;
                let pan = (-transform.right() * total_motion.x + transform.up() * total_motion.y)
                    * pan_speed;
                orbit.target_focus += pan;
                changed = true;
            }
        }
    }

    for scroll in mouse_wheel.read() {
        orbit.zoom(scroll.y.signum());
        changed = true;
    }

    // Single finger orbits
    if touch_input.iter().count() == 1 {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                orbit.rotate(delta, height);
                changed = true;
            }
        }
    }

    // Pinch to zoom
    if touch_input.iter().count() == 2 {
        let touches: Vec<_> = touch_input.iter().collect();
        if let (Some(t1), Some(t2)) = (touches.first(), touches.get(1)) {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            if curr_dist != prev_dist {
                let zoom_factor = prev_dist / curr_dist.max(1.0);
                orbit.target_distance = (orbit.target_distance * zoom_factor).clamp(0.1, 500.0);
                changed = true;
            }
        }
    }

    // Damping keeps moving after input stops
    let moved = orbit.update(time.delta_secs());

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = orbit.eye();
        transform.look_at(orbit.target, Vec3::Y);
    }

    if changed || moved {
        redraw.write(NeedsRedraw);
    }
}
