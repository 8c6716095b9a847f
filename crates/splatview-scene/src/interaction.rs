//! Double-click recentering of the orbit target

use bevy::input::mouse::MouseButtonInput;
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use splatview_core::{ClickOutcome, DoubleClick, OrbitControls};

use crate::camera::{clip_from_world, MainCamera, OrbitCamera};
use crate::redraw::{NeedsRedraw, Viewport};
use crate::scene::TargetMarker;
use crate::splat::SplatLayer;
use crate::ViewerSettings;

/// Double-click detector state
#[derive(Resource, Debug, Default)]
pub struct ClickState(pub DoubleClick);

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClickState>()
            .add_systems(Update, handle_pointer_down);
    }
}

/// Screen positions of this frame's pointer-down events
fn pointer_presses(
    mouse: &mut MessageReader<MouseButtonInput>,
    touches: &mut MessageReader<TouchInput>,
    cursor: Option<Vec2>,
) -> Vec<Vec2> {
    let mut presses = Vec::new();
    for event in mouse.read() {
        if event.button == MouseButton::Left && event.state == ButtonState::Pressed {
            if let Some(position) = cursor {
                presses.push(position);
            }
        }
    }
    for event in touches.read() {
        if event.phase == TouchPhase::Started {
            presses.push(event.position);
        }
    }
    presses
}

#[allow(clippy::too_many_arguments)]
fn handle_pointer_down(
    mut mouse: MessageReader<MouseButtonInput>,
    mut touches: MessageReader<TouchInput>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Projection, &GlobalTransform), With<MainCamera>>,
    mut markers: Query<&mut Transform, With<TargetMarker>>,
    mut click: ResMut<ClickState>,
    mut orbit: ResMut<OrbitCamera>,
    layer: Res<SplatLayer>,
    viewport: Res<Viewport>,
    settings: Res<ViewerSettings>,
    time: Res<Time<Real>>,
    mut redraw: MessageWriter<NeedsRedraw>,
) {
    let cursor = windows.single().ok().and_then(|w| w.cursor_position());
    let presses = pointer_presses(&mut mouse, &mut touches, cursor);
    if presses.is_empty() {
        return;
    }
    let now_ms = time.elapsed_secs_f64() * 1000.0;

    for position in presses {
        if click.0.pointer_down(now_ms) != ClickOutcome::DoubleClick {
            continue;
        }

        let Ok((projection, camera_transform)) = cameras.single() else {
            continue;
        };
        let hit = layer.hit_test(
            &clip_from_world(projection, camera_transform),
            &viewport.0,
            position,
            settings.0.splat.pick_radius_px,
        );

        if let Some(target) = hit {
            tracing::debug!(x = target.x, y = target.y, z = target.z, "Recentering orbit");
            orbit.set_target(target);
            for mut transform in markers.iter_mut() {
                transform.translation = target;
            }
            redraw.write(NeedsRedraw);
        }
    }
}
