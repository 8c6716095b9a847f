//! Render-on-demand scheduling on top of reactive winit updates
//!
//! Systems that want a new frame write [`NeedsRedraw`]. Once per update the
//! requests are folded into the core [`RedrawScheduler`], which writes a
//! single [`RequestRedraw`] only when no frame is pending. The pending flag is
//! cleared in `First`, before anything of the frame runs, so requests made
//! while the frame is being produced schedule the next one.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, RequestRedraw, WindowResized};
use splatview_core::{RedrawScheduler, ViewportState};

/// A redraw request from any event source
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct NeedsRedraw;

/// Per-viewer redraw scheduler
#[derive(Resource, Debug, Default)]
pub struct FrameScheduler(pub RedrawScheduler);

/// Current window size in logical pixels
#[derive(Resource, Debug, Default)]
pub struct Viewport(pub ViewportState);

pub struct RedrawPlugin;

impl Plugin for RedrawPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<NeedsRedraw>()
            .add_message::<RequestRedraw>()
            .add_message::<WindowResized>()
            .init_resource::<FrameScheduler>()
            .init_resource::<Viewport>()
            .add_systems(Startup, init_viewport)
            .add_systems(First, begin_frame)
            .add_systems(PreUpdate, handle_resize)
            .add_systems(Last, flush_redraw_requests);
    }
}

fn init_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
    mut redraw: MessageWriter<NeedsRedraw>,
) {
    if let Ok(window) = windows.single() {
        viewport.0.resize(window.width() as u32, window.height() as u32);
    }
    redraw.write(NeedsRedraw);
}

fn begin_frame(mut scheduler: ResMut<FrameScheduler>) {
    scheduler.0.begin_frame();
}

/// Track window size. The camera aspect and the surface follow the window
/// inside Bevy; this only keeps the viewport used for projection and picking.
fn handle_resize(
    mut resized: MessageReader<WindowResized>,
    mut viewport: ResMut<Viewport>,
    mut redraw: MessageWriter<NeedsRedraw>,
) {
    for event in resized.read() {
        viewport.0.resize(event.width as u32, event.height as u32);
        tracing::debug!(
            width = event.width,
            height = event.height,
            "Window resized"
        );
        redraw.write(NeedsRedraw);
    }
}

fn flush_redraw_requests(
    mut requests: MessageReader<NeedsRedraw>,
    mut scheduler: ResMut<FrameScheduler>,
    mut redraw: MessageWriter<RequestRedraw>,
) {
    if requests.read().count() == 0 {
        return;
    }
    scheduler.0.request_redraw_with(|| {
        redraw.write(RequestRedraw);
    });
}
