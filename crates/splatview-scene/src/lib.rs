//! Splatview Scene - Bevy integration of the splat viewer
//!
//! This crate binds the engine-independent pieces of `splatview-core` to
//! Bevy: redraw coalescing on top of reactive winit updates, orbit camera,
//! scene setup, glTF model tracking, the splat point layer, double-click
//! recentering and the model tooltip.

pub mod camera;
pub mod interaction;
pub mod models;
pub mod redraw;
pub mod scene;
pub mod splat;
pub mod ui;

use bevy::prelude::*;
use splatview_core::ViewerConfig;

/// Viewer configuration shared by all plugins
#[derive(Debug, Clone, Resource, Default)]
pub struct ViewerSettings(pub ViewerConfig);

/// Plugin that sets up the shared 3D scene components
pub struct SplatViewScenePlugin {
    pub config: ViewerConfig,
    /// Draw the tooltip with egui. Browser builds use a DOM element instead.
    pub draw_tooltip: bool,
}

impl Plugin for SplatViewScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ViewerSettings(self.config.clone()))
            .add_plugins(redraw::RedrawPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(splat::SplatPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(ui::TooltipPlugin {
                draw: self.draw_tooltip,
            });
    }
}

// Re-export commonly used types
pub use camera::{MainCamera, OrbitCamera};
pub use models::ModelState;
pub use redraw::{FrameScheduler, NeedsRedraw, Viewport};
pub use splat::{SplatLayer, SplatLoaded};
pub use ui::TooltipState;
