//! Bevy application setup

use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::winit::WinitSettings;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use splatview_core::ViewerConfig;
use splatview_scene::SplatViewScenePlugin;

use crate::dom::DomOverlayPlugin;

/// Where the viewer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    /// Canvas in a web page; tooltip and spinner are DOM elements
    Browser,
    /// Desktop window; tooltip drawn with egui
    Native,
}

/// Run the Bevy application
pub fn run(config: ViewerConfig, frontend: Frontend) {
    let asset_plugin = match frontend {
        // Load assets relative to the page, the server has no .meta files
        Frontend::Browser => AssetPlugin {
            file_path: "".to_string(),
            meta_check: AssetMetaCheck::Never,
            ..default()
        },
        Frontend::Native => AssetPlugin {
            meta_check: AssetMetaCheck::Never,
            ..default()
        },
    };

    let mut app = App::new();
    app.insert_resource(ClearColor(Color::BLACK))
        // Reactive updates: a frame runs only when something requests a redraw
        .insert_resource(WinitSettings::desktop_app())
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Splatview".to_string(),
                        canvas: Some("#viewer-canvas".to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(asset_plugin),
        );

    match frontend {
        Frontend::Browser => {
            app.add_plugins(DomOverlayPlugin);
        }
        Frontend::Native => {
            // bevy_egui looks for PickingPlugin, add it before EguiPlugin
            app.add_plugins(DefaultPickingPlugins)
                .add_plugins(EguiPlugin::default());
        }
    }

    tracing::info!(
        splat = %config.splat.url,
        model = %config.model.url,
        ?frontend,
        "Starting viewer"
    );
    app.add_plugins(SplatViewScenePlugin {
        config,
        draw_tooltip: frontend == Frontend::Native,
    })
    .run();
}
