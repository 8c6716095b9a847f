//! Model tooltip anchored above the model's bounding box

use bevy::prelude::*;
use bevy::transform::TransformSystems;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use splatview_core::OverlayPlacement;

use crate::camera::{clip_from_world, MainCamera, DEPTH_RANGE};
use crate::models::{ModelBounds, ModelState};
use crate::redraw::Viewport;
use crate::ViewerSettings;

/// Where the tooltip goes this frame and what it says
#[derive(Resource, Debug, Clone)]
pub struct TooltipState {
    pub placement: OverlayPlacement,
    pub label: String,
}

impl Default for TooltipState {
    fn default() -> Self {
        Self {
            placement: OverlayPlacement::hidden(),
            label: String::new(),
        }
    }
}

/// Plugin that keeps [`TooltipState`] in sync with the model and camera
pub struct TooltipPlugin {
    /// Also draw the tooltip through egui
    pub draw: bool,
}

impl Plugin for TooltipPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TooltipState>()
            .add_systems(Startup, init_label)
            .add_systems(
                PostUpdate,
                update_tooltip
                    .after(TransformSystems::Propagate)
                    .after(crate::models::update_model_bounds),
            );
        if self.draw {
            app.add_systems(EguiPrimaryContextPass, draw_tooltip);
        }
    }
}

fn init_label(settings: Res<ViewerSettings>, mut tooltip: ResMut<TooltipState>) {
    tooltip.label = settings.0.model.label.clone();
}

/// Project the top-centre of the model bounds to pixels
pub fn update_tooltip(
    state: Res<ModelState>,
    bounds: Res<ModelBounds>,
    cameras: Query<(&Projection, &GlobalTransform), With<MainCamera>>,
    viewport: Res<Viewport>,
    mut tooltip: ResMut<TooltipState>,
) {
    let placement = match (state.has_model(), bounds.0, cameras.single()) {
        (true, Some(bounds), Ok((projection, transform))) => OverlayPlacement::for_bounds(
            &bounds,
            &clip_from_world(projection, transform),
            &viewport.0,
            DEPTH_RANGE,
        ),
        _ => OverlayPlacement::hidden(),
    };
    if tooltip.placement != placement {
        tooltip.placement = placement;
    }
}

fn draw_tooltip(mut contexts: EguiContexts, tooltip: Res<TooltipState>) {
    if !tooltip.placement.visible {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let anchor = tooltip.placement.position;
    // Centred horizontally, bottom edge on the anchor
    egui::Area::new(egui::Id::new("model_tooltip"))
        .fixed_pos(egui::pos2(anchor.x, anchor.y))
        .pivot(egui::Align2::CENTER_BOTTOM)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(&tooltip.label);
            });
        });
}
