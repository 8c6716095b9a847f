//! Browser page integration: rendering-context check, tooltip element and
//! loading spinner

use bevy::prelude::*;
use splatview_core::{LoadProgress, OverlayPlacement};

pub const TOOLTIP_ID: &str = "splatview-tooltip";
pub const SPINNER_ID: &str = "spinner";

/// Inline style of the tooltip element. The transform puts its bottom centre
/// on the anchor.
pub const TOOLTIP_STYLE: [(&str, &str); 8] = [
    ("position", "absolute"),
    ("padding", "4px 8px"),
    ("background", "rgba(0,0,0,0.7)"),
    ("color", "white"),
    ("border-radius", "4px"),
    ("pointer-events", "none"),
    ("transform", "translate(-50%, -100%)"),
    ("display", "none"),
];

/// `left`, `top` and `display` for a tooltip placement
pub fn tooltip_position(placement: &OverlayPlacement) -> [(&'static str, String); 3] {
    [
        ("left", format!("{}px", placement.position.x)),
        ("top", format!("{}px", placement.position.y)),
        ("display", display_value(placement.visible).to_string()),
    ]
}

/// Spinner CSS `display` for the current progress
pub fn spinner_display(progress: &LoadProgress) -> &'static str {
    display_value(progress.spinner_visible())
}

fn display_value(visible: bool) -> &'static str {
    if visible {
        "block"
    } else {
        "none"
    }
}

/// Plugin mirroring tooltip and load state into the page
pub struct DomOverlayPlugin;

impl Plugin for DomOverlayPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, web::create_tooltip)
            .add_systems(
                PostUpdate,
                web::sync_tooltip.after(splatview_scene::ui::update_tooltip),
            )
            .add_systems(Update, web::sync_spinner);
        #[cfg(not(target_arch = "wasm32"))]
        let _ = app;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{alert, check_rendering_context};

#[cfg(target_arch = "wasm32")]
mod web {
    use bevy::prelude::*;
    use splatview_core::ViewerError;
    use splatview_scene::{SplatLayer, SplatLoaded, TooltipState, ViewerSettings};
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Document, HtmlCanvasElement, HtmlElement};

    use super::*;

    fn document() -> Option<Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn element(id: &str) -> Option<HtmlElement> {
        document()?.get_element_by_id(id)?.dyn_into().ok()
    }

    fn set_styles<'a>(
        element: &HtmlElement,
        styles: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), JsValue> {
        let style = element.style();
        for (property, value) in styles {
            style.set_property(property, value)?;
        }
        Ok(())
    }

    pub fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    /// Fail unless the page can give us a context for one of the enabled backends
    pub fn check_rendering_context() -> Result<(), ViewerError> {
        let window = web_sys::window()
            .ok_or_else(|| ViewerError::UnsupportedContext("no browser window".to_string()))?;

        if cfg!(feature = "webgpu")
            && js_sys::Reflect::has(&window.navigator(), &JsValue::from_str("gpu")).unwrap_or(false)
        {
            return Ok(());
        }

        if cfg!(feature = "webgl2") {
            // Probe with a scratch canvas so the viewer canvas keeps its context free
            let webgl2 = window
                .document()
                .and_then(|doc| doc.create_element("canvas").ok())
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
                .and_then(|canvas| canvas.get_context("webgl2").ok().flatten())
                .is_some();
            if webgl2 {
                return Ok(());
            }
            return Err(ViewerError::UnsupportedContext(
                "WebGL2 not supported in this browser".to_string(),
            ));
        }

        Err(ViewerError::UnsupportedContext(
            "WebGPU not supported in this browser".to_string(),
        ))
    }

    pub(super) fn create_tooltip(settings: Res<ViewerSettings>) {
        let Some(doc) = document() else { return };
        let Some(el) = doc
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        el.set_id(TOOLTIP_ID);
        el.set_inner_text(&settings.0.model.label);
        if let Err(err) = set_styles(&el, TOOLTIP_STYLE) {
            tracing::warn!("Failed to style tooltip: {:?}", err);
        }
        if let Some(body) = doc.body() {
            let _ = body.append_child(&el);
        }
    }

    pub(super) fn sync_tooltip(tooltip: Res<TooltipState>) {
        if !tooltip.is_changed() {
            return;
        }
        let Some(el) = element(TOOLTIP_ID) else { return };
        let position = tooltip_position(&tooltip.placement);
        let styles = position.iter().map(|(p, v)| (*p, v.as_str()));
        if let Err(err) = set_styles(&el, styles) {
            tracing::warn!("Failed to move tooltip: {:?}", err);
        }
    }

    pub(super) fn sync_spinner(mut loaded: MessageReader<SplatLoaded>, layer: Res<SplatLayer>) {
        let failed = layer.is_changed() && layer.failed;
        if loaded.read().count() == 0 && !failed {
            return;
        }
        let Some(spinner) = element(SPINNER_ID) else { return };
        let display = if layer.failed {
            "none"
        } else {
            spinner_display(&layer.progress)
        };
        let _ = set_styles(&spinner, [("display", display)]);
    }
}
