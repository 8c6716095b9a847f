//! Splatview Viewer - Gaussian splat scene with a glTF model overlay
//!
//! Runs in the browser as a WASM module or natively as the `splatview`
//! binary. Rendering is on demand: nothing is drawn until input, a resize or
//! an asset load asks for a frame.

mod app;
pub mod dom;
pub mod url_params;

pub use app::{run, Frontend};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Parse a configured log level, falling back to WARN
pub fn log_level(level: &str) -> tracing::Level {
    level.parse().unwrap_or(tracing::Level::WARN)
}

/// Level for a native run. The command line wins over the `[log]` section.
pub fn effective_log_level(
    cli: Option<&str>,
    config: &splatview_core::ViewerConfig,
) -> tracing::Level {
    log_level(cli.unwrap_or(&config.log.level))
}

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    let mut config = splatview_core::ViewerConfig::default();
    let rejected = url_params::apply_page_params(&mut config);

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(log_level(&config.log.level))
            .build(),
    );
    for err in rejected {
        tracing::warn!("Ignoring URL parameter: {}", err);
    }

    if let Err(err) = dom::check_rendering_context() {
        tracing::error!("{}", err);
        dom::alert(&err.to_string());
        return;
    }

    app::run(config, Frontend::Browser);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(log_level("debug"), tracing::Level::DEBUG);
        assert_eq!(log_level("ERROR"), tracing::Level::ERROR);
        assert_eq!(log_level("loud"), tracing::Level::WARN);
    }

    #[test]
    fn test_config_log_level_applies_without_flag() {
        let mut config = splatview_core::ViewerConfig::default();
        config.log.level = "debug".to_string();
        assert_eq!(effective_log_level(None, &config), tracing::Level::DEBUG);
        assert_eq!(
            effective_log_level(Some("error"), &config),
            tracing::Level::ERROR
        );
    }
}
