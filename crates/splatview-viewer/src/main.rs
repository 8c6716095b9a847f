//! Splatview - native viewer entry point

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Result;
    use clap::Parser;
    use splatview_core::load_config;
    use splatview_viewer::{effective_log_level, log_level, run, url_params, Frontend};
    use std::path::PathBuf;
    use tracing::info;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, reload};

    #[derive(Parser, Debug)]
    #[command(name = "splatview")]
    #[command(about = "Gaussian splat scene viewer with a glTF model overlay")]
    #[command(version)]
    struct Args {
        /// Path to configuration file
        #[arg(short, long, default_value = "splatview.toml")]
        config: PathBuf,

        /// Splat file to display, overrides the configuration
        #[arg(long)]
        splat: Option<String>,

        /// glTF model to display, overrides the configuration
        #[arg(long)]
        model: Option<String>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long)]
        log_level: Option<String>,
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        // Logging comes up before the config file so its loading is visible,
        // then switches to the configured level
        let startup = log_level(args.log_level.as_deref().unwrap_or("info"));
        let (filter, filter_handle) = reload::Layer::new(LevelFilter::from_level(startup));
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()?;

        info!("Splatview v{}", env!("CARGO_PKG_VERSION"));

        let mut config = load_config(&args.config)?;
        let overrides = [("splat", args.splat), ("model", args.model)];
        let rejected = url_params::apply_pairs(
            &mut config,
            overrides
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );
        if let Some(err) = rejected.into_iter().next() {
            return Err(err.into());
        }

        let level = effective_log_level(args.log_level.as_deref(), &config);
        filter_handle.modify(|filter| *filter = LevelFilter::from_level(level))?;

        info!(
            splat = %config.splat.url,
            model = %config.model.url,
            "Configuration loaded"
        );

        run(config, Frontend::Native);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

// The browser build starts from the library's wasm entry point
#[cfg(target_arch = "wasm32")]
fn main() {}
