//! Splatview Core - Engine-independent viewer state and scheduling
//!
//! This crate provides the pieces of the splat viewer that do not depend on a
//! rendering engine:
//! - Render-on-demand scheduling with redraw coalescing
//! - Viewport state and resize handling
//! - Double-click detection for recentering the orbit camera
//! - Screen-space projection of the model tooltip anchor
//! - Splat cloud parsing, effects, clipping and hit-testing
//! - Viewer configuration

pub mod config;
pub mod error;
pub mod events;
pub mod interaction;
pub mod overlay;
pub mod progress;
pub mod scheduler;
pub mod splat;
pub mod viewer;
pub mod viewport;

pub use config::{load_config, ConfigError, ViewerConfig};
pub use error::ViewerError;
pub use events::{EventQueue, EventSource, ViewerEvent};
pub use interaction::{ClickOutcome, DoubleClick, DOUBLE_CLICK_THRESHOLD_MS};
pub use overlay::{Bounds, DepthRange, OverlayPlacement};
pub use progress::LoadProgress;
pub use scheduler::{ManualRefresh, RedrawScheduler, RefreshSource};
pub use splat::{Splat, SplatCloud, SplatEffect, SplatError};
pub use viewer::{OrbitControls, Viewer, ViewerBackend};
pub use viewport::ViewportState;
