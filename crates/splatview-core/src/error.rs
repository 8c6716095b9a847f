//! Top-level viewer errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::splat::SplatError;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// The browser or platform cannot create the rendering context we need.
    /// Fatal: startup stops after the user is notified.
    #[error("Rendering context not supported: {0}")]
    UnsupportedContext(String),
    /// The mesh model failed to load. The viewer keeps running without it.
    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },
    #[error("Splat error: {0}")]
    Splat(#[from] SplatError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ViewerError {
    /// Whether this error must stop the viewer
    pub fn is_fatal(&self) -> bool {
        matches!(self, ViewerError::UnsupportedContext(_) | ViewerError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ViewerError::UnsupportedContext("webgl2".into()).is_fatal());
        let load = ViewerError::ModelLoad {
            path: "./wasl.glb".into(),
            reason: "404".into(),
        };
        assert!(!load.is_fatal());
        assert_eq!(load.to_string(), "Failed to load model ./wasl.glb: 404");
        assert!(!ViewerError::Splat(SplatError::Empty).is_fatal());
    }
}
