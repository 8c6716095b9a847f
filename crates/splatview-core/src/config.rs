//! Viewer configuration
//!
//! Loaded from a TOML file on native builds and adjusted from URL query
//! parameters in the browser. Every section has defaults matching the demo
//! scene, so an empty file is a valid configuration.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::splat::{SplatEffect, LUMA_WEIGHTS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewerConfig {
    #[serde(default)]
    pub splat: SplatConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplatConfig {
    /// Path or URL of the `.splat` file
    #[serde(default = "default_splat_url")]
    pub url: String,
    /// Rotation about X applied to the whole cloud, in degrees
    #[serde(default = "default_rotation_x")]
    pub rotation_x_deg: f32,
    /// Grayscale weights; `None` keeps the original colours
    #[serde(default = "default_color_weights")]
    pub color_weights: Option<[f32; 3]>,
    /// Clip sphere radius around the origin; `None` disables clipping
    #[serde(default = "default_clip_radius")]
    pub clip_radius: Option<f32>,
    /// How close to a splat centre a double-click must land, in pixels
    #[serde(default = "default_pick_radius")]
    pub pick_radius_px: f32,
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            url: default_splat_url(),
            rotation_x_deg: default_rotation_x(),
            color_weights: default_color_weights(),
            clip_radius: default_clip_radius(),
            pick_radius_px: default_pick_radius(),
        }
    }
}

fn default_splat_url() -> String {
    "scene.splat".to_string()
}

fn default_rotation_x() -> f32 {
    130.0
}

fn default_color_weights() -> Option<[f32; 3]> {
    Some(LUMA_WEIGHTS)
}

fn default_clip_radius() -> Option<f32> {
    Some(10.0)
}

fn default_pick_radius() -> f32 {
    6.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path or URL of the glTF binary
    #[serde(default = "default_model_url")]
    pub url: String,
    /// Tooltip text shown above the model
    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            label: default_label(),
        }
    }
}

fn default_model_url() -> String {
    "wasl.glb".to_string()
}

fn default_label() -> String {
    "WASL Model".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_deg: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
        }
    }
}

fn default_fov() -> f32 {
    50.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_position() -> [f32; 3] {
    [3.0, 3.0, 3.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_true")]
    pub enable_damping: bool,
    /// Fraction of the remaining motion applied per 60 Hz frame
    #[serde(default = "default_damping_factor")]
    pub damping_factor: f32,
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: default_damping_factor(),
            rotate_speed: default_rotate_speed(),
            zoom_speed: default_zoom_speed(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_damping_factor() -> f32 {
    0.25
}

fn default_rotate_speed() -> f32 {
    0.5
}

fn default_zoom_speed() -> f32 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Grid edge length in world units
    #[serde(default = "default_grid_size")]
    pub grid_size: f32,
    #[serde(default = "default_grid_divisions")]
    pub grid_divisions: u32,
    /// Height of the grid plane
    #[serde(default = "default_grid_height")]
    pub grid_height: f32,
    /// Radius of the orbit target marker ball
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            grid_divisions: default_grid_divisions(),
            grid_height: default_grid_height(),
            marker_radius: default_marker_radius(),
        }
    }
}

fn default_grid_size() -> f32 {
    10.0
}

fn default_grid_divisions() -> u32 {
    10
}

fn default_grid_height() -> f32 {
    -1.0
}

fn default_marker_radius() -> f32 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl ViewerConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply a single `key=value` override, as found in a page URL.
    ///
    /// Recognised keys: `splat`, `model`, `label`, `fov`, `log`. Unknown keys
    /// are ignored and reported as `false`.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "splat" => self.splat.url = value.to_string(),
            "model" => self.model.url = value.to_string(),
            "label" => self.model.label = value.to_string(),
            "fov" => {
                let fov: f32 = value.parse().map_err(|_| invalid())?;
                if !(fov > 0.0 && fov < 180.0) {
                    return Err(invalid());
                }
                self.camera.fov_deg = fov;
            }
            "log" => match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    self.log.level = value.to_lowercase()
                }
                _ => return Err(invalid()),
            },
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Colour and clip settings for the splat layer
    pub fn splat_effect(&self) -> SplatEffect {
        SplatEffect {
            color_weights: self.splat.color_weights,
            clip_radius: self.splat.clip_radius,
        }
    }

    /// World placement of the splat cloud
    pub fn splat_transform(&self) -> Mat4 {
        Mat4::from_rotation_x(self.splat.rotation_x_deg.to_radians())
    }

    pub fn camera_position(&self) -> Vec3 {
        Vec3::from(self.camera.position)
    }
}

/// Load configuration from file, falling back to defaults if it is missing
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = ViewerConfig::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ViewerConfig::from_toml("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.model.label, "WASL Model");
        assert_eq!(config.camera.fov_deg, 50.0);
        assert_eq!(config.controls.damping_factor, 0.25);
        assert_eq!(config.splat_effect(), SplatEffect::default());
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
[splat]
url = "garden.splat"
clip_radius = 25.0

[camera]
position = [0.0, 2.0, 8.0]
"#;
        let config = ViewerConfig::from_toml(toml).unwrap();
        assert_eq!(config.splat.url, "garden.splat");
        assert_eq!(config.splat.clip_radius, Some(25.0));
        assert_eq!(config.splat.rotation_x_deg, 130.0);
        assert_eq!(config.camera_position(), Vec3::new(0.0, 2.0, 8.0));
        assert_eq!(config.camera.far, 1000.0);
    }

    #[test]
    fn test_query_overrides() {
        let mut config = ViewerConfig::default();
        assert!(config.apply_override("model", "models/bike.glb").unwrap());
        assert!(config.apply_override("fov", "70").unwrap());
        assert!(config.apply_override("log", "DEBUG").unwrap());
        assert!(!config.apply_override("unknown", "x").unwrap());
        assert_eq!(config.model.url, "models/bike.glb");
        assert_eq!(config.camera.fov_deg, 70.0);
        assert_eq!(config.log.level, "debug");

        assert!(matches!(
            config.apply_override("fov", "wide"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.apply_override("fov", "270").is_err());
        assert!(config.apply_override("log", "loud").is_err());
    }

    #[test]
    fn test_load_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("splatview.toml");

        // Missing file falls back to defaults
        assert_eq!(load_config(&path).unwrap(), ViewerConfig::default());

        std::fs::write(&path, "[model]\nlabel = \"Bike\"\n").unwrap();
        assert_eq!(load_config(&path).unwrap().model.label, "Bike");

        std::fs::write(&path, "[model\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_splat_transform_rotates_about_x() {
        let config = ViewerConfig::default();
        let p = config.splat_transform().transform_point3(Vec3::X);
        assert!(p.distance(Vec3::X) < 1e-6);
    }
}
