//! Viewer configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!     "seed": 7,
//!     "particle_count": 20000,
//!     "camera": { "far": 2000.0 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Hsl;
use crate::error::ConfigError;
use crate::material::BlendMode;

/// Camera and viewport settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Starting camera position.
    pub position: [f32; 3],
    /// Point on the XY plane the camera eases towards every frame.
    pub drift_target: [f32; 2],
    /// Fraction of the remaining distance to the drift target covered per frame.
    pub drift_factor: f32,
    /// Orbit-control damping factor.
    pub damping_factor: f32,
    /// Upper bound on the device pixel ratio used for rendering.
    pub max_pixel_ratio: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [1.0, 1.0, 100.0],
            drift_target: [0.0, 0.0],
            drift_factor: 0.5,
            damping_factor: 0.05,
            max_pixel_ratio: 2.0,
        }
    }
}

fn default_blending() -> BlendMode {
    BlendMode::Additive
}

/// One particle group: base color, sprite, and point size.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupConfig {
    pub color: Hsl,
    pub texture: PathBuf,
    pub size: f32,
    #[serde(default = "default_blending")]
    pub blending: BlendMode,
}

impl GroupConfig {
    pub fn new(color: [f32; 3], texture: impl Into<PathBuf>, size: f32) -> Self {
        Self {
            color: color.into(),
            texture: texture.into(),
            size,
            blending: default_blending(),
        }
    }
}

fn default_groups() -> Vec<GroupConfig> {
    vec![
        GroupConfig::new([1.0, 0.2, 0.5], "textures/snowflake2.png", 20.0),
        GroupConfig::new([0.95, 0.1, 0.5], "textures/snowflake3.png", 15.0),
        GroupConfig::new([0.90, 0.05, 0.5], "textures/snowflake1.png", 10.0),
        GroupConfig::new([0.85, 0.0, 0.5], "textures/snowflake5.png", 8.0),
        GroupConfig::new([0.80, 0.0, 0.5], "textures/snowflake4.png", 5.0),
    ]
}

/// Complete viewer configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnowfieldConfig {
    pub title: String,
    /// Initial window width in logical pixels.
    pub width: u32,
    /// Initial window height in logical pixels.
    pub height: u32,
    /// Seed for particle placement. Random when absent.
    pub seed: Option<u64>,
    pub particle_count: usize,
    /// Half-size of the cube particles are scattered in.
    pub extent: f32,
    pub camera: CameraConfig,
    pub groups: Vec<GroupConfig>,
    /// Hue turns per second.
    pub hue_speed: f32,
    /// Base spin rate in radians per second, scaled per group.
    pub rotation_speed: f32,
    /// Whether sprites start textured.
    pub textures_enabled: bool,
}

impl Default for SnowfieldConfig {
    fn default() -> Self {
        Self {
            title: "Snowfield".to_string(),
            width: 1280,
            height: 720,
            seed: None,
            particle_count: 10_000,
            extent: 1000.0,
            camera: CameraConfig::default(),
            groups: default_groups(),
            hue_speed: 0.05,
            rotation_speed: 0.05,
            textures_enabled: true,
        }
    }
}

impl SnowfieldConfig {
    /// Read and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the viewer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(msg.into()))
        }

        if self.width == 0 || self.height == 0 {
            return invalid(format!("window size {}x{} must be non-zero", self.width, self.height));
        }
        if self.particle_count == 0 {
            return invalid("particle_count must be at least 1");
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return invalid(format!("extent must be positive, got {}", self.extent));
        }
        if self.groups.is_empty() {
            return invalid("at least one particle group is required");
        }
        if let Some(i) = self.groups.iter().position(|g| !(g.size > 0.0)) {
            return invalid(format!("group {i} has non-positive size {}", self.groups[i].size));
        }

        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return invalid(format!("fov_degrees must be in (0, 180), got {}", cam.fov_degrees));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return invalid(format!("clip planes must satisfy 0 < near < far, got {} and {}", cam.near, cam.far));
        }
        if !(cam.max_pixel_ratio > 0.0) {
            return invalid("max_pixel_ratio must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SnowfieldConfig::default();
        config.validate().unwrap();
        assert_eq!(config.groups.len(), 5);
        assert_eq!(config.particle_count, 10_000);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SnowfieldConfig::from_json_str(r#"{ "seed": 7, "camera": { "far": 2000.0 } }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.camera.far, 2000.0);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.groups, default_groups());
    }

    #[test]
    fn test_group_blending_defaults_to_additive() {
        let config = SnowfieldConfig::from_json_str(
            r#"{ "groups": [ { "color": [0.5, 0.5, 0.5], "texture": "a.png", "size": 3.0 } ] }"#,
        )
        .unwrap();
        assert_eq!(config.groups[0].blending, BlendMode::Additive);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            r#"{ "particle_count": 0 }"#,
            r#"{ "extent": -1.0 }"#,
            r#"{ "groups": [] }"#,
            r#"{ "width": 0 }"#,
            r#"{ "camera": { "near": 10.0, "far": 1.0 } }"#,
            r#"{ "groups": [ { "color": [0, 0, 0], "texture": "a.png", "size": 0 } ] }"#,
        ];
        for json in cases {
            assert!(
                matches!(SnowfieldConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SnowfieldConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
