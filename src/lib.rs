//! # Snowfield
//!
//! An animated field of snowflake point sprites rendered with wgpu.
//!
//! Ten thousand points are scattered through a cube once at startup and shared
//! by five particle groups. Each group draws the same points with its own
//! sprite, size and color, spins at its own rate, and slowly cycles its hue.
//!
//! ## Quick Start
//!
//! ```ignore
//! use snowfield::prelude::*;
//!
//! fn main() -> Result<(), RunError> {
//!     Snowfield::new()
//!         .with_particle_count(10_000)
//!         .with_seed(7)
//!         .run()
//! }
//! ```
//!
//! ## Headless use
//!
//! All per-frame rules live on [`Scene`], which has no GPU dependency:
//!
//! ```ignore
//! use rand::{rngs::StdRng, SeedableRng};
//! use snowfield::prelude::*;
//!
//! let config = SnowfieldConfig::default();
//! let mut textures = TextureRegistry::new();
//! let mut rng = StdRng::seed_from_u64(1);
//! let viewport = Viewport::new(800, 600, 1.0, 2.0);
//! let mut scene = Scene::new(&config, viewport, &mut textures, &mut rng)?;
//!
//! scene.update(1.5);
//! scene.set_textures_enabled(false);
//! scene.resize(1024, 768, 1.0);
//! ```
//!
//! ## Features
//!
//! - `egui` (default): the debug panel with the texture toggle.

mod app;
pub mod camera;
pub mod color;
pub mod config;
mod error;
mod gpu;
#[cfg(feature = "egui")]
mod gui;
pub mod material;
pub mod scene;
pub mod spawn;
pub mod textures;
pub mod time;

pub use app::Snowfield;
pub use camera::{OrbitControls, PerspectiveCamera};
pub use color::{cycle_hue, Hsl};
pub use config::{CameraConfig, GroupConfig, SnowfieldConfig};
pub use error::{ConfigError, GpuError, RunError, TextureError};
pub use glam::{Vec2, Vec3};
pub use material::{BlendMode, PointsMaterial, TextureHandle};
pub use scene::{group_spin, ParticleGroup, Scene, Viewport};
pub use spawn::{generate_positions, random_rotation, PositionSet};
pub use textures::{FilterMode, TextureConfig, TextureRegistry};
pub use time::Clock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use snowfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::Snowfield;
    pub use crate::camera::{OrbitControls, PerspectiveCamera};
    pub use crate::color::{cycle_hue, Hsl};
    pub use crate::config::{CameraConfig, GroupConfig, SnowfieldConfig};
    pub use crate::error::{ConfigError, GpuError, RunError, TextureError};
    pub use crate::material::{BlendMode, PointsMaterial, TextureHandle};
    pub use crate::scene::{ParticleGroup, Scene, Viewport};
    pub use crate::textures::{TextureConfig, TextureRegistry};
    pub use crate::time::Clock;
    pub use crate::{Vec2, Vec3};
}
