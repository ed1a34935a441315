//! Application state and the per-frame update rules.
//!
//! [`Scene`] owns everything that changes while the viewer runs: the camera,
//! its orbit controls, the particle groups and the viewport. The window event
//! handler owns one `Scene` and passes it to the renderer each frame. Nothing
//! here touches the GPU.

use glam::{EulerRot, Mat4, Vec2, Vec3};
use rand::Rng;

use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::color::cycle_hue;
use crate::config::SnowfieldConfig;
use crate::error::ConfigError;
use crate::material::PointsMaterial;
use crate::spawn::{generate_positions, random_rotation, PositionSet};
use crate::textures::TextureRegistry;

/// Output size of the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Viewport for a window of `width x height` logical pixels.
    ///
    /// The device scale factor is capped at `max_pixel_ratio`.
    pub fn new(width: u32, height: u32, scale_factor: f32, max_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: scale_factor.min(max_pixel_ratio),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Size of the render target in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            ((self.width as f32 * self.pixel_ratio).round() as u32).max(1),
            ((self.height as f32 * self.pixel_ratio).round() as u32).max(1),
        )
    }
}

/// A set of points drawn with one material.
#[derive(Debug, Clone)]
pub struct ParticleGroup {
    positions: PositionSet,
    pub material: PointsMaterial,
    /// Euler rotation in radians, applied X then Y then Z.
    pub rotation: Vec3,
}

impl ParticleGroup {
    pub fn new(positions: PositionSet, material: PointsMaterial, rotation: Vec3) -> Self {
        Self {
            positions,
            material,
            rotation,
        }
    }

    /// Shared point set this group draws.
    pub fn positions(&self) -> &PositionSet {
        &self.positions
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

/// Y rotation of group `index` after `elapsed` seconds.
///
/// The first four groups spin one way and the rest the other, each faster
/// than the one before.
pub fn group_spin(index: usize, elapsed: f32, speed: f32) -> f32 {
    let sign = if index < 4 { 1.0 } else { -1.0 };
    elapsed * sign * (index + 1) as f32 * speed
}

/// All mutable state of the viewer.
#[derive(Debug, Clone)]
pub struct Scene {
    camera: PerspectiveCamera,
    controls: OrbitControls,
    positions: PositionSet,
    groups: Vec<ParticleGroup>,
    viewport: Viewport,
    max_pixel_ratio: f32,
    drift_target: Vec2,
    drift_factor: f32,
    hue_speed: f32,
    rotation_speed: f32,
    textures_enabled: bool,
}

impl Scene {
    /// Build the scene: camera, controls, shared positions, and one group per
    /// configured entry. Group sprites are loaded into `textures`.
    ///
    /// `rng` places the particles and picks each group's starting rotation.
    /// Fails with [`ConfigError::Invalid`] if `config` does not validate.
    pub fn new<R: Rng + ?Sized>(
        config: &SnowfieldConfig,
        viewport: Viewport,
        textures: &mut TextureRegistry,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let cam = &config.camera;

        let mut camera = PerspectiveCamera::new(cam.fov_degrees, viewport.aspect(), cam.near, cam.far);
        camera.position = Vec3::from(cam.position);

        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        controls.damping_factor = cam.damping_factor;

        let positions = generate_positions(rng, config.particle_count, config.extent);

        let groups = config
            .groups
            .iter()
            .map(|group| {
                let sprite = textures.load(&group.texture);
                let mut material =
                    PointsMaterial::new(group.color, group.size, Some(sprite)).with_blending(group.blending);
                material.set_map_enabled(config.textures_enabled);
                ParticleGroup::new(positions.clone(), material, random_rotation(rng))
            })
            .collect::<Vec<_>>();

        log::info!(
            "Scene ready: {} particles shared by {} groups",
            positions.len(),
            groups.len()
        );

        Ok(Self {
            camera,
            controls,
            positions,
            groups,
            viewport,
            max_pixel_ratio: cam.max_pixel_ratio,
            drift_target: Vec2::from(cam.drift_target),
            drift_factor: cam.drift_factor,
            hue_speed: config.hue_speed,
            rotation_speed: config.rotation_speed,
            textures_enabled: config.textures_enabled,
        })
    }

    /// Match a new window size.
    ///
    /// Updates the camera aspect, the render size and the pixel ratio.
    /// Zero-sized viewports (a minimized window) are ignored; returns whether
    /// anything changed.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let viewport = Viewport::new(width, height, scale_factor, self.max_pixel_ratio);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        log::debug!(
            "Resized to {}x{} (pixel ratio {})",
            width,
            height,
            viewport.pixel_ratio
        );
        true
    }

    /// Advance animation to `elapsed` seconds since start.
    pub fn update(&mut self, elapsed: f32) {
        self.controls.update(&mut self.camera);

        // Per-frame easing, deliberately not scaled by frame time
        let pos = &mut self.camera.position;
        pos.x += (self.drift_target.x - pos.x) * self.drift_factor;
        pos.y += (self.drift_target.y - pos.y) * self.drift_factor;
        self.camera.look_at(Vec3::ZERO);

        for (i, group) in self.groups.iter_mut().enumerate() {
            group.rotation.y = group_spin(i, elapsed, self.rotation_speed);

            let material = &mut group.material;
            let base = material.base_color();
            material.color = base.with_hue(cycle_hue(base.h, elapsed, self.hue_speed));
        }
    }

    /// Show or hide every group's sprite texture.
    pub fn set_textures_enabled(&mut self, enabled: bool) {
        self.textures_enabled = enabled;
        for group in &mut self.groups {
            group.material.set_map_enabled(enabled);
        }
        log::info!("Textures {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn textures_enabled(&self) -> bool {
        self.textures_enabled
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Point set shared by all groups.
    pub fn positions(&self) -> &PositionSet {
        &self.positions
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [ParticleGroup] {
        &mut self.groups
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}
