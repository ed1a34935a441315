//! Point sprite materials.

use serde::{Deserialize, Serialize};

use crate::color::Hsl;

/// Handle to a texture slot in a [`TextureRegistry`](crate::TextureRegistry).
///
/// A handle is valid even when its image failed to load; the slot then
/// stays unresolved and the renderer treats it as untextured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

impl TextureHandle {
    /// Index of the slot in its registry.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Blend modes for particle rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Additive blending.
    ///
    /// Particle colors are added together, so overlapping sprites glow.
    Additive,
}

/// Material shared by every point in a particle group.
#[derive(Debug, Clone)]
pub struct PointsMaterial {
    base_color: Hsl,
    /// Color used for the next draw.
    pub color: Hsl,
    /// Point size in pixels at a view distance equal to half the viewport height.
    pub size: f32,
    pub blending: BlendMode,
    pub depth_test: bool,
    assigned_map: Option<TextureHandle>,
    map: Option<TextureHandle>,
    needs_update: bool,
}

impl PointsMaterial {
    /// Additive, depth-test-free material with the given sprite assigned and active.
    pub fn new(base_color: Hsl, size: f32, map: Option<TextureHandle>) -> Self {
        Self {
            base_color,
            color: base_color.normalized(),
            size,
            blending: BlendMode::Additive,
            depth_test: false,
            assigned_map: map,
            map,
            needs_update: true,
        }
    }

    pub fn with_blending(mut self, blending: BlendMode) -> Self {
        self.blending = blending;
        self
    }

    /// Color the material was created with.
    pub fn base_color(&self) -> Hsl {
        self.base_color
    }

    /// Texture currently sampled when drawing, if any.
    pub fn map(&self) -> Option<TextureHandle> {
        self.map
    }

    /// Texture this material was created with.
    pub fn assigned_map(&self) -> Option<TextureHandle> {
        self.assigned_map
    }

    /// Switch between the assigned texture and no texture.
    ///
    /// Always flags the material for re-upload.
    pub fn set_map_enabled(&mut self, enabled: bool) {
        self.map = if enabled { self.assigned_map } else { None };
        self.needs_update = true;
    }

    /// Whether GPU resources must be rebuilt before the next draw.
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Read and clear the re-upload flag.
    pub(crate) fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }
}
