//! Sprite texture loading.
//!
//! Textures are decoded on the CPU with the `image` crate and stored in a
//! [`TextureRegistry`]. Materials refer to them through [`TextureHandle`]s.
//!
//! A file that cannot be loaded still gets a handle. Its slot stays
//! unresolved, a warning is logged, and anything drawn with it renders as if
//! it had no texture.
//!
//! # Supported Formats
//!
//! - PNG (recommended)
//! - JPEG

use std::path::{Path, PathBuf};

use crate::error::TextureError;
use crate::material::TextureHandle;

/// Filter mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Smooth linear filtering (default).
    #[default]
    Linear,
    /// Sharp nearest-neighbor filtering.
    Nearest,
}

/// Decoded RGBA texture ready for upload.
#[derive(Debug, Clone)]
pub struct TextureConfig {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// Filter mode for magnification/minification.
    pub filter: FilterMode,
}

impl TextureConfig {
    /// Create a texture configuration from raw RGBA data.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not exactly `width * height * 4` bytes.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "RGBA data size mismatch"
        );
        Self {
            data,
            width,
            height,
            filter: FilterMode::Linear,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Decode an in-memory PNG or JPEG.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(img.into_raw(), width, height))
    }

    /// Create a solid color texture (1x1 pixel).
    pub fn solid(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            data: vec![r, g, b, a],
            width: 1,
            height: 1,
            filter: FilterMode::Nearest,
        }
    }
}

#[derive(Debug, Clone)]
struct TextureSlot {
    path: Option<PathBuf>,
    texture: Option<TextureConfig>,
}

/// Holds every texture the scene references.
#[derive(Debug, Clone, Default)]
pub struct TextureRegistry {
    slots: Vec<TextureSlot>,
}

impl TextureRegistry {
    /// Create a new empty texture registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an image file, reusing the slot if the same path was loaded before.
    ///
    /// Load failures are logged and leave the slot unresolved.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        let path = path.as_ref();
        if let Some(i) = self
            .slots
            .iter()
            .position(|s| s.path.as_deref() == Some(path))
        {
            return TextureHandle(i);
        }

        let texture = match TextureConfig::from_file(path) {
            Ok(tex) => {
                log::debug!("Loaded texture {} ({}x{})", path.display(), tex.width, tex.height);
                Some(tex)
            }
            Err(e) => {
                log::warn!("Texture {} left unresolved: {}", path.display(), e);
                None
            }
        };

        self.slots.push(TextureSlot {
            path: Some(path.to_path_buf()),
            texture,
        });
        TextureHandle(self.slots.len() - 1)
    }

    /// Add an already decoded texture.
    pub fn insert(&mut self, texture: TextureConfig) -> TextureHandle {
        self.slots.push(TextureSlot {
            path: None,
            texture: Some(texture),
        });
        TextureHandle(self.slots.len() - 1)
    }

    /// Pixel data for a handle, or `None` if the slot is unresolved.
    pub fn get(&self, handle: TextureHandle) -> Option<&TextureConfig> {
        self.slots.get(handle.0).and_then(|s| s.texture.as_ref())
    }

    /// Whether the handle points at decoded pixel data.
    pub fn is_resolved(&self, handle: TextureHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Path the slot was loaded from, if it came from a file.
    pub fn path(&self, handle: TextureHandle) -> Option<&Path> {
        self.slots.get(handle.0).and_then(|s| s.path.as_deref())
    }

    /// Iterate over all slots in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, Option<&TextureConfig>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (TextureHandle(i), s.texture.as_ref()))
    }

    /// Get the number of texture slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
