//! Error types for Snowfield.
//!
//! This module provides error types for GPU initialization, texture loading,
//! configuration parsing, and running the viewer.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur during texture loading.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Failed to decode the image data.
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// Failed to read file from disk.
    #[error("Failed to read texture file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for this config.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of its allowed range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur when running the viewer.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The configuration was rejected.
    #[error("{0}")]
    Config(#[from] ConfigError),
}
