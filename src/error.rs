//! Error types for Cosmic River.
//!
//! GPU initialization, window creation and configuration can fail. Nothing on
//! the per-frame path returns an error.

use thiserror::Error;

/// Errors that can occur while bringing up the GPU for the scene.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("Surface is not supported by the selected adapter")]
    UnsupportedSurface,
}

/// Errors raised when a [`RiverConfig`](crate::RiverConfig) is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting is outside its allowed range.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
    /// A colour string is not `#rgb` or `#rrggbb`.
    #[error("Invalid colour `{0}`, expected #rgb or #rrggbb")]
    InvalidColor(String),
    /// The config file is not valid RON.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when building a [`ParticleField`](crate::ParticleField) from raw buffers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// Position and colour buffers hold a different number of floats.
    #[error("Position buffer has {positions} floats but colour buffer has {colors}")]
    LengthMismatch { positions: usize, colors: usize },
    /// A buffer length is not a whole number of xyz / rgb triples.
    #[error("Buffer length {0} is not a multiple of 3")]
    NotTriples(usize),
}

/// Errors that can occur when running the river.
#[derive(Debug, Error)]
pub enum RiverError {
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
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
