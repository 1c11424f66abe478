//! # Cosmic River
//!
//! A bloom-lit particle tunnel. Thousands of point particles stream toward the
//! camera; scrolling moves the camera down the tunnel and turns up the glow,
//! the pointer tilts the view.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cosmic_river::prelude::*;
//!
//! fn main() -> Result<(), RiverError> {
//!     CosmicRiver::new(
//!         RiverConfig::default()
//!             .with_particle_count(20_000)
//!             .with_colors("#4f46e5", "#06b6d4", "#ec4899"),
//!     )
//!     .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The field
//!
//! [`ParticleField`] stores positions and colours as two flat `f32` buffers,
//! three floats per particle. Particles start scattered through a tunnel of
//! length `tunnel_length` along -Z, denser toward the axis, and take their
//! colour from a three-stop [`DepthGradient`].
//!
//! ### The frame step
//!
//! [`River::step`] runs once per frame:
//!
//! 1. every particle moves `delta * speed` toward the camera
//! 2. particles past `camera_z + reset_threshold` jump back to the far end
//! 3. the camera eases toward a depth set by scroll and a tilt set by the pointer
//! 4. bloom strength follows scroll directly
//!
//! The step is plain CPU work, so it runs headless too:
//!
//! ```ignore
//! let mut river = River::new(RiverConfig::default())?;
//! let mut frames = FrameLoop::new(FixedFrames::new(1.0 / 60.0, 600), CancelToken::new());
//! frames.run(|delta| {
//!     river.step(delta, &InputSnapshot::default());
//! });
//! ```
//!
//! ### Rendering
//!
//! [`gpu::Renderer`] draws the field as additive sprites into an HDR target,
//! then the [`gpu::Composer`] runs bright-pass, blur and composite to the
//! window surface.

mod app;
pub mod bloom;
pub mod camera;
pub mod config;
pub mod error;
pub mod field;
pub mod gpu;
pub mod gradient;
pub mod input;
pub mod river;
pub mod time;

pub use app::CosmicRiver;
pub use bloom::{strength_for_scroll, BloomSettings};
pub use camera::RiverCamera;
pub use config::{BloomConfig, ColorStops, RiverConfig};
pub use error::{ConfigError, FieldError, GpuError, RiverError};
pub use field::{ParticleField, TunnelShape};
pub use glam::{Vec2, Vec3};
pub use gradient::DepthGradient;
pub use input::{InputSnapshot, InputState};
pub use river::{FrameReport, River};
pub use time::{CancelToken, FixedFrames, FrameClock, FrameLoop, FrameSource};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use cosmic_river::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::CosmicRiver;
    pub use crate::config::RiverConfig;
    pub use crate::error::RiverError;
    pub use crate::input::{InputSnapshot, InputState};
    pub use crate::river::{FrameReport, River};
    pub use crate::time::{CancelToken, FixedFrames, FrameClock, FrameLoop, FrameSource};
    pub use crate::{Vec2, Vec3};
}
