//! Tunable settings for the river.
//!
//! Every constant of the effect lives in [`RiverConfig`]. Settings can be
//! built in code with the `with_*` methods or loaded from a RON file:
//!
//! ```ignore
//! RiverConfig::default()
//!     .with_particle_count(5_000)
//!     .with_tunnel_length(2_000.0)
//!     .with_speed(40.0);
//! ```
//!
//! ```ron
//! (
//!     particle_count: 5000,
//!     bloom: (min_strength: 1.0, max_strength: 2.5),
//!     colors: (far: "#1e1b4b", mid: "#0ea5e9", near: "#f472b6"),
//! )
//! ```

use std::f32::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gradient::parse_hex_color;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cosmic-river.ron";

/// Bloom pass settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Glow strength at the top of the page.
    pub min_strength: f32,
    /// Glow strength at scroll fraction 1.0.
    pub max_strength: f32,
    /// Blur spread.
    pub radius: f32,
    /// Luminance below which pixels do not glow.
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            min_strength: 1.5,
            max_strength: 3.0,
            radius: 0.4,
            threshold: 0.1,
        }
    }
}

/// The three reference colours of the depth gradient, as CSS hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorStops {
    /// Colour at the far end of the tunnel.
    pub far: String,
    /// Colour halfway down the tunnel.
    pub mid: String,
    /// Colour next to the camera.
    pub near: String,
}

impl Default for ColorStops {
    fn default() -> Self {
        Self {
            far: "#4f46e5".into(),
            mid: "#06b6d4".into(),
            near: "#ec4899".into(),
        }
    }
}

/// Complete configuration of the particle river.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    /// Number of particles in the field.
    pub particle_count: u32,
    /// Depth range the particles are spread over.
    pub tunnel_length: f32,
    /// Minimum distance from the tunnel axis.
    pub base_radius: f32,
    /// Extra radial spread, scaled by `random()²`.
    pub spread: f32,
    /// Flow speed toward the camera, in units per second.
    pub speed: f32,
    /// Distance past the camera at which a particle is recycled.
    pub reset_threshold: f32,
    /// Half-width of the random jitter applied to recycled depths.
    pub reset_offset: f32,
    /// Camera depth at scroll fraction 0.
    pub initial_camera_z: f32,
    /// Vertical field of view, in degrees.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Per-frame blend factor toward camera targets.
    pub smoothing: f32,
    /// Camera tilt at full pointer deflection, in radians.
    pub pointer_tilt: f32,
    /// Fraction of the tunnel the camera travels per unit of scroll.
    pub scroll_travel: f32,
    /// Upper clamp of the scroll fraction.
    pub max_scroll_fraction: f32,
    /// Height of the virtual page that is scrolled, in pixels.
    pub document_height: f32,
    /// Glow settings.
    pub bloom: BloomConfig,
    /// Particle sprite size in world units.
    pub point_size: f32,
    /// Depth gradient colours.
    pub colors: ColorStops,
    /// Initial window width.
    pub window_width: u32,
    /// Initial window height.
    pub window_height: u32,
    /// Largest frame delta fed to the updater, in seconds.
    pub max_delta: f32,
    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            tunnel_length: 4000.0,
            base_radius: 5.0,
            spread: 30.0,
            speed: 20.0,
            reset_threshold: 5.0,
            reset_offset: 50.0,
            initial_camera_z: 5.0,
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            smoothing: 0.05,
            pointer_tilt: PI / 20.0,
            scroll_travel: 0.7,
            max_scroll_fraction: 0.7,
            document_height: 6000.0,
            bloom: BloomConfig::default(),
            point_size: 1.5,
            colors: ColorStops::default(),
            window_width: 1280,
            window_height: 720,
            max_delta: 0.1,
            seed: None,
        }
    }
}

impl RiverConfig {
    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the tunnel length.
    pub fn with_tunnel_length(mut self, length: f32) -> Self {
        self.tunnel_length = length;
        self
    }

    /// Set the radial placement (`base + spread * random()²`).
    pub fn with_radius(mut self, base: f32, spread: f32) -> Self {
        self.base_radius = base;
        self.spread = spread;
        self
    }

    /// Set the flow speed in units per second.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the recycle threshold and jitter.
    pub fn with_recycling(mut self, threshold: f32, offset: f32) -> Self {
        self.reset_threshold = threshold;
        self.reset_offset = offset;
        self
    }

    /// Set the camera blend factor.
    pub fn with_smoothing(mut self, factor: f32) -> Self {
        self.smoothing = factor;
        self
    }

    /// Set the scroll clamp.
    pub fn with_max_scroll_fraction(mut self, max: f32) -> Self {
        self.max_scroll_fraction = max;
        self
    }

    /// Set the bloom strength range.
    pub fn with_bloom_strength(mut self, min: f32, max: f32) -> Self {
        self.bloom.min_strength = min;
        self.bloom.max_strength = max;
        self
    }

    /// Set the gradient colours from CSS hex strings.
    pub fn with_colors(mut self, far: &str, mid: &str, near: &str) -> Self {
        self.colors = ColorStops {
            far: far.into(),
            mid: mid.into(),
            near: near.into(),
        };
        self
    }

    /// Use a fixed RNG seed so the field is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] when `None`.
    ///
    /// A missing default file is silent; any other failure is logged and the
    /// defaults are used.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE).to_path_buf());

        if !explicit && !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Check every setting is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::InvalidValue {
                field,
                reason: reason.into(),
            }
        }

        let finite = [
            ("tunnel_length", self.tunnel_length),
            ("base_radius", self.base_radius),
            ("spread", self.spread),
            ("speed", self.speed),
            ("reset_threshold", self.reset_threshold),
            ("reset_offset", self.reset_offset),
            ("initial_camera_z", self.initial_camera_z),
            ("fov_degrees", self.fov_degrees),
            ("near", self.near),
            ("far", self.far),
            ("smoothing", self.smoothing),
            ("pointer_tilt", self.pointer_tilt),
            ("scroll_travel", self.scroll_travel),
            ("max_scroll_fraction", self.max_scroll_fraction),
            ("document_height", self.document_height),
            ("bloom", self.bloom.min_strength),
            ("bloom", self.bloom.max_strength),
            ("bloom", self.bloom.radius),
            ("bloom", self.bloom.threshold),
            ("point_size", self.point_size),
            ("max_delta", self.max_delta),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {}", value)));
            }
        }

        if self.particle_count == 0 {
            return Err(invalid("particle_count", "must be at least 1"));
        }
        if !(self.tunnel_length > 0.0) {
            return Err(invalid("tunnel_length", "must be positive"));
        }
        if !(self.base_radius >= 0.0 && self.spread >= 0.0) {
            return Err(invalid("base_radius", "radius and spread must not be negative"));
        }
        if !(self.speed >= 0.0) {
            return Err(invalid("speed", "must not be negative"));
        }
        if !(self.reset_threshold >= 0.0) {
            return Err(invalid("reset_threshold", "must not be negative"));
        }
        if !(self.reset_offset >= 0.0) {
            return Err(invalid("reset_offset", "must not be negative"));
        }
        if !(self.reset_offset + self.reset_threshold < self.tunnel_length) {
            return Err(invalid(
                "reset_offset",
                "offset plus threshold must be shorter than the tunnel",
            ));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fov_degrees", "must be between 0 and 180"));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(invalid("near", "need 0 < near < far"));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(invalid("smoothing", "must be in (0, 1]"));
        }
        if !(self.scroll_travel >= 0.0) {
            return Err(invalid("scroll_travel", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.max_scroll_fraction) {
            return Err(invalid("max_scroll_fraction", "must be in [0, 1]"));
        }
        if !(self.document_height > 0.0) {
            return Err(invalid("document_height", "must be positive"));
        }
        if !(self.bloom.min_strength <= self.bloom.max_strength) {
            return Err(invalid("bloom", "min_strength exceeds max_strength"));
        }
        if !(self.bloom.radius >= 0.0 && self.bloom.threshold >= 0.0) {
            return Err(invalid("bloom", "radius and threshold must not be negative"));
        }
        if !(self.point_size > 0.0) {
            return Err(invalid("point_size", "must be positive"));
        }
        if !(self.max_delta > 0.0) {
            return Err(invalid("max_delta", "must be positive"));
        }
        for color in [&self.colors.far, &self.colors.mid, &self.colors.near] {
            parse_hex_color(color)?;
        }
        Ok(())
    }
}
