//! Bloom settings and the scroll-to-strength law.

use crate::camera::lerp;
use crate::config::BloomConfig;

/// Live bloom parameters handed to the composer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Glow multiplier.
    pub strength: f32,
    /// Blur spread.
    pub radius: f32,
    /// Luminance cut-off for the bright pass.
    pub threshold: f32,
}

impl BloomSettings {
    /// Settings at scroll fraction 0.
    pub fn from_config(config: &BloomConfig) -> Self {
        Self {
            strength: config.min_strength,
            radius: config.radius,
            threshold: config.threshold,
        }
    }
}

/// Bloom strength for a scroll fraction.
///
/// Linear between `min` at 0 and `max` at 1. There is no easing: the glow
/// tracks scroll immediately.
pub fn strength_for_scroll(min: f32, max: f32, scroll_fraction: f32) -> f32 {
    lerp(min, max, scroll_fraction.clamp(0.0, 1.0))
}
