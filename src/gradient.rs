//! Depth-keyed colour gradient.
//!
//! Particles are coloured by how far down the tunnel they start: the far end
//! takes the first colour, the middle the second, and the end nearest the
//! camera the third. Between stops the colour is a straight linear blend.

use glam::Vec3;

use crate::config::ColorStops;
use crate::error::ConfigError;

/// Three-stop colour gradient over normalized depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthGradient {
    /// Colour at depth fraction 0 (far end).
    pub far: Vec3,
    /// Colour at depth fraction 0.5.
    pub mid: Vec3,
    /// Colour at depth fraction 1 (near end).
    pub near: Vec3,
}

impl DepthGradient {
    /// Create a gradient from RGB colours in `0.0..=1.0`.
    pub fn new(far: Vec3, mid: Vec3, near: Vec3) -> Self {
        Self { far, mid, near }
    }

    /// Parse the configured CSS hex colours.
    pub fn from_stops(stops: &ColorStops) -> Result<Self, ConfigError> {
        Ok(Self {
            far: parse_hex_color(&stops.far)?,
            mid: parse_hex_color(&stops.mid)?,
            near: parse_hex_color(&stops.near)?,
        })
    }

    /// Colour at normalized depth `t` (0 = far, 1 = near).
    ///
    /// The first half blends far→mid, the second mid→near. Both halves meet
    /// at exactly `mid` when `t == 0.5`. `t` is clamped to `0.0..=1.0`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        if t < 0.5 {
            self.far.lerp(self.mid, t * 2.0)
        } else {
            self.mid.lerp(self.near, (t - 0.5) * 2.0)
        }
    }
}

impl Default for DepthGradient {
    fn default() -> Self {
        // Defaults of `ColorStops` are known-good hex strings.
        Self::new(
            Vec3::new(79.0, 70.0, 229.0) / 255.0,
            Vec3::new(6.0, 182.0, 212.0) / 255.0,
            Vec3::new(236.0, 72.0, 153.0) / 255.0,
        )
    }
}

/// Parse a CSS hex colour (`#rgb` or `#rrggbb`, `#` optional) into RGB `0.0..=1.0`.
pub fn parse_hex_color(text: &str) -> Result<Vec3, ConfigError> {
    let invalid = || ConfigError::InvalidColor(text.to_string());
    let hex = text.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    let (r, g, b) = match hex.len() {
        3 => {
            // #abc expands to #aabbcc
            let digit = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            (digit(0)?, digit(1)?, digit(2)?)
        }
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        _ => return Err(invalid()),
    };

    Ok(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    fn rgb() -> DepthGradient {
        DepthGradient::new(Vec3::X, Vec3::Y, Vec3::Z)
    }

    #[test]
    fn test_endpoints() {
        let g = rgb();
        assert!(approx(g.sample(0.0), Vec3::X));
        assert!(approx(g.sample(1.0), Vec3::Z));
    }

    #[test]
    fn test_continuous_at_midpoint() {
        let g = rgb();
        // Lower branch approaching 0.5 and upper branch at 0.5 both land on mid.
        let below = g.far.lerp(g.mid, 0.5 * 2.0);
        let at = g.sample(0.5);
        assert!(approx(below, g.mid));
        assert!(approx(at, g.mid));
        assert!(approx(g.sample(0.5 - 1e-6), g.mid));
    }

    #[test]
    fn test_quarter_points() {
        let g = rgb();
        assert!(approx(g.sample(0.25), Vec3::new(0.5, 0.5, 0.0)));
        assert!(approx(g.sample(0.75), Vec3::new(0.0, 0.5, 0.5)));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let g = rgb();
        assert!(approx(g.sample(-3.0), Vec3::X));
        assert!(approx(g.sample(7.0), Vec3::Z));
    }

    #[test]
    fn test_parse_hex() {
        assert!(approx(parse_hex_color("#ff0000").unwrap(), Vec3::X));
        assert!(approx(parse_hex_color("00ff00").unwrap(), Vec3::Y));
        assert!(approx(parse_hex_color("#00f").unwrap(), Vec3::Z));
        assert!(approx(parse_hex_color(" #FFFFFF ").unwrap(), Vec3::ONE));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        for bad in ["", "#", "#12", "#12345", "#gggggg", "blue", "#ff00ff00"] {
            assert!(parse_hex_color(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_default_matches_default_stops() {
        let parsed = DepthGradient::from_stops(&ColorStops::default()).unwrap();
        let builtin = DepthGradient::default();
        assert!(approx(parsed.far, builtin.far));
        assert!(approx(parsed.mid, builtin.mid));
        assert!(approx(parsed.near, builtin.near));
    }
}
