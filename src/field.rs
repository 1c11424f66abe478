//! The particle field: flat position and colour buffers.
//!
//! Particles live along a virtual tunnel running down the negative Z axis.
//! Both buffers hold three floats per particle, so particle `i` is
//! `positions[3i..3i + 3]` (x, y, z) and `colors[3i..3i + 3]` (r, g, b).
//! The buffers are sized once and only ever overwritten in place.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::error::FieldError;
use crate::gradient::DepthGradient;

/// Placement of particles along the tunnel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelShape {
    /// Depth range; particles spawn with z in `[-length, 0]`.
    pub length: f32,
    /// Minimum distance from the tunnel axis.
    pub base_radius: f32,
    /// Extra radial spread, scaled by `random()²`.
    pub spread: f32,
}

impl TunnelShape {
    /// Normalized depth of `z`: 0 at the far end, 1 at the mouth.
    #[inline]
    pub fn depth_fraction(&self, z: f32) -> f32 {
        (z + self.length) / self.length
    }
}

/// A fixed-size set of point particles stored as flat `f32` buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl ParticleField {
    /// Scatter `count` particles through `shape`, coloured by `gradient`.
    ///
    /// Radius is `base_radius + spread * random()²`, so the field is densest
    /// near the axis. Colour depends only on the starting depth.
    pub fn generate<R: Rng + ?Sized>(
        count: u32,
        shape: &TunnelShape,
        gradient: &DepthGradient,
        rng: &mut R,
    ) -> Self {
        let count = count as usize;
        let mut positions = Vec::with_capacity(count * 3);
        let mut colors = Vec::with_capacity(count * 3);

        for _ in 0..count {
            let z = -rng.gen::<f32>() * shape.length;
            let angle = rng.gen_range(0.0..TAU);
            let r: f32 = rng.gen();
            let radius = shape.base_radius + shape.spread * r * r;

            positions.extend_from_slice(&[angle.cos() * radius, angle.sin() * radius, z]);

            let color = gradient.sample(shape.depth_fraction(z));
            colors.extend_from_slice(&color.to_array());
        }

        Self { positions, colors }
    }

    /// Build a field from existing buffers.
    ///
    /// Both buffers must have the same length, and that length must be a
    /// multiple of 3.
    pub fn from_buffers(positions: Vec<f32>, colors: Vec<f32>) -> Result<Self, FieldError> {
        if positions.len() != colors.len() {
            return Err(FieldError::LengthMismatch {
                positions: positions.len(),
                colors: colors.len(),
            });
        }
        if positions.len() % 3 != 0 {
            return Err(FieldError::NotTriples(positions.len()));
        }
        Ok(Self { positions, colors })
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    /// Whether the field holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flat xyz buffer, `3 * len()` floats.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat rgb buffer, `3 * len()` floats.
    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Position of particle `i`.
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    /// Colour of particle `i`.
    pub fn color(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.colors[i * 3..i * 3 + 3])
    }

    /// Iterator over every particle's depth.
    pub fn depths(&self) -> impl Iterator<Item = f32> + '_ {
        self.positions.iter().skip(2).step_by(3).copied()
    }

    /// Mutable iterator over every particle's depth.
    pub(crate) fn depths_mut(&mut self) -> impl Iterator<Item = &mut f32> + '_ {
        self.positions.iter_mut().skip(2).step_by(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn shape() -> TunnelShape {
        TunnelShape {
            length: 4000.0,
            base_radius: 5.0,
            spread: 30.0,
        }
    }

    #[test]
    fn test_generate_buffer_lengths() {
        let mut rng = SmallRng::seed_from_u64(1);
        let field = ParticleField::generate(1234, &shape(), &DepthGradient::default(), &mut rng);

        assert_eq!(field.len(), 1234);
        assert_eq!(field.positions().len(), 3 * 1234);
        assert_eq!(field.colors().len(), 3 * 1234);
    }

    #[test]
    fn test_generate_within_tunnel() {
        let mut rng = SmallRng::seed_from_u64(2);
        let s = shape();
        let field = ParticleField::generate(5000, &s, &DepthGradient::default(), &mut rng);

        for i in 0..field.len() {
            let p = field.position(i);
            assert!(p.z <= 0.0 && p.z >= -s.length, "z out of range: {}", p.z);

            let radius = (p.x * p.x + p.y * p.y).sqrt();
            assert!(radius >= s.base_radius - 1e-3);
            assert!(radius <= s.base_radius + s.spread + 1e-3);
        }
    }

    #[test]
    fn test_radius_biased_toward_axis() {
        let mut rng = SmallRng::seed_from_u64(3);
        let s = shape();
        let field = ParticleField::generate(20_000, &s, &DepthGradient::default(), &mut rng);

        // random()² puts about 70% of particles in the inner half of the spread.
        let midpoint = s.base_radius + s.spread * 0.5;
        let inner = (0..field.len())
            .filter(|&i| field.position(i).truncate().length() < midpoint)
            .count();
        assert!(inner as f32 / field.len() as f32 > 0.6);
    }

    #[test]
    fn test_color_follows_depth() {
        let mut rng = SmallRng::seed_from_u64(4);
        let s = shape();
        let gradient = DepthGradient::new(Vec3::X, Vec3::Y, Vec3::Z);
        let field = ParticleField::generate(200, &s, &gradient, &mut rng);

        for i in 0..field.len() {
            let expected = gradient.sample(s.depth_fraction(field.position(i).z));
            assert!((field.color(i) - expected).abs().max_element() < 1e-6);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = ParticleField::generate(
            64,
            &shape(),
            &DepthGradient::default(),
            &mut SmallRng::seed_from_u64(9),
        );
        let b = ParticleField::generate(
            64,
            &shape(),
            &DepthGradient::default(),
            &mut SmallRng::seed_from_u64(9),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_buffers_validation() {
        assert_eq!(
            ParticleField::from_buffers(vec![0.0; 6], vec![0.0; 3]),
            Err(FieldError::LengthMismatch {
                positions: 6,
                colors: 3
            })
        );
        assert_eq!(
            ParticleField::from_buffers(vec![0.0; 4], vec![0.0; 4]),
            Err(FieldError::NotTriples(4))
        );

        let field = ParticleField::from_buffers(vec![1.0, 2.0, 3.0], vec![0.5; 3]).unwrap();
        assert_eq!(field.len(), 1);
        assert_eq!(field.position(0), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_depth_iterators() {
        let mut field =
            ParticleField::from_buffers(vec![0.0, 0.0, -1.0, 0.0, 0.0, -2.0], vec![0.0; 6])
                .unwrap();
        assert_eq!(field.depths().collect::<Vec<_>>(), vec![-1.0, -2.0]);

        for z in field.depths_mut() {
            *z += 1.0;
        }
        assert_eq!(field.depths().collect::<Vec<_>>(), vec![0.0, -1.0]);
    }

    #[test]
    fn test_empty_field() {
        let field = ParticleField::from_buffers(Vec::new(), Vec::new()).unwrap();
        assert!(field.is_empty());
        assert_eq!(field.depths().count(), 0);
    }
}
