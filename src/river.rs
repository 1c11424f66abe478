//! The river controller: particle field, camera and bloom, stepped per frame.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::bloom::{strength_for_scroll, BloomSettings};
use crate::camera::RiverCamera;
use crate::config::RiverConfig;
use crate::error::ConfigError;
use crate::field::{ParticleField, TunnelShape};
use crate::gradient::DepthGradient;
use crate::input::InputSnapshot;

/// What happened during one [`River::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Seconds simulated.
    pub delta: f32,
    /// Particles sent back to the far end this frame.
    pub recycled: usize,
    /// Camera depth the recycle rule was measured against.
    pub recycle_camera_z: f32,
    /// Camera depth after easing.
    pub camera_z: f32,
    /// Bloom strength for this frame.
    pub bloom_strength: f32,
}

/// Owns all animation state of the effect.
///
/// Created once when the scene comes up and dropped with it. The frame step
/// only overwrites buffers and camera values in place.
#[derive(Debug, Clone)]
pub struct River {
    config: RiverConfig,
    field: ParticleField,
    camera: RiverCamera,
    bloom: BloomSettings,
    rng: SmallRng,
}

impl River {
    /// Validate `config` and scatter a fresh particle field.
    pub fn new(config: RiverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let gradient = DepthGradient::from_stops(&config.colors)?;
        let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or_else(clock_seed));
        let field = ParticleField::generate(
            config.particle_count,
            &tunnel_shape(&config),
            &gradient,
            &mut rng,
        );
        Ok(Self::assemble(config, field, rng))
    }

    /// Use an existing field instead of generating one.
    ///
    /// `config.particle_count` is ignored; the field decides the count.
    pub fn with_field(config: RiverConfig, field: ParticleField) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = SmallRng::seed_from_u64(config.seed.unwrap_or_else(clock_seed));
        Ok(Self::assemble(config, field, rng))
    }

    fn assemble(config: RiverConfig, field: ParticleField, rng: SmallRng) -> Self {
        let camera = RiverCamera::new(
            config.initial_camera_z,
            config.fov_degrees,
            config.near,
            config.far,
        );
        let bloom = BloomSettings::from_config(&config.bloom);
        Self {
            config,
            field,
            camera,
            bloom,
            rng,
        }
    }

    /// Advance one frame of `delta` seconds using `input`.
    ///
    /// Order: match the camera aspect to the snapshot viewport, move particles,
    /// recycle those past the camera, ease the camera toward its scroll and
    /// pointer targets, then set bloom from scroll.
    pub fn step(&mut self, delta: f32, input: &InputSnapshot) -> FrameReport {
        let (width, height) = input.viewport;
        self.resize(width, height);

        let recycle_camera_z = self.camera.position.z;
        let recycled = self.advance_particles(delta);

        let (target_z, target_rotation) = self.camera_targets(input);
        self.camera
            .approach(target_z, target_rotation, self.config.smoothing);

        self.bloom.strength = strength_for_scroll(
            self.config.bloom.min_strength,
            self.config.bloom.max_strength,
            input.scroll_fraction,
        );

        FrameReport {
            delta,
            recycled,
            recycle_camera_z,
            camera_z: self.camera.position.z,
            bloom_strength: self.bloom.strength,
        }
    }

    /// Move every particle `delta * speed` toward the camera and recycle the
    /// ones that pass it. Returns how many were recycled.
    ///
    /// A recycled particle lands at `camera_z - tunnel_length` give or take
    /// `reset_offset`, keeping its x, y and colour.
    pub fn advance_particles(&mut self, delta: f32) -> usize {
        let advance = delta * self.config.speed;
        let camera_z = self.camera.position.z;
        let limit = camera_z + self.config.reset_threshold;
        let far_end = camera_z - self.config.tunnel_length - self.config.reset_offset;
        let jitter = 2.0 * self.config.reset_offset;

        let rng = &mut self.rng;
        let mut recycled = 0;
        for z in self.field.depths_mut() {
            *z += advance;
            if *z > limit {
                let spread = if jitter > 0.0 {
                    rng.gen_range(0.0..jitter)
                } else {
                    0.0
                };
                *z = far_end + spread;
                recycled += 1;
            }
        }
        recycled
    }

    /// Camera depth and rotation the camera eases toward for `input`.
    pub fn camera_targets(&self, input: &InputSnapshot) -> (f32, Vec2) {
        let travel = self.config.tunnel_length * self.config.scroll_travel;
        let target_z = self.config.initial_camera_z - input.scroll_fraction * travel;
        let tilt = self.config.pointer_tilt;
        let target_rotation = Vec2::new(input.pointer.y * tilt, -input.pointer.x * tilt);
        (target_z, target_rotation)
    }

    /// Track a new viewport size. Zero sizes, as reported when minimized, are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect(width, height);
    }

    /// The particle buffers.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// The camera.
    pub fn camera(&self) -> &RiverCamera {
        &self.camera
    }

    /// Current bloom parameters.
    pub fn bloom(&self) -> BloomSettings {
        self.bloom
    }

    /// The configuration this river was built from.
    pub fn config(&self) -> &RiverConfig {
        &self.config
    }
}

fn tunnel_shape(config: &RiverConfig) -> TunnelShape {
    TunnelShape {
        length: config.tunnel_length,
        base_radius: config.base_radius,
        spread: config.spread,
    }
}

/// Seed that differs between runs.
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RiverConfig {
        RiverConfig::default()
            .with_particle_count(500)
            .with_tunnel_length(400.0)
            .with_recycling(5.0, 20.0)
            .with_seed(11)
    }

    #[test]
    fn test_new_generates_configured_count() {
        let river = River::new(small_config()).unwrap();
        assert_eq!(river.field().len(), 500);
        assert_eq!(river.camera().position.z, 5.0);
        assert_eq!(river.bloom().strength, 1.5);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(River::new(small_config().with_smoothing(0.0)).is_err());
    }

    #[test]
    fn test_camera_targets() {
        let river = River::new(small_config()).unwrap();
        let input = InputSnapshot {
            scroll_fraction: 0.5,
            pointer: Vec2::new(1.0, -1.0),
            ..Default::default()
        };

        let (z, rot) = river.camera_targets(&input);
        let tilt = std::f32::consts::PI / 20.0;
        // 5 - 0.5 * 400 * 0.7
        assert!((z - -135.0).abs() < 1e-4);
        assert!((rot.x - -tilt).abs() < 1e-6);
        assert!((rot.y - -tilt).abs() < 1e-6);
    }

    #[test]
    fn test_zero_jitter_recycles_to_exact_far_end() {
        let field = ParticleField::from_buffers(vec![0.0, 0.0, 11.0], vec![1.0; 3]).unwrap();
        let config = small_config().with_recycling(5.0, 0.0);
        let mut river = River::with_field(config, field).unwrap();

        assert_eq!(river.advance_particles(0.0), 1);
        assert_eq!(river.field().position(0).z, 5.0 - 400.0);
    }

    #[test]
    fn test_step_keeps_buffers_in_place() {
        let mut river = River::new(small_config()).unwrap();
        let ptr = river.field().positions().as_ptr();
        let len = river.field().positions().len();

        for _ in 0..100 {
            river.step(1.0 / 60.0, &InputSnapshot::default());
        }

        assert_eq!(river.field().positions().as_ptr(), ptr);
        assert_eq!(river.field().positions().len(), len);
    }

    #[test]
    fn test_zero_resize_keeps_projection_finite() {
        let mut river = River::new(small_config()).unwrap();
        river.resize(1280, 720);
        let aspect = river.camera().aspect;

        river.resize(0, 0);
        river.resize(1280, 0);

        assert_eq!(river.camera().aspect, aspect);
        assert!(river.camera().view_proj().is_finite());
    }

    #[test]
    fn test_step_follows_snapshot_viewport() {
        let mut river = River::new(small_config()).unwrap();
        let mut input = InputSnapshot {
            viewport: (1000, 500),
            ..Default::default()
        };

        river.step(0.016, &input);
        assert_eq!(river.camera().aspect, 2.0);

        input.viewport = (0, 0);
        river.step(0.016, &input);
        assert_eq!(river.camera().aspect, 2.0);
    }

    #[test]
    fn test_recycling_keeps_xy_and_color() {
        let field =
            ParticleField::from_buffers(vec![3.0, -4.0, 100.0], vec![0.1, 0.2, 0.3]).unwrap();
        let mut river = River::with_field(small_config(), field).unwrap();
        river.advance_particles(0.016);

        let p = river.field().position(0);
        assert_eq!((p.x, p.y), (3.0, -4.0));
        assert!(p.z < 0.0);
        assert_eq!(river.field().colors(), &[0.1, 0.2, 0.3]);
    }
}
