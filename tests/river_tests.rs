//! Integration tests for the frame step.
//!
//! These drive a [`River`] through many frames the way the windowed runner
//! does and check the motion, recycling, camera and bloom rules hold.

use std::path::Path;

use cosmic_river::prelude::*;
use cosmic_river::ParticleField;

fn tiny_config() -> RiverConfig {
    RiverConfig::default()
        .with_tunnel_length(100.0)
        .with_speed(10.0)
        .with_recycling(5.0, 10.0)
        .with_seed(3)
}

fn scrolled(fraction: f32) -> InputSnapshot {
    InputSnapshot {
        scroll_fraction: fraction,
        ..Default::default()
    }
}

// ============================================================================
// Particle motion
// ============================================================================

#[test]
fn test_three_particle_frame() {
    let field = ParticleField::from_buffers(
        vec![
            1.0, 2.0, -50.0, //
            -1.0, 0.5, -6.0, //
            4.0, -3.0, 1.0,
        ],
        vec![0.5; 9],
    )
    .unwrap();
    let mut river = River::with_field(tiny_config(), field).unwrap();

    let report = river.step(1.0, &InputSnapshot::default());

    assert_eq!(report.recycled, 1);
    assert_eq!(report.recycle_camera_z, 5.0);
    assert_eq!(river.field().position(0).z, -40.0);
    assert_eq!(river.field().position(1).z, 4.0);

    // 5 - 100 - 10 plus up to twice the offset
    let recycled = river.field().position(2);
    assert!(recycled.z >= -105.0 && recycled.z <= -85.0, "z = {}", recycled.z);
    assert_eq!((recycled.x, recycled.y), (4.0, -3.0));
}

#[test]
fn test_particles_stay_in_front_of_recycle_line() {
    let config = tiny_config().with_particle_count(2_000);
    let threshold = config.reset_threshold;
    let mut river = River::new(config).unwrap();

    for frame in 0..600 {
        let fraction = (frame as f32 / 600.0).min(0.7);
        let report = river.step(1.0 / 30.0, &scrolled(fraction));
        let limit = report.recycle_camera_z + threshold;

        for z in river.field().depths() {
            assert!(z <= limit, "frame {}: z {} past {}", frame, z, limit);
        }
    }
}

#[test]
fn test_recycled_depths_land_at_far_end() {
    let config = tiny_config().with_particle_count(1_000).with_speed(200.0);
    let mut river = River::new(config).unwrap();
    let camera_z = river.camera().position.z;

    let before: Vec<f32> = river.field().depths().collect();
    let report = river.step(0.5, &InputSnapshot::default());
    assert!(report.recycled > 0);

    let mut seen = 0;
    for (old, new) in before.iter().zip(river.field().depths()) {
        if (new - (old + 100.0)).abs() > 1e-3 {
            assert!(new >= camera_z - 110.0 && new <= camera_z - 90.0, "z = {}", new);
            seen += 1;
        }
    }
    assert_eq!(seen, report.recycled);
}

#[test]
fn test_zero_delta_moves_nothing() {
    let mut river = River::new(tiny_config().with_particle_count(200)).unwrap();
    let before = river.field().positions().to_vec();

    let report = river.step(0.0, &InputSnapshot::default());

    assert_eq!(report.recycled, 0);
    assert_eq!(river.field().positions(), &before[..]);
}

#[test]
fn test_count_and_colors_never_change() {
    let mut river = River::new(tiny_config().with_particle_count(300)).unwrap();
    let colors = river.field().colors().to_vec();

    for _ in 0..240 {
        river.step(1.0 / 60.0, &scrolled(0.3));
    }

    assert_eq!(river.field().len(), 300);
    assert_eq!(river.field().colors(), &colors[..]);
}

// ============================================================================
// Camera and bloom
// ============================================================================

#[test]
fn test_camera_converges_monotonically() {
    let mut river = River::new(tiny_config().with_particle_count(10)).unwrap();
    let input = InputSnapshot {
        scroll_fraction: 0.5,
        pointer: Vec2::new(0.5, 0.25),
        ..Default::default()
    };
    let tilt = std::f32::consts::PI / 20.0;
    let (target_z, target_rotation) = river.camera_targets(&input);

    // x follows pointer.y, y follows -pointer.x
    assert!((target_rotation.x - 0.25 * tilt).abs() < 1e-6);
    assert!((target_rotation.y - -0.5 * tilt).abs() < 1e-6);

    let mut z_gap = (river.camera().position.z - target_z).abs();
    let mut rotation_gap = river.camera().rotation.distance(target_rotation);
    for frame in 0..200 {
        let report = river.step(1.0 / 60.0, &input);
        let camera = river.camera();

        let new_z_gap = (report.camera_z - target_z).abs();
        let new_rotation_gap = camera.rotation.distance(target_rotation);
        assert!(new_z_gap < z_gap, "frame {}: z gap {} -> {}", frame, z_gap, new_z_gap);
        assert!(
            new_rotation_gap < rotation_gap,
            "frame {}: rotation gap {} -> {}",
            frame,
            rotation_gap,
            new_rotation_gap
        );
        assert!(report.camera_z >= target_z);
        assert!(camera.rotation.x <= target_rotation.x);
        assert!(camera.rotation.y >= target_rotation.y);

        z_gap = new_z_gap;
        rotation_gap = new_rotation_gap;
    }

    for _ in 0..300 {
        river.step(1.0 / 60.0, &input);
    }
    assert!((river.camera().position.z - target_z).abs() < 0.01);
    assert!(river.camera().rotation.distance(target_rotation) < 1e-4);
}

#[test]
fn test_camera_returns_when_scrolled_back() {
    let mut river = River::new(tiny_config().with_particle_count(10)).unwrap();

    for _ in 0..300 {
        river.step(1.0 / 60.0, &scrolled(0.7));
    }
    let deep = river.camera().position.z;
    for _ in 0..300 {
        river.step(1.0 / 60.0, &InputSnapshot::default());
    }

    assert!(deep < -40.0);
    assert!((river.camera().position.z - 5.0).abs() < 0.1);
}

#[test]
fn test_bloom_follows_scroll() {
    let mut river = River::new(tiny_config().with_particle_count(10)).unwrap();

    assert_eq!(river.step(0.016, &scrolled(0.0)).bloom_strength, 1.5);
    assert_eq!(river.step(0.016, &scrolled(1.0)).bloom_strength, 3.0);

    let mid = river.step(0.016, &scrolled(0.5)).bloom_strength;
    assert!((mid - 2.25).abs() < 1e-5);
}

#[test]
fn test_input_state_caps_scroll() {
    let mut input = InputState::new(6000.0, 0.7);
    input.scroll_by(1_000_000.0);

    let mut river = River::new(tiny_config().with_particle_count(10)).unwrap();
    let report = river.step(0.016, &input.snapshot());

    assert!((input.snapshot().scroll_fraction - 0.7).abs() < 1e-6);
    assert!((report.bloom_strength - 2.55).abs() < 1e-5);
}

// ============================================================================
// Frame loop
// ============================================================================

#[test]
fn test_frame_loop_drives_river() {
    let mut river = River::new(tiny_config().with_particle_count(100)).unwrap();
    let mut frames = FrameLoop::new(FixedFrames::new(1.0 / 60.0, 120), CancelToken::new());
    let mut recycled = 0;

    let ran = frames.run(|delta| {
        recycled += river.step(delta, &scrolled(0.2)).recycled;
    });

    assert_eq!(ran, 120);
    assert!(recycled > 0);
}

#[test]
fn test_frame_loop_cancel_stops_updates() {
    let mut river = River::new(tiny_config().with_particle_count(100)).unwrap();
    let token = CancelToken::new();
    let mut frames = FrameLoop::new(FixedFrames::new(1.0 / 60.0, 10_000), token.clone());
    let mut steps = 0;

    frames.run(|delta| {
        river.step(delta, &InputSnapshot::default());
        steps += 1;
        if steps == 10 {
            token.cancel();
        }
    });

    assert_eq!(steps, 10);
    let after = river.field().positions().to_vec();
    frames.run(|delta| {
        river.step(delta, &InputSnapshot::default());
    });
    assert_eq!(river.field().positions(), &after[..]);
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_demo_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/cosmic-river.ron");
    let config = RiverConfig::load(&path).unwrap();

    assert_eq!(config.particle_count, 30_000);
    assert_eq!(config.window_width, 1600);
    assert_eq!(config.initial_camera_z, 5.0);
    config.validate().unwrap();
}

#[test]
fn test_seeded_rivers_match() {
    let mut a = River::new(tiny_config().with_particle_count(50)).unwrap();
    let mut b = River::new(tiny_config().with_particle_count(50)).unwrap();

    for _ in 0..200 {
        a.step(0.05, &scrolled(0.4));
        b.step(0.05, &scrolled(0.4));
    }

    assert_eq!(a.field().positions(), b.field().positions());
}
