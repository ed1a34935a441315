//! Integration tests for scene construction and the per-frame rules.
//!
//! Everything here runs without a GPU: the scene is built from a seeded rng
//! and driven by explicit elapsed times.

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use snowfield::prelude::*;
use snowfield::{cycle_hue, group_spin};

fn build(config: &SnowfieldConfig, seed: u64) -> (Scene, TextureRegistry) {
    let mut textures = TextureRegistry::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let viewport = Viewport::new(800, 600, 1.0, config.camera.max_pixel_ratio);
    let scene = Scene::new(config, viewport, &mut textures, &mut rng).unwrap();
    (scene, textures)
}

fn default_scene() -> (Scene, TextureRegistry) {
    build(&SnowfieldConfig::default(), 42)
}

// ============================================================================
// Particle generation
// ============================================================================

#[test]
fn test_positions_within_bounds() {
    let (scene, _) = default_scene();
    for p in scene.positions().iter() {
        for c in p.to_array() {
            assert!((-1000.0..=1000.0).contains(&c), "coordinate {c} out of range");
        }
    }
}

#[test]
fn test_positions_shared_by_all_groups() {
    let (scene, _) = default_scene();
    assert_eq!(scene.positions().len(), 10_000);
    assert_eq!(scene.groups().len(), 5);

    for group in scene.groups() {
        assert!(Arc::ptr_eq(group.positions(), scene.positions()));
        assert_eq!(group.positions().len(), 10_000);
        assert_eq!(&group.positions()[..], &scene.positions()[..]);
    }
}

#[test]
fn test_seed_reproduces_scene() {
    let (a, _) = build(&SnowfieldConfig::default(), 7);
    let (b, _) = build(&SnowfieldConfig::default(), 7);
    let (c, _) = build(&SnowfieldConfig::default(), 8);

    assert_eq!(&a.positions()[..], &b.positions()[..]);
    assert_ne!(&a.positions()[..], &c.positions()[..]);
    for (ga, gb) in a.groups().iter().zip(b.groups()) {
        assert_eq!(ga.rotation, gb.rotation);
    }
}

#[test]
fn test_groups_have_distinct_sizes_and_colors() {
    let (scene, _) = default_scene();

    let sizes: Vec<f32> = scene.groups().iter().map(|g| g.material.size).collect();
    assert_eq!(sizes, vec![20.0, 15.0, 10.0, 8.0, 5.0]);

    let colors: HashSet<[u32; 3]> = scene
        .groups()
        .iter()
        .map(|g| {
            let c = g.material.base_color();
            [c.h.to_bits(), c.s.to_bits(), c.l.to_bits()]
        })
        .collect();
    assert_eq!(colors.len(), 5);
}

#[test]
fn test_materials_are_additive_without_depth_test() {
    let (scene, _) = default_scene();
    for group in scene.groups() {
        assert_eq!(group.material.blending, BlendMode::Additive);
        assert!(!group.material.depth_test);
    }
}

#[test]
fn test_initial_rotations_in_range() {
    let (scene, _) = default_scene();
    for group in scene.groups() {
        assert!(group.rotation.min_element() >= 0.0);
        assert!(group.rotation.max_element() < std::f32::consts::TAU);
    }
}

// ============================================================================
// Per-frame update
// ============================================================================

#[test]
fn test_hue_at_time_zero_is_base_hue() {
    let (mut scene, _) = default_scene();
    scene.update(0.0);

    for group in scene.groups() {
        let base = group.material.base_color().h;
        let hue = group.material.color.h;
        // Base hue 1.0 is a full turn and reads back as 0.0
        assert!((hue - base.rem_euclid(1.0)).abs() < 1e-5, "{hue} != {base}");
    }
}

#[test]
fn test_hue_wraps_at_boundary() {
    let (mut scene, _) = default_scene();
    scene.update(20.0);

    // Group 0 has base hue 1.0: 360 * (1.0 + 20 * 0.05) = 720 wraps to 0
    assert_eq!(scene.groups()[0].material.color.h, 0.0);
    for group in scene.groups() {
        let h = group.material.color.h;
        assert!((0.0..1.0).contains(&h));
    }
}

#[test]
fn test_hue_holds_saturation_and_lightness() {
    let (mut scene, _) = default_scene();
    for t in [0.0, 1.0, 13.7, 600.0] {
        scene.update(t);
        for group in scene.groups() {
            let base = group.material.base_color();
            assert_eq!(group.material.color.s, base.s);
            assert_eq!(group.material.color.l, base.l);
            assert!((group.material.color.h - cycle_hue(base.h, t, 0.05)).abs() < 1e-6);
        }
    }
}

#[test]
fn test_group_rotation_rule() {
    let (mut scene, _) = default_scene();
    scene.update(8.0);

    let ys: Vec<f32> = scene.groups().iter().map(|g| g.rotation.y).collect();
    let expected = [0.4, 0.8, 1.2, 1.6, -2.0];
    for (i, (got, want)) in ys.iter().zip(expected).enumerate() {
        assert!((got - want).abs() < 1e-5, "group {i}: {got} != {want}");
        assert_eq!(*got, group_spin(i, 8.0, 0.05));
    }
}

#[test]
fn test_frame_state_depends_only_on_elapsed() {
    let (mut stepped, _) = default_scene();
    let (mut jumped, _) = default_scene();

    for i in 1..=120 {
        stepped.update(i as f32 / 60.0);
    }
    jumped.update(2.0);

    for (a, b) in stepped.groups().iter().zip(jumped.groups()) {
        assert!((a.rotation.y - b.rotation.y).abs() < 1e-5);
        assert!((a.material.color.h - b.material.color.h).abs() < 1e-5);
    }
}

#[test]
fn test_camera_eases_and_looks_at_origin() {
    let (mut scene, _) = default_scene();
    let start = scene.camera().position;
    scene.update(0.016);

    let p = scene.camera().position;
    assert!(p.x.abs() < start.x.abs());
    assert!(p.y.abs() < start.y.abs());
    assert_eq!(scene.camera().target(), Vec3::ZERO);
}

#[test]
fn test_drift_target_from_config() {
    let mut config = SnowfieldConfig::default();
    config.camera.drift_target = [10.0, -10.0];
    let (mut scene, _) = build(&config, 1);

    for _ in 0..40 {
        scene.update(0.0);
    }
    let p = scene.camera().position;
    assert!((p.x - 10.0).abs() < 0.5, "x = {}", p.x);
    assert!((p.y + 10.0).abs() < 0.5, "y = {}", p.y);
}

// ============================================================================
// Texture toggle
// ============================================================================

#[test]
fn test_texture_toggle() {
    let (mut scene, textures) = default_scene();
    let assigned: Vec<_> = scene
        .groups()
        .iter()
        .map(|g| g.material.assigned_map())
        .collect();
    assert_eq!(textures.len(), 5);
    assert!(assigned.iter().all(Option::is_some));

    scene.set_textures_enabled(false);
    assert!(!scene.textures_enabled());
    for group in scene.groups() {
        assert_eq!(group.material.map(), None);
        assert!(group.material.needs_update());
    }

    scene.set_textures_enabled(true);
    for (group, original) in scene.groups().iter().zip(&assigned) {
        assert_eq!(group.material.map(), *original);
        assert!(group.material.needs_update());
    }
}

#[test]
fn test_groups_get_configured_sprites() {
    let (scene, textures) = default_scene();
    let paths: Vec<_> = scene
        .groups()
        .iter()
        .map(|g| textures.path(g.material.map().unwrap()).unwrap().to_path_buf())
        .collect();
    let expected = [
        "textures/snowflake2.png",
        "textures/snowflake3.png",
        "textures/snowflake1.png",
        "textures/snowflake5.png",
        "textures/snowflake4.png",
    ];
    for (got, want) in paths.iter().zip(expected) {
        assert_eq!(got, std::path::Path::new(want));
    }
}

#[test]
fn test_textures_disabled_in_config() {
    let mut config = SnowfieldConfig::default();
    config.textures_enabled = false;
    let (scene, _) = build(&config, 3);

    assert!(!scene.textures_enabled());
    for group in scene.groups() {
        assert_eq!(group.material.map(), None);
        assert!(group.material.assigned_map().is_some());
    }
}

#[test]
fn test_real_sprite_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let sprite = dir.path().join("flake.png");
    image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]))
        .save(&sprite)
        .unwrap();

    let mut config = SnowfieldConfig::default();
    config.particle_count = 16;
    for group in &mut config.groups {
        group.texture = sprite.clone();
    }
    let (scene, textures) = build(&config, 4);

    // All groups share the one file and therefore one slot
    assert_eq!(textures.len(), 1);
    let handle = scene.groups()[0].material.map().unwrap();
    assert!(textures.is_resolved(handle));
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_resize_updates_camera_and_renderer() {
    let (mut scene, _) = default_scene();
    assert!((scene.camera().aspect - 800.0 / 600.0).abs() < 1e-6);

    assert!(scene.resize(1024, 768, 1.0));
    assert!((scene.camera().aspect - 1024.0 / 768.0).abs() < 1e-6);
    let viewport = scene.viewport();
    assert_eq!((viewport.width, viewport.height), (1024, 768));
    assert_eq!(viewport.physical_size(), (1024, 768));
}

#[test]
fn test_resize_caps_pixel_ratio() {
    let (mut scene, _) = default_scene();
    scene.resize(1024, 768, 3.0);
    assert_eq!(scene.viewport().pixel_ratio, 2.0);
    assert_eq!(scene.viewport().physical_size(), (2048, 1536));
}

#[test]
fn test_resize_leaves_other_state_alone() {
    let (mut scene, _) = default_scene();
    scene.update(3.0);
    let before = scene.clone();

    scene.resize(1024, 768, 1.0);
    assert_eq!(scene.camera().position, before.camera().position);
    assert_eq!(scene.camera().fov, before.camera().fov);
    for (a, b) in scene.groups().iter().zip(before.groups()) {
        assert_eq!(a.rotation, b.rotation);
        assert_eq!(a.material.color, b.material.color);
    }
}

// ============================================================================
// Config files
// ============================================================================

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snowfield.json");

    let mut config = SnowfieldConfig::default();
    config.seed = Some(99);
    config.particle_count = 500;
    config.save(&path).unwrap();

    let loaded = SnowfieldConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_scene_rejects_invalid_config() {
    let mut config = SnowfieldConfig::default();
    config.extent = -1.0;
    let mut textures = TextureRegistry::new();
    let mut rng = StdRng::seed_from_u64(0);
    let viewport = Viewport::new(800, 600, 1.0, 2.0);

    assert!(matches!(
        Scene::new(&config, viewport, &mut textures, &mut rng),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_missing_config_file() {
    assert!(matches!(
        SnowfieldConfig::from_file("no/such/config.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_builder_applies_settings() {
    let viewer = Snowfield::new()
        .with_particle_count(123)
        .with_seed(5)
        .with_window_size(640, 480)
        .with_title("Flakes")
        .with_textures_enabled(false);
    let config = viewer.config();
    assert_eq!(config.particle_count, 123);
    assert_eq!(config.seed, Some(5));
    assert_eq!((config.width, config.height), (640, 480));
    assert_eq!(config.title, "Flakes");
    assert!(!config.textures_enabled);
}
