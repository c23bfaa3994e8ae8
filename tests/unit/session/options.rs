use super::*;
use crate::foundation::color::Rgb8;

fn fast_device() -> HostEnvironment {
    HostEnvironment {
        capabilities: DeviceCapabilities {
            cores: Some(16),
            memory_gb: Some(32.0),
        },
        ..HostEnvironment::default()
    }
}

#[test]
fn empty_document_resolves_to_defaults() {
    let opts = MosaicOptions::from_json_str("{}").unwrap();
    assert_eq!(opts, MosaicOptions::default());

    let r = opts.resolve(&fast_device()).unwrap();
    assert_eq!(r.source, None);
    assert_eq!(r.requested_grid_size, 16);
    assert_eq!(r.grid_size, 16);
    assert_eq!((r.width, r.height), (320.0, 320.0));
    assert_eq!(r.dot_radius, 2.6);
    assert_eq!(r.duration_ms, 3400.0);
    assert_eq!(r.easing, DEFAULT_EASING);
    assert_eq!(r.shape, ShapeKind::Square);
    assert_eq!(r.speed, 1.0);
    assert_eq!(r.preset, AnimationPreset::Calm);
    assert_eq!(r.tuning, AnimationPreset::Calm.tuning());
    assert_eq!(r.render_mode, RenderMode::Auto);
    assert_eq!(r.quality, Quality::Auto);
    assert_eq!(r.credentials, CredentialMode::Anonymous);
    assert!(!r.reduced_motion);
    assert!(r.color.is_none());
}

#[test]
fn parses_every_field() {
    let json = r##"{
        "src": "cat.png",
        "gridSize": 20,
        "width": 200,
        "height": 100,
        "dotRadius": 3,
        "gap": 12,
        "duration": 2000,
        "easing": "linear",
        "shape": "circle",
        "speed": 2,
        "minOpacity": 0.1,
        "maxOpacity": 0.9,
        "minScale": 0.5,
        "maxScale": 1.5,
        "renderMode": "canvas",
        "quality": "high",
        "animationPreset": "vivid",
        "reducedMotion": true,
        "crossOrigin": "use-credentials",
        "color": "#00ff00"
    }"##;
    let r = MosaicOptions::from_json_str(json)
        .unwrap()
        .resolve(&HostEnvironment::default())
        .unwrap();
    assert_eq!(r.source.as_deref(), Some("cat.png"));
    assert_eq!(r.grid_size, 20);
    assert_eq!((r.width, r.height), (200.0, 100.0));
    assert_eq!(r.gap, Some(12.0));
    assert_eq!(r.shape, ShapeKind::Circle);
    assert_eq!(r.effective_duration(), 1000.0);
    assert_eq!(r.tuning.min_opacity, 0.1);
    assert_eq!(r.tuning.max_scale, 1.5);
    assert_eq!(r.tuning.stagger_factor, AnimationPreset::Vivid.tuning().stagger_factor);
    assert_eq!(r.render_mode, RenderMode::Canvas);
    assert!(r.reduced_motion);
    assert_eq!(r.credentials, CredentialMode::UseCredentials);
    assert_eq!(r.color, Some(ColorOverride::Solid(Rgb8::new(0, 255, 0))));
}

#[test]
fn size_and_dot_count_take_precedence() {
    let opts = MosaicOptions {
        size: Some(250.0),
        width: Some(100.0),
        dot_count: Some(150.0),
        grid_size: Some(4),
        quality: Some(Quality::High),
        ..MosaicOptions::default()
    };
    let r = opts.resolve(&HostEnvironment::default()).unwrap();
    assert_eq!((r.width, r.height), (250.0, 250.0));
    assert_eq!(r.grid_size, 12);

    let tiny = MosaicOptions {
        dot_count: Some(0.0),
        quality: Some(Quality::High),
        ..MosaicOptions::default()
    };
    assert_eq!(tiny.resolve(&HostEnvironment::default()).unwrap().grid_size, 1);
}

#[test]
fn grid_size_below_one_is_raised() {
    let opts = MosaicOptions {
        grid_size: Some(-3),
        quality: Some(Quality::High),
        ..MosaicOptions::default()
    };
    assert_eq!(opts.resolve(&HostEnvironment::default()).unwrap().grid_size, 1);
}

#[test]
fn quality_adapts_the_sampled_grid() {
    let opts = MosaicOptions {
        grid_size: Some(40),
        quality: Some(Quality::Low),
        ..MosaicOptions::default()
    };
    let r = opts.resolve(&HostEnvironment::default()).unwrap();
    assert_eq!(r.requested_grid_size, 40);
    assert_eq!(r.grid_size, 27);
    assert_eq!(r.sampling_request().grid_size, 27);

    let auto = MosaicOptions {
        grid_size: Some(40),
        ..MosaicOptions::default()
    };
    // Unknown capabilities count as the mid tier.
    assert_eq!(auto.resolve(&HostEnvironment::default()).unwrap().grid_size, 32);
}

#[test]
fn grid_size_above_the_ceiling_is_rejected() {
    let env = HostEnvironment::default();
    let huge = MosaicOptions::from_json_str(r#"{"gridSize": 3000000, "quality": "high"}"#).unwrap();
    let err = huge.resolve(&env).unwrap_err();
    assert!(matches!(err, MosaicError::Validation(_)), "{err}");

    let huge_count = MosaicOptions {
        dot_count: Some(1e13),
        ..MosaicOptions::default()
    };
    assert!(matches!(huge_count.resolve(&env), Err(MosaicError::Validation(_))));

    let at_limit = MosaicOptions {
        grid_size: Some(i64::from(MAX_GRID_SIZE)),
        quality: Some(Quality::High),
        ..MosaicOptions::default()
    };
    assert_eq!(at_limit.resolve(&env).unwrap().grid_size, MAX_GRID_SIZE);
}

#[test]
fn reduced_motion_follows_host_unless_set() {
    let env = HostEnvironment {
        prefers_reduced_motion: true,
        ..HostEnvironment::default()
    };
    assert!(MosaicOptions::default().resolve(&env).unwrap().reduced_motion);

    let forced_off = MosaicOptions {
        reduced_motion: Some(false),
        ..MosaicOptions::default()
    };
    assert!(!forced_off.resolve(&env).unwrap().reduced_motion);
}

#[test]
fn rejects_invalid_bounds() {
    let env = HostEnvironment::default();
    let bad = [
        MosaicOptions {
            min_opacity: Some(1.5),
            ..MosaicOptions::default()
        },
        MosaicOptions {
            max_scale: Some(2.5),
            ..MosaicOptions::default()
        },
        MosaicOptions {
            dot_radius: Some(-1.0),
            ..MosaicOptions::default()
        },
        MosaicOptions {
            duration: Some(-10.0),
            ..MosaicOptions::default()
        },
        MosaicOptions {
            width: Some(f64::NAN),
            ..MosaicOptions::default()
        },
        MosaicOptions {
            easing: Some("  ".to_string()),
            ..MosaicOptions::default()
        },
    ];
    for opts in bad {
        let err = opts.resolve(&env).unwrap_err();
        assert!(matches!(err, MosaicError::Validation(_)), "{err}");
    }
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = MosaicOptions::from_json_str("{\"gridSize\": \"big\"}").unwrap_err();
    assert!(matches!(err, MosaicError::Serde(_)));
    let err = MosaicOptions::from_json_str("{\"renderMode\": \"webgl\"}").unwrap_err();
    assert!(matches!(err, MosaicError::Serde(_)));
}

#[test]
fn unknown_shape_names_fall_back_to_square() {
    let opts = MosaicOptions::from_json_str("{\"shape\": \"star\"}").unwrap();
    assert_eq!(opts.shape, Some(ShapeKind::Square));
}

#[test]
fn from_path_reads_files() {
    let dir = std::env::temp_dir().join(format!("dotmosaic-options-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("opts.json");
    std::fs::write(&path, r#"{"gridSize": 9, "shape": "diamond"}"#).unwrap();

    let opts = MosaicOptions::from_path(&path).unwrap();
    assert_eq!(opts.grid_size, Some(9));
    assert_eq!(opts.shape, Some(ShapeKind::Diamond));

    assert!(MosaicOptions::from_path(&dir.join("missing.json")).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn derived_configs_carry_resolved_values() {
    let opts = MosaicOptions {
        speed: Some(4.0),
        reduced_motion: Some(true),
        ..MosaicOptions::default()
    };
    let env = HostEnvironment {
        device_pixel_ratio: 2.0,
        ..HostEnvironment::default()
    };
    let r = opts.resolve(&env).unwrap();

    let canvas = r.canvas_config();
    assert_eq!(canvas.device_pixel_ratio, 2.0);
    assert!(canvas.reduced_motion);

    let svg = r.svg_config();
    assert_eq!(svg.duration_ms, 850.0);
    assert_eq!(svg.easing, DEFAULT_EASING);

    let params = r.compose_params();
    assert_eq!(params.speed, 4.0);
    assert_eq!(params.duration_ms, 3400.0);
}
