use super::*;
use crate::animation::gradient::{GradientStop, LinearGradient};
use crate::animation::preset::AnimationPreset;
use crate::sampling::grid::fallback_grid;
use crate::sampling::request::{CredentialMode, SamplingRequest};

fn grid(n: u32, gap: Option<f64>) -> Vec<Sample> {
    fallback_grid(&SamplingRequest {
        source: None,
        grid_size: n,
        width: 300.0,
        height: 300.0,
        gap,
        credentials: CredentialMode::Anonymous,
    })
}

fn params(shape: ShapeKind) -> ComposeParams {
    ComposeParams {
        width: 300.0,
        height: 300.0,
        shape,
        tuning: AnimationPreset::Calm.tuning(),
        duration_ms: 3400.0,
        speed: 1.0,
        color: None,
    }
}

#[test]
fn effective_duration_clamps_speed() {
    assert_eq!(effective_duration(2000.0, 2.0), 1000.0);
    assert_eq!(effective_duration(2000.0, 0.0), 20000.0);
    assert_eq!(effective_duration(2000.0, 50.0), 200.0);
    assert_eq!(effective_duration(2000.0, f64::NAN), 2000.0);
}

#[test]
fn phase_hash_is_deterministic_and_in_unit_range() {
    for gx in 0..24 {
        for gy in 0..24 {
            let h = phase_hash(gx, gy);
            assert!((0.0..1.0).contains(&h), "{gx},{gy} -> {h}");
            assert_eq!(h, phase_hash(gx, gy));
        }
    }
    assert_eq!(phase_hash(0, 0), 0.0);
}

#[test]
fn square_keeps_every_sample_in_order() {
    let samples = grid(5, None);
    let dots = compose_runtime_dots(&samples, &params(ShapeKind::Square));
    assert_eq!(dots.len(), 25);
    for (dot, s) in dots.iter().zip(&samples) {
        assert_eq!((dot.grid_x, dot.grid_y), (s.grid_x, s.grid_y));
        assert_eq!((dot.x, dot.y), (s.x, s.y));
        assert_eq!(dot.color, "#1a1a1a");
        assert_eq!(dot.rgb, [26, 26, 26]);
    }
}

#[test]
fn circle_mask_drops_the_corners_of_a_centered_grid() {
    let samples = grid(4, Some(75.0));
    let dots = compose_runtime_dots(&samples, &params(ShapeKind::Circle));
    assert_eq!(dots.len(), 12);
    for corner in [(0, 0), (3, 0), (0, 3), (3, 3)] {
        assert!(!dots.iter().any(|d| (d.grid_x, d.grid_y) == corner));
    }
}

#[test]
fn periods_respect_the_floor() {
    let mut p = params(ShapeKind::Square);
    p.duration_ms = 100.0;
    for dot in compose_runtime_dots(&grid(6, None), &p) {
        assert_eq!(dot.period_ms, MIN_PERIOD_MS);
    }

    p.duration_ms = 3400.0;
    p.tuning = AnimationPreset::Vivid.tuning();
    for dot in compose_runtime_dots(&grid(6, None), &p) {
        assert!(dot.period_ms >= MIN_PERIOD_MS);
        assert!((dot.period_ms - 3400.0).abs() <= 160.0);
    }
}

#[test]
fn depth_falls_off_toward_the_corners() {
    let dots = compose_runtime_dots(&grid(3, None), &params(ShapeKind::Square));
    let at = |x: u32, y: u32| dots.iter().find(|d| d.grid_x == x && d.grid_y == y).unwrap();
    assert_eq!(at(1, 1).depth, 1.0);
    assert!((at(0, 0).depth - 0.78).abs() < 1e-12);
    assert!((at(2, 2).depth - 0.78).abs() < 1e-12);
    assert!(at(1, 0).depth > 0.78 && at(1, 0).depth < 1.0);
}

#[test]
fn delay_follows_the_formula() {
    let p = params(ShapeKind::Square);
    let dots = compose_runtime_dots(&grid(4, None), &p);
    let t = p.tuning;
    for dot in &dots {
        let (gx, gy) = (f64::from(dot.grid_x), f64::from(dot.grid_y));
        let diagonal = (gx + gy) / 7.0;
        let radial = (gx - 1.5).hypot(gy - 1.5) / 1.5f64.hypot(1.5);
        let jitter = phase_hash(dot.grid_x, dot.grid_y) - 0.5;
        let expected = ((1.0 - t.phase_mix) * diagonal + t.phase_mix * radial)
            * 3400.0
            * t.stagger_factor
            + jitter * 3400.0 * t.phase_spread_factor;
        assert!((dot.delay_ms - expected).abs() < 1e-9);
    }
}

#[test]
fn speed_shortens_the_cycle() {
    let mut p = params(ShapeKind::Square);
    p.duration_ms = 2000.0;
    p.speed = 2.0;
    let dot = &compose_runtime_dots(&grid(1, None), &p)[0];
    // Cell (0, 0) hashes to 0, so jitter sits at its lower bound.
    assert!((dot.period_ms - 910.0).abs() < 1e-9);
    assert!((dot.delay_ms + 60.0).abs() < 1e-9);
    assert_eq!(dot.depth, 1.0);
}

#[test]
fn color_override_replaces_sampled_colors() {
    let mut p = params(ShapeKind::Square);
    p.color = Some(ColorOverride::Solid(Rgb8::new(0xff, 0, 0)));
    assert!(
        compose_runtime_dots(&grid(3, None), &p)
            .iter()
            .all(|d| d.color == "#ff0000" && d.rgb == [255, 0, 0])
    );

    let black = GradientStop {
        offset: 0.0,
        color: Rgb8::new(0, 0, 0),
    };
    let white = GradientStop {
        offset: 1.0,
        color: Rgb8::new(255, 255, 255),
    };
    p.color = Some(ColorOverride::Linear(
        LinearGradient::new(180.0, vec![black, white]).unwrap(),
    ));
    let dots = compose_runtime_dots(&grid(3, None), &p);
    assert_eq!(dots[0].rgb, [0, 0, 0]);
    assert_eq!(dots[8].rgb, [255, 255, 255]);
    assert!(dots[3].rgb[0] > 0 && dots[3].rgb[0] < 255);
}

#[test]
fn recomposition_is_idempotent() {
    let samples = grid(7, None);
    let p = params(ShapeKind::Hexagon);
    assert_eq!(compose_runtime_dots(&samples, &p), compose_runtime_dots(&samples, &p));
}

#[test]
fn empty_input_yields_no_dots() {
    assert!(compose_runtime_dots(&[], &params(ShapeKind::Circle)).is_empty());
}

#[test]
fn phase_is_mid_under_reduced_motion_and_bounded_otherwise() {
    let dot = &compose_runtime_dots(&grid(2, None), &params(ShapeKind::Square))[3];
    assert_eq!(dot.phase_at(1234.0, true), 0.5);
    for i in 0..50 {
        let ph = dot.phase_at(f64::from(i) * 97.0, false);
        assert!((0.0..=1.0).contains(&ph));
    }
}
