use serde::Serialize;

use crate::animation::gradient::ColorOverride;
use crate::animation::preset::WaveTuning;
use crate::foundation::color::{FALLBACK_COLOR, Rgb8};
use crate::sampling::request::Sample;
use crate::shape::{ShapeKind, inside_shape};

/// Shortest allowed wave cycle.
pub const MIN_PERIOD_MS: f64 = 700.0;
/// Brightness lost at the outermost radial position.
pub const DEPTH_FALLOFF: f64 = 0.22;

const SPEED_MIN: f64 = 0.1;
const SPEED_MAX: f64 = 10.0;

/// A visible dot with its resolved color and wave timing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDot {
    /// Grid column.
    pub grid_x: u32,
    /// Grid row.
    pub grid_y: u32,
    /// Horizontal position in output pixels.
    pub x: f64,
    /// Vertical position in output pixels.
    pub y: f64,
    /// Lowercase `#rrggbb`.
    pub color: String,
    /// Same color as separate channels.
    pub rgb: [u8; 3],
    /// Phase offset of the wave.
    pub delay_ms: f64,
    /// Full cycle length, at least [`MIN_PERIOD_MS`].
    pub period_ms: f64,
    /// Brightness multiplier in `[1 - DEPTH_FALLOFF, 1]`.
    pub depth: f64,
}

impl RuntimeDot {
    /// Wave phase in `[0, 1]` at `time_ms`. Reduced motion pins every dot at mid-phase.
    pub fn phase_at(&self, time_ms: f64, reduced_motion: bool) -> f64 {
        if reduced_motion {
            return 0.5;
        }
        let turns = (time_ms + self.delay_ms) / self.period_ms;
        0.5 + 0.5 * (turns * std::f64::consts::TAU).sin()
    }
}

/// Inputs for [`compose_runtime_dots`].
#[derive(Clone, Debug)]
pub struct ComposeParams {
    /// Output box width in pixels.
    pub width: f64,
    /// Output box height in pixels.
    pub height: f64,
    /// Mask applied to sample positions.
    pub shape: ShapeKind,
    /// Preset constants with any bound overrides applied.
    pub tuning: WaveTuning,
    /// Requested cycle duration.
    pub duration_ms: f64,
    /// Playback speed multiplier, clamped to `[0.1, 10]`.
    pub speed: f64,
    /// Replaces sampled colors when set.
    pub color: Option<ColorOverride>,
}

/// `duration / clamp(speed, 0.1, 10)`. A non-finite speed counts as 1.
pub fn effective_duration(duration_ms: f64, speed: f64) -> f64 {
    let speed = if speed.is_finite() { speed } else { 1.0 };
    duration_ms / speed.clamp(SPEED_MIN, SPEED_MAX)
}

/// Deterministic jitter in `[0, 1)` for a grid cell.
pub fn phase_hash(grid_x: u32, grid_y: u32) -> f64 {
    let n = (f64::from(grid_x) * 12.9898 + f64::from(grid_y) * 78.233).sin() * 43758.5453;
    n - n.floor()
}

fn normalized(v: f64, extent: f64) -> f64 {
    if extent > 0.0 { v / extent } else { 0.0 }
}

/// Samples whose normalized position lies inside `shape`, in input order.
pub fn visible_samples(
    samples: &[Sample],
    width: f64,
    height: f64,
    shape: ShapeKind,
) -> Vec<&Sample> {
    if shape == ShapeKind::Square {
        return samples.iter().collect();
    }
    samples
        .iter()
        .filter(|s| inside_shape(normalized(s.x, width), normalized(s.y, height), shape))
        .collect()
}

/// Mask, time and color `samples`.
///
/// The layout center and radial normalization come from the grid extent of the *visible* set, so
/// a mask shrinks the wave field along with the dots. Output order follows input order.
#[tracing::instrument(skip_all, fields(samples = samples.len(), shape = params.shape.as_str()))]
pub fn compose_runtime_dots(samples: &[Sample], params: &ComposeParams) -> Vec<RuntimeDot> {
    let visible = visible_samples(samples, params.width, params.height, params.shape);
    let Some(max_x) = visible.iter().map(|s| s.grid_x).max() else {
        return Vec::new();
    };
    let max_y = visible.iter().map(|s| s.grid_y).max().unwrap_or(0);
    let (max_x, max_y) = (f64::from(max_x), f64::from(max_y));

    let tuning = &params.tuning;
    let effective = effective_duration(params.duration_ms, params.speed);
    let (cx, cy) = (max_x / 2.0, max_y / 2.0);
    let max_dist = match cx.hypot(cy) {
        d if d > 0.0 => d,
        _ => 1.0,
    };
    let diag_span = max_x + max_y + 1.0;

    visible
        .into_iter()
        .map(|s| {
            let (gx, gy) = (f64::from(s.grid_x), f64::from(s.grid_y));
            let jitter = phase_hash(s.grid_x, s.grid_y) - 0.5;
            let diagonal = (gx + gy) / diag_span;
            let radial = (gx - cx).hypot(gy - cy) / max_dist;

            let progress = (1.0 - tuning.phase_mix) * diagonal + tuning.phase_mix * radial;
            let base = progress * effective * tuning.stagger_factor;
            let delay_ms = base + jitter * effective * tuning.phase_spread_factor;
            let period_ms = (effective + jitter * tuning.duration_spread).max(MIN_PERIOD_MS);

            let rgb = match &params.color {
                Some(over) => over.resolve(
                    normalized(s.x, params.width),
                    normalized(s.y, params.height),
                ),
                None => Rgb8::from_hex6(&s.color).unwrap_or(FALLBACK_COLOR),
            };

            RuntimeDot {
                grid_x: s.grid_x,
                grid_y: s.grid_y,
                x: s.x,
                y: s.y,
                color: rgb.to_hex(),
                rgb: rgb.channels(),
                delay_ms,
                period_ms,
                depth: 1.0 - radial * DEPTH_FALLOFF,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/compose.rs"]
mod tests;
