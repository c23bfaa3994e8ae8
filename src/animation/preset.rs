use serde::{Deserialize, Serialize};

/// Named bundle of wave tuning constants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationPreset {
    /// Soft, slow shimmer.
    #[default]
    Calm,
    /// High contrast, wider stagger.
    Vivid,
    /// Barely-there motion.
    Minimal,
}

/// Tuning constants for the wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WaveTuning {
    /// Opacity at the wave trough.
    pub min_opacity: f64,
    /// Opacity at the wave peak.
    pub max_opacity: f64,
    /// Scale at the wave trough.
    pub min_scale: f64,
    /// Scale at the wave peak.
    pub max_scale: f64,
    /// Blend between diagonal (0) and radial (1) phase progress.
    pub phase_mix: f64,
    /// Jitter of the phase offset, as a fraction of the effective duration.
    pub phase_spread_factor: f64,
    /// Jitter of the cycle period, in milliseconds.
    pub duration_spread: f64,
    /// Stagger span, as a fraction of the effective duration.
    pub stagger_factor: f64,
}

impl AnimationPreset {
    /// Constants for this preset.
    pub const fn tuning(self) -> WaveTuning {
        match self {
            Self::Calm => WaveTuning {
                min_opacity: 0.48,
                max_opacity: 0.96,
                min_scale: 0.9,
                max_scale: 1.03,
                phase_mix: 0.22,
                phase_spread_factor: 0.12,
                duration_spread: 180.0,
                stagger_factor: 0.26,
            },
            Self::Vivid => WaveTuning {
                min_opacity: 0.3,
                max_opacity: 1.0,
                min_scale: 0.82,
                max_scale: 1.08,
                phase_mix: 0.34,
                phase_spread_factor: 0.2,
                duration_spread: 320.0,
                stagger_factor: 0.34,
            },
            Self::Minimal => WaveTuning {
                min_opacity: 0.62,
                max_opacity: 0.9,
                min_scale: 0.95,
                max_scale: 1.01,
                phase_mix: 0.16,
                phase_spread_factor: 0.08,
                duration_spread: 120.0,
                stagger_factor: 0.2,
            },
        }
    }
}

/// Caller-supplied opacity/scale bounds. Unset fields keep the preset value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaveBounds {
    /// Override for [`WaveTuning::min_opacity`].
    pub min_opacity: Option<f64>,
    /// Override for [`WaveTuning::max_opacity`].
    pub max_opacity: Option<f64>,
    /// Override for [`WaveTuning::min_scale`].
    pub min_scale: Option<f64>,
    /// Override for [`WaveTuning::max_scale`].
    pub max_scale: Option<f64>,
}

impl WaveTuning {
    /// Apply explicit bounds on top of these constants.
    pub fn with_bounds(self, bounds: WaveBounds) -> Self {
        Self {
            min_opacity: bounds.min_opacity.unwrap_or(self.min_opacity),
            max_opacity: bounds.max_opacity.unwrap_or(self.max_opacity),
            min_scale: bounds.min_scale.unwrap_or(self.min_scale),
            max_scale: bounds.max_scale.unwrap_or(self.max_scale),
            ..self
        }
    }

    /// Opacity at `phase` in `[0, 1]`, before depth and loading attenuation.
    pub fn opacity_at(&self, phase: f64) -> f64 {
        lerp(self.min_opacity, self.max_opacity, phase)
    }

    /// Scale at `phase` in `[0, 1]`.
    pub fn scale_at(&self, phase: f64) -> f64 {
        lerp(self.min_scale, self.max_scale, phase)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/animation/preset.rs"]
mod tests;
