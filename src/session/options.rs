use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

use crate::animation::compose::{ComposeParams, effective_duration};
use crate::animation::gradient::ColorOverride;
use crate::animation::preset::{AnimationPreset, WaveBounds, WaveTuning};
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::quality::{CapabilityProvider, DeviceCapabilities, Quality, effective_grid_size};
use crate::render::canvas::CanvasConfig;
use crate::render::select::RenderMode;
use crate::render::svg::SvgConfig;
use crate::sampling::grid::MAX_GRID_SIZE;
use crate::sampling::request::{CredentialMode, SamplingRequest};
use crate::shape::ShapeKind;

/// Grid size used when neither `gridSize` nor `dotCount` is given.
pub const DEFAULT_GRID_SIZE: u32 = 16;
/// Output width used when neither `width` nor `size` is given.
pub const DEFAULT_WIDTH: f64 = 320.0;
/// Output height used when neither `height` nor `size` is given.
pub const DEFAULT_HEIGHT: f64 = 320.0;
/// Disc radius used when `dotRadius` is unset.
pub const DEFAULT_DOT_RADIUS: f64 = 2.6;
/// Wave duration used when `duration` is unset.
pub const DEFAULT_DURATION_MS: f64 = 3400.0;
/// Timing function of the declarative wave.
pub const DEFAULT_EASING: &str = "cubic-bezier(0.33, 0, 0.2, 1)";

/// Caller-facing options, as read from JSON. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicOptions {
    /// Image source; unset or blank renders the fallback grid.
    pub src: Option<String>,
    /// Cells per side. Values below 1 count as 1; values above [`MAX_GRID_SIZE`] are rejected.
    pub grid_size: Option<i64>,
    /// Approximate total dots; overrides `gridSize` with `round(sqrt(dotCount))`.
    pub dot_count: Option<f64>,
    /// Output width in pixels.
    pub width: Option<f64>,
    /// Output height in pixels.
    pub height: Option<f64>,
    /// Square output side; overrides `width` and `height`.
    pub size: Option<f64>,
    /// Base disc radius.
    pub dot_radius: Option<f64>,
    /// Fixed spacing between dot centers.
    pub gap: Option<f64>,
    /// Wave cycle duration in milliseconds.
    pub duration: Option<f64>,
    /// CSS timing function for the declarative driver.
    pub easing: Option<String>,
    /// Mask shape; unknown names fall back to `square`.
    pub shape: Option<ShapeKind>,
    /// Playback speed multiplier.
    pub speed: Option<f64>,
    /// Overrides the preset's trough opacity.
    pub min_opacity: Option<f64>,
    /// Overrides the preset's peak opacity.
    pub max_opacity: Option<f64>,
    /// Overrides the preset's trough scale.
    pub min_scale: Option<f64>,
    /// Overrides the preset's peak scale.
    pub max_scale: Option<f64>,
    /// Renderer choice.
    pub render_mode: Option<RenderMode>,
    /// Quality profile.
    pub quality: Option<Quality>,
    /// Wave preset.
    pub animation_preset: Option<AnimationPreset>,
    /// Forces reduced motion on or off; unset follows the host preference.
    pub reduced_motion: Option<bool>,
    /// Cross-origin credential mode for image loads.
    pub cross_origin: Option<CredentialMode>,
    /// Solid or gradient color replacing sampled colors.
    pub color: Option<ColorOverride>,
}

/// Host collaborators and preferences consulted when resolving options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostEnvironment {
    /// The user asked the platform for reduced motion.
    pub prefers_reduced_motion: bool,
    /// Physical pixels per CSS pixel.
    pub device_pixel_ratio: f64,
    /// Device class for `quality: auto`.
    pub capabilities: DeviceCapabilities,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self {
            prefers_reduced_motion: false,
            device_pixel_ratio: 1.0,
            capabilities: DeviceCapabilities::default(),
        }
    }
}

impl HostEnvironment {
    /// Environment with capabilities taken from `provider`.
    pub fn from_provider(provider: &impl CapabilityProvider) -> Self {
        Self {
            capabilities: provider.capabilities(),
            ..Self::default()
        }
    }
}

/// Options after defaults, presets, quality and host preferences have been applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOptions {
    /// Image source, if any.
    pub source: Option<String>,
    /// Grid size before quality adaptation.
    pub requested_grid_size: u32,
    /// Grid size actually sampled.
    pub grid_size: u32,
    /// Output width.
    pub width: f64,
    /// Output height.
    pub height: f64,
    /// Base disc radius.
    pub dot_radius: f64,
    /// Fixed spacing, if any.
    pub gap: Option<f64>,
    /// Requested wave duration.
    pub duration_ms: f64,
    /// Declarative timing function.
    pub easing: String,
    /// Mask shape.
    pub shape: ShapeKind,
    /// Playback speed.
    pub speed: f64,
    /// Selected preset.
    pub preset: AnimationPreset,
    /// Preset constants with bound overrides.
    pub tuning: WaveTuning,
    /// Renderer choice.
    pub render_mode: RenderMode,
    /// Quality profile.
    pub quality: Quality,
    /// Reduced motion after host preference.
    pub reduced_motion: bool,
    /// Host pixel ratio.
    pub device_pixel_ratio: f64,
    /// Cross-origin credential mode.
    pub credentials: CredentialMode,
    /// Color override.
    pub color: Option<ColorOverride>,
}

fn finite(name: &str, v: f64) -> MosaicResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MosaicError::validation(format!("{name} must be finite")))
    }
}

fn non_negative(name: &str, v: f64) -> MosaicResult<f64> {
    let v = finite(name, v)?;
    if v < 0.0 {
        return Err(MosaicError::validation(format!("{name} must be >= 0")));
    }
    Ok(v)
}

fn in_range(name: &str, v: f64, lo: f64, hi: f64) -> MosaicResult<()> {
    let v = finite(name, v)?;
    if !(lo..=hi).contains(&v) {
        return Err(MosaicError::validation(format!(
            "{name} must be within [{lo}, {hi}], got {v}"
        )));
    }
    Ok(())
}

impl MosaicOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> MosaicResult<Self> {
        serde_json::from_str(json).map_err(|e| MosaicError::serde(format!("parse options: {e}")))
    }

    /// Read and parse a JSON options file.
    pub fn from_path(path: &Path) -> MosaicResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read options '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    fn requested_grid_size(&self) -> MosaicResult<u32> {
        let too_large = |name: &str| {
            MosaicError::validation(format!("{name} exceeds {MAX_GRID_SIZE} cells per side"))
        };
        if let Some(count) = self.dot_count {
            let count = non_negative("dotCount", count)?;
            let side = count.sqrt().round().max(1.0);
            if side > f64::from(MAX_GRID_SIZE) {
                return Err(too_large("dotCount"));
            }
            return Ok(side as u32);
        }
        match self.grid_size {
            None => Ok(DEFAULT_GRID_SIZE),
            Some(n) => u32::try_from(n.max(1))
                .ok()
                .filter(|&n| n <= MAX_GRID_SIZE)
                .ok_or_else(|| too_large("gridSize")),
        }
    }

    /// Apply defaults, the preset and `env`, validating every numeric field.
    pub fn resolve(&self, env: &HostEnvironment) -> MosaicResult<ResolvedOptions> {
        let (width, height) = match self.size {
            Some(size) => (size, size),
            None => (
                self.width.unwrap_or(DEFAULT_WIDTH),
                self.height.unwrap_or(DEFAULT_HEIGHT),
            ),
        };
        let width = finite("width", width)?;
        let height = finite("height", height)?;
        let dot_radius = non_negative("dotRadius", self.dot_radius.unwrap_or(DEFAULT_DOT_RADIUS))?;
        let duration_ms = non_negative("duration", self.duration.unwrap_or(DEFAULT_DURATION_MS))?;
        let speed = finite("speed", self.speed.unwrap_or(1.0))?;
        let gap = self.gap.map(|g| finite("gap", g)).transpose()?;

        let easing = self.easing.clone().unwrap_or_else(|| DEFAULT_EASING.to_owned());
        if easing.trim().is_empty() {
            return Err(MosaicError::validation("easing must be non-empty"));
        }

        let preset = self.animation_preset.unwrap_or_default();
        let tuning = preset.tuning().with_bounds(WaveBounds {
            min_opacity: self.min_opacity,
            max_opacity: self.max_opacity,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
        });
        in_range("minOpacity", tuning.min_opacity, 0.0, 1.0)?;
        in_range("maxOpacity", tuning.max_opacity, 0.0, 1.0)?;
        in_range("minScale", tuning.min_scale, 0.0, 2.0)?;
        in_range("maxScale", tuning.max_scale, 0.0, 2.0)?;

        let requested_grid_size = self.requested_grid_size()?;
        let quality = self.quality.unwrap_or_default();
        let grid_size = effective_grid_size(requested_grid_size, quality, &env.capabilities);

        Ok(ResolvedOptions {
            source: self.src.clone(),
            requested_grid_size,
            grid_size,
            width,
            height,
            dot_radius,
            gap,
            duration_ms,
            easing,
            shape: self.shape.unwrap_or_default(),
            speed,
            preset,
            tuning,
            render_mode: self.render_mode.unwrap_or_default(),
            quality,
            reduced_motion: self.reduced_motion.unwrap_or(env.prefers_reduced_motion),
            device_pixel_ratio: env.device_pixel_ratio,
            credentials: self.cross_origin.unwrap_or_default(),
            color: self.color.clone(),
        })
    }
}

impl ResolvedOptions {
    /// `duration / clamp(speed, 0.1, 10)`.
    pub fn effective_duration(&self) -> f64 {
        effective_duration(self.duration_ms, self.speed)
    }

    /// Request handed to the sampler.
    pub fn sampling_request(&self) -> SamplingRequest {
        SamplingRequest {
            source: self.source.clone(),
            grid_size: self.grid_size,
            width: self.width,
            height: self.height,
            gap: self.gap,
            credentials: self.credentials,
        }
    }

    /// Inputs for the composer.
    pub fn compose_params(&self) -> ComposeParams {
        ComposeParams {
            width: self.width,
            height: self.height,
            shape: self.shape,
            tuning: self.tuning,
            duration_ms: self.duration_ms,
            speed: self.speed,
            color: self.color.clone(),
        }
    }

    /// Configuration of the canvas driver.
    pub fn canvas_config(&self) -> CanvasConfig {
        CanvasConfig {
            width: self.width,
            height: self.height,
            device_pixel_ratio: self.device_pixel_ratio,
            dot_radius: self.dot_radius,
            tuning: self.tuning,
            reduced_motion: self.reduced_motion,
            quality: self.quality,
        }
    }

    /// Configuration of the SVG scene.
    pub fn svg_config(&self) -> SvgConfig {
        SvgConfig {
            width: self.width,
            height: self.height,
            dot_radius: self.dot_radius,
            tuning: self.tuning,
            duration_ms: self.effective_duration(),
            easing: self.easing.clone(),
            reduced_motion: self.reduced_motion,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/options.rs"]
mod tests;
