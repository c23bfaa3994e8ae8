use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Cross-origin access mode requested when loading an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialMode {
    /// Plain request without CORS. Cross-origin pixels are unreadable.
    #[serde(rename = "", alias = "none")]
    None,
    /// CORS request without credentials.
    #[default]
    Anonymous,
    /// CORS request with credentials.
    UseCredentials,
}

impl CredentialMode {
    /// Stable identifier used in cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Anonymous => "anonymous",
            Self::UseCredentials => "use-credentials",
        }
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grid cell sampled from the source image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    /// Column in the sampling grid.
    pub grid_x: u32,
    /// Row in the sampling grid.
    pub grid_y: u32,
    /// Horizontal position in the output box, in pixels.
    pub x: f64,
    /// Vertical position in the output box, in pixels.
    pub y: f64,
    /// Representative color as `#rrggbb`.
    pub color: String,
}

/// Parameters that fully determine a [`SamplingResult`].
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingRequest {
    /// Image source identifier. `None` or blank selects the fallback grid.
    pub source: Option<String>,
    /// Requested cells per side.
    pub grid_size: u32,
    /// Output box width in pixels.
    pub width: f64,
    /// Output box height in pixels.
    pub height: f64,
    /// Fixed spacing between dot centers. `None` spreads dots across the box.
    pub gap: Option<f64>,
    /// Cross-origin mode handed to the loader.
    pub credentials: CredentialMode,
}

impl SamplingRequest {
    /// Canonical cache key: source, grid size, output box, gap (or `auto`) and credential mode.
    pub fn cache_key(&self) -> String {
        let gap = match self.effective_gap() {
            Some(g) => g.to_string(),
            None => "auto".to_owned(),
        };
        format!(
            "{}|{}|{}x{}|{}|{}",
            self.source.as_deref().unwrap_or(""),
            self.grid_size,
            self.width,
            self.height,
            gap,
            self.credentials
        )
    }

    /// Gap override if it is usable (finite and positive).
    pub fn effective_gap(&self) -> Option<f64> {
        self.gap.filter(|g| g.is_finite() && *g > 0.0)
    }

    pub(crate) fn has_valid_box(&self) -> bool {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        ok(self.width) && ok(self.height) && self.grid_size >= 1
    }

    pub(crate) fn image_source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Output of sampling: the dot lattice plus load status flags.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingResult {
    /// Samples in row-major order (`grid_y`, then `grid_x`).
    pub samples: Arc<[Sample]>,
    /// An image acquisition is in flight.
    pub loading: bool,
    /// Pixel data could not be read; samples are a degraded fallback.
    pub errored: bool,
}

impl SamplingResult {
    pub(crate) fn ready(samples: Vec<Sample>, errored: bool) -> Self {
        Self {
            samples: samples.into(),
            loading: false,
            errored,
        }
    }

    /// Initial state before any request completed.
    pub fn pending() -> Self {
        Self {
            samples: Arc::from(Vec::new()),
            loading: true,
            errored: false,
        }
    }
}
