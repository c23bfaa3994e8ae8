use serde::Deserialize;

use crate::foundation::color::Rgb8;
use crate::foundation::error::{MosaicError, MosaicResult};

/// Default gradient direction in degrees (CSS convention: top to bottom).
pub const DEFAULT_GRADIENT_ANGLE: f64 = 180.0;

/// Color applied to every dot instead of its sampled color.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorOverride {
    /// One color for all dots.
    Solid(Rgb8),
    /// Position-dependent linear gradient.
    Linear(LinearGradient),
}

impl ColorOverride {
    /// Color at normalized layout position `(nx, ny)`.
    pub fn resolve(&self, nx: f64, ny: f64) -> Rgb8 {
        match self {
            Self::Solid(c) => *c,
            Self::Linear(g) => g.color_at(g.project(nx, ny)),
        }
    }
}

/// One gradient stop.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient axis in `[0, 1]`.
    pub offset: f64,
    /// Stop color.
    pub color: Rgb8,
}

/// Linear gradient with stops sorted by offset.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    angle_deg: f64,
    stops: Vec<GradientStop>,
}

impl LinearGradient {
    /// Build a gradient. Stops are clamped to `[0, 1]` and stably sorted by offset.
    pub fn new(angle_deg: f64, mut stops: Vec<GradientStop>) -> MosaicResult<Self> {
        if !angle_deg.is_finite() {
            return Err(MosaicError::validation("gradient angle must be finite"));
        }
        if stops.is_empty() {
            return Err(MosaicError::validation("gradient needs at least one stop"));
        }
        for stop in &mut stops {
            if !stop.offset.is_finite() {
                return Err(MosaicError::validation("gradient stop offset must be finite"));
            }
            stop.offset = stop.offset.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Ok(Self { angle_deg, stops })
    }

    /// Gradient direction in degrees.
    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    /// Stops in ascending offset order.
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Project a normalized position onto the gradient axis, clamped to `[0, 1]`.
    ///
    /// The axis runs through the box center along `(sin a, -cos a)` and spans the box corners, so
    /// `0deg` paints bottom to top and `90deg` left to right.
    pub fn project(&self, nx: f64, ny: f64) -> f64 {
        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        let half_len = (sin.abs() + cos.abs()) / 2.0;
        let along = (nx - 0.5) * sin - (ny - 0.5) * cos;
        (0.5 + along / (2.0 * half_len)).clamp(0.0, 1.0)
    }

    /// Color at axis position `t`: clamped to the end stops, linear in RGB between them.
    pub fn color_at(&self, t: f64) -> Rgb8 {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return crate::foundation::color::FALLBACK_COLOR;
        };
        let t = t.clamp(0.0, 1.0);
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t < a.offset || t > b.offset {
                continue;
            }
            let span = b.offset - a.offset;
            if span <= 0.0 {
                return b.color;
            }
            let f = (t - a.offset) / span;
            let mix = |x: u8, y: u8| {
                (f64::from(x) + (f64::from(y) - f64::from(x)) * f)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            return Rgb8::new(
                mix(a.color.r, b.color.r),
                mix(a.color.g, b.color.g),
                mix(a.color.b, b.color.b),
            );
        }
        last.color
    }
}

impl<'de> Deserialize<'de> for ColorOverride {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "lowercase")]
        enum Kind {
            Linear,
        }

        #[derive(Deserialize)]
        struct GradientRepr {
            #[serde(rename = "type")]
            _kind: Kind,
            #[serde(default)]
            angle: Option<f64>,
            stops: Vec<GradientStop>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Gradient(GradientRepr),
            Solid(Rgb8),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Solid(c) => Ok(Self::Solid(c)),
            Repr::Gradient(g) => {
                LinearGradient::new(g.angle.unwrap_or(DEFAULT_GRADIENT_ANGLE), g.stops)
                    .map(Self::Linear)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/gradient.rs"]
mod tests;
