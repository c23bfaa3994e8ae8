use std::fmt::Write as _;
use std::sync::Arc;

use crate::animation::compose::RuntimeDot;
use crate::animation::preset::WaveTuning;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::render::FrameRGBA;

/// Circle opacity while a newer image is loading.
pub const LOADING_OPACITY: f64 = 0.4;

const MAX_RASTER_DIM: u32 = 16_384;

/// Static inputs of an [`SvgScene`].
#[derive(Clone, Debug, PartialEq)]
pub struct SvgConfig {
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
    /// Circle radius.
    pub dot_radius: f64,
    /// Keyframe opacity and scale bounds.
    pub tuning: WaveTuning,
    /// Default cycle length of the shared animation; each dot overrides it with its period.
    pub duration_ms: f64,
    /// CSS timing function of the wave.
    pub easing: String,
    /// Pause every animation in place.
    pub reduced_motion: bool,
}

/// Declarative driver: one animated `<circle>` per dot, timing delegated to the host.
#[derive(Clone, Debug)]
pub struct SvgScene {
    dots: Arc<[RuntimeDot]>,
    config: SvgConfig,
    loading: bool,
}

fn num(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return "0".to_owned();
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_owned()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl SvgScene {
    /// Scene for `dots`.
    pub fn new(dots: impl Into<Arc<[RuntimeDot]>>, config: SvgConfig) -> Self {
        Self {
            dots: dots.into(),
            config,
            loading: false,
        }
    }

    /// Mark the scene as loading; circles are dimmed to [`LOADING_OPACITY`].
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Dots in the scene.
    pub fn dots(&self) -> &[RuntimeDot] {
        &self.dots
    }

    /// Scene configuration.
    pub fn config(&self) -> &SvgConfig {
        &self.config
    }

    /// Serialize the scene as a standalone SVG document.
    pub fn to_svg_string(&self) -> String {
        let c = &self.config;
        let t = &c.tuning;
        let mut out = String::with_capacity(256 + self.dots.len() * 160);

        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" aria-hidden="true">"#,
            w = num(c.width),
            h = num(c.height),
        );
        let _ = write!(
            out,
            "<defs><style>\
             .rd-dot{{transform-origin:center;transform-box:fill-box;animation:rd-wave {dur}ms {ease} infinite;}}\
             @keyframes rd-wave{{\
             0%,100%{{opacity:{min_o};transform:scale({min_s});}}\
             50%{{opacity:{max_o};transform:scale({max_s});}}\
             }}</style></defs>",
            dur = num(c.duration_ms),
            ease = escape_xml(&c.easing),
            min_o = num(t.min_opacity),
            min_s = num(t.min_scale),
            max_o = num(t.max_opacity),
            max_s = num(t.max_scale),
        );

        let play_state = if c.reduced_motion { "paused" } else { "running" };
        let r = num(c.dot_radius);
        for dot in self.dots.iter() {
            let _ = write!(
                out,
                r#"<circle class="rd-dot" cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" style="animation-duration:{dur}ms;animation-delay:{delay}ms;animation-play-state:{play_state}"#,
                cx = num(dot.x),
                cy = num(dot.y),
                fill = dot.color,
                dur = num(dot.period_ms),
                delay = num(-dot.delay_ms),
            );
            if self.loading {
                let _ = write!(out, ";opacity:{}", num(LOADING_OPACITY));
            }
            out.push_str(r#""/>"#);
        }
        out.push_str("</svg>");
        out
    }

    /// Parse the serialized scene with `usvg`.
    pub fn to_tree(&self) -> MosaicResult<usvg::Tree> {
        usvg::Tree::from_str(&self.to_svg_string(), &usvg::Options::default())
            .map_err(|e| MosaicError::render(format!("parse svg scene: {e}")))
    }

    /// Render a static snapshot at `scale` device pixels per unit. Premultiplied RGBA8.
    #[tracing::instrument(skip(self), fields(dots = self.dots.len()))]
    pub fn rasterize(&self, scale: f64) -> MosaicResult<FrameRGBA> {
        let tree = self.to_tree()?;
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let size = tree.size();
        let to_px = |v: f32| -> MosaicResult<u32> {
            let px = (f64::from(v) * scale).ceil().max(1.0);
            if px > f64::from(MAX_RASTER_DIM) {
                return Err(MosaicError::render(format!(
                    "svg raster size too large: {px} (max {MAX_RASTER_DIM})"
                )));
            }
            Ok(px as u32)
        };
        let (width, height) = (to_px(size.width())?, to_px(size.height())?);

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| MosaicError::render("failed to allocate svg pixmap"))?;
        let xform = resvg::tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data().to_vec(),
            premultiplied: true,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
