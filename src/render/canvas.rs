use std::sync::Arc;

use kurbo::Shape as _;

use crate::animation::compose::RuntimeDot;
use crate::animation::preset::WaveTuning;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::quality::Quality;
use crate::render::FrameRGBA;
use crate::render::frame::{FrameScheduler, FrameToken, ManualFrameClock};

/// Upper bound applied to the host's device pixel ratio.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;
/// Opacity multiplier while a newer image is loading.
pub const LOADING_DIM: f64 = 0.55;

/// Static inputs of a [`CanvasDriver`].
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasConfig {
    /// Output width in CSS pixels.
    pub width: f64,
    /// Output height in CSS pixels.
    pub height: f64,
    /// Host device pixel ratio; clamped by [`clamp_device_pixel_ratio`].
    pub device_pixel_ratio: f64,
    /// Base disc radius before wave scaling.
    pub dot_radius: f64,
    /// Opacity and scale bounds.
    pub tuning: WaveTuning,
    /// Freeze every dot at mid-phase and stop the frame loop.
    pub reduced_motion: bool,
    /// `Low` draws only every other frame.
    pub quality: Quality,
}

/// Pixel ratio actually used: `[1, 2]`, non-finite values count as 1.
pub fn clamp_device_pixel_ratio(dpr: f64) -> f64 {
    if dpr.is_finite() {
        dpr.clamp(1.0, MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Per-frame look of one dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotAppearance {
    /// Wave phase in `[0, 1]`.
    pub phase: f64,
    /// Fill opacity in `[0, 1]`.
    pub opacity: f64,
    /// Wave scale factor.
    pub scale: f64,
    /// Disc radius in CSS pixels.
    pub radius: f64,
}

/// Evaluate the wave for `dot` at `time_ms`.
pub fn dot_appearance(
    dot: &RuntimeDot,
    time_ms: f64,
    config: &CanvasConfig,
    loading: bool,
) -> DotAppearance {
    let phase = dot.phase_at(time_ms, config.reduced_motion);
    let dim = if loading { LOADING_DIM } else { 1.0 };
    let opacity = (config.tuning.opacity_at(phase) * dot.depth * dim).clamp(0.0, 1.0);
    let scale = config.tuning.scale_at(phase);
    DotAppearance {
        phase,
        opacity,
        scale,
        radius: config.dot_radius * scale,
    }
}

struct CanvasSurface {
    width: u16,
    height: u16,
    scale: f64,
    pixmap: vello_cpu::Pixmap,
}

impl CanvasSurface {
    fn acquire(config: &CanvasConfig) -> MosaicResult<Self> {
        let scale = clamp_device_pixel_ratio(config.device_pixel_ratio);
        let side = |v: f64, what: &str| -> MosaicResult<u16> {
            if !v.is_finite() {
                return Err(MosaicError::render(format!("canvas {what} must be finite")));
            }
            let px = (v * scale).round().max(1.0);
            if px > f64::from(u16::MAX) {
                return Err(MosaicError::render(format!(
                    "canvas {what} exceeds u16: {px}"
                )));
            }
            Ok(px as u16)
        };
        let width = side(config.width, "width")?;
        let height = side(config.height, "height")?;
        tracing::debug!(width, height, scale, "acquired canvas surface");
        Ok(Self {
            width,
            height,
            scale,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn circle_path(x: f64, y: f64, radius: f64) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in kurbo::Circle::new((x, y), radius).path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Immediate-mode driver: clears and redraws every dot on each scheduled frame.
///
/// The surface is acquired on construction (or on [`CanvasDriver::start`] after a stop) and
/// released by [`CanvasDriver::stop`]. Dropping the driver stops it.
pub struct CanvasDriver<S: FrameScheduler> {
    dots: Arc<[RuntimeDot]>,
    config: CanvasConfig,
    scheduler: S,
    surface: Option<CanvasSurface>,
    pending: Option<FrameToken>,
    loading: bool,
    frame_count: u64,
    drawn: u64,
    last: Option<FrameRGBA>,
}

impl<S: FrameScheduler> CanvasDriver<S> {
    /// Acquire a surface for `config`. Fails when a side does not fit the surface limits.
    pub fn new(
        dots: impl Into<Arc<[RuntimeDot]>>,
        config: CanvasConfig,
        scheduler: S,
    ) -> MosaicResult<Self> {
        let surface = CanvasSurface::acquire(&config)?;
        Ok(Self {
            dots: dots.into(),
            config,
            scheduler,
            surface: Some(surface),
            pending: None,
            loading: false,
            frame_count: 0,
            drawn: 0,
            last: None,
        })
    }

    /// Draw the first frame at `time_ms` and enter the frame loop.
    pub fn start(&mut self, time_ms: f64) -> MosaicResult<()> {
        self.cancel_pending();
        if self.surface.is_none() {
            self.surface = Some(CanvasSurface::acquire(&self.config)?);
        }
        self.frame_count = 0;
        self.draw(time_ms)?;
        self.schedule_next();
        Ok(())
    }

    /// Handle a frame callback. Returns `true` when a frame was drawn.
    ///
    /// Tokens other than the one currently pending are ignored.
    pub fn on_frame(&mut self, token: FrameToken, time_ms: f64) -> MosaicResult<bool> {
        if self.pending != Some(token) {
            tracing::debug!(?token, "ignoring stale frame callback");
            return Ok(false);
        }
        self.pending = None;
        self.frame_count += 1;

        if self.config.quality == Quality::Low && self.frame_count % 2 == 1 {
            self.schedule_next();
            return Ok(false);
        }
        self.draw(time_ms)?;
        self.schedule_next();
        Ok(true)
    }

    /// Draw one frame at `time_ms` outside the frame loop.
    pub fn render_at(&mut self, time_ms: f64) -> MosaicResult<&FrameRGBA> {
        self.draw(time_ms)?;
        self.last
            .as_ref()
            .ok_or_else(|| MosaicError::render("canvas produced no frame"))
    }

    /// Cancel the pending frame and release the surface.
    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.surface.take().is_some() {
            tracing::debug!(frames = self.drawn, "released canvas surface");
        }
    }

    /// Dim subsequent frames while `loading`.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Last drawn frame, premultiplied RGBA8.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.last.as_ref()
    }

    /// A frame callback is pending.
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames drawn since construction.
    pub fn frames_drawn(&self) -> u64 {
        self.drawn
    }

    /// Surface size in device pixels, while acquired.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface
            .as_ref()
            .map(|s| (u32::from(s.width), u32::from(s.height)))
    }

    /// Dots being drawn.
    pub fn dots(&self) -> &[RuntimeDot] {
        &self.dots
    }

    /// Driver configuration.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Borrow the scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutably borrow the scheduler.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn schedule_next(&mut self) {
        if !self.config.reduced_motion {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
    }

    fn draw(&mut self, time_ms: f64) -> MosaicResult<()> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| MosaicError::render("canvas surface was released"))?;

        clear_pixmap(&mut surface.pixmap);
        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        ctx.set_transform(vello_cpu::kurbo::Affine::scale(surface.scale));

        for dot in self.dots.iter() {
            let look = dot_appearance(dot, time_ms, &self.config, self.loading);
            if look.opacity <= 0.0 || look.radius <= 0.0 {
                continue;
            }
            let [r, g, b] = dot.rgb;
            let alpha = (look.opacity * 255.0).round() as u8;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, alpha));
            ctx.fill_path(&circle_path(dot.x, dot.y, look.radius));
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);
        self.drawn += 1;
        self.last = Some(FrameRGBA {
            width: u32::from(surface.width),
            height: u32::from(surface.height),
            data: surface.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        });
        Ok(())
    }
}

impl CanvasDriver<ManualFrameClock> {
    /// Advance the owned clock by `step_ms` and dispatch the frame that came due.
    pub fn tick(&mut self, step_ms: f64) -> MosaicResult<bool> {
        match self.scheduler.advance(step_ms) {
            Some(due) => self.on_frame(due.token, due.time_ms),
            None => Ok(false),
        }
    }
}

impl<S: FrameScheduler> Drop for CanvasDriver<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
