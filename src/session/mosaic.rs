use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;

use crate::animation::compose::{RuntimeDot, compose_runtime_dots};
use crate::foundation::error::MosaicResult;
use crate::render::canvas::CanvasDriver;
use crate::render::frame::FrameScheduler;
use crate::render::select::RendererKind;
use crate::render::svg::SvgScene;
use crate::sampling::cache::SharedSampleCache;
use crate::sampling::loader::ImageLoader;
use crate::sampling::request::SamplingResult;
use crate::sampling::sampler::ImageSampler;
use crate::session::options::{HostEnvironment, MosaicOptions, ResolvedOptions};

/// Dots ready to draw plus the renderer that will draw them.
#[derive(Clone, Debug, PartialEq)]
pub struct Composed {
    /// Visible dots in sample order.
    pub dots: Arc<[RuntimeDot]>,
    /// Renderer picked for this dot count.
    pub renderer: RendererKind,
    /// A newer image is still loading.
    pub loading: bool,
    /// The displayed samples are a degraded fallback.
    pub errored: bool,
}

/// Mounted driver.
pub enum Drawable<S: FrameScheduler> {
    /// Continuous-redraw driver; call [`CanvasDriver::start`] to enter the frame loop.
    Canvas(CanvasDriver<S>),
    /// Declarative scene.
    Svg(SvgScene),
}

impl<S: FrameScheduler> Drawable<S> {
    /// Which renderer this is.
    pub fn kind(&self) -> RendererKind {
        match self {
            Self::Canvas(_) => RendererKind::Canvas,
            Self::Svg(_) => RendererKind::Svg,
        }
    }
}

/// One mosaic instance: options, host environment and its sampler.
///
/// All methods take `&self` so a parameter change can be made while an earlier load is still in
/// flight; the earlier completion is then discarded by the sampler.
pub struct MosaicSession<L> {
    options: RefCell<MosaicOptions>,
    env: RefCell<HostEnvironment>,
    resolved: RefCell<ResolvedOptions>,
    sampler: ImageSampler<L>,
}

impl<L: ImageLoader> MosaicSession<L> {
    /// Resolve `options` against `env`. Nothing is loaded until [`MosaicSession::load`].
    pub fn new(
        loader: L,
        cache: SharedSampleCache,
        options: MosaicOptions,
        env: HostEnvironment,
    ) -> MosaicResult<Self> {
        let resolved = options.resolve(&env)?;
        Ok(Self {
            options: RefCell::new(options),
            env: RefCell::new(env),
            resolved: RefCell::new(resolved),
            sampler: ImageSampler::new(loader, cache),
        })
    }

    /// Options as given.
    pub fn options(&self) -> MosaicOptions {
        self.options.borrow().clone()
    }

    /// Options after resolution.
    pub fn resolved(&self) -> ResolvedOptions {
        self.resolved.borrow().clone()
    }

    /// Host environment in use.
    pub fn env(&self) -> HostEnvironment {
        *self.env.borrow()
    }

    /// Issue the sampling request for the current options.
    ///
    /// Resolves to `None` when a later `load` superseded this one.
    pub fn load(&self) -> impl Future<Output = Option<SamplingResult>> + '_ {
        let request = self.resolved.borrow().sampling_request();
        self.sampler.sample(request)
    }

    /// Replace options and environment. Returns `true` when the sampling request changed and a
    /// new [`MosaicSession::load`] is needed. Invalid options leave the session untouched.
    #[tracing::instrument(skip_all)]
    pub fn update(&self, options: MosaicOptions, env: HostEnvironment) -> MosaicResult<bool> {
        let resolved = options.resolve(&env)?;
        let changed = resolved.sampling_request() != self.resolved.borrow().sampling_request();
        if changed {
            tracing::debug!(grid = resolved.grid_size, "sampling parameters changed");
        }
        *self.options.borrow_mut() = options;
        *self.env.borrow_mut() = env;
        *self.resolved.borrow_mut() = resolved;
        Ok(changed)
    }

    /// Busy indicator for the embedding UI.
    pub fn busy(&self) -> bool {
        self.sampler.state().loading
    }

    /// Latest sampling state.
    pub fn sampling_state(&self) -> SamplingResult {
        self.sampler.state()
    }

    /// Compose runtime dots from the latest samples and pick a renderer.
    pub fn compose(&self) -> Composed {
        let state = self.sampler.state();
        let resolved = self.resolved.borrow();
        let dots: Arc<[RuntimeDot]> =
            compose_runtime_dots(&state.samples, &resolved.compose_params()).into();
        Composed {
            renderer: resolved.render_mode.resolve(dots.len()),
            dots,
            loading: state.loading,
            errored: state.errored,
        }
    }

    /// Build the driver for the current composition.
    ///
    /// The canvas driver acquires its surface here and fails if the surface cannot be created.
    pub fn mount<S: FrameScheduler>(&self, scheduler: S) -> MosaicResult<Drawable<S>> {
        let composed = self.compose();
        let resolved = self.resolved.borrow();
        tracing::debug!(
            dots = composed.dots.len(),
            renderer = ?composed.renderer,
            "mounting mosaic"
        );
        match composed.renderer {
            RendererKind::Canvas => {
                let mut driver =
                    CanvasDriver::new(composed.dots, resolved.canvas_config(), scheduler)?;
                driver.set_loading(composed.loading);
                Ok(Drawable::Canvas(driver))
            }
            RendererKind::Svg => {
                let mut scene = SvgScene::new(composed.dots, resolved.svg_config());
                scene.set_loading(composed.loading);
                Ok(Drawable::Svg(scene))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/mosaic.rs"]
mod tests;
