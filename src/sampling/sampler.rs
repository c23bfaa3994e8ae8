use std::cell::{Cell, RefCell};
use std::future::Future;

use image::RgbaImage;

use crate::foundation::error::{MosaicError, MosaicResult};
use crate::sampling::cache::{SampleCache, SharedSampleCache};
use crate::sampling::grid::{fallback_grid, sample_pixels};
use crate::sampling::loader::{ImageLoader, LoadOutcome};
use crate::sampling::request::{SamplingRequest, SamplingResult};

/// Largest off-screen surface side accepted for rasterizing a source image.
pub const MAX_SURFACE_DIM: u32 = 16_384;

enum Prepared {
    /// Resolved without touching the loader.
    Ready(SamplingResult),
    /// Cache miss; the loader must run.
    Load { key: String, source: String },
}

fn prepare(cache: &RefCell<SampleCache>, request: &SamplingRequest) -> Prepared {
    if !request.has_valid_box() {
        tracing::debug!(
            width = request.width,
            height = request.height,
            grid = request.grid_size,
            "invalid output box, using fallback grid"
        );
        return Prepared::Ready(SamplingResult::ready(fallback_grid(request), false));
    }
    let Some(source) = request.image_source() else {
        return Prepared::Ready(SamplingResult::ready(fallback_grid(request), false));
    };

    let key = request.cache_key();
    if let Some(hit) = cache.borrow().lookup(&key) {
        tracing::debug!(%key, "sampling cache hit");
        return Prepared::Ready(hit.clone());
    }
    tracing::debug!(%key, "sampling cache miss");
    Prepared::Load {
        key,
        source: source.to_owned(),
    }
}

/// Image rasterized at natural resolution, ready for read-back.
struct OffscreenSurface {
    pixels: RgbaImage,
}

impl OffscreenSurface {
    fn check_dims(width: u32, height: u32) -> MosaicResult<()> {
        if width == 0 || height == 0 {
            return Err(MosaicError::render("image has zero natural size"));
        }
        if width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
            return Err(MosaicError::render(format!(
                "image too large for off-screen surface: {width}x{height} (max {MAX_SURFACE_DIM})"
            )));
        }
        Ok(())
    }

    fn acquire(image: RgbaImage) -> MosaicResult<Self> {
        Self::check_dims(image.width(), image.height())?;
        Ok(Self { pixels: image })
    }
}

/// Turn a loader outcome into the terminal result for `request`.
fn complete(request: &SamplingRequest, outcome: LoadOutcome) -> SamplingResult {
    match outcome {
        LoadOutcome::Pixels(image) => match OffscreenSurface::acquire(image) {
            Ok(surface) => {
                let (w, h) = surface.pixels.dimensions();
                SamplingResult::ready(sample_pixels(w, h, Some(&surface.pixels), request), false)
            }
            Err(err) => degraded(request, &err),
        },
        LoadOutcome::Tainted { width, height } => {
            if let Err(err) = OffscreenSurface::check_dims(width, height) {
                return degraded(request, &err);
            }
            tracing::warn!(
                source = request.source.as_deref().unwrap_or(""),
                "pixel read-back denied, sampling geometry only"
            );
            SamplingResult::ready(sample_pixels(width, height, None, request), true)
        }
        LoadOutcome::Failed(err) => degraded(request, &err),
    }
}

fn degraded(request: &SamplingRequest, err: &MosaicError) -> SamplingResult {
    tracing::warn!(
        source = request.source.as_deref().unwrap_or(""),
        error = %err,
        "image sampling failed, using fallback grid"
    );
    SamplingResult::ready(fallback_grid(request), true)
}

/// Sample `request` once, consulting and filling `cache`.
///
/// Invalid boxes and missing sources resolve to a fallback grid without touching the cache. Every
/// other outcome, degraded ones included, is cached under the request's canonical key.
#[tracing::instrument(skip_all, fields(grid = request.grid_size))]
pub async fn sample_image<L: ImageLoader + ?Sized>(
    loader: &L,
    cache: &RefCell<SampleCache>,
    request: &SamplingRequest,
) -> SamplingResult {
    match prepare(cache, request) {
        Prepared::Ready(result) => result,
        Prepared::Load { key, source } => {
            let outcome = loader.load(&source, request.credentials).await;
            let result = complete(request, outcome);
            cache.borrow_mut().insert(key, result.clone());
            result
        }
    }
}

/// Per-component sampler that lets newer requests supersede in-flight ones.
///
/// Each call to [`ImageSampler::sample`] is stamped with a generation when it is *issued*. A
/// completion whose generation is no longer the newest is dropped: it neither updates
/// [`ImageSampler::state`] nor the cache.
pub struct ImageSampler<L> {
    loader: L,
    cache: SharedSampleCache,
    generation: Cell<u64>,
    state: RefCell<SamplingResult>,
}

impl<L: ImageLoader> ImageSampler<L> {
    /// Create a sampler using `loader` and the shared `cache`.
    pub fn new(loader: L, cache: SharedSampleCache) -> Self {
        Self {
            loader,
            cache,
            generation: Cell::new(0),
            state: RefCell::new(SamplingResult::pending()),
        }
    }

    /// Latest applied result. `loading` is set while the newest request is in flight.
    pub fn state(&self) -> SamplingResult {
        self.state.borrow().clone()
    }

    /// Borrow the loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Shared cache handle.
    pub fn cache(&self) -> &SharedSampleCache {
        &self.cache
    }

    /// Issue `request`, superseding any request still in flight.
    ///
    /// Synchronous outcomes (fallback grids, cache hits) are applied immediately. The returned
    /// future resolves to `None` when a newer request was issued before this one's load finished.
    pub fn sample(&self, request: SamplingRequest) -> impl Future<Output = Option<SamplingResult>> {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        let prepared = prepare(&self.cache, &request);
        match &prepared {
            Prepared::Ready(result) => *self.state.borrow_mut() = result.clone(),
            Prepared::Load { .. } => {
                let mut state = self.state.borrow_mut();
                state.loading = true;
                state.errored = false;
            }
        }

        async move {
            let (key, source) = match prepared {
                Prepared::Ready(result) => return Some(result),
                Prepared::Load { key, source } => (key, source),
            };

            let outcome = self.loader.load(&source, request.credentials).await;
            if self.generation.get() != generation {
                tracing::debug!(%key, "discarding superseded sampling result");
                return None;
            }

            let result = complete(&request, outcome);
            self.cache.borrow_mut().insert(key, result.clone());
            *self.state.borrow_mut() = result.clone();
            Some(result)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/sampler.rs"]
mod tests;
