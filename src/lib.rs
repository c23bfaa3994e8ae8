//! Image-sampled animated dot matrix.
//!
//! An image is reduced to a sparse grid of colored samples, masked by a [`ShapeKind`], timed into
//! a staggered wave and drawn either by an immediate-mode [`CanvasDriver`] or as a declarative
//! [`SvgScene`].
//!
//! ```no_run
//! use dotmosaic::{FsImageLoader, HostEnvironment, MosaicOptions, MosaicSession, SampleCache};
//!
//! # fn main() -> dotmosaic::MosaicResult<()> {
//! let options = MosaicOptions::from_json_str(r#"{"src": "logo.png", "shape": "circle"}"#)?;
//! let session = MosaicSession::new(
//!     FsImageLoader::new("."),
//!     SampleCache::shared(),
//!     options,
//!     HostEnvironment::default(),
//! )?;
//! pollster::block_on(session.load());
//! let composed = session.compose();
//! println!("{} dots via {:?}", composed.dots.len(), composed.renderer);
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Wave timing, presets and color overrides.
pub mod animation;
/// Errors and colors.
pub mod foundation;
/// Device-driven grid density.
pub mod quality;
/// Renderer selection and drivers.
pub mod render;
/// Image loading, sampling and caching.
pub mod sampling;
/// Options and sessions.
pub mod session;
/// Shape masks.
pub mod shape;

pub use animation::compose::{ComposeParams, RuntimeDot, compose_runtime_dots, effective_duration};
pub use animation::gradient::{ColorOverride, GradientStop, LinearGradient};
pub use animation::preset::{AnimationPreset, WaveBounds, WaveTuning};
pub use foundation::color::Rgb8;
pub use foundation::error::{MosaicError, MosaicResult};
pub use quality::{
    CapabilityProvider, DeviceCapabilities, Quality, SystemCapabilities, effective_grid_size,
};
pub use render::FrameRGBA;
pub use render::canvas::{CanvasConfig, CanvasDriver};
pub use render::frame::{DueFrame, FrameScheduler, FrameToken, ManualFrameClock};
pub use render::select::{RenderMode, RendererKind};
pub use render::svg::{SvgConfig, SvgScene};
pub use sampling::cache::{SampleCache, SharedSampleCache};
pub use sampling::grid::MAX_GRID_SIZE;
pub use sampling::loader::{FsImageLoader, ImageLoader, LoadOutcome, MemoryImageLoader};
pub use sampling::request::{CredentialMode, Sample, SamplingRequest, SamplingResult};
pub use sampling::sampler::{ImageSampler, sample_image};
pub use session::mosaic::{Composed, Drawable, MosaicSession};
pub use session::options::{HostEnvironment, MosaicOptions, ResolvedOptions};
pub use shape::{ShapeKind, inside_shape};
