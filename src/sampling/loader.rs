use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{MosaicError, MosaicResult};
use crate::sampling::request::CredentialMode;

/// Terminal outcome of one image acquisition.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Decoded with readable pixels (straight-alpha RGBA8).
    Pixels(RgbaImage),
    /// Decoded, but pixel access is denied (cross-origin taint). Only the natural size is known.
    Tainted {
        /// Natural width in pixels.
        width: u32,
        /// Natural height in pixels.
        height: u32,
    },
    /// Network, access or decode failure.
    Failed(MosaicError),
}

/// Asset loader collaborator consumed by the sampler.
///
/// Implementations may suspend while the resource is fetched. Failures are reported through
/// [`LoadOutcome::Failed`], never by panicking.
#[allow(async_fn_in_trait)]
pub trait ImageLoader {
    /// Acquire `source` honoring `credentials`.
    async fn load(&self, source: &str, credentials: CredentialMode) -> LoadOutcome;
}

impl<L: ImageLoader + ?Sized> ImageLoader for &L {
    async fn load(&self, source: &str, credentials: CredentialMode) -> LoadOutcome {
        (**self).load(source, credentials).await
    }
}

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> MosaicResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Normalize and validate loader-relative source paths.
///
/// The normalized result uses `/` separators, drops `.` segments and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> MosaicResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.starts_with('/') {
        return Err(MosaicError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(MosaicError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MosaicError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MosaicError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Loads images from a directory. Local files are same-origin, so pixels are always readable.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    /// Resolve sources relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory sources are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, source: &str) -> MosaicResult<RgbaImage> {
        let norm = normalize_rel_path(source)?;
        let path = self.root.join(Path::new(&norm));
        let bytes = std::fs::read(&path).map_err(|e| {
            MosaicError::asset(format!("failed to read image '{}': {e}", path.display()))
        })?;
        decode_image(&bytes)
    }
}

impl ImageLoader for FsImageLoader {
    async fn load(&self, source: &str, _credentials: CredentialMode) -> LoadOutcome {
        match self.read(source) {
            Ok(img) => LoadOutcome::Pixels(img),
            Err(err) => LoadOutcome::Failed(err),
        }
    }
}

/// Where a resource is served from, relative to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceOrigin {
    /// Same origin as the host; always readable.
    SameOrigin,
    /// Foreign origin with its CORS grants.
    CrossOrigin {
        /// Responds to anonymous CORS requests.
        allow_anonymous: bool,
        /// Responds to credentialed CORS requests.
        allow_credentials: bool,
    },
}

/// Pixel access granted for a resource under a credential mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelAccess {
    /// Pixels can be read back.
    Readable,
    /// Image loads, pixels cannot be read back.
    Tainted,
    /// CORS request rejected; the load fails.
    Blocked,
}

impl ResourceOrigin {
    /// Resolve access the way a browser does for `<img crossorigin>`.
    pub fn access(self, credentials: CredentialMode) -> PixelAccess {
        match self {
            Self::SameOrigin => PixelAccess::Readable,
            Self::CrossOrigin {
                allow_anonymous,
                allow_credentials,
            } => {
                let granted = match credentials {
                    CredentialMode::None => return PixelAccess::Tainted,
                    CredentialMode::Anonymous => allow_anonymous,
                    CredentialMode::UseCredentials => allow_credentials,
                };
                if granted {
                    PixelAccess::Readable
                } else {
                    PixelAccess::Blocked
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
struct MemoryResource {
    bytes: Arc<[u8]>,
    origin: ResourceOrigin,
}

/// In-memory resource table, for embedders that fetch bytes themselves and for tests.
#[derive(Debug, Default)]
pub struct MemoryImageLoader {
    resources: HashMap<String, MemoryResource>,
    loads: Cell<usize>,
}

impl MemoryImageLoader {
    /// Empty loader; every source fails until inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes for `source` served from the host's origin.
    pub fn insert(&mut self, source: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.insert_with_origin(source, bytes, ResourceOrigin::SameOrigin);
    }

    /// Register encoded bytes for `source` served from `origin`.
    pub fn insert_with_origin(
        &mut self,
        source: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        origin: ResourceOrigin,
    ) {
        self.resources.insert(
            source.into(),
            MemoryResource {
                bytes: bytes.into(),
                origin,
            },
        );
    }

    /// Number of `load` calls served so far.
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }
}

impl ImageLoader for MemoryImageLoader {
    async fn load(&self, source: &str, credentials: CredentialMode) -> LoadOutcome {
        self.loads.set(self.loads.get() + 1);
        let Some(res) = self.resources.get(source) else {
            return LoadOutcome::Failed(MosaicError::asset(format!(
                "no resource registered for '{source}'"
            )));
        };

        let access = res.origin.access(credentials);
        if access == PixelAccess::Blocked {
            return LoadOutcome::Failed(MosaicError::asset(format!(
                "cross-origin request for '{source}' rejected ({credentials})"
            )));
        }

        match decode_image(&res.bytes) {
            Ok(img) if access == PixelAccess::Tainted => LoadOutcome::Tainted {
                width: img.width(),
                height: img.height(),
            },
            Ok(img) => LoadOutcome::Pixels(img),
            Err(err) => LoadOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/loader.rs"]
mod tests;
