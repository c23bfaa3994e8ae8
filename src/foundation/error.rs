/// Convenience result alias used across the crate.
pub type MosaicResult<T> = Result<T, MosaicError>;

/// Error type for option parsing, asset loading and surface acquisition.
///
/// Sampling itself never returns this to the embedder: every sampling failure resolves to a
/// fallback grid with `errored = true`. Loaders still report *why* a load failed through this type
/// so the sampler can log it.
#[derive(thiserror::Error, Debug)]
pub enum MosaicError {
    /// Invalid option value or malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image source could not be read or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Drawing surface could not be acquired or rendered.
    #[error("render error: {0}")]
    Render(String),

    /// Option (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MosaicError {
    /// Build a [`MosaicError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MosaicError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`MosaicError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MosaicError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
