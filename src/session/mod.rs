//! Render entry point: options, host environment and the per-instance session.

/// Mosaic session and mounted drivers.
pub mod mosaic;
/// Option files and their resolution.
pub mod options;
