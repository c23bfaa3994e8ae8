//! Shared error type and color helpers.

/// sRGB color parsing and hex encoding.
pub mod color;
/// Crate error type.
pub mod error;
