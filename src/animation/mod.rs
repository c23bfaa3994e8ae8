//! Shape masking, wave timing and color resolution for sampled dots.

/// Runtime dot composition.
pub mod compose;
/// Solid and linear-gradient color overrides.
pub mod gradient;
/// Named wave tuning presets.
pub mod preset;
