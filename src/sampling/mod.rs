//! Image acquisition and reduction to a sparse grid of colored samples.

/// Bounded, insertion-ordered memo of sampling results.
pub mod cache;
/// Lattice layout and pixel sampling.
pub mod grid;
/// Image loader collaborators.
pub mod loader;
/// Request/result data model.
pub mod request;
/// Sampling pipeline and the per-component sampler.
pub mod sampler;
