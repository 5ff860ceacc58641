//! Render errors.
//!
//! Configuration problems surface when a [`Camera`](crate::Camera) or
//! [`Scene`](crate::Scene) is built. Worker failures surface from
//! [`Scene::render`](crate::Scene::render). Numeric degeneracies during
//! tracing (parallel rays, zero-length scatter directions) are not errors;
//! they simply produce no hit or no scatter.

use thiserror::Error;

/// Errors that can occur while configuring or running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Unsupported color channel count: {0} (expected 3 or 4)")]
    UnsupportedChannels(u8),

    #[error("Bucket size must be non-zero")]
    ZeroBucketSize,

    #[error("Degenerate camera basis: {0}")]
    DegenerateCamera(String),

    #[error("Invalid camera parameter: {0}")]
    InvalidCamera(String),

    #[error("Failed to spawn render worker: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    #[error("Failed to build bucket thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Render worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
