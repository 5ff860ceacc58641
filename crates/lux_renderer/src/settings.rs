//! Image and render configuration.
//!
//! Everything here is plain data with serde support so a front end can
//! load it from a scene file.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{RenderError, RenderResult};
use lux_math::Interval;

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Channel range kept by [`Quantization::Reference`] before scaling.
const INTENSITY: Interval = Interval::new(0.0, 0.999);

/// Output shape and sampling parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    /// Bounce budget per camera sample; 0 renders black
    pub max_bounces: u32,
    /// 3 for RGB, 4 for RGB plus opaque alpha
    pub color_channels: u8,
    /// Where the front end should write the image, if anywhere
    pub target: Option<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            samples_per_pixel: 16,
            max_bounces: 6,
            color_channels: 3,
            target: None,
        }
    }
}

impl ImageConfig {
    /// Image of the given size with default sampling.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set sampling quality.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_bounces: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_bounces = max_bounces;
        self
    }

    pub fn with_channels(mut self, color_channels: u8) -> Self {
        self.color_channels = color_channels;
        self
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::ZeroSamples);
        }
        if !matches!(self.color_channels, 3 | 4) {
            return Err(RenderError::UnsupportedChannels(self.color_channels));
        }
        Ok(())
    }

    /// Bytes in one row of pixels.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.color_channels as usize
    }

    /// Bytes in the whole image.
    pub fn buffer_len(&self) -> usize {
        self.row_len() * self.height as usize
    }
}

/// How many worker threads a row-band render uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadUsage {
    /// Every hardware thread
    All,
    /// Leave two hardware threads for the rest of the system
    #[default]
    AllMinusTwo,
    Half,
    Single,
    /// Exactly this many workers
    Fixed(usize),
}

impl ThreadUsage {
    /// Worker count given `available` hardware threads, never below 1.
    pub fn worker_count(self, available: usize) -> usize {
        let count = match self {
            ThreadUsage::All => available,
            ThreadUsage::AllMinusTwo => available.saturating_sub(2),
            ThreadUsage::Half => available / 2,
            ThreadUsage::Single => 1,
            ThreadUsage::Fixed(n) => n,
        };
        count.max(1)
    }

    /// Worker count for this machine.
    pub fn resolve(self) -> usize {
        let available = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        self.worker_count(available)
    }
}

/// How completed rows reach the rows-processed callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowDelivery {
    /// Workers call back concurrently with only their own row.
    #[default]
    OwnRow,
    /// Workers copy the row into a locked mirror and call back while
    /// holding the lock, with the full image.
    Serialized,
    /// Workers send rows to the calling thread, which writes them and
    /// calls back with the full image.
    Collector,
}

/// Mapping from a gamma-corrected channel to a byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    /// Clamp to [0, 0.999], scale by 256 and truncate.
    #[default]
    Reference,
    /// Scale by 256 and truncate without the upper clamp.
    Unclamped256,
}

impl Quantization {
    /// Quantize one channel. Saturates at 255; NaN maps to 0.
    pub fn quantize(self, value: f64) -> u8 {
        if value.is_nan() {
            return 0;
        }
        let value = match self {
            Quantization::Reference => INTENSITY.clamp(value),
            Quantization::Unclamped256 => value.max(0.0),
        };
        (value * 256.0).min(255.0) as u8
    }
}

/// Work distribution strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheduler {
    /// One OS thread per contiguous band of rows, with row callbacks.
    #[default]
    RowBands,
    /// Square tiles in spiral order on the rayon pool. No row callbacks.
    Buckets { size: u32 },
}

impl Scheduler {
    /// Bucket scheduler with [`DEFAULT_BUCKET_SIZE`].
    pub fn buckets() -> Self {
        Scheduler::Buckets {
            size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Render-wide settings that do not change the scene itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Base seed; each worker or bucket derives its own stream from it.
    ///
    /// Row-band workers seed with `seed + band index`, so the image also
    /// depends on the band count. With `AllMinusTwo`, `Half` or `All` that
    /// follows the host's core count; use [`ThreadUsage::Fixed`] or
    /// [`Scheduler::Buckets`] for output that matches across machines.
    pub seed: u64,
    pub thread_usage: ThreadUsage,
    pub row_delivery: RowDelivery,
    pub quantization: Quantization,
    pub scheduler: Scheduler,
}

impl RenderSettings {
    pub fn validate(&self) -> RenderResult<()> {
        if let Scheduler::Buckets { size: 0 } = self.scheduler {
            return Err(RenderError::ZeroBucketSize);
        }
        Ok(())
    }
}
