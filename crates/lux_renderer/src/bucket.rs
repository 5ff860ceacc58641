//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel on a rayon pool sized by
//! [`ThreadUsage`](crate::ThreadUsage).

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::renderer::{encode_pixel, FrameContext};
use crate::RenderResult;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Seed for this bucket's random stream.
    ///
    /// Derived from the top-left pixel's index, so it does not depend on
    /// the render order or the pool size.
    pub fn seed(&self, base_seed: u64, image_width: u32) -> u64 {
        let pixel_index = self.y as u64 * image_width as u64 + self.x as u64;
        base_seed.wrapping_add(pixel_index)
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets nearest the image center come first so the most important
/// part of the frame finishes early.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let step = bucket_size.max(1);
    let mut buckets = Vec::new();

    for y in (0..height).step_by(step as usize) {
        for x in (0..width).step_by(step as usize) {
            let bw = step.min(width - x);
            let bh = step.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
        }
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center. Ties keep grid order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;
    let distance = |b: &Bucket| {
        let dx = b.x as f64 + b.width as f64 / 2.0 - center_x;
        let dy = b.y as f64 + b.height as f64 / 2.0 - center_y;
        dx * dx + dy * dy
    };

    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Encoded pixels in row-major order within the bucket
    pub pixels: Vec<u8>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<u8>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy this bucket's pixels into a full image buffer.
    pub fn blit(&self, image: &mut [u8], image_width: u32, channels: usize) {
        let row_len = image_width as usize * channels;
        let bucket_row_len = self.bucket.width as usize * channels;
        let x_offset = self.bucket.x as usize * channels;

        for (local_y, src) in self.pixels.chunks_exact(bucket_row_len).enumerate() {
            let start = (self.bucket.y as usize + local_y) * row_len + x_offset;
            image[start..start + bucket_row_len].copy_from_slice(src);
        }
    }
}

/// Render a single bucket with its own seeded random stream.
pub fn render_bucket(bucket: &Bucket, ctx: &FrameContext<'_>, base_seed: u64) -> BucketResult {
    let channels = ctx.image.color_channels as usize;
    let mut rng = StdRng::seed_from_u64(bucket.seed(base_seed, ctx.image.width));
    let mut pixels = vec![0u8; bucket.pixel_count() as usize * channels];

    let bucket_row_len = bucket.width as usize * channels;
    for (local_y, row) in pixels.chunks_exact_mut(bucket_row_len).enumerate() {
        let y = bucket.y + local_y as u32;
        for (local_x, pixel) in row.chunks_exact_mut(channels).enumerate() {
            let color = ctx.render_pixel(bucket.x + local_x as u32, y, &mut rng);
            encode_pixel(color, ctx.quantization, pixel);
        }
    }

    BucketResult::new(*bucket, pixels)
}

fn bucket_pool(workers: usize) -> RenderResult<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("lux-bucket-{}", i))
        .build()?;
    Ok(pool)
}

/// Render every bucket on a dedicated pool of `workers` threads and write
/// them into `image`.
pub(crate) fn render_buckets(
    ctx: &FrameContext<'_>,
    bucket_size: u32,
    base_seed: u64,
    workers: usize,
    image: &mut [u8],
) -> RenderResult<()> {
    let buckets = generate_buckets(ctx.image.width, ctx.image.height, bucket_size);
    let pool = bucket_pool(workers)?;
    log::debug!(
        "Rendering {} buckets of up to {}x{} on {} rayon threads",
        buckets.len(),
        bucket_size,
        bucket_size,
        pool.current_num_threads()
    );

    let results: Vec<BucketResult> = pool.install(|| {
        buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, ctx, base_seed))
            .collect()
    });

    let channels = ctx.image.color_channels as usize;
    for result in &results {
        result.blit(image, ctx.image.width, channels);
    }
    Ok(())
}
