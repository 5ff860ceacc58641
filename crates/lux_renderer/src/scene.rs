//! Scene: world, camera and pixel buffer, plus the render entry point.
//!
//! The default scheduler splits the image into contiguous row bands and
//! renders each band on its own scoped OS thread. Pixel writes go to
//! disjoint slices of the buffer and need no locking. How finished rows
//! reach the rows-processed callback is chosen by [`RowDelivery`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::band::{partition_rows, RowBand};
use crate::bucket::render_buckets;
use crate::renderer::FrameContext;
use crate::{
    Camera, Geometry, ImageConfig, RenderError, RenderResult, RenderSettings, RowDelivery, Scheduler,
};

/// Progress report for one finished row.
#[derive(Debug, Clone, Copy)]
pub struct RowsProcessed<'a> {
    /// Index of the worker that rendered the row
    pub worker: usize,
    /// Image row, 0 at the top
    pub row: u32,
    /// Encoded bytes of that row
    pub row_pixels: &'a [u8],
    /// Whole image as delivered so far. `None` under [`RowDelivery::OwnRow`].
    pub image: Option<&'a [u8]>,
}

/// Rows-processed callback. May be called from several threads at once.
pub type RowsCallback = dyn Fn(&RowsProcessed<'_>) + Send + Sync;

/// A renderable scene that owns its output buffer.
pub struct Scene {
    world: Geometry,
    camera: Camera,
    image: ImageConfig,
    settings: RenderSettings,
    pixels: Vec<u8>,
    on_rows_processed: Option<Box<RowsCallback>>,
}

impl Scene {
    /// Create a scene with default settings.
    ///
    /// Fails if the image configuration is invalid.
    pub fn new(world: impl Into<Geometry>, camera: Camera, image: ImageConfig) -> RenderResult<Self> {
        image.validate()?;
        let pixels = vec![0; image.buffer_len()];

        Ok(Self {
            world: world.into(),
            camera,
            image,
            settings: RenderSettings::default(),
            pixels,
            on_rows_processed: None,
        })
    }

    /// Replace the render settings.
    pub fn with_settings(mut self, settings: RenderSettings) -> RenderResult<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    pub fn world(&self) -> &Geometry {
        &self.world
    }

    pub fn set_world(&mut self, world: impl Into<Geometry>) {
        self.world = world.into();
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn image(&self) -> &ImageConfig {
        &self.image
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Register the callback invoked after each finished row.
    ///
    /// Only the row-band scheduler reports rows.
    pub fn set_on_rows_processed<F>(&mut self, callback: F)
    where
        F: Fn(&RowsProcessed<'_>) + Send + Sync + 'static,
    {
        self.on_rows_processed = Some(Box::new(callback));
    }

    /// Rendered pixels: row-major, top row first, `color_channels` bytes each.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Render the whole image, blocking until every worker has finished.
    pub fn render(&mut self) -> RenderResult<()> {
        let start = Instant::now();
        self.pixels.fill(0);

        let ctx = FrameContext {
            camera: &self.camera,
            world: &self.world,
            image: &self.image,
            quantization: self.settings.quantization,
        };
        let seed = self.settings.seed;

        match self.settings.scheduler {
            Scheduler::RowBands => {
                let bands = partition_rows(self.image.height, self.settings.thread_usage.resolve());
                log::info!(
                    "Rendering {}x{} at {} spp on {} row bands ({:?} delivery)",
                    self.image.width,
                    self.image.height,
                    self.image.samples_per_pixel,
                    bands.len(),
                    self.settings.row_delivery
                );

                let callback = self.on_rows_processed.as_deref();
                let pixels = self.pixels.as_mut_slice();
                match self.settings.row_delivery {
                    RowDelivery::OwnRow => render_own_row(&ctx, &bands, seed, callback, pixels)?,
                    RowDelivery::Serialized => render_serialized(&ctx, &bands, seed, callback, pixels)?,
                    RowDelivery::Collector => render_collector(&ctx, &bands, seed, callback, pixels)?,
                }
            }
            Scheduler::Buckets { size } => {
                let workers = self.settings.thread_usage.resolve();
                log::info!(
                    "Rendering {}x{} at {} spp in {}px buckets on {} threads",
                    self.image.width,
                    self.image.height,
                    self.image.samples_per_pixel,
                    size,
                    workers
                );
                render_buckets(&ctx, size, seed, workers, &mut self.pixels)?;
            }
        }

        log::info!("Render finished in {:.2?}", start.elapsed());
        Ok(())
    }
}

/// A finished row on its way to the collecting thread.
struct CompletedRow {
    worker: usize,
    row: u32,
    pixels: Vec<u8>,
}

fn worker_rng(seed: u64, band: &RowBand) -> StdRng {
    let worker_seed = seed.wrapping_add(band.index as u64);
    log::debug!(
        "Worker {} rendering rows {}..{} (seed {})",
        band.index,
        band.start_row,
        band.end_row,
        worker_seed
    );
    StdRng::seed_from_u64(worker_seed)
}

/// Split the buffer into one mutable slice per band.
fn band_slices<'p>(pixels: &'p mut [u8], bands: &[RowBand], row_len: usize) -> Vec<&'p mut [u8]> {
    let mut rest = pixels;
    bands
        .iter()
        .map(|band| {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(band.row_count() as usize * row_len);
            rest = tail;
            head
        })
        .collect()
}

/// Run `work` on one named scoped thread per band, then `collect` on the
/// calling thread while they run.
///
/// Every spawned thread is joined before returning. A spawn failure is
/// reported first, then a `collect` failure, then any worker panic.
fn run_workers<P, W, C>(bands: &[RowBand], payloads: Vec<P>, work: W, collect: C) -> RenderResult<()>
where
    P: Send,
    W: Fn(&RowBand, P) + Sync,
    C: FnOnce() -> RenderResult<()>,
{
    thread::scope(|scope| {
        let work = &work;
        let mut handles = Vec::with_capacity(bands.len());
        let mut spawn_error = None;

        for (band, payload) in bands.iter().zip(payloads) {
            let spawned = thread::Builder::new()
                .name(format!("lux-band-{}", band.index))
                .spawn_scoped(scope, move || work(band, payload));
            match spawned {
                Ok(handle) => handles.push((band.index, handle)),
                Err(err) => {
                    log::error!("Failed to spawn render worker {}: {}", band.index, err);
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        let collected = collect();

        let mut panicked = None;
        for (worker, handle) in handles {
            if handle.join().is_err() {
                log::error!("Render worker {} panicked", worker);
                panicked.get_or_insert(worker);
            }
        }

        if let Some(err) = spawn_error {
            return Err(RenderError::ThreadSpawn(err));
        }
        collected?;
        match panicked {
            Some(worker) => Err(RenderError::WorkerPanicked { worker }),
            None => Ok(()),
        }
    })
}

fn render_own_row(
    ctx: &FrameContext<'_>,
    bands: &[RowBand],
    seed: u64,
    callback: Option<&RowsCallback>,
    pixels: &mut [u8],
) -> RenderResult<()> {
    let row_len = ctx.image.row_len();
    let slices = band_slices(pixels, bands, row_len);

    let work = |band: &RowBand, slice: &mut [u8]| {
        let mut rng = worker_rng(seed, band);
        for (row, out) in band.rows().zip(slice.chunks_exact_mut(row_len)) {
            ctx.render_row(row, &mut rng, out);
            if let Some(callback) = callback {
                callback(&RowsProcessed {
                    worker: band.index,
                    row,
                    row_pixels: out,
                    image: None,
                });
            }
        }
    };

    run_workers(bands, slices, work, || Ok(()))
}

fn render_serialized(
    ctx: &FrameContext<'_>,
    bands: &[RowBand],
    seed: u64,
    callback: Option<&RowsCallback>,
    pixels: &mut [u8],
) -> RenderResult<()> {
    let row_len = ctx.image.row_len();
    let mirror = Mutex::new(vec![0u8; pixels.len()]);
    let slices = band_slices(pixels, bands, row_len);

    let work = |band: &RowBand, slice: &mut [u8]| {
        let mut rng = worker_rng(seed, band);
        for (row, out) in band.rows().zip(slice.chunks_exact_mut(row_len)) {
            ctx.render_row(row, &mut rng, out);

            // A panicking callback poisons the lock; the image itself is
            // still consistent, so keep going.
            let mut image = mirror.lock().unwrap_or_else(PoisonError::into_inner);
            let start = row as usize * row_len;
            image[start..start + row_len].copy_from_slice(out);
            if let Some(callback) = callback {
                callback(&RowsProcessed {
                    worker: band.index,
                    row,
                    row_pixels: out,
                    image: Some(image.as_slice()),
                });
            }
        }
    };

    run_workers(bands, slices, work, || Ok(()))
}

fn render_collector(
    ctx: &FrameContext<'_>,
    bands: &[RowBand],
    seed: u64,
    callback: Option<&RowsCallback>,
    pixels: &mut [u8],
) -> RenderResult<()> {
    let row_len = ctx.image.row_len();
    let (tx, rx) = mpsc::channel::<CompletedRow>();
    let senders: Vec<Sender<CompletedRow>> = bands.iter().map(|_| tx.clone()).collect();
    drop(tx);

    let work = |band: &RowBand, tx: Sender<CompletedRow>| {
        let mut rng = worker_rng(seed, band);
        for row in band.rows() {
            let mut out = vec![0u8; row_len];
            ctx.render_row(row, &mut rng, &mut out);
            let done = CompletedRow {
                worker: band.index,
                row,
                pixels: out,
            };
            if tx.send(done).is_err() {
                break;
            }
        }
    };

    // Ends once every worker has dropped its sender. A panicking callback
    // is charged to the worker whose row it was reporting, as in the other
    // delivery modes; dropping the receiver stops the remaining workers.
    let collect = || {
        for done in rx {
            let start = done.row as usize * row_len;
            pixels[start..start + row_len].copy_from_slice(&done.pixels);
            let Some(callback) = callback else {
                continue;
            };
            let report = RowsProcessed {
                worker: done.worker,
                row: done.row,
                row_pixels: &pixels[start..start + row_len],
                image: Some(&*pixels),
            };
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&report))).is_err() {
                log::error!("Rows callback panicked on row {} from worker {}", done.row, done.worker);
                return Err(RenderError::WorkerPanicked { worker: done.worker });
            }
        }
        Ok(())
    };

    run_workers(bands, senders, work, collect)
}
