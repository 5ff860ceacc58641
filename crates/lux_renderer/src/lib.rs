//! Lux renderer: CPU path tracing.
//!
//! A Monte Carlo path tracer over spheres, triangles and triangle meshes
//! with diffuse, metallic and dielectric materials. A [`Scene`] owns the
//! world, the camera and an 8-bit pixel buffer; [`Scene::render`] fills the
//! buffer using scoped worker threads (row bands) or the rayon pool
//! (buckets).
//!
//! ```no_run
//! use std::sync::Arc;
//! use lux_renderer::{Camera, CameraConfig, GeometryList, ImageConfig, Lambertian, Scene, Sphere, Vec3};
//!
//! let world = GeometryList::new().with(Sphere::new(
//!     Vec3::new(0.0, 0.0, -1.0),
//!     0.5,
//!     Arc::new(Lambertian::new(Vec3::splat(0.5))),
//! ));
//! let camera = Camera::new(CameraConfig::default())?;
//! let mut scene = Scene::new(world, camera, ImageConfig::new(320, 180))?;
//! scene.render()?;
//! assert_eq!(scene.pixels().len(), 320 * 180 * 3);
//! # Ok::<(), lux_renderer::RenderError>(())
//! ```

mod band;
mod bucket;
mod camera;
mod error;
mod geometry;
mod hittable;
mod material;
mod mesh;
mod renderer;
mod scene;
pub mod scenes;
mod settings;
mod sphere;
mod triangle;

pub use band::{partition_rows, RowBand};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use camera::{Camera, CameraConfig};
pub use error::{RenderError, RenderResult};
pub use geometry::{Geometry, GeometryList};
pub use hittable::{HitRecord, Hittable};
pub use material::{Dielectric, Lambertian, Material, Metallic, ScatterResult};
pub use mesh::{Mesh, MeshTraversal};
pub use renderer::{encode_pixel, linear_to_gamma, sky_gradient, trace_color, FrameContext, HIT_EPSILON};
pub use scene::{RowsCallback, RowsProcessed, Scene};
pub use settings::{
    ImageConfig, Quantization, RenderSettings, RowDelivery, Scheduler, ThreadUsage, DEFAULT_BUCKET_SIZE,
};
pub use sphere::Sphere;
pub use triangle::{ParallelTest, Triangle};

/// Re-export the math types used throughout the public API.
pub use lux_math::{Color, Interval, Point, Ray, Vec3};
