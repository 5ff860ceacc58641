//! Ready-made worlds for demos and tests.

use std::sync::Arc;

use rand::RngCore;

use crate::{Dielectric, GeometryList, Lambertian, Material, Mesh, Metallic, Sphere};
use lux_math::random::{gen_f64, random_color, random_range};
use lux_math::{Color, Point};

const GROUND_RADIUS: f64 = 1000.0;
const GRID_SIZE: u32 = 8;

fn ground() -> Sphere {
    let material: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
    Sphere::new(Point::new(0.0, -GROUND_RADIUS, 0.0), GROUND_RADIUS, material)
}

/// Linearly map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// A gray ground plane (a very large sphere) with `mesh` resting on it.
pub fn ground_with_mesh(mesh: Mesh) -> GeometryList {
    GeometryList::new().with(ground()).with(mesh)
}

/// The ground plus an 8x8 grid of randomly sized and shaded spheres.
///
/// Grid cells span x in [-10, 10) and z in [0, -20); each sphere rests on
/// the ground and is jittered by up to half its radius.
pub fn random_spheres(rng: &mut dyn RngCore) -> GeometryList {
    let mut world = GeometryList::new();
    world.add(ground());

    for x in 0..GRID_SIZE {
        for z in 0..GRID_SIZE {
            let choose_mat = gen_f64(rng);
            let material: Arc<dyn Material> = if choose_mat < 0.2 {
                Arc::new(Dielectric::new(1.51))
            } else if choose_mat < 0.4 {
                let albedo = random_color(rng, 0.8, 1.0);
                Arc::new(Metallic::new(albedo, random_range(rng, 0.025, 0.65)))
            } else {
                Arc::new(Lambertian::new(random_color(rng, 0.3, 1.0)))
            };

            // Mostly small spheres with a few large ones
            let radius = if gen_f64(rng) < 0.7 {
                random_range(rng, 0.25, 0.5)
            } else {
                random_range(rng, 0.75, 1.0)
            };

            let jitter = radius / 2.0;
            let px = map_range(x as f64, 0.0, GRID_SIZE as f64, -10.0, 10.0) + random_range(rng, -jitter, jitter);
            let pz = map_range(z as f64, 0.0, GRID_SIZE as f64, 0.0, -20.0) + random_range(rng, -jitter, jitter);

            world.add(Sphere::new(Point::new(px, radius, pz), radius, material));
        }
    }

    log::debug!("Generated random sphere scene with {} objects", world.len());
    world
}
