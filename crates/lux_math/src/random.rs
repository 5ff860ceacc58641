//! Random sampling primitives.
//!
//! Every function draws from an explicit generator so each render worker
//! can own an independently seeded stream.

use std::f64::consts::PI;

use rand::{Rng, RngCore};

use crate::{Color, Vec3};

/// Uniform f64 in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform f64 in [min, max).
#[inline]
pub fn random_range(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + (max - min) * gen_f64(rng)
}

/// Vector with each component uniform in [min, max).
pub fn random_vec(rng: &mut dyn RngCore, min: f64, max: f64) -> Vec3 {
    Vec3::new(
        random_range(rng, min, max),
        random_range(rng, min, max),
        random_range(rng, min, max),
    )
}

/// Random color with each channel uniform in [min, max).
#[inline]
pub fn random_color(rng: &mut dyn RngCore, min: f64, max: f64) -> Color {
    random_vec(rng, min, max)
}

/// Sample a random point in the unit disk (z = 0) by rejection.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            random_range(rng, -1.0, 1.0),
            random_range(rng, -1.0, 1.0),
            0.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform point on the unit sphere via the inverse CDF.
///
/// Azimuth is uniform in [0, 2π); the polar angle is `acos(1 - 2u)`.
pub fn random_on_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let theta = 2.0 * PI * gen_f64(rng);
    let phi = (1.0 - 2.0 * gen_f64(rng)).acos();

    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()).normalize()
}

/// Unit sphere sample flipped onto the hemisphere around `normal`.
pub fn random_on_hemisphere(rng: &mut dyn RngCore, normal: Vec3) -> Vec3 {
    let on_unit_sphere = random_on_unit_sphere(rng);
    if on_unit_sphere.dot(normal) > 0.0 {
        on_unit_sphere
    } else {
        -on_unit_sphere
    }
}
