//! Material trait for surface scattering.

use crate::hittable::HitRecord;
use lux_math::random::{gen_f64, random_on_unit_sphere};
use lux_math::{Color, Ray, VecExt};
use rand::RngCore;

/// Outcome of a scatter event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Color the continued path is multiplied by
    pub attenuation: Color,
    /// Outgoing ray leaving the hit point
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// Materials are immutable and shared by every surface that uses them
/// (`Arc<dyn Material>`), across all render workers.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> Option<ScatterResult>;
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_on_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metallic (glossy reflective) material.
#[derive(Debug, Clone)]
pub struct Metallic {
    albedo: Color,
    roughness: f64,
}

impl Metallic {
    /// Create a new Metallic material.
    ///
    /// - `albedo`: The color of the metal
    /// - `roughness`: 0.0 = perfect mirror, 1.0 = very rough; clamped to [0, 1]
    pub fn new(albedo: Color, roughness: f64) -> Self {
        Self {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }
}

impl Material for Metallic {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = ray_in.direction().normalize().reflect(rec.normal);
        let scattered_dir = reflected + self.roughness * random_on_unit_sphere(rng);

        // Fuzz pushed the ray below the surface: absorbed
        if scattered_dir.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scattered_dir),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond).
    ///   Non-positive or non-finite values are replaced with 1.0.
    pub fn new(ior: f64) -> Self {
        let ior = if ior.is_finite() && ior > 0.0 {
            ior
        } else {
            log::warn!("Dielectric index of refraction {} is not positive, using 1.0", ior);
            1.0
        };
        Self { ior }
    }

    pub fn ior(&self) -> f64 {
        self.ior
    }

    /// Schlick's approximation for reflectance.
    pub fn reflectance(cosine: f64, ratio: f64) -> f64 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f64(rng) {
                unit_direction.reflect(rec.normal)
            } else {
                unit_direction.refract(rec.normal, refraction_ratio)
            };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}
