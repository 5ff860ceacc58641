//! Lux math: double-precision vector algebra, rays and sampling.
//!
//! Vectors are `glam::DVec3`, aliased as [`Vec3`], [`Point`] and [`Color`]
//! depending on what they carry.

// Re-export glam for convenience
pub use glam;

mod interval;
pub mod random;
mod ray;

pub use interval::Interval;
pub use ray::Ray;

/// 3-component f64 vector.
pub type Vec3 = glam::DVec3;
/// A position in world space.
pub type Point = Vec3;
/// An RGB color, components nominally in [0, 1].
pub type Color = Vec3;

/// Operations the path tracer needs on top of glam's vector API.
pub trait VecExt {
    /// Reflect about a normal: `v - 2(v·n)n`.
    fn reflect(self, normal: Vec3) -> Vec3;

    /// Refract a unit vector through a surface with unit `normal`.
    ///
    /// `ratio` is the incident index over the transmitted index.
    fn refract(self, normal: Vec3, ratio: f64) -> Vec3;

    /// Weak equality: lengths differ by at most `f32::EPSILON`.
    ///
    /// Direction is ignored, so anti-parallel vectors of equal length
    /// compare equal. Use `==` for component-wise equality.
    fn approx_eq(self, other: Vec3) -> bool;

    /// True when the vector is indistinguishable from zero under [`VecExt::approx_eq`].
    fn near_zero(self) -> bool;
}

impl VecExt for Vec3 {
    #[inline]
    fn reflect(self, normal: Vec3) -> Vec3 {
        self - 2.0 * self.dot(normal) * normal
    }

    #[inline]
    fn refract(self, normal: Vec3, ratio: f64) -> Vec3 {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_out_perp = ratio * (self + cos_theta * normal);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * normal;
        r_out_perp + r_out_parallel
    }

    #[inline]
    fn approx_eq(self, other: Vec3) -> bool {
        (self.length() - other.length()).abs() <= f32::EPSILON as f64
    }

    #[inline]
    fn near_zero(self) -> bool {
        self.approx_eq(Vec3::ZERO)
    }
}
