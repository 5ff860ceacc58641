//! Hittable trait and HitRecord for ray-object intersection.

use crate::Material;
use lux_math::{Interval, Point, Ray, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t`, orienting `outward_normal` against the ray.
    ///
    /// If the ray and the outward normal point the same way the ray is
    /// leaving the surface, so the back face was hit and the stored normal
    /// is flipped.
    pub fn new(ray: &Ray, t: f64, outward_normal: Vec3, material: &'a dyn Material) -> Self {
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            p: ray.at(t),
            normal,
            material,
            t,
            front_face,
        }
    }
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("p", &self.p)
            .field("normal", &self.normal)
            .field("t", &self.t)
            .field("front_face", &self.front_face)
            .finish_non_exhaustive()
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` in the window `(ray_t.min, ray_t.max]`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}

/// Closest hit over a sequence, shrinking the window after every hit.
pub(crate) fn closest_hit<'a, H, I>(objects: I, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>
where
    H: Hittable + 'a,
    I: IntoIterator<Item = &'a H>,
{
    let mut closest = None;
    let mut closest_so_far = ray_t.max;

    for object in objects {
        if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
            closest_so_far = rec.t;
            closest = Some(rec);
        }
    }

    closest
}
