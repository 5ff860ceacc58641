//! Scene geometry: the closed set of traceable surfaces.

use crate::{
    hittable::{closest_hit, HitRecord, Hittable},
    Mesh, Sphere, Triangle,
};
use lux_math::{Interval, Ray};

/// Any surface a scene can hold.
#[derive(Clone)]
pub enum Geometry {
    Sphere(Sphere),
    Triangle(Triangle),
    Mesh(Mesh),
    List(GeometryList),
}

impl Hittable for Geometry {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Geometry::Sphere(sphere) => sphere.hit(ray, ray_t),
            Geometry::Triangle(triangle) => triangle.hit(ray, ray_t),
            Geometry::Mesh(mesh) => mesh.hit(ray, ray_t),
            Geometry::List(list) => list.hit(ray, ray_t),
        }
    }
}

impl From<Sphere> for Geometry {
    fn from(sphere: Sphere) -> Self {
        Geometry::Sphere(sphere)
    }
}

impl From<Triangle> for Geometry {
    fn from(triangle: Triangle) -> Self {
        Geometry::Triangle(triangle)
    }
}

impl From<Mesh> for Geometry {
    fn from(mesh: Mesh) -> Self {
        Geometry::Mesh(mesh)
    }
}

impl From<GeometryList> for Geometry {
    fn from(list: GeometryList) -> Self {
        Geometry::List(list)
    }
}

/// An ordered, possibly nested collection of geometry.
///
/// Every query scans all children.
#[derive(Clone, Default)]
pub struct GeometryList {
    objects: Vec<Geometry>,
}

impl GeometryList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Geometry>) {
        self.objects.push(object.into());
    }

    /// Builder form of [`GeometryList::add`].
    pub fn with(mut self, object: impl Into<Geometry>) -> Self {
        self.add(object);
        self
    }

    /// Remove all objects.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Geometry> {
        self.objects.iter()
    }
}

impl Hittable for GeometryList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        closest_hit(&self.objects, ray, ray_t)
    }
}

impl FromIterator<Geometry> for GeometryList {
    fn from_iter<I: IntoIterator<Item = Geometry>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a GeometryList {
    type Item = &'a Geometry;
    type IntoIter = std::slice::Iter<'a, Geometry>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
