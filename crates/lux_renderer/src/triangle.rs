//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use lux_core::TriangleData;
use lux_math::{Color, Interval, Point, Ray, Vec3};

/// Shared tolerance for the parallel test and self-intersection rejection.
const EPSILON: f64 = 0.0001;

/// How near-parallel rays are rejected before solving for barycentrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallelTest {
    /// Legacy form `a > -ε && a < -ε`, which is never true.
    ///
    /// Near-parallel rays go on to the barycentric tests and may hit.
    /// Exactly parallel rays yield a non-finite `u`, which the barycentric
    /// range check rejects.
    Reference,
    /// `|a| < ε·scale`: near-parallel rays never hit.
    ///
    /// `scale` is `|edge1|·|edge2|·|d|`, so the test bounds the angle
    /// between the ray and the triangle's plane regardless of triangle
    /// size or ray length.
    #[default]
    Symmetric,
}

impl ParallelTest {
    /// Whether the determinant `a` counts as parallel, given the product
    /// of the edge and direction lengths it was computed from.
    #[inline]
    pub fn rejects(self, a: f64, scale: f64) -> bool {
        match self {
            ParallelTest::Reference => a > -EPSILON && a < -EPSILON,
            ParallelTest::Symmetric => a.abs() < EPSILON * scale,
        }
    }
}

/// A triangle primitive with per-vertex attributes.
#[derive(Clone)]
pub struct Triangle {
    vertices: [Point; 3],
    normals: [Vec3; 3],
    tex_coords: [Vec3; 3],
    colors: [Color; 3],
    material_id: i32,
    material: Arc<dyn Material>,
    parallel_test: ParallelTest,
}

impl Triangle {
    /// Create a triangle from vertices and per-vertex normals.
    pub fn new(vertices: [Point; 3], normals: [Vec3; 3], material: Arc<dyn Material>) -> Self {
        Self {
            vertices,
            normals,
            tex_coords: [Vec3::ZERO; 3],
            colors: [Color::ONE; 3],
            material_id: -1,
            material,
            parallel_test: ParallelTest::default(),
        }
    }

    /// Create a triangle from loader output.
    pub fn from_data(data: &TriangleData, material: Arc<dyn Material>) -> Self {
        Self {
            vertices: data.positions,
            normals: data.normals,
            tex_coords: data.tex_coords,
            colors: data.colors,
            material_id: data.material_id,
            material,
            parallel_test: ParallelTest::default(),
        }
    }

    /// Select the parallel-ray rejection behavior.
    pub fn with_parallel_test(mut self, parallel_test: ParallelTest) -> Self {
        self.parallel_test = parallel_test;
        self
    }

    pub fn vertices(&self) -> &[Point; 3] {
        &self.vertices
    }

    pub fn tex_coords(&self) -> &[Vec3; 3] {
        &self.tex_coords
    }

    pub fn colors(&self) -> &[Color; 3] {
        &self.colors
    }

    pub fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    pub fn material_id(&self) -> i32 {
        self.material_id
    }

    pub fn parallel_test(&self) -> ParallelTest {
        self.parallel_test
    }

    /// Unweighted mean of the vertex normals, normalized.
    ///
    /// Falls back to the geometric normal (counter-clockwise winding) when
    /// the vertex normals cancel out or are missing.
    fn shading_normal(&self) -> Vec3 {
        let [n0, n1, n2] = self.normals;
        ((n0 + n1 + n2) / 3.0).try_normalize().unwrap_or_else(|| {
            let [v0, v1, v2] = self.vertices;
            (v1 - v0).cross(v2 - v0).normalize()
        })
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        let scale = edge1.length() * edge2.length() * ray.direction().length();
        if self.parallel_test.rejects(a, scale) {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);

        // Too close to the origin (shadow acne) or outside the hit window
        if t < EPSILON || !ray_t.admits(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.shading_normal(), self.material.as_ref()))
    }
}
