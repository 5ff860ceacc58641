//! Triangle meshes.
//!
//! A mesh owns its triangles and scans them linearly; there is no
//! acceleration structure.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    hittable::{closest_hit, HitRecord, Hittable},
    triangle::{ParallelTest, Triangle},
    Material,
};
use lux_core::TriangleData;
use lux_math::{Interval, Ray};

/// How a mesh searches its triangles for a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshTraversal {
    /// Return the first triangle in storage order that reports a hit,
    /// which is not necessarily the nearest one.
    FirstHit,
    /// Test every triangle against the full window and keep the nearest.
    FixedInterval,
    /// Nearest hit, narrowing the window after each hit.
    #[default]
    ShrinkingInterval,
}

/// A triangle mesh sharing one default material.
#[derive(Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    material: Arc<dyn Material>,
    traversal: MeshTraversal,
}

impl Mesh {
    /// Create a mesh from already built triangles.
    pub fn new(triangles: Vec<Triangle>, material: Arc<dyn Material>) -> Self {
        Self {
            triangles,
            material,
            traversal: MeshTraversal::default(),
        }
    }

    /// Build a mesh where every triangle uses `material`.
    pub fn from_triangles(data: &[TriangleData], material: Arc<dyn Material>) -> Self {
        let triangles = data
            .iter()
            .map(|tri| Triangle::from_data(tri, Arc::clone(&material)))
            .collect();
        Self::new(triangles, material)
    }

    /// Build a mesh whose triangles pick their material from `palette` by
    /// `material_id`.
    ///
    /// Negative ids and ids past the end of the palette use `material`.
    pub fn from_triangles_with_palette(
        data: &[TriangleData],
        material: Arc<dyn Material>,
        palette: &[Arc<dyn Material>],
    ) -> Self {
        let mut fallbacks = 0usize;
        let triangles = data
            .iter()
            .map(|tri| {
                let face_material = usize::try_from(tri.material_id)
                    .ok()
                    .and_then(|id| palette.get(id))
                    .unwrap_or_else(|| {
                        fallbacks += 1;
                        &material
                    });
                Triangle::from_data(tri, Arc::clone(face_material))
            })
            .collect();

        if fallbacks > 0 {
            log::debug!(
                "{} of {} triangles use the mesh material (palette has {} entries)",
                fallbacks,
                data.len(),
                palette.len()
            );
        }

        Self::new(triangles, material)
    }

    /// Select how triangles are searched.
    pub fn with_traversal(mut self, traversal: MeshTraversal) -> Self {
        self.traversal = traversal;
        self
    }

    /// Apply a parallel-ray test to every triangle.
    pub fn with_parallel_test(mut self, parallel_test: ParallelTest) -> Self {
        self.triangles = self
            .triangles
            .into_iter()
            .map(|tri| tri.with_parallel_test(parallel_test))
            .collect();
        self
    }

    pub fn traversal(&self) -> MeshTraversal {
        self.traversal
    }

    pub fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl Hittable for Mesh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self.traversal {
            MeshTraversal::FirstHit => self.triangles.iter().find_map(|tri| tri.hit(ray, ray_t)),
            MeshTraversal::FixedInterval => self
                .triangles
                .iter()
                .filter_map(|tri| tri.hit(ray, ray_t))
                .min_by(|a, b| a.t.total_cmp(&b.t)),
            MeshTraversal::ShrinkingInterval => closest_hit(&self.triangles, ray, ray_t),
        }
    }
}
