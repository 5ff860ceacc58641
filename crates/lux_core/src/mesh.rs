//! Triangle input handed over by mesh loaders.
//!
//! The renderer consumes a flat list of [`TriangleData`]. Loaders that
//! produce indexed geometry can build a [`MeshData`] and flatten it with
//! [`MeshData::triangles`].

use lux_math::{Color, Point, Vec3};

/// One decoded triangle: exactly three of everything.
///
/// Attributes a source file lacks are zeroed (colors default to white).
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleData {
    pub positions: [Point; 3],
    pub normals: [Vec3; 3],
    /// Texture coordinates, `z` unused
    pub tex_coords: [Vec3; 3],
    pub colors: [Color; 3],
    /// Per-face material index from the source file, negative if none
    pub material_id: i32,
}

impl TriangleData {
    /// Triangle with only positions; other attributes take their defaults.
    pub fn from_positions(positions: [Point; 3]) -> Self {
        Self {
            positions,
            normals: [Vec3::ZERO; 3],
            tex_coords: [Vec3::ZERO; 3],
            colors: [Color::ONE; 3],
            material_id: -1,
        }
    }

    /// Set the same normal on all three vertices.
    pub fn with_flat_normal(mut self, normal: Vec3) -> Self {
        self.normals = [normal; 3];
        self
    }

    /// Set the material index.
    pub fn with_material_id(mut self, material_id: i32) -> Self {
        self.material_id = material_id;
        self
    }
}

/// Indexed triangle mesh as a loader sees it.
///
/// Every three indices form a triangle. Optional attribute arrays are
/// per-vertex, `material_ids` is per-face.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Point>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub colors: Option<Vec<Color>>,
    pub material_ids: Option<Vec<i32>>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create a new mesh from positions and indices, optionally with normals.
    ///
    /// Normals are NOT computed automatically. Call `compute_normals()`
    /// explicitly if you need them.
    pub fn new(positions: Vec<Point>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        Self {
            positions,
            normals,
            indices,
            ..Default::default()
        }
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: Vec<[f64; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Attach per-vertex colors.
    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Attach per-face material ids.
    pub fn with_material_ids(mut self, material_ids: Vec<i32>) -> Self {
        self.material_ids = Some(material_ids);
        self
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Faces are counter-clockwise. Where the face normals around a vertex
    /// cancel out, the vertex takes the normal of the first non-degenerate
    /// face that uses it. Vertices touched by no such face get +Y.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];
        let mut first_face: Vec<Option<Vec3>> = vec![None; vertex_count];

        for face in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (face[0] as usize, face[1] as usize, face[2] as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;

            if let Some(unit) = face_normal.try_normalize() {
                for i in [i0, i1, i2] {
                    first_face[i].get_or_insert(unit);
                }
            }
        }

        for (normal, fallback) in normals.iter_mut().zip(first_face) {
            *normal = normal
                .try_normalize()
                .or(fallback)
                .unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Ensure the mesh has per-vertex normals, computing them if necessary.
    /// Also recomputes if existing normals don't match the vertex count.
    pub fn ensure_normals(&mut self) {
        let mismatched = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if mismatched {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Normals array length ({}) doesn't match vertex count ({}), computing smooth normals",
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Flatten into a triangle soup.
    ///
    /// Faces referencing out-of-range vertices are skipped with a warning;
    /// a trailing partial face is ignored.
    pub fn triangles(&self) -> Vec<TriangleData> {
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for (face, chunk) in self.indices.chunks_exact(3).enumerate() {
            let idx = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];

            if idx.iter().any(|&i| i >= self.positions.len()) {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    idx[0],
                    idx[1],
                    idx[2],
                    self.positions.len()
                );
                continue;
            }

            let normal = |i: usize| {
                self.normals
                    .as_ref()
                    .and_then(|n| n.get(i).copied())
                    .unwrap_or(Vec3::ZERO)
            };
            let uv = |i: usize| {
                self.uvs
                    .as_ref()
                    .and_then(|uvs| uvs.get(i))
                    .map_or(Vec3::ZERO, |[u, v]| Vec3::new(*u, *v, 0.0))
            };
            let color = |i: usize| {
                self.colors
                    .as_ref()
                    .and_then(|c| c.get(i).copied())
                    .unwrap_or(Color::ONE)
            };

            triangles.push(TriangleData {
                positions: idx.map(|i| self.positions[i]),
                normals: idx.map(normal),
                tex_coords: idx.map(uv),
                colors: idx.map(color),
                material_id: self
                    .material_ids
                    .as_ref()
                    .and_then(|ids| ids.get(face).copied())
                    .unwrap_or(-1),
            });
        }

        triangles
    }
}
