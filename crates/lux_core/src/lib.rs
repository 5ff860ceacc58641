//! Lux Core - input types handed to the renderer by mesh loaders.
//!
//! Decoding model files is not this crate's job. Loaders produce either a
//! flat list of [`TriangleData`] or an indexed [`MeshData`], and the
//! renderer builds its geometry from those.
//!
//! # Example
//!
//! ```
//! use lux_core::MeshData;
//! use lux_math::Vec3;
//!
//! let mesh = MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2], None);
//! assert_eq!(mesh.triangles().len(), 1);
//! ```

pub mod mesh;

pub use mesh::{MeshData, TriangleData};
