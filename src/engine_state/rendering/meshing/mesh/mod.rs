//! Mesh generation for voxel chunks.
//!
//! A chunk is meshed by visiting every rendered block, asking it for the
//! triangles of its uncovered faces and appending those triangles to a
//! [`MeshBuilder`]. The result is a [`ChunkMesh`]: a flat vertex array, a
//! `u32` index array and the triangle count.
//!
//! # Architecture
//! - [`face`]: unit-cube corner and winding tables
//! - [`Triangle`]: three vertices emitted together by one face
//! - [`MeshBuilder`]: index assignment (unshared or deduplicated)
//! - [`culled`]: the per-block face culling mesher

mod builder;
pub mod culled;
pub mod face;
mod triangle;

pub use builder::MeshBuilder;
pub use triangle::Triangle;

use crate::engine_state::rendering::vertex::{Vertex, FLOATS_PER_VERTEX};

/// Geometry of one chunk, ready for upload.
///
/// Every index is below `vertices.len()`, and `indices.len()` is always
/// `3 * triangle_count`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    /// Vertex records in emission order.
    pub vertices: Vec<Vertex>,
    /// Consecutive index triples, one per triangle.
    pub indices: Vec<u32>,
    /// Number of triangles in the mesh.
    pub triangle_count: u32,
}

impl ChunkMesh {
    /// The vertex records viewed as a flat `f32` array, 8 floats per vertex.
    pub fn vertex_array(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the vertex array, as uploaded to the vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the index array, as uploaded to the index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of indices drawn for this mesh.
    pub fn index_count(&self) -> u32 {
        self.triangle_count * 3
    }

    /// Number of vertex records (`vertex_array().len() / 8`).
    pub fn vertex_count(&self) -> usize {
        self.vertex_array().len() / FLOATS_PER_VERTEX
    }

    /// Whether the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangle_count == 0
    }
}
