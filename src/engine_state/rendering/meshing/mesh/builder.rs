use std::collections::HashMap;

use crate::engine_state::{
    error::VoxelError,
    rendering::{meshing::IndexMode, vertex::Vertex},
};

use super::{ChunkMesh, Triangle};

/// Accumulates triangles into a [`ChunkMesh`], assigning `u32` indices.
///
/// In [`IndexMode::Unshared`] every triangle appends three new vertices, so the
/// index array is simply `0, 1, 2, ...`. In [`IndexMode::Deduplicated`] a vertex
/// equal in all eight fields to an earlier one reuses its index.
pub struct MeshBuilder {
    index_mode: IndexMode,
    mesh: ChunkMesh,
    /// Bit patterns of already emitted vertices. Only used when deduplicating.
    vertex_lookup: HashMap<[u32; 8], u32>,
}

impl MeshBuilder {
    /// Creates an empty builder.
    pub fn new(index_mode: IndexMode) -> Self {
        Self {
            index_mode,
            mesh: ChunkMesh::default(),
            vertex_lookup: HashMap::new(),
        }
    }

    /// Appends one triangle.
    ///
    /// # Errors
    /// [`VoxelError::IndexOverflow`] if a new vertex could not be addressed by a `u32`.
    pub fn push_triangle(&mut self, triangle: Triangle) -> Result<(), VoxelError> {
        for vertex in triangle.vertices {
            let index = match self.index_mode {
                IndexMode::Unshared => self.push_vertex(vertex)?,
                IndexMode::Deduplicated => {
                    let key: [u32; 8] = bytemuck::cast(vertex);
                    match self.vertex_lookup.get(&key) {
                        Some(&index) => index,
                        None => {
                            let index = self.push_vertex(vertex)?;
                            self.vertex_lookup.insert(key, index);
                            index
                        }
                    }
                }
            };
            self.mesh.indices.push(index);
        }
        self.mesh.triangle_count += 1;
        Ok(())
    }

    /// Finishes the mesh.
    pub fn finish(self) -> ChunkMesh {
        self.mesh
    }

    fn push_vertex(&mut self, vertex: Vertex) -> Result<u32, VoxelError> {
        let index = u32::try_from(self.mesh.vertices.len()).map_err(|_| VoxelError::IndexOverflow {
            vertex_count: self.mesh.vertices.len() + 1,
        })?;
        self.mesh.vertices.push(vertex);
        Ok(index)
    }
}
