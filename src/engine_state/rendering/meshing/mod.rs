//! Mesh generation and caching for voxel rendering.
//!
//! # Architecture
//! - `mesh/`: converts a chunk and its neighbours into a [`mesh::ChunkMesh`]
//! - [`MeshCache`]: the last mesh built for each chunk, with dirty/buffered flags
//! - [`BufferRegistry`]: the GPU vertex/index buffer pair owned by each meshed chunk
//!
//! The world drives all three: dirty chunks are re-meshed, new meshes are
//! uploaded into their buffer pair, and buffer pairs whose chunk left the cache
//! are deleted together.

mod buffer_registry;
pub mod mesh;
mod mesh_cache;

pub use buffer_registry::{BufferRecord, BufferRegistry};
pub use mesh_cache::{MeshCache, MeshCacheEntry};

use serde::Deserialize;

/// How a mesh assigns indices to its vertices.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Three fresh vertices per triangle; indices are `0, 1, 2, ...`.
    #[default]
    Unshared,
    /// Equal vertices share one index.
    Deduplicated,
}

/// Parameters of a chunk meshing pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeshOptions {
    /// Skip faces covered by a solid neighbour.
    pub face_culling: bool,
    /// Vertex indexing strategy.
    pub index_mode: IndexMode,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            face_culling: true,
            index_mode: IndexMode::Unshared,
        }
    }
}
