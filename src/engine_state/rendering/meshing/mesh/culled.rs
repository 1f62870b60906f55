//! Per-block face culling mesher.
//!
//! Every rendered block contributes the faces that are not covered by a solid
//! neighbour. Neighbours across the chunk boundary are looked up in the
//! adjacent chunks; a missing adjacent chunk counts as empty space, so the
//! boundary faces facing it are emitted.
//!
//! Blocks are visited with x outermost and z innermost, which fixes the
//! triangle order of the output for identical input.

use cgmath::Point3;

use crate::engine_state::{
    error::VoxelError,
    rendering::meshing::MeshOptions,
    voxels::{
        block::block_side::BlockSide,
        chunk::{Chunk, ChunkNeighbors, CHUNK_SIZE},
        world::ChunkPosition,
    },
};

use super::{ChunkMesh, MeshBuilder};

/// Meshes `chunk`, placed at `chunk_position` in chunk coordinates.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `neighbors` - The six face-adjacent chunks, any of which may be absent
/// * `chunk_position` - Chunk coordinate; blocks land at `chunk_position * CHUNK_SIZE + local`
/// * `options` - Culling switch and index mode
///
/// # Errors
/// [`VoxelError::IndexOverflow`] if the mesh cannot be indexed with `u32`.
pub fn generate_culled_mesh(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors,
    chunk_position: ChunkPosition,
    options: &MeshOptions,
) -> Result<ChunkMesh, VoxelError> {
    let origin = Point3::new(
        chunk_position.x * CHUNK_SIZE,
        chunk_position.y * CHUNK_SIZE,
        chunk_position.z * CHUNK_SIZE,
    );
    let mut builder = MeshBuilder::new(options.index_mode);

    for (local, block) in chunk.iter_cells() {
        if !block.is_rendered() {
            continue;
        }

        let cull = BlockSide::all().map(|side| chunk.is_face_covered(neighbors, local, side));
        let centre = Point3::new(
            (origin.x + local.x) as f32,
            (origin.y + local.y) as f32,
            (origin.z + local.z) as f32,
        );

        for triangle in block.triangles(cull, centre, options.face_culling) {
            builder.push_triangle(triangle)?;
        }
    }

    Ok(builder.finish())
}
