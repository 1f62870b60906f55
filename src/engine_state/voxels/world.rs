//! # World Module
//!
//! This module provides the `World` struct which owns the loaded chunks, the
//! mesh built for each chunk and the GPU buffers those meshes live in.
//!
//! ## Frame Flow
//!
//! 1. Edits (`set_block`, `add_chunk`, `remove_chunk`) mark cache entries dirty
//!    and the world out of date
//! 2. `update()` re-meshes every chunk without an up-to-date mesh, uploads new
//!    meshes into the chunk's buffer pair and sweeps buffer pairs whose chunk
//!    left the cache
//! 3. `render()` runs `update()` if needed, then issues one indexed draw per
//!    registered buffer pair
//!
//! ## Coordinates
//!
//! Block coordinates are world-space integers. A block at `b` lives in chunk
//! `floor(b / CHUNK_SIZE)` at local offset `b mod CHUNK_SIZE`, for negative
//! coordinates too.

use std::collections::HashMap;
#[cfg(test)]
use std::collections::HashSet;

use cgmath::Point3;
use log::{debug, error, trace};

use crate::engine_state::{
    config::WorldConfig,
    error::VoxelError,
    rendering::{
        backend::{BufferTarget, BufferUsageHint, IndexType, PrimitiveType, RenderBackend},
        meshing::{BufferRegistry, MeshCache, MeshCacheEntry},
        vertex::Vertex,
    },
    voxels::{
        block::{block_side::BlockSide, Block},
        chunk::{Chunk, ChunkNeighbors, CHUNK_SIZE},
    },
};

/// Position of a chunk in chunk coordinates (not block coordinates).
pub type ChunkPosition = Point3<i32>;

/// What a call to [`World::update`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Chunks whose mesh was regenerated.
    pub meshed: Vec<ChunkPosition>,
    /// Chunks whose mesh failed to build; they are retried on the next update.
    pub failed: Vec<ChunkPosition>,
    /// Chunks whose mesh was uploaded to the GPU.
    pub uploaded: Vec<ChunkPosition>,
    /// Chunks whose buffer pair was deleted.
    pub evicted: Vec<ChunkPosition>,
}

/// A sparse voxel world composed of 16x16x16 chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_chunk_mesher::engine_state::{
///     config::WorldConfig,
///     rendering::backend::RecordingBackend,
///     voxels::{block::{block_type::BlockType, Block}, chunk::Chunk, world::World},
/// };
///
/// let mut world = World::new(WorldConfig::default());
/// world.add_chunk(Chunk::empty(), Point3::new(0, 0, 0));
/// world.set_block(Block::new(BlockType::STONE), 1, 2, 3).unwrap();
///
/// let mut backend = RecordingBackend::new();
/// assert_eq!(world.render(&mut backend), 1);
/// assert_eq!(world.mesh_cache().get(Point3::new(0, 0, 0)).unwrap().mesh.triangle_count, 12);
/// ```
pub struct World {
    config: WorldConfig,
    chunks: HashMap<ChunkPosition, Chunk>,
    mesh_cache: MeshCache,
    buffers: BufferRegistry,
    mesh_up_to_date: bool,
    /// Chunks whose meshing is forced to fail.
    #[cfg(test)]
    failing_chunks: HashSet<ChunkPosition>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new(config: WorldConfig) -> Self {
        World {
            config,
            chunks: HashMap::new(),
            mesh_cache: MeshCache::new(),
            buffers: BufferRegistry::new(),
            mesh_up_to_date: false,
            #[cfg(test)]
            failing_chunks: HashSet::new(),
        }
    }

    /// The behaviour switches in effect.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Turns face culling on or off. Every cached mesh becomes stale.
    pub fn set_face_culling(&mut self, face_culling: bool) {
        if self.config.face_culling != face_culling {
            self.config.face_culling = face_culling;
            self.mesh_cache.mark_all_dirty();
            self.mesh_up_to_date = false;
        }
    }

    /// Enables or disables re-meshing during `update()`.
    pub fn set_mesh_enabled(&mut self, mesh_enabled: bool) {
        self.config.mesh_enabled = mesh_enabled;
        self.mesh_up_to_date = false;
    }

    /// The chunk containing world block `block`.
    pub fn chunk_pos(block: Point3<i32>) -> ChunkPosition {
        Point3::new(
            block.x.div_euclid(CHUNK_SIZE),
            block.y.div_euclid(CHUNK_SIZE),
            block.z.div_euclid(CHUNK_SIZE),
        )
    }

    /// World block coordinate of a chunk's local cell (0, 0, 0).
    pub fn block_pos(chunk: ChunkPosition) -> Point3<i32> {
        Point3::new(chunk.x * CHUNK_SIZE, chunk.y * CHUNK_SIZE, chunk.z * CHUNK_SIZE)
    }

    /// Local coordinate of world block `block` inside its chunk.
    pub fn offset_block_pos(block: Point3<i32>) -> Point3<i32> {
        Point3::new(
            block.x.rem_euclid(CHUNK_SIZE),
            block.y.rem_euclid(CHUNK_SIZE),
            block.z.rem_euclid(CHUNK_SIZE),
        )
    }

    /// Places `chunk` at `position`, replacing and returning any chunk already there.
    pub fn add_chunk(&mut self, chunk: Chunk, position: ChunkPosition) -> Option<Chunk> {
        let previous = self.chunks.insert(position, chunk);
        self.mesh_cache.mark_dirty(position);
        if self.config.propagate_boundary_edits {
            self.mark_neighbors_dirty(position);
        }
        self.mesh_up_to_date = false;
        previous
    }

    /// Unloads the chunk at `position`.
    ///
    /// Its mesh is dropped immediately; its buffers are freed by the next `update()`.
    pub fn remove_chunk(&mut self, position: ChunkPosition) -> Option<Chunk> {
        let removed = self.chunks.remove(&position)?;
        self.mesh_cache.remove(position);
        if self.config.propagate_boundary_edits {
            self.mark_neighbors_dirty(position);
        }
        self.mesh_up_to_date = false;
        Some(removed)
    }

    /// The chunk at `position`, if loaded.
    pub fn get_chunk(&self, position: ChunkPosition) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The block at world coordinates, or `None` if its chunk is not loaded.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        let block = Point3::new(x, y, z);
        let local = Self::offset_block_pos(block);
        self.chunks
            .get(&Self::chunk_pos(block))?
            .get_block(local.x, local.y, local.z)
    }

    /// Replaces the block at world coordinates and returns the previous block.
    ///
    /// The owning chunk's mesh becomes stale. If the cell lies on a chunk face
    /// and boundary propagation is on, the chunk across that face is marked
    /// stale too.
    ///
    /// # Errors
    /// [`VoxelError::ChunkNotLoaded`] if no chunk covers the coordinate.
    pub fn set_block(&mut self, block: Block, x: i32, y: i32, z: i32) -> Result<Block, VoxelError> {
        let world_block = Point3::new(x, y, z);
        let position = Self::chunk_pos(world_block);
        let local = Self::offset_block_pos(world_block);

        let chunk = self
            .chunks
            .get_mut(&position)
            .ok_or(VoxelError::ChunkNotLoaded(position))?;
        let previous = chunk.set_block(block, local.x, local.y, local.z)?;

        self.mesh_cache.mark_dirty(position);
        if self.config.propagate_boundary_edits {
            for side in BlockSide::all() {
                let adjacent = local + side.normal();
                if !Chunk::contains_local(adjacent.x, adjacent.y, adjacent.z) {
                    self.mesh_cache.mark_dirty(position + side.normal());
                }
            }
        }
        self.mesh_up_to_date = false;
        Ok(previous)
    }

    /// The six face-adjacent chunks of `position`.
    pub fn neighbors(&self, position: ChunkPosition) -> ChunkNeighbors<'_> {
        Self::neighbors_in(&self.chunks, position)
    }

    /// The cached meshes.
    pub fn mesh_cache(&self) -> &MeshCache {
        &self.mesh_cache
    }

    /// The GPU buffer bookkeeping.
    pub fn buffers(&self) -> &BufferRegistry {
        &self.buffers
    }

    /// Whether every mesh is built and uploaded.
    pub fn mesh_up_to_date(&self) -> bool {
        self.mesh_up_to_date
    }

    /// Builds a mesh for every loaded chunk that has none or a stale one.
    ///
    /// # Returns
    /// The mesh cache after the pass.
    pub fn mesh(&mut self) -> &MeshCache {
        let mut report = UpdateReport::default();
        self.mesh_pass(&mut report);
        &self.mesh_cache
    }

    /// Mark phase of buffer eviction. Inert when eviction is disabled.
    pub fn mark_all_buffers_excess(&mut self) {
        if self.config.evict_unused_buffers {
            self.buffers.mark_all_excess();
        }
    }

    /// Sweep phase of buffer eviction: frees both buffers of every unused pair.
    pub fn delete_excess_buffers(&mut self, backend: &mut impl RenderBackend) -> Vec<ChunkPosition> {
        self.buffers.delete_excess(backend)
    }

    /// Brings meshes and GPU buffers in line with the chunk data.
    ///
    /// Calling it again without intervening edits does no meshing and no uploads.
    pub fn update(&mut self, backend: &mut impl RenderBackend) -> UpdateReport {
        let mut report = UpdateReport::default();

        if self.config.mesh_enabled {
            self.mesh_pass(&mut report);
        }

        self.mark_all_buffers_excess();

        for entry in self.mesh_cache.iter_mut() {
            if !entry.buffered {
                let (vertex, index) = self.buffers.get_or_create(entry.position, backend);
                self.buffers.set_contents(entry.position, entry.mesh.clone());

                backend.bind_buffer(BufferTarget::ArrayBuffer, vertex);
                backend.upload_data(BufferTarget::ArrayBuffer, entry.mesh.vertex_bytes(), BufferUsageHint::DynamicDraw);
                backend.bind_buffer(BufferTarget::ElementArrayBuffer, index);
                backend.upload_data(
                    BufferTarget::ElementArrayBuffer,
                    entry.mesh.index_bytes(),
                    BufferUsageHint::DynamicDraw,
                );

                entry.buffered = true;
                report.uploaded.push(entry.position);
            }
            self.buffers.mark_used(entry.position);
        }
        report.uploaded.sort_by_key(|p| (p.x, p.y, p.z));

        report.evicted = self.delete_excess_buffers(backend);
        self.mesh_up_to_date = report.failed.is_empty();

        if !report.meshed.is_empty() || !report.evicted.is_empty() {
            debug!(
                "World update: {} meshed, {} uploaded, {} evicted, {} failed",
                report.meshed.len(),
                report.uploaded.len(),
                report.evicted.len(),
                report.failed.len()
            );
        }

        report
    }

    /// Draws every registered buffer pair, updating first if anything is stale.
    ///
    /// Each pair is drawn from its own record, so with eviction disabled the
    /// pairs of removed chunks are still submitted.
    ///
    /// # Returns
    /// The number of draw calls issued.
    pub fn render(&mut self, backend: &mut impl RenderBackend) -> u32 {
        if !self.mesh_up_to_date {
            self.update(backend);
        }

        let mut draws = 0;
        for (position, vertex, index) in self.buffers.pairs() {
            backend.bind_buffer(BufferTarget::ArrayBuffer, vertex.handle);
            for attribute in Vertex::ATTRIBUTES {
                backend.set_vertex_attribute(attribute);
            }
            backend.bind_buffer(BufferTarget::ElementArrayBuffer, index.handle);
            backend.draw_indexed(
                PrimitiveType::Triangles,
                3 * index.element_count,
                IndexType::UnsignedInt,
                0,
            );
            trace!(
                "Drew chunk ({}, {}, {}) with {} triangles",
                position.x,
                position.y,
                position.z,
                index.element_count
            );
            draws += 1;
        }
        draws
    }

    /// Frees every GPU buffer owned by the world.
    ///
    /// Cached meshes are kept but will be re-uploaded by the next `update()`.
    pub fn release_buffers(&mut self, backend: &mut impl RenderBackend) {
        self.buffers.clear(backend);
        for entry in self.mesh_cache.iter_mut() {
            entry.buffered = false;
        }
        self.mesh_up_to_date = false;
    }

    fn mesh_pass(&mut self, report: &mut UpdateReport) {
        let options = self.config.mesh_options();
        let mut stale: Vec<ChunkPosition> = self
            .chunks
            .keys()
            .copied()
            .filter(|position| self.mesh_cache.needs_mesh(*position))
            .collect();
        stale.sort_by_key(|p| (p.x, p.y, p.z));

        for position in stale {
            let chunk = &self.chunks[&position];
            let neighbors = Self::neighbors_in(&self.chunks, position);

            let result = chunk.gen_mesh(&neighbors, position, &options);
            #[cfg(test)]
            let result = if self.failing_chunks.contains(&position) {
                Err(VoxelError::IndexOverflow {
                    vertex_count: u32::MAX as usize + 1,
                })
            } else {
                result
            };

            match result {
                Ok(mesh) => {
                    debug!(
                        "Meshed chunk ({}, {}, {}): {} triangles",
                        position.x, position.y, position.z, mesh.triangle_count
                    );
                    self.mesh_cache.insert(MeshCacheEntry::new(position, mesh));
                    report.meshed.push(position);
                }
                Err(err) => {
                    error!(
                        "Failed to mesh chunk ({}, {}, {}): {}",
                        position.x, position.y, position.z, err
                    );
                    self.mesh_cache.mark_dirty(position);
                    report.failed.push(position);
                }
            }
        }
    }

    fn mark_neighbors_dirty(&mut self, position: ChunkPosition) {
        for side in BlockSide::all() {
            self.mesh_cache.mark_dirty(position + side.normal());
        }
    }

    fn neighbors_in(chunks: &HashMap<ChunkPosition, Chunk>, position: ChunkPosition) -> ChunkNeighbors<'_> {
        ChunkNeighbors::new(BlockSide::all().map(|side| chunks.get(&(position + side.normal()))))
    }
}
