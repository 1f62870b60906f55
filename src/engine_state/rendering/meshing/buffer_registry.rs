//! Tracks the GPU buffer pair owned by each meshed chunk.
//!
//! Every chunk that has been uploaded owns exactly one vertex buffer and one
//! index buffer. The two are created together and deleted together, so the
//! vertex and index maps always hold the same set of chunk positions.
//!
//! Eviction is mark-and-sweep: [`BufferRegistry::mark_all_excess`] clears every
//! `used` flag, the world re-marks the pairs of chunks still in the mesh cache,
//! and [`BufferRegistry::delete_excess`] frees whatever is left unmarked.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::engine_state::{
    rendering::backend::{BufferHandle, BufferTarget, RenderBackend},
    voxels::world::ChunkPosition,
};

use super::mesh::ChunkMesh;

/// Bookkeeping for one GPU buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct BufferRecord {
    /// Backend handle of the buffer.
    pub handle: BufferHandle,
    /// Cleared by the mark phase, set again while the chunk is still cached.
    pub used: bool,
    /// Triangles in the uploaded mesh. A draw covers `3 * element_count` indices.
    pub element_count: u32,
    /// The mesh last uploaded into the pair.
    pub data: Option<Rc<ChunkMesh>>,
}

impl BufferRecord {
    fn new(handle: BufferHandle) -> Self {
        Self {
            handle,
            used: true,
            element_count: 0,
            data: None,
        }
    }
}

/// Vertex and index buffer records keyed by chunk position.
#[derive(Debug, Default)]
pub struct BufferRegistry {
    vertex_buffers: HashMap<ChunkPosition, BufferRecord>,
    index_buffers: HashMap<ChunkPosition, BufferRecord>,
}

impl BufferRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the `(vertex, index)` handles of the chunk, creating both buffers if needed.
    pub fn get_or_create(
        &mut self,
        position: ChunkPosition,
        backend: &mut impl RenderBackend,
    ) -> (BufferHandle, BufferHandle) {
        if let Some(handles) = self.handles(position) {
            return handles;
        }

        let vertex = backend.create_buffer();
        let index = backend.create_buffer();
        debug!(
            "Created buffers {:?}/{:?} for chunk ({}, {}, {})",
            vertex, index, position.x, position.y, position.z
        );
        self.vertex_buffers.insert(position, BufferRecord::new(vertex));
        self.index_buffers.insert(position, BufferRecord::new(index));
        (vertex, index)
    }

    /// The `(vertex, index)` handles of the chunk, if it owns a pair.
    pub fn handles(&self, position: ChunkPosition) -> Option<(BufferHandle, BufferHandle)> {
        let vertex = self.vertex_buffers.get(&position)?;
        let index = self.index_buffers.get(&position)?;
        Some((vertex.handle, index.handle))
    }

    /// The record behind `target` for the chunk.
    pub fn record(&self, target: BufferTarget, position: ChunkPosition) -> Option<&BufferRecord> {
        match target {
            BufferTarget::ArrayBuffer => self.vertex_buffers.get(&position),
            BufferTarget::ElementArrayBuffer => self.index_buffers.get(&position),
        }
    }

    /// Every registered pair as `(position, vertex record, index record)`,
    /// ordered by position.
    pub fn pairs(&self) -> Vec<(ChunkPosition, &BufferRecord, &BufferRecord)> {
        let mut pairs: Vec<_> = self
            .vertex_buffers
            .iter()
            .filter_map(|(position, vertex)| {
                let index = self.index_buffers.get(position)?;
                Some((*position, vertex, index))
            })
            .collect();
        pairs.sort_by_key(|(p, _, _)| (p.x, p.y, p.z));
        pairs
    }

    /// Links the pair to `mesh` and updates its element count.
    pub fn set_contents(&mut self, position: ChunkPosition, mesh: Rc<ChunkMesh>) {
        for records in [&mut self.vertex_buffers, &mut self.index_buffers] {
            if let Some(record) = records.get_mut(&position) {
                record.element_count = mesh.triangle_count;
                record.data = Some(Rc::clone(&mesh));
            }
        }
    }

    /// Keeps the chunk's pair alive through the next sweep.
    pub fn mark_used(&mut self, position: ChunkPosition) {
        for records in [&mut self.vertex_buffers, &mut self.index_buffers] {
            if let Some(record) = records.get_mut(&position) {
                record.used = true;
            }
        }
    }

    /// Mark phase: every pair becomes a deletion candidate.
    pub fn mark_all_excess(&mut self) {
        for record in self.vertex_buffers.values_mut().chain(self.index_buffers.values_mut()) {
            record.used = false;
        }
    }

    /// Sweep phase: deletes both buffers of every pair left unused.
    ///
    /// # Returns
    /// The chunk positions whose buffers were freed.
    pub fn delete_excess(&mut self, backend: &mut impl RenderBackend) -> Vec<ChunkPosition> {
        let mut excess: Vec<ChunkPosition> = self
            .vertex_buffers
            .iter()
            .filter(|(position, vertex)| {
                let index_used = self.index_buffers.get(*position).is_some_and(|index| index.used);
                !vertex.used && !index_used
            })
            .map(|(position, _)| *position)
            .collect();
        excess.sort_by_key(|p| (p.x, p.y, p.z));

        for position in &excess {
            if let Some(vertex) = self.vertex_buffers.remove(position) {
                backend.delete_buffer(vertex.handle);
            }
            if let Some(index) = self.index_buffers.remove(position) {
                backend.delete_buffer(index.handle);
            }
            debug!("Evicted buffers of chunk ({}, {}, {})", position.x, position.y, position.z);
        }

        excess
    }

    /// Deletes every buffer pair.
    pub fn clear(&mut self, backend: &mut impl RenderBackend) {
        self.mark_all_excess();
        self.delete_excess(backend);
    }

    /// Number of chunks owning a buffer pair.
    pub fn len(&self) -> usize {
        self.vertex_buffers.len()
    }

    /// Whether no chunk owns a buffer pair.
    pub fn is_empty(&self) -> bool {
        self.vertex_buffers.is_empty()
    }
}
