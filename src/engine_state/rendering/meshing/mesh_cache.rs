use std::collections::HashMap;
use std::rc::Rc;

use crate::engine_state::voxels::world::ChunkPosition;

use super::mesh::ChunkMesh;

/// The last mesh built for one chunk.
///
/// The mesh itself is immutable once built; regenerating a chunk replaces the
/// whole entry. Only the flags change in place.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshCacheEntry {
    /// Chunk the mesh belongs to.
    pub position: ChunkPosition,
    /// The mesh, shared with the buffer registry once uploaded.
    pub mesh: Rc<ChunkMesh>,
    /// The chunk changed since this mesh was built.
    pub dirty: bool,
    /// The mesh has been uploaded into the chunk's buffer pair.
    pub buffered: bool,
}

impl MeshCacheEntry {
    /// A freshly built, not yet uploaded, entry.
    pub fn new(position: ChunkPosition, mesh: ChunkMesh) -> Self {
        Self {
            position,
            mesh: Rc::new(mesh),
            dirty: false,
            buffered: false,
        }
    }
}

/// Meshes keyed by chunk position.
#[derive(Debug, Default)]
pub struct MeshCache {
    entries: HashMap<ChunkPosition, MeshCacheEntry>,
}

impl MeshCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the chunk at `position` has no up-to-date mesh.
    pub fn needs_mesh(&self, position: ChunkPosition) -> bool {
        self.entries.get(&position).map_or(true, |entry| entry.dirty)
    }

    /// Flags the entry at `position` as stale. Returns false if there is no entry.
    pub fn mark_dirty(&mut self, position: ChunkPosition) -> bool {
        match self.entries.get_mut(&position) {
            Some(entry) => {
                entry.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Flags every entry as stale.
    pub fn mark_all_dirty(&mut self) {
        for entry in self.entries.values_mut() {
            entry.dirty = true;
        }
    }

    /// Stores `entry`, replacing any previous entry for the same chunk.
    pub fn insert(&mut self, entry: MeshCacheEntry) -> Option<MeshCacheEntry> {
        self.entries.insert(entry.position, entry)
    }

    /// Drops the entry at `position`.
    pub fn remove(&mut self, position: ChunkPosition) -> Option<MeshCacheEntry> {
        self.entries.remove(&position)
    }

    /// The entry at `position`.
    pub fn get(&self, position: ChunkPosition) -> Option<&MeshCacheEntry> {
        self.entries.get(&position)
    }

    /// All entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &MeshCacheEntry> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut MeshCacheEntry> {
        self.entries.values_mut()
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no meshes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;

    #[test]
    fn absent_and_dirty_entries_need_meshing() {
        let mut cache = MeshCache::new();
        let position = Point3::new(1, 2, 3);
        assert!(cache.needs_mesh(position));
        assert!(!cache.mark_dirty(position));

        cache.insert(MeshCacheEntry::new(position, ChunkMesh::default()));
        assert!(!cache.needs_mesh(position));

        assert!(cache.mark_dirty(position));
        assert!(cache.needs_mesh(position));
    }

    #[test]
    fn insert_replaces_the_whole_entry() {
        let mut cache = MeshCache::new();
        let position = Point3::new(0, 0, 0);
        let mut uploaded = MeshCacheEntry::new(position, ChunkMesh::default());
        uploaded.buffered = true;
        uploaded.dirty = true;
        cache.insert(uploaded);

        let previous = cache.insert(MeshCacheEntry::new(position, ChunkMesh::default()));
        assert!(previous.is_some_and(|entry| entry.buffered));

        let current = cache.get(position).unwrap();
        assert!(!current.dirty);
        assert!(!current.buffered);
        assert_eq!(cache.len(), 1);
    }
}
