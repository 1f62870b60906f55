//! # Chunk Iteration Module
//!
//! This module provides an iterator over every cell of a chunk.
//!
//! Cells are produced with x outermost, then y, then z innermost. Meshing
//! relies on this order to emit triangles deterministically.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{Chunk, CHUNK_SIZE};

/// An iterator over all cells of a chunk, air included.
///
/// Yields the local coordinate of each cell together with its block.
pub struct ChunkCellIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next cell to yield, or `None` once exhausted
    next_local: Option<Point3<i32>>,
}

impl<'a> ChunkCellIterator<'a> {
    /// Creates a new iterator positioned at local cell (0, 0, 0).
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkCellIterator {
            chunk_ref,
            next_local: Some(Point3::new(0, 0, 0)),
        }
    }

    fn advance(local: Point3<i32>) -> Option<Point3<i32>> {
        let mut next = local;
        next.z += 1;
        if next.z == CHUNK_SIZE {
            next.z = 0;
            next.y += 1;
            if next.y == CHUNK_SIZE {
                next.y = 0;
                next.x += 1;
                if next.x == CHUNK_SIZE {
                    return None;
                }
            }
        }
        Some(next)
    }
}

impl<'a> Iterator for ChunkCellIterator<'a> {
    type Item = (Point3<i32>, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let local = self.next_local?;
        self.next_local = Self::advance(local);
        let block = &self.chunk_ref.blocks[Chunk::local_index(local.x, local.y, local.z)];
        Some((local, block))
    }
}
