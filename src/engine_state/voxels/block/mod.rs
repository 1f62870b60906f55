//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, and per-block
//! triangle emission.

use block_side::BlockSide;
use block_type::BlockType;
use cgmath::Point3;

use crate::engine_state::rendering::meshing::mesh::{face, Triangle};

pub mod block_side;
pub mod block_type;

/// Represents a single voxel block in the world.
///
/// Blocks are plain values: a chunk cell is replaced wholesale by `set_block`,
/// never mutated in place.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    /// The type of this block.
    pub block_type: BlockType,
}

impl Block {
    /// The empty block.
    pub const AIR: Block = Block {
        block_type: BlockType::AIR,
    };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block { block_type }
    }

    /// Whether this block occludes the faces of its neighbours.
    pub fn is_solid(&self) -> bool {
        self.block_type.is_solid()
    }

    /// Whether this block produces geometry.
    pub fn is_rendered(&self) -> bool {
        self.block_type.is_rendered()
    }

    /// Emits the triangles of the visible faces of a unit cube centred on `position`.
    ///
    /// Faces are visited in [`BlockSide::all`] order and each contributes two
    /// triangles. `cull[side]` hides that face, but only while `face_culling`
    /// is on; with culling off all 12 triangles are emitted.
    ///
    /// # Arguments
    /// * `cull` - Per-face occlusion flags, indexed by `BlockSide as usize`
    /// * `position` - World-space centre of the block
    /// * `face_culling` - The global culling switch
    ///
    /// # Returns
    /// The triangles of every uncovered face, in face order.
    pub fn triangles(&self, cull: [bool; 6], position: Point3<f32>, face_culling: bool) -> Vec<Triangle> {
        if !self.is_rendered() {
            return Vec::new();
        }

        let corners = face::cube_corners(position);
        let mut triangles = Vec::with_capacity(12);

        for side in BlockSide::all() {
            if face_culling && cull[side as usize] {
                continue;
            }
            for corner_indices in face::FACE_TRIANGLES[side as usize] {
                triangles.push(Triangle::from_corners(&corners, corner_indices));
            }
        }

        triangles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone() -> Block {
        Block::new(BlockType::STONE)
    }

    #[test]
    fn uncovered_block_emits_twelve_triangles() {
        let triangles = stone().triangles([false; 6], Point3::new(0.0, 0.0, 0.0), true);
        assert_eq!(triangles.len(), 12);
    }

    #[test]
    fn covered_faces_are_skipped() {
        let mut cull = [false; 6];
        cull[BlockSide::TOP as usize] = true;
        cull[BlockSide::LEFT as usize] = true;

        let triangles = stone().triangles(cull, Point3::new(0.0, 0.0, 0.0), true);
        assert_eq!(triangles.len(), 8);

        // The first emitted face is now +X, whose vertices all sit at x = +0.5.
        for vertex in triangles[0].vertices {
            assert_eq!(vertex.position[0], 0.5);
        }
    }

    #[test]
    fn culling_switch_off_emits_every_face() {
        let triangles = stone().triangles([true; 6], Point3::new(0.0, 0.0, 0.0), false);
        assert_eq!(triangles.len(), 12);
    }

    #[test]
    fn fully_covered_block_emits_nothing() {
        let triangles = stone().triangles([true; 6], Point3::new(3.0, 4.0, 5.0), true);
        assert!(triangles.is_empty());
    }

    #[test]
    fn air_emits_nothing() {
        assert!(Block::AIR.triangles([false; 6], Point3::new(0.0, 0.0, 0.0), true).is_empty());
    }

    #[test]
    fn vertices_stay_within_half_a_block() {
        let centre = Point3::new(10.0, -3.0, 7.0);
        for triangle in stone().triangles([false; 6], centre, true) {
            for vertex in triangle.vertices {
                assert!((vertex.position[0] - centre.x).abs() <= 0.5);
                assert!((vertex.position[1] - centre.y).abs() <= 0.5);
                assert!((vertex.position[2] - centre.z).abs() <= 0.5);
            }
        }
    }
}
