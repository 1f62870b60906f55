//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the fixed order in
//! which faces are culled and emitted.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is the index into every per-face array (`cull` flags,
/// neighbour chunks, face triangle tables). The order is
/// −X, +X, −Y, +Y, −Z, +Z.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The left face (facing negative X)
    LEFT = 0,

    /// The right face (facing positive X)
    RIGHT = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The back face (facing negative Z)
    BACK = 4,

    /// The front face (facing positive Z)
    FRONT = 5,
}

impl BlockSide {
    /// Returns all six block faces in emission order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::BACK,
            BlockSide::FRONT,
        ]
    }

    /// Unit offset from a block to the neighbour across this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
        }
    }
}
