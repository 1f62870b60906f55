//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.

use serde::Deserialize;

/// Enumerates all possible block types in the voxel world.
///
/// Block types carry no geometry of their own: every non-air block is meshed as
/// a unit cube. The type only decides whether a block is solid and rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// An air block, which is non-solid and never rendered.
    #[default]
    AIR,

    /// Plain stone, the fill used by the startup world.
    STONE,

    /// A basic dirt block.
    DIRT,

    /// A grass block.
    GRASS,

    /// A wooden block.
    WOOD,

    /// A plain white block, often used for testing.
    WHITE,
}

impl BlockType {
    /// Whether blocks of this type occlude neighbouring faces.
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }

    /// Whether blocks of this type produce geometry.
    ///
    /// Identical to [`BlockType::is_solid`] today; kept separate so
    /// transparent-but-visible types can be introduced without touching culling.
    pub fn is_rendered(self) -> bool {
        self != BlockType::AIR
    }
}
