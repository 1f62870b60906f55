//! # Error Types
//!
//! Errors raised by the voxel data, meshing and configuration layers.
//! Out-of-range *lookups* are not errors; they return `None`.

use cgmath::Point3;
use thiserror::Error;

/// Errors that can occur while editing or meshing the voxel world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoxelError {
    /// A world-space edit targeted a chunk that has not been added.
    #[error("no chunk loaded at chunk position ({}, {}, {})", .0.x, .0.y, .0.z)]
    ChunkNotLoaded(Point3<i32>),

    /// Chunk-local coordinates outside `0..CHUNK_SIZE`.
    #[error("local block coordinate ({x}, {y}, {z}) is outside the chunk")]
    LocalOutOfBounds {
        /// Local x coordinate.
        x: i32,
        /// Local y coordinate.
        y: i32,
        /// Local z coordinate.
        z: i32,
    },

    /// A mesh needed more vertices than a `u32` index can address.
    #[error("mesh needs {vertex_count} vertices, more than u32 indices can address")]
    IndexOverflow {
        /// Number of vertices the mesh would have produced.
        vertex_count: usize,
    },

    /// A vector component name that is not one of `xyzw` / `rgba`.
    #[error("invalid vector component '{0}'")]
    InvalidComponent(char),

    /// A named GPU buffer that was never created.
    #[error("no buffer named '{0}'")]
    UnknownBuffer(&'static str),

    /// A write past the end of a named GPU buffer.
    #[error("write to '{buffer}' ends at byte {end}, but only {allocated} bytes are allocated")]
    BufferOverrun {
        /// Name of the buffer.
        buffer: &'static str,
        /// End offset of the rejected write.
        end: u64,
        /// Allocated size of the buffer.
        allocated: u64,
    },
}

/// Errors that can occur while loading an engine configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for `EngineConfig`.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
