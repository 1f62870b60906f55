//! # Voxel Data
//!
//! Block, chunk and world storage for the voxel engine.
//!
//! * **Block**: a single voxel cell, its type and its six sides
//! * **Chunk**: a fixed 16x16x16 array of blocks with a solidity bitset
//! * **World**: the sparse map of loaded chunks, their cached meshes and GPU buffers
//!
//! ## Data Flow
//!
//! 1. The world receives block or chunk edits
//! 2. Edits mark the affected cached meshes dirty
//! 3. `World::update` re-meshes dirty chunks and uploads the results
//! 4. `World::render` issues one indexed draw per cached mesh

pub mod block;
pub mod chunk;
pub mod world;
