//! # Voxel Chunk Mesher Viewer
//!
//! Native entry point. For the browser build, see `run_web()` in the library.
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    #[cfg(not(target_family = "wasm"))]
    voxel_chunk_mesher::run();
}
