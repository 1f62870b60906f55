#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Chunk Mesher
//!
//! Chunk meshing and GPU buffer management for a sparse voxel world, plus a
//! small wgpu viewer that exercises it.
//!
//! ## Key Modules
//!
//! * `engine_state::voxels` - Blocks, 16x16x16 chunks and the `World` that owns them
//! * `engine_state::rendering::meshing` - Face-culled chunk meshes, the mesh cache and the buffer registry
//! * `engine_state::rendering::backend` - The GPU interface the world drives, with a headless recorder
//! * `engine_state::buffer_state` - The wgpu implementation of that interface
//! * `application_state` - Window, input and lifecycle handling for the viewer
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_chunk_mesher::engine_state::{
//!     config::WorldConfig,
//!     rendering::backend::RecordingBackend,
//!     voxels::{block::block_type::BlockType, chunk::Chunk, world::World},
//! };
//!
//! let mut world = World::new(WorldConfig::default());
//! world.add_chunk(Chunk::filled(BlockType::STONE), Point3::new(0, 0, 0));
//!
//! let mut backend = RecordingBackend::new();
//! let report = world.update(&mut backend);
//! assert_eq!(report.meshed, vec![Point3::new(0, 0, 0)]);
//! assert_eq!(world.render(&mut backend), 1);
//! ```
//!
//! The viewer is started with [`run`] on native targets and `run_web` in the browser.

use application_state::ApplicationState;
use engine_state::config::EngineConfig;
#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::wasm_bindgen;

use winit::event_loop::EventLoop;

use log::info;

mod application_state;
pub mod engine_state;

#[cfg(target_family = "wasm")]
const CANVAS_ID: &str = "wgpu-canvas";

/// Starts the native viewer and blocks until its window is closed.
///
/// Logging is configured from `RUST_LOG`; the engine configuration is read
/// from `VOXEL_CONFIG` or `./config.json` when present.
///
/// # Panics
/// Panics if no event loop can be created.
#[cfg(not(target_family = "wasm"))]
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let config = EngineConfig::discover();

    let event_loop = EventLoop::with_user_event()
        .build()
        .expect("failed to create event loop");

    let mut state = ApplicationState::new(event_loop.create_proxy(), config);

    if let Err(err) = event_loop.run_app(&mut state) {
        log::error!("Event loop exited with error: {}", err);
    }
}

/// Starts the viewer on the `wgpu-canvas` element of the hosting page.
#[cfg(target_family = "wasm")]
#[wasm_bindgen]
pub fn run_web() {
    use winit::platform::web::EventLoopExtWebSys;

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info).expect("Couldn't initialize logger");
    info!("Logger initialized");

    let event_loop = EventLoop::with_user_event()
        .build()
        .expect("failed to create event loop");

    let state = ApplicationState::new(event_loop.create_proxy(), EngineConfig::default());

    event_loop.spawn_app(state);
}
