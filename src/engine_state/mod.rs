//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - Ties the world, camera and renderer together for the viewer
//! * `buffer_state` - wgpu implementation of the renderer backend
//! * `camera_state` - Handles camera positioning and movement
//! * `config` - Runtime configuration
//! * `rendering` - Backend interface, chunk meshing and the render pipeline
//! * `voxels` - Blocks, chunks and the world
//!
//! ## Frame Flow
//!
//! 1. Input is translated into a [`PlayerAction`]
//! 2. Toggles reconfigure the world; movement updates the camera uniform
//! 3. `World::render` brings meshes and buffers up to date and records one draw per chunk
//! 4. The renderer replays those draws in a single render pass

use std::rc::Rc;

use camera_state::{camera, CameraState, CameraUpdates, CAMERA_BUFFER_NAME};
use cgmath::Point3;
use log::{debug, error, info};
use rendering::MeshRendererManager;
use voxels::{chunk::Chunk, world::World};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::application_state::input_state::ProcessedInputState;
use config::{ChunkPattern, DemoWorldConfig, EngineConfig};

pub mod buffer_state;
pub mod camera_state;
pub mod config;
pub mod error;
pub mod math;
pub mod rendering;
pub mod voxels;

/// Near and far clipping planes of the viewer camera.
const CLIP_PLANES: (f32, f32) = (0.1, 1000.0);

/// The main state container for the voxel viewer
///
/// Owns the world, the camera and the wgpu resources, and coordinates them
/// once per frame.
pub struct EngineState {
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// GPU buffers, including every chunk buffer the world owns
    pub buffer_state: buffer_state::BufferState,
    /// Surface and chunk pipeline
    pub render_manager: MeshRendererManager,
    /// The voxel world containing all chunk data
    pub world: World,
    /// Current chunk position of the player
    current_player_chunk_position: Point3<i32>,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized
    ///
    /// The world is populated from `config.demo`.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        config: EngineConfig,
    ) -> Self {
        let device = Rc::new(device);
        let queue = Rc::new(queue);
        let mut buffer_state = buffer_state::BufferState::new(device.clone(), queue.clone());

        let camera_projection = camera::Projection::new(
            surface_config.width,
            surface_config.height,
            cgmath::Deg(config.camera.fovy_degrees),
            CLIP_PLANES.0,
            CLIP_PLANES.1,
        );
        let camera_state = CameraState::new(&config.camera, &camera_projection);
        buffer_state.create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: camera_state.uniform_bytes(),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let render_manager = MeshRendererManager::new(
            surface,
            surface_config,
            device,
            queue,
            &buffer_state,
            camera_projection,
        );

        let world = demo_world(&config);
        info!("Demo world ready with {} chunks", world.chunk_count());

        Self {
            current_player_chunk_position: World::chunk_pos(Point3::new(
                camera_state.camera.position.x.floor() as i32,
                camera_state.camera.position.y.floor() as i32,
                camera_state.camera.position.z.floor() as i32,
            )),
            camera_state,
            player_actions: PlayerAction::default(),
            buffer_state,
            render_manager,
            world,
        }
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render_manager.resize_surface(size);
        self.camera_state
            .refresh_uniform(&self.render_manager.camera_projection);
        self.write_camera_uniform();
    }

    /// Renders the current frame
    pub fn render(&mut self) {
        self.buffer_state.clear_frame();
        let draws = self.world.render(&mut self.buffer_state);
        log::trace!("Recorded {} chunk draws", draws);
        self.render_manager.render(&self.buffer_state);
    }

    /// Applies the current player actions: toggles, then camera movement
    pub fn process_input(&mut self, wait_duration: web_time::Duration) {
        if self.player_actions.toggle_face_culling {
            let face_culling = !self.world.config().face_culling;
            self.world.set_face_culling(face_culling);
            info!("Face culling {}", if face_culling { "on" } else { "off" });
        }
        if self.player_actions.toggle_meshing {
            let mesh_enabled = !self.world.config().mesh_enabled;
            self.world.set_mesh_enabled(mesh_enabled);
            info!("Meshing {}", if mesh_enabled { "on" } else { "off" });
        }
        if self.player_actions.log_buffer_data {
            self.buffer_state.log_analytics();
            info!(
                "World: {} chunks, {} meshes, {} buffer pairs",
                self.world.chunk_count(),
                self.world.mesh_cache().len(),
                self.world.buffers().len()
            );
        }

        self.camera_state.intake_actions(&self.player_actions);
        if let Some(CameraUpdates { new_chunk_position }) = self
            .camera_state
            .update(wait_duration, &self.render_manager.camera_projection)
        {
            self.write_camera_uniform();
            if self.current_player_chunk_position != new_chunk_position {
                debug!(
                    "Camera entered chunk ({}, {}, {})",
                    new_chunk_position.x, new_chunk_position.y, new_chunk_position.z
                );
                self.current_player_chunk_position = new_chunk_position;
            }
        }

        self.player_actions = PlayerAction::default();
    }

    /// Sets the input commands for the next call to `process_input`.
    pub(crate) fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = PlayerAction::from_input(&input);
    }

    fn write_camera_uniform(&mut self) {
        if let Err(err) = self.buffer_state.write_buffer(
            CAMERA_BUFFER_NAME,
            0,
            bytemuck::bytes_of(&self.camera_state.camera_uniform),
        ) {
            error!("Failed to update camera uniform: {}", err);
        }
    }
}

/// Builds the world described by `config.demo`, using `config.world` switches.
///
/// Chunks are laid out from chunk (0, 0, 0) along the positive axes.
pub fn demo_world(config: &EngineConfig) -> World {
    let mut world = World::new(config.world);
    let DemoWorldConfig {
        extent,
        block_type,
        pattern,
    } = config.demo;

    for x in 0..extent[0] {
        for y in 0..extent[1] {
            for z in 0..extent[2] {
                let chunk = match pattern {
                    ChunkPattern::Filled => Chunk::filled(block_type),
                    ChunkPattern::Checkerboard => Chunk::checkerboard(block_type),
                    ChunkPattern::Random { density } => Chunk::random(block_type, density),
                };
                world.add_chunk(chunk, Point3::new(x, y, z));
            }
        }
    }
    world
}

/// Player actions derived from one frame of input
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerAction {
    /// Movement actions - true if key is pressed or held
    pub(crate) move_forward: bool,
    pub(crate) move_backward: bool,
    pub(crate) move_left: bool,
    pub(crate) move_right: bool,
    pub(crate) move_up: bool,
    pub(crate) move_down: bool,

    /// View rotation - Some while the left mouse button is down and the mouse moved
    pub(crate) rotate_view: Option<(f64, f64)>,

    /// Actions that only trigger on key press, not hold
    pub(crate) toggle_face_culling: bool,
    pub(crate) toggle_meshing: bool,
    pub(crate) log_buffer_data: bool,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    pub(crate) fn from_input(input: &ProcessedInputState) -> Self {
        let rotate_view = input
            .get_mouse_delta()
            .filter(|_| input.get_mouse_button_state(MouseButton::Left).is_active());

        Self {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            move_up: input.get_key_state(KeyCode::Space).is_active(),
            move_down: input.get_key_state(KeyCode::ShiftLeft).is_active(),
            rotate_view,
            toggle_face_culling: input.get_key_state(KeyCode::KeyC).is_just_pressed(),
            toggle_meshing: input.get_key_state(KeyCode::KeyM).is_just_pressed(),
            log_buffer_data: input.get_key_state(KeyCode::KeyB).is_just_pressed(),
        }
    }
}
