//! Rendering system for the voxel engine.
//!
//! - `backend`: the narrow GPU interface the world drives, with a headless
//!   recording implementation
//! - `meshing`: chunk mesh generation, the mesh cache and the buffer registry
//! - `MeshRendererManager`: the wgpu surface and the chunk render pass

use std::rc::Rc;

use pipeline_manager::PipelineManager;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use super::{buffer_state::BufferState, camera_state::camera};

pub mod backend;
pub mod meshing;
mod pipeline_manager;
mod texture;
pub mod vertex;

pub use vertex::Vertex;

/// Owns the wgpu surface and draws chunk meshes onto it.
pub struct MeshRendererManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    device: Rc<Device>,
    queue: Rc<Queue>,
    pipeline_manager: PipelineManager,
    /// Camera projection settings
    pub camera_projection: camera::Projection,
}

impl MeshRendererManager {
    /// Creates the chunk pipeline for `surface`.
    ///
    /// `buffer_state` must already hold the camera uniform buffer.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Rc<Device>,
        queue: Rc<Queue>,
        buffer_state: &BufferState,
        camera_projection: camera::Projection,
    ) -> Self {
        let pipeline_manager = PipelineManager::new(
            &device,
            &surface_config,
            surface_config.format,
            buffer_state,
        );

        Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            camera_projection,
        }
    }

    /// Handles window resize events.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);

        self.camera_projection.resize(size.width, size.height);
        self.pipeline_manager.resize(&self.device, &self.surface_config);
    }

    /// Presents a frame with the draws recorded in `buffer_state`.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, buffer_state: &BufferState) {
        match self
            .pipeline_manager
            .render(&self.surface, &self.device, &self.queue, buffer_state)
        {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
            }
            Err(err) => log::error!("Error getting current frame: {:?}", err),
        }
    }
}
