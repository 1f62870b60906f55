//! Manages the WebGPU render pipeline used to draw chunk meshes.
//!
//! The pipeline manager owns the chunk pipeline, the camera bind group and the
//! depth texture. Each frame it opens one render pass and replays the indexed
//! draws that `World::render` recorded into the [`BufferState`].

use log::warn;
use wgpu::{BindGroup, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration, TextureFormat};

use super::{texture, vertex::Vertex};
use crate::engine_state::{buffer_state::BufferState, camera_state::CAMERA_BUFFER_NAME};

const CHUNK_SHADER: &str = include_str!("shaders/chunk.wgsl");

/// Sky colour behind the chunks.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.55,
    g: 0.7,
    b: 0.85,
    a: 1.0,
};

/// Chunk pipeline, camera bind group and depth target.
pub struct PipelineManager {
    render_pipeline: RenderPipeline,
    camera_bind_group: BindGroup,
    /// Depth texture used for depth testing
    depth_texture: texture::Texture,
}

impl PipelineManager {
    /// Builds the chunk pipeline for surfaces of `texture_format`.
    ///
    /// # Panics
    /// Panics if the camera uniform buffer has not been created in `buffer_state`.
    pub fn new(
        device: &Device,
        config: &SurfaceConfiguration,
        texture_format: TextureFormat,
        buffer_state: &BufferState,
    ) -> Self {
        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let camera_binding = buffer_state
            .get_entire_binding(CAMERA_BUFFER_NAME)
            .expect("camera buffer must exist before the pipeline is built");
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_binding,
            }],
            label: Some("camera_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chunk Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Chunk Shader"),
            source: wgpu::ShaderSource::Wgsl(CHUNK_SHADER.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Chunk Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            camera_bind_group,
            depth_texture: texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE"),
        }
    }

    /// Renders one frame: clears, then replays the recorded chunk draws.
    ///
    /// # Errors
    /// Returns the surface error if no frame could be acquired.
    pub fn render(
        &self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        buffer_state: &BufferState,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;
        if frame.suboptimal {
            warn!("Surface frame is suboptimal");
        }

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&Default::default());
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("chunk_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            rpass.set_pipeline(&self.render_pipeline);
            rpass.set_bind_group(0, &self.camera_bind_group, &[]);
            buffer_state.encode_draws(&mut rpass);
        }

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Recreates the depth texture for a new surface size.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}
