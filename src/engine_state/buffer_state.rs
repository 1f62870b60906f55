//! # Buffer State Module
//!
//! GPU buffer management for the voxel engine.
//!
//! `BufferState` owns two kinds of buffers:
//!
//! * Named buffers (the camera uniform) created once and rewritten in place
//! * Chunk buffers created and deleted through the [`RenderBackend`] interface,
//!   addressed by [`BufferHandle`]
//!
//! ## Chunk Buffers
//!
//! The world drives chunk buffers with bind-then-act calls. Uploads that fit in
//! the current allocation are written through the queue; larger uploads
//! reallocate the buffer. Indexed draws are recorded and replayed into the
//! frame's render pass by [`BufferState::encode_draws`].
//!
//! ## Analytics
//!
//! Every buffer tracks allocated bytes, used bytes and write count, which can be
//! summed or logged to spot over-allocation.

use std::collections::HashMap;
use std::rc::Rc;

use log::{info, trace, warn};
use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device, Queue};

use crate::engine_state::{
    error::VoxelError,
    rendering::{
        backend::{
            BufferHandle, BufferTarget, BufferUsageHint, IndexType, PrimitiveType, RenderBackend,
            VertexAttribute,
        },
        vertex::Vertex,
    },
};

/// Analytics data for a GPU buffer
#[derive(Debug, Default, Clone, Copy)]
struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    allocated_memory: u64,
    /// Memory holding live data in bytes
    used_memory: u64,
    /// Number of times the buffer has been written to
    times_written: u64,
}

/// A chunk buffer. The wgpu buffer is allocated lazily on first upload.
#[derive(Debug, Default)]
struct ChunkBuffer {
    buffer: Option<Buffer>,
    analytics: BufferAnalytics,
}

/// An indexed draw resolved against the bindings at record time.
#[derive(Debug, Clone, Copy)]
struct DrawCommand {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    count: u32,
    first_index: u32,
}

/// Central manager for GPU buffers in the voxel engine
///
/// Implements [`RenderBackend`] on top of wgpu so the world can keep chunk
/// meshes resident on the GPU.
pub struct BufferState {
    /// Reference to the GPU device
    device: Rc<Device>,
    /// Reference to the GPU command queue
    queue: Rc<Queue>,
    /// Map of buffer names to buffer objects
    named_buffers: HashMap<&'static str, (Buffer, BufferAnalytics)>,
    chunk_buffers: HashMap<BufferHandle, ChunkBuffer>,
    bindings: HashMap<BufferTarget, BufferHandle>,
    draws: Vec<DrawCommand>,
    next_handle: u32,
}

impl BufferState {
    /// Creates a new buffer state manager
    ///
    /// # Arguments
    ///
    /// * `device` - Reference to the GPU device
    /// * `queue` - Reference to the GPU command queue
    pub fn new(device: Rc<Device>, queue: Rc<Queue>) -> Self {
        Self {
            device,
            queue,
            named_buffers: HashMap::new(),
            chunk_buffers: HashMap::new(),
            bindings: HashMap::new(),
            draws: Vec::new(),
            next_handle: 0,
        }
    }

    /// Creates a named buffer and initializes it with data
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Unique name for the buffer
    /// * `init_descriptor` - Buffer initialization descriptor with data
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let analytics = BufferAnalytics {
            allocated_memory: init_descriptor.contents.len() as u64,
            used_memory: init_descriptor.contents.len() as u64,
            times_written: 1,
        };
        let buffer = self.device.create_buffer_init(&init_descriptor);
        self.named_buffers.insert(buffer_name, (buffer, analytics));
    }

    /// Writes raw byte data to a named buffer
    ///
    /// # Errors
    ///
    /// [`VoxelError::UnknownBuffer`] if no buffer has that name, and
    /// [`VoxelError::BufferOverrun`] if the write would exceed the allocation.
    pub fn write_buffer(
        &mut self,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> Result<(), VoxelError> {
        let (buffer, analytics) = self
            .named_buffers
            .get_mut(buffer_name)
            .ok_or(VoxelError::UnknownBuffer(buffer_name))?;

        let end = offset + data.len() as u64;
        if end > analytics.allocated_memory {
            return Err(VoxelError::BufferOverrun {
                buffer: buffer_name,
                end,
                allocated: analytics.allocated_memory,
            });
        }

        self.queue.write_buffer(buffer, offset, data);
        analytics.used_memory = analytics.used_memory.max(end);
        analytics.times_written += 1;
        Ok(())
    }

    /// Gets a binding resource for the entire named buffer
    pub fn get_entire_binding(&self, buffer_name: &'static str) -> Option<wgpu::BindingResource<'_>> {
        self.named_buffers
            .get(buffer_name)
            .map(|(buffer, _)| buffer.as_entire_binding())
    }

    /// Replays the indexed draws recorded this frame into `render_pass`.
    ///
    /// Draws with no indices, or whose buffers were deleted or never
    /// written, are skipped.
    pub fn encode_draws(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for draw in &self.draws {
            if draw.count == 0 {
                continue;
            }
            let (Some(vertex), Some(index)) = (
                self.gpu_buffer(draw.vertex_buffer),
                self.gpu_buffer(draw.index_buffer),
            ) else {
                continue;
            };
            render_pass.set_vertex_buffer(0, vertex.slice(..));
            render_pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(draw.first_index..draw.first_index + draw.count, 0, 0..1);
        }
    }

    /// Forgets the draws recorded for the previous frame.
    pub fn clear_frame(&mut self) {
        self.draws.clear();
    }

    /// Gets the total allocated memory across all buffers
    ///
    /// # Returns
    ///
    /// Total allocated memory in bytes
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.analytics().fold(0, |acc, analytics| acc + analytics.allocated_memory)
    }

    /// Gets the total used memory across all buffers
    ///
    /// # Returns
    ///
    /// Total used memory in bytes
    pub fn get_total_used_memory(&self) -> u64 {
        self.analytics().fold(0, |acc, analytics| acc + analytics.used_memory)
    }

    /// Logs a one-line summary of buffer usage.
    pub fn log_analytics(&self) {
        let writes: u64 = self.analytics().map(|analytics| analytics.times_written).sum();
        info!(
            "GPU buffers: {} chunk + {} named, {} bytes allocated, {} bytes used, {} writes",
            self.chunk_buffers.len(),
            self.named_buffers.len(),
            self.get_total_allocated_memory(),
            self.get_total_used_memory(),
            writes
        );
    }

    fn analytics(&self) -> impl Iterator<Item = &BufferAnalytics> {
        self.named_buffers
            .values()
            .map(|(_, analytics)| analytics)
            .chain(self.chunk_buffers.values().map(|chunk| &chunk.analytics))
    }

    fn gpu_buffer(&self, handle: BufferHandle) -> Option<&Buffer> {
        self.chunk_buffers.get(&handle)?.buffer.as_ref()
    }
}

impl RenderBackend for BufferState {
    fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle::new(self.next_handle);
        self.next_handle += 1;
        self.chunk_buffers.insert(handle, ChunkBuffer::default());
        handle
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        if !self.chunk_buffers.contains_key(&handle) {
            warn!("Binding unknown buffer {:?} to {:?}", handle, target);
        }
        self.bindings.insert(target, handle);
    }

    fn upload_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsageHint) {
        let Some(&handle) = self.bindings.get(&target) else {
            warn!("Upload to {:?} with no buffer bound", target);
            return;
        };
        let Some(chunk_buffer) = self.chunk_buffers.get_mut(&handle) else {
            warn!("Upload to deleted buffer {:?}", handle);
            return;
        };

        let size = data.len() as u64;
        let fits = size <= chunk_buffer.analytics.allocated_memory;
        match chunk_buffer.buffer.as_ref() {
            Some(buffer) if fits => {
                if size > 0 {
                    self.queue.write_buffer(buffer, 0, data);
                }
            }
            _ => {
                let usages = match target {
                    BufferTarget::ArrayBuffer => BufferUsages::VERTEX | BufferUsages::COPY_DST,
                    BufferTarget::ElementArrayBuffer => BufferUsages::INDEX | BufferUsages::COPY_DST,
                };
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("chunk_buffer"),
                    contents: data,
                    usage: usages,
                });
                if let Some(previous) = chunk_buffer.buffer.replace(buffer) {
                    previous.destroy();
                }
                chunk_buffer.analytics.allocated_memory = size;
            }
        }

        chunk_buffer.analytics.used_memory = size;
        chunk_buffer.analytics.times_written += 1;
        trace!("Uploaded {} bytes to {:?} ({:?})", size, handle, usage);
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        match self.chunk_buffers.remove(&handle) {
            Some(ChunkBuffer { buffer: Some(buffer), .. }) => buffer.destroy(),
            Some(_) => {}
            None => warn!("Deleting unknown buffer {:?}", handle),
        }
        self.bindings.retain(|_, bound| *bound != handle);
    }

    fn set_vertex_attribute(&mut self, attribute: VertexAttribute) {
        // The pipeline's vertex layout is fixed; only the chunk vertex format is supported.
        if !Vertex::ATTRIBUTES.contains(&attribute) {
            warn!("Unsupported vertex attribute {:?}", attribute);
        }
    }

    fn draw_indexed(&mut self, primitive: PrimitiveType, count: u32, index_type: IndexType, offset: u64) {
        let (Some(&vertex_buffer), Some(&index_buffer)) = (
            self.bindings.get(&BufferTarget::ArrayBuffer),
            self.bindings.get(&BufferTarget::ElementArrayBuffer),
        ) else {
            warn!("Indexed draw without both vertex and index buffers bound");
            return;
        };
        match primitive {
            PrimitiveType::Triangles => self.draws.push(DrawCommand {
                vertex_buffer,
                index_buffer,
                count,
                first_index: (offset / index_type.size()) as u32,
            }),
        }
    }
}
