use std::collections::HashMap;

use log::{trace, warn};

use super::{
    BufferHandle, BufferTarget, BufferUsageHint, IndexType, PrimitiveType, RenderBackend,
    VertexAttribute,
};

/// A backend call, as recorded by [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    /// `create_buffer` returned this handle.
    CreateBuffer(BufferHandle),
    /// `bind_buffer(target, handle)`.
    BindBuffer(BufferTarget, BufferHandle),
    /// `upload_data` into the buffer bound at the time.
    UploadData {
        /// Target the data was uploaded through.
        target: BufferTarget,
        /// Buffer that received the data.
        handle: BufferHandle,
        /// Number of bytes uploaded.
        bytes: usize,
        /// Usage hint supplied by the caller.
        usage: BufferUsageHint,
    },
    /// `delete_buffer(handle)`.
    DeleteBuffer(BufferHandle),
    /// `set_vertex_attribute(attribute)`.
    SetVertexAttribute(VertexAttribute),
    /// `draw_indexed`, resolved against the bindings at the time.
    DrawIndexed {
        /// Bound vertex buffer.
        vertex_buffer: BufferHandle,
        /// Bound index buffer.
        index_buffer: BufferHandle,
        /// Primitive mode.
        primitive: PrimitiveType,
        /// Number of indices drawn.
        count: u32,
        /// Index element type.
        index_type: IndexType,
        /// Byte offset into the index buffer.
        offset: u64,
    },
}

/// Headless backend that keeps buffers in memory and records every call.
///
/// Useful for tests and for inspecting the submission stream without a GPU.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u32,
    buffers: HashMap<BufferHandle, Vec<u8>>,
    bindings: HashMap<BufferTarget, BufferHandle>,
    calls: Vec<BackendCall>,
}

impl RecordingBackend {
    /// Creates a backend with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since creation or the last [`RecordingBackend::clear_calls`].
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forgets the recorded calls. Buffers and bindings are kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of buffers created and not yet deleted.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Whether `handle` names a live buffer.
    pub fn is_live(&self, handle: BufferHandle) -> bool {
        self.buffers.contains_key(&handle)
    }

    /// Current contents of a live buffer.
    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(Vec::as_slice)
    }

    /// Recorded draws, in submission order.
    pub fn draw_calls(&self) -> Vec<&BackendCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::DrawIndexed { .. }))
            .collect()
    }

    /// Number of recorded uploads.
    pub fn upload_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::UploadData { .. }))
            .count()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle::new(self.next_id);
        self.next_id += 1;
        self.buffers.insert(handle, Vec::new());
        self.calls.push(BackendCall::CreateBuffer(handle));
        handle
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        if !self.buffers.contains_key(&handle) {
            warn!("Binding unknown buffer {:?} to {:?}", handle, target);
        }
        self.bindings.insert(target, handle);
        self.calls.push(BackendCall::BindBuffer(target, handle));
    }

    fn upload_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsageHint) {
        let Some(&handle) = self.bindings.get(&target) else {
            warn!("Upload to {:?} with no buffer bound", target);
            return;
        };
        let Some(contents) = self.buffers.get_mut(&handle) else {
            warn!("Upload to deleted buffer {:?}", handle);
            return;
        };
        contents.clear();
        contents.extend_from_slice(data);
        trace!("Uploaded {} bytes to {:?}", data.len(), handle);
        self.calls.push(BackendCall::UploadData {
            target,
            handle,
            bytes: data.len(),
            usage,
        });
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle).is_none() {
            warn!("Deleting unknown buffer {:?}", handle);
        }
        self.bindings.retain(|_, bound| *bound != handle);
        self.calls.push(BackendCall::DeleteBuffer(handle));
    }

    fn set_vertex_attribute(&mut self, attribute: VertexAttribute) {
        self.calls.push(BackendCall::SetVertexAttribute(attribute));
    }

    fn draw_indexed(&mut self, primitive: PrimitiveType, count: u32, index_type: IndexType, offset: u64) {
        let (Some(&vertex_buffer), Some(&index_buffer)) = (
            self.bindings.get(&BufferTarget::ArrayBuffer),
            self.bindings.get(&BufferTarget::ElementArrayBuffer),
        ) else {
            warn!("Indexed draw without both vertex and index buffers bound");
            return;
        };
        self.calls.push(BackendCall::DrawIndexed {
            vertex_buffer,
            index_buffer,
            primitive,
            count,
            index_type,
            offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_goes_to_the_bound_buffer() {
        let mut backend = RecordingBackend::new();
        let a = backend.create_buffer();
        let b = backend.create_buffer();

        backend.bind_buffer(BufferTarget::ArrayBuffer, a);
        backend.bind_buffer(BufferTarget::ElementArrayBuffer, b);
        backend.upload_data(BufferTarget::ArrayBuffer, &[1, 2, 3, 4], BufferUsageHint::DynamicDraw);
        backend.upload_data(BufferTarget::ElementArrayBuffer, &[9; 8], BufferUsageHint::DynamicDraw);

        assert_eq!(backend.buffer_contents(a), Some(&[1, 2, 3, 4][..]));
        assert_eq!(backend.buffer_contents(b), Some(&[9; 8][..]));
        assert_eq!(backend.upload_count(), 2);
    }

    #[test]
    fn unbound_upload_is_ignored() {
        let mut backend = RecordingBackend::new();
        backend.upload_data(BufferTarget::ArrayBuffer, &[1], BufferUsageHint::StaticDraw);
        assert_eq!(backend.upload_count(), 0);
    }

    #[test]
    fn delete_clears_bindings() {
        let mut backend = RecordingBackend::new();
        let vertex = backend.create_buffer();
        let index = backend.create_buffer();
        backend.bind_buffer(BufferTarget::ArrayBuffer, vertex);
        backend.bind_buffer(BufferTarget::ElementArrayBuffer, index);
        backend.delete_buffer(vertex);

        backend.draw_indexed(PrimitiveType::Triangles, 3, IndexType::UnsignedInt, 0);

        assert!(backend.draw_calls().is_empty());
        assert_eq!(backend.live_buffer_count(), 1);
        assert!(!backend.is_live(vertex));
    }

    #[test]
    fn draw_records_current_bindings() {
        let mut backend = RecordingBackend::new();
        let vertex = backend.create_buffer();
        let index = backend.create_buffer();
        backend.bind_buffer(BufferTarget::ArrayBuffer, vertex);
        backend.bind_buffer(BufferTarget::ElementArrayBuffer, index);
        backend.draw_indexed(PrimitiveType::Triangles, 36, IndexType::UnsignedInt, 0);

        assert_eq!(
            backend.draw_calls(),
            vec![&BackendCall::DrawIndexed {
                vertex_buffer: vertex,
                index_buffer: index,
                primitive: PrimitiveType::Triangles,
                count: 36,
                index_type: IndexType::UnsignedInt,
                offset: 0,
            }]
        );
    }
}
