//! Renderer backend abstraction.
//!
//! The world talks to the GPU through this narrow, bind-then-act interface:
//! buffers are created and deleted by handle, data is uploaded to whichever
//! buffer is bound to a target, and indexed draws read the currently bound
//! vertex and index buffers.
//!
//! Two implementations exist:
//! - [`RecordingBackend`]: headless, keeps buffer contents in memory and logs every call
//! - [`crate::engine_state::buffer_state::BufferState`]: wgpu buffers replayed into a render pass

mod recording;

pub use recording::{BackendCall, RecordingBackend};

/// Opaque identifier of a GPU buffer created by a backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(u32);

impl BufferHandle {
    /// Wraps a backend-assigned id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// The backend-assigned id.
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Binding point a buffer is attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    ArrayBuffer,
    /// Index data.
    ElementArrayBuffer,
}

/// How often uploaded data is expected to change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferUsageHint {
    /// Written once, drawn many times.
    StaticDraw,
    /// Rewritten occasionally, drawn many times.
    DynamicDraw,
    /// Rewritten about every draw.
    StreamDraw,
}

/// Component type of a vertex attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// 32-bit float.
    Float,
}

/// Primitive assembly mode of a draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Independent triangles, three indices each.
    Triangles,
}

/// Element type of an index buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 32-bit unsigned indices.
    UnsignedInt,
}

impl IndexType {
    /// Size of one index in bytes.
    pub fn size(self) -> u64 {
        match self {
            IndexType::UnsignedInt => 4,
        }
    }
}

/// One vertex attribute pointer, read from the bound vertex buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader input location.
    pub slot: u32,
    /// Number of components (1 to 4).
    pub components: u32,
    /// Component type.
    pub attribute_type: AttributeType,
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// Byte offset of the attribute inside a vertex.
    pub offset: u32,
}

/// The GPU operations needed to keep chunk meshes resident and draw them.
///
/// Handles are only meaningful to the backend that created them. Uploading or
/// drawing with nothing bound to the relevant target is a caller bug; backends
/// log it and ignore the call.
pub trait RenderBackend {
    /// Allocates a new, empty buffer.
    fn create_buffer(&mut self) -> BufferHandle;

    /// Binds `handle` to `target`, replacing the previous binding.
    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle);

    /// Replaces the contents of the buffer bound to `target`.
    fn upload_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsageHint);

    /// Frees a buffer. Any binding of it is cleared.
    fn delete_buffer(&mut self, handle: BufferHandle);

    /// Declares how one attribute is read from the bound vertex buffer.
    fn set_vertex_attribute(&mut self, attribute: VertexAttribute);

    /// Draws `count` indices from the bound index buffer, starting `offset` bytes in.
    fn draw_indexed(&mut self, primitive: PrimitiveType, count: u32, index_type: IndexType, offset: u64);
}
