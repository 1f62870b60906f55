//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format written into chunk vertex buffers and
//! the attribute layout the renderer declares for it.

use crate::engine_state::rendering::backend::{AttributeType, VertexAttribute};

/// Number of `f32` values in one vertex record.
pub const FLOATS_PER_VERTEX: usize = 8;

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// - Position: [f32; 3] (offset 0)
/// - Texture Coordinates: [f32; 2] (offset 12)
/// - Aux: [f32; 3] (offset 20)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// UV texture coordinates
    pub tex_coords: [f32; 2],
    /// Per-corner marker, the (x, y, z) bits of the cube corner
    pub aux: [f32; 3],
}

impl Vertex {
    /// Byte distance between consecutive vertices.
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// Attribute bindings issued before every chunk draw.
    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute {
            slot: 0,
            components: 3,
            attribute_type: AttributeType::Float,
            stride: Self::STRIDE,
            offset: std::mem::offset_of!(Vertex, position) as u32,
        },
        VertexAttribute {
            slot: 1,
            components: 2,
            attribute_type: AttributeType::Float,
            stride: Self::STRIDE,
            offset: std::mem::offset_of!(Vertex, tex_coords) as u32,
        },
        VertexAttribute {
            slot: 2,
            components: 3,
            attribute_type: AttributeType::Float,
            stride: Self::STRIDE,
            offset: std::mem::offset_of!(Vertex, aux) as u32,
        },
    ];

    const WGPU_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

    /// Creates a new vertex.
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], aux: [f32; 3]) -> Self {
        Vertex {
            position,
            tex_coords,
            aux,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: aux (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::WGPU_ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_eight_packed_floats() {
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(std::mem::size_of::<Vertex>(), FLOATS_PER_VERTEX * 4);
        let offsets: Vec<u32> = Vertex::ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
    }

    #[test]
    fn wgpu_layout_matches_backend_attributes() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, Vertex::STRIDE as u64);
        for (wgpu_attr, attr) in layout.attributes.iter().zip(Vertex::ATTRIBUTES) {
            assert_eq!(wgpu_attr.shader_location, attr.slot);
            assert_eq!(wgpu_attr.offset, attr.offset as u64);
            assert_eq!(wgpu_attr.format.size(), attr.components as u64 * 4);
        }
    }
}
