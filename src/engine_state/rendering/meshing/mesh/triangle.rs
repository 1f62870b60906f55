use crate::engine_state::rendering::vertex::Vertex;

/// Three vertices emitted together by a block face.
///
/// Triangles carry no indices of their own; [`super::MeshBuilder`] assigns
/// them when the triangle joins a mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    /// Vertices in counter-clockwise order seen from outside the block.
    pub vertices: [Vertex; 3],
}

impl Triangle {
    /// Builds a triangle from three of a cube's corner vertices.
    pub fn from_corners(corners: &[Vertex; 8], corner_indices: [usize; 3]) -> Self {
        Self {
            vertices: corner_indices.map(|corner| corners[corner]),
        }
    }
}
