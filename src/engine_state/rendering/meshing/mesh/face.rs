//! Unit-cube geometry shared by every rendered block.
//!
//! Corner `c` sits at `centre + (bit2, bit1, bit0) - 0.5`, where bit 2 selects
//! +X, bit 1 +Y and bit 0 +Z. The same bits are written to the vertex aux
//! attribute so shaders can tell the corners apart.

use cgmath::Point3;

use crate::engine_state::rendering::vertex::Vertex;

/// Corner indices of the two counter-clockwise triangles of each face,
/// indexed by `BlockSide as usize`.
pub const FACE_TRIANGLES: [[[usize; 3]; 2]; 6] = [
    [[0, 1, 3], [3, 2, 0]], // −X
    [[4, 6, 7], [7, 5, 4]], // +X
    [[0, 4, 5], [5, 1, 0]], // −Y
    [[2, 3, 7], [7, 6, 2]], // +Y
    [[0, 2, 6], [6, 4, 0]], // −Z
    [[1, 5, 7], [7, 3, 1]], // +Z
];

/// The eight corner vertices of the unit cube centred on `centre`.
pub fn cube_corners(centre: Point3<f32>) -> [Vertex; 8] {
    std::array::from_fn(|corner| {
        let aux = [
            ((corner >> 2) & 1) as f32,
            ((corner >> 1) & 1) as f32,
            (corner & 1) as f32,
        ];
        Vertex::new(
            [
                centre.x + aux[0] - 0.5,
                centre.y + aux[1] - 0.5,
                centre.z + aux[2] - 0.5,
            ],
            [0.0, 0.0],
            aux,
        )
    })
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;

    #[test]
    fn corner_aux_matches_its_offset() {
        let corners = cube_corners(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(corners[0].position, [-0.5, -0.5, -0.5]);
        assert_eq!(corners[5].position, [0.5, -0.5, 0.5]);
        assert_eq!(corners[5].aux, [1.0, 0.0, 1.0]);
        assert_eq!(corners[7].position, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn face_triangles_wind_outwards() {
        let corners = cube_corners(Point3::new(0.0, 0.0, 0.0));
        for side in BlockSide::all() {
            let normal = side.normal().cast::<f32>().unwrap();
            for [a, b, c] in FACE_TRIANGLES[side as usize] {
                let p0 = Vector3::from(corners[a].position);
                let p1 = Vector3::from(corners[b].position);
                let p2 = Vector3::from(corners[c].position);
                let winding = (p1 - p0).cross(p2 - p0).normalize();
                assert!((winding - normal).magnitude() < 1e-6, "{side:?} winds inwards");
            }
        }
    }
}
