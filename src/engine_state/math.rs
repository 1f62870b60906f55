//! Component-wise vector access.
//!
//! Reads or writes any ordered selection of components, so callers never need
//! a dedicated accessor per permutation (`xzy`, `zx`, ...).

use std::ops::{Index, IndexMut};

use super::error::VoxelError;

/// Parses component names (`x y z w`, or `r g b a`) into indices.
///
/// ```
/// use voxel_chunk_mesher::engine_state::math::component_indices;
/// assert_eq!(component_indices("zyx").unwrap(), vec![2, 1, 0]);
/// ```
pub fn component_indices(names: &str) -> Result<Vec<usize>, VoxelError> {
    names
        .chars()
        .map(|c| match c {
            'x' | 'r' => Ok(0),
            'y' | 'g' => Ok(1),
            'z' | 'b' => Ok(2),
            'w' | 'a' => Ok(3),
            other => Err(VoxelError::InvalidComponent(other)),
        })
        .collect()
}

/// Reads the components at `indices`, in order. Repeats are allowed.
///
/// Panics if an index is out of range for `V`, as indexing does.
pub fn swizzle<V, const N: usize>(source: &V, indices: [usize; N]) -> [f32; N]
where
    V: Index<usize, Output = f32>,
{
    indices.map(|i| source[i])
}

/// Writes `values[n]` to component `indices[n]`. Later writes win on repeats.
pub fn swizzle_set<V, const N: usize>(target: &mut V, indices: [usize; N], values: [f32; N])
where
    V: IndexMut<usize, Output = f32>,
{
    for (i, value) in indices.into_iter().zip(values) {
        target[i] = value;
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector3, Vector4};

    use super::*;

    #[test]
    fn reads_arbitrary_permutations() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(swizzle(&v, [2, 0, 1]), [3.0, 1.0, 2.0]);
        assert_eq!(swizzle(&v, [0, 2]), [1.0, 3.0]);
        assert_eq!(swizzle(&v, [1, 1, 1, 1]), [2.0; 4]);
    }

    #[test]
    fn writes_selected_components_only() {
        let mut v = Vector4::new(0.0, 0.0, 0.0, 0.0);
        swizzle_set(&mut v, [3, 0], [9.0, 4.0]);
        assert_eq!(v, Vector4::new(4.0, 0.0, 0.0, 9.0));
    }

    #[test]
    fn parses_names_and_color_aliases() {
        assert_eq!(component_indices("xzy").unwrap(), vec![0, 2, 1]);
        assert_eq!(component_indices("abgr").unwrap(), vec![3, 2, 1, 0]);
        assert_eq!(component_indices("xq"), Err(VoxelError::InvalidComponent('q')));
    }
}
