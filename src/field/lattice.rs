//! Cube lattice layout.

use glam::Vec3;

/// Base positions of a `stride³` lattice centered on the origin.
///
/// Cubes are unit sized and separated by `gap` (a fraction of the cube
/// size), so neighbouring centers sit `1 + gap` apart. Iteration order is
/// x outer, y middle, z inner.
#[must_use]
pub fn lattice_positions(stride: u32, gap: f32) -> Vec<Vec3> {
    let pitch = 1.0 + gap;
    let offset = (stride as f32 - 1.0) * pitch / 2.0;
    let axis = |i: u32| i as f32 * pitch - offset;

    let n = stride as usize;
    let mut positions = Vec::with_capacity(n * n * n);
    for x in 0..stride {
        for y in 0..stride {
            for z in 0..stride {
                positions.push(Vec3::new(axis(x), axis(y), axis(z)));
            }
        }
    }
    positions
}

/// Flat index of lattice cell `(x, y, z)` in [`lattice_positions`] order.
#[must_use]
pub fn lattice_index(stride: u32, x: u32, y: u32, z: u32) -> usize {
    let n = stride as usize;
    (x as usize * n + y as usize) * n + z as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_stride_cubed() {
        for stride in 0..7 {
            assert_eq!(lattice_positions(stride, 0.1).len(), (stride as usize).pow(3));
        }
    }

    #[test]
    fn symmetric_about_origin() {
        for &(stride, gap) in &[(1, 0.0), (2, 0.1), (4, 0.1), (5, 0.5), (7, 2.0)] {
            let positions = lattice_positions(stride, gap);
            let min = positions.iter().copied().fold(Vec3::INFINITY, Vec3::min);
            let max = positions.iter().copied().fold(Vec3::NEG_INFINITY, Vec3::max);
            assert!((min + max).length() < 1e-5, "stride {stride} gap {gap}");
            let centroid = positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
            assert!(centroid.length() < 1e-4);
        }
    }

    #[test]
    fn axis_aligned_with_uniform_pitch() {
        let positions = lattice_positions(3, 0.25);
        let a = positions[lattice_index(3, 0, 0, 0)];
        let b = positions[lattice_index(3, 0, 0, 1)];
        let c = positions[lattice_index(3, 1, 0, 0)];
        assert_eq!(b - a, Vec3::new(0.0, 0.0, 1.25));
        assert_eq!(c - a, Vec3::new(1.25, 0.0, 0.0));
    }

    #[test]
    fn single_cube_sits_at_origin() {
        assert_eq!(lattice_positions(1, 0.3), vec![Vec3::ZERO]);
    }
}
