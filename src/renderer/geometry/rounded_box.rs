use std::f32::consts::FRAC_PI_4;

use glam::Vec3;

/// Per-vertex data of a static mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit outward normal.
    pub normal: [f32; 3],
}

/// Indexed triangle list with counter-clockwise outward winding.
#[derive(Debug, Clone, Default)]
pub struct RoundedBoxMesh {
    /// Mesh vertices.
    pub vertices: Vec<MeshVertex>,
    /// Triangle indices into `vertices`.
    pub indices: Vec<u32>,
}

/// Generate a box centered at the origin whose edges and corners are
/// rounded with `radius`, using `segments` subdivisions per quarter of a
/// rounded edge.
///
/// Each face is a grid whose vertices are pushed onto a sphere of `radius`
/// around the nearest point of the inner (shrunk) box. The radius is clamped
/// to half the smallest extent; a zero radius or zero segments yields a
/// plain box.
#[must_use]
pub fn rounded_box(
    width: f32,
    height: f32,
    depth: f32,
    segments: u32,
    radius: f32,
) -> RoundedBoxMesh {
    let half = Vec3::new(width, height, depth).abs() * 0.5;
    let radius = radius.clamp(0.0, half.min_element());
    let segments = if radius > 0.0 { segments } else { 0 };
    let inner = half - Vec3::splat(radius);

    let axis_coords = [
        face_coordinates(half.x, radius, segments),
        face_coordinates(half.y, radius, segments),
        face_coordinates(half.z, radius, segments),
    ];

    let mut mesh = RoundedBoxMesh::default();
    for axis in 0..3 {
        for sign in [1.0f32, -1.0] {
            // (u, v) span the face so that u × v points outward.
            let (u, v) = if sign > 0.0 {
                ((axis + 1) % 3, (axis + 2) % 3)
            } else {
                ((axis + 2) % 3, (axis + 1) % 3)
            };
            let mut face_normal = Vec3::ZERO;
            face_normal[axis] = sign;

            let base = mesh.vertices.len() as u32;
            let us = &axis_coords[u];
            let vs = &axis_coords[v];
            for &cv in vs {
                for &cu in us {
                    let mut point = Vec3::ZERO;
                    point[axis] = sign * half[axis];
                    point[u] = cu;
                    point[v] = cv;
                    mesh.vertices.push(round_vertex(point, inner, radius, face_normal));
                }
            }

            let row = us.len() as u32;
            for j in 0..vs.len() as u32 - 1 {
                for i in 0..row - 1 {
                    let a = base + j * row + i;
                    let b = a + 1;
                    let c = a + row + 1;
                    let d = a + row;
                    mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
                }
            }
        }
    }
    mesh
}

/// Grid coordinates along one face axis, ascending from `-half` to `half`.
///
/// The rounded band on each side is sampled at equal angular steps so the
/// projected vertices spread evenly over the arc.
fn face_coordinates(half: f32, radius: f32, segments: u32) -> Vec<f32> {
    if segments == 0 {
        return vec![-half, half];
    }
    let flat = half - radius;
    let mut coords = Vec::with_capacity(2 * segments as usize + 2);
    for k in 0..=segments {
        let angle = FRAC_PI_4 * (segments - k) as f32 / segments as f32;
        coords.push(-flat - radius * angle.tan());
    }
    for k in 0..=segments {
        let angle = FRAC_PI_4 * k as f32 / segments as f32;
        coords.push(flat + radius * angle.tan());
    }
    coords.dedup_by(|a, b| (*a - *b).abs() <= f32::EPSILON);
    coords
}

fn round_vertex(point: Vec3, inner: Vec3, radius: f32, face_normal: Vec3) -> MeshVertex {
    let core = point.clamp(-inner, inner);
    let offset = point - core;
    let (position, normal) = match offset.try_normalize() {
        Some(normal) if radius > 0.0 => (core + normal * radius, normal),
        _ => (point, face_normal),
    };
    MeshVertex {
        position: position.to_array(),
        normal: normal.to_array(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> RoundedBoxMesh {
        rounded_box(1.0, 1.0, 1.0, 2, 0.15)
    }

    #[test]
    fn vertex_and_index_counts() {
        let mesh = cube();
        // 6 coordinates per axis → 36 vertices and 25 quads per face.
        assert_eq!(mesh.vertices.len(), 6 * 36);
        assert_eq!(mesh.indices.len(), 6 * 25 * 6);
        let max = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn vertices_stay_inside_bounds() {
        for v in &cube().vertices {
            let p = Vec3::from_array(v.position);
            assert!(p.abs().max_element() <= 0.5 + 1e-5, "{p}");
        }
    }

    #[test]
    fn normals_are_unit_length() {
        for v in &cube().vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn surface_is_radius_from_inner_box() {
        let inner = Vec3::splat(0.5 - 0.15);
        for v in &cube().vertices {
            let p = Vec3::from_array(v.position);
            let d = p.distance(p.clamp(-inner, inner));
            assert!((d - 0.15).abs() < 1e-4);
        }
    }

    #[test]
    fn winding_faces_outward() {
        let mesh = cube();
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| mesh.vertices[i as usize]);
            let pa = Vec3::from_array(a.position);
            let cross = (Vec3::from_array(b.position) - pa)
                .cross(Vec3::from_array(c.position) - pa);
            if cross.length_squared() < 1e-12 {
                continue;
            }
            let normal = Vec3::from_array(a.normal)
                + Vec3::from_array(b.normal)
                + Vec3::from_array(c.normal);
            assert!(cross.dot(normal) > 0.0);
        }
    }

    #[test]
    fn zero_radius_is_plain_box() {
        let mesh = rounded_box(2.0, 1.0, 1.0, 4, 0.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            assert!((p.x.abs() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn radius_clamped_to_half_extent() {
        let mesh = rounded_box(1.0, 1.0, 1.0, 3, 5.0);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            assert!((p.length() - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn face_coordinates_span_extent() {
        let coords = face_coordinates(0.5, 0.15, 2);
        assert_eq!(coords.len(), 6);
        assert!((coords[0] + 0.5).abs() < 1e-6);
        assert!((coords[5] - 0.5).abs() < 1e-6);
        assert!(coords.windows(2).all(|w| w[0] < w[1]));
    }
}
