//! Tube sweeping along a polyline with parallel-transport frames.

use glam::Vec3;

use super::MeshDescriptor;

/// Pick a unit normal perpendicular to `tangent`, preferring `hint`
fn frame_normal(tangent: Vec3, hint: Vec3) -> Vec3 {
    let mut normal = hint.cross(tangent);
    if normal.length_squared() < 1e-6 {
        normal = Vec3::Y.cross(tangent);
        if normal.length_squared() < 1e-6 {
            normal = Vec3::X.cross(tangent);
        }
    }
    normal.normalize_or_zero()
}

/// Sweep a circular cross-section of `radius` along `path`.
///
/// Rings of `sides` vertices are placed at every path point and stitched
/// together with two triangles per quad. Ends are left open. Returns an empty
/// mesh for paths shorter than two points or fewer than three sides.
pub fn sweep_tube(path: &[Vec3], radius: f32, sides: usize) -> MeshDescriptor {
    let mut mesh = MeshDescriptor::default();
    if path.len() < 2 || sides < 3 {
        return mesh;
    }

    let tangents: Vec<Vec3> = (0..path.len())
        .map(|i| {
            let t = if i + 1 < path.len() {
                path[i + 1] - path[i]
            } else {
                path[i] - path[i - 1]
            };
            t.normalize_or_zero()
        })
        .collect();

    // Parallel transport keeps the ring from twisting between samples
    let mut normals = Vec::with_capacity(path.len());
    let mut normal = frame_normal(tangents[0], Vec3::Z);
    normals.push(normal);
    for &tangent in &tangents[1..] {
        let projected = (normal - tangent * normal.dot(tangent)).normalize_or_zero();
        normal = if projected.length_squared() < 1e-6 {
            frame_normal(tangent, Vec3::Z)
        } else {
            projected
        };
        normals.push(normal);
    }

    mesh.positions.reserve(path.len() * sides);
    mesh.normals.reserve(path.len() * sides);
    for ((&center, &tangent), &normal) in path.iter().zip(&tangents).zip(&normals) {
        let binormal = tangent.cross(normal).normalize_or_zero();
        for side in 0..sides {
            let phi = side as f32 / sides as f32 * std::f32::consts::TAU;
            let dir = normal * phi.cos() + binormal * phi.sin();
            mesh.positions.push((center + dir * radius).to_array());
            mesh.normals.push(dir.normalize_or_zero().to_array());
        }
    }

    mesh.indices.reserve((path.len() - 1) * sides * 6);
    for ring in 0..path.len() - 1 {
        let a = (ring * sides) as u32;
        let b = ((ring + 1) * sides) as u32;
        for side in 0..sides {
            let s0 = side as u32;
            let s1 = ((side + 1) % sides) as u32;
            mesh.indices.extend_from_slice(&[a + s0, b + s0, b + s1]);
            mesh.indices.extend_from_slice(&[a + s0, b + s1, a + s1]);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_tube_ring_radius() {
        let path = [Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)];
        let mesh = sweep_tube(&path, 0.5, 8);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 16);
        for p in &mesh.positions[..8] {
            let radial = Vec3::new(p[0], 0.0, p[2]);
            assert!((radial.length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerate_input_gives_empty_mesh() {
        assert_eq!(sweep_tube(&[Vec3::ZERO], 0.1, 8).vertex_count(), 0);
        assert_eq!(sweep_tube(&[Vec3::ZERO, Vec3::X], 0.1, 2).vertex_count(), 0);
    }

    #[test]
    fn test_indices_in_range() {
        let path = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0)];
        let mesh = sweep_tube(&path, 0.1, 6);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }
}
