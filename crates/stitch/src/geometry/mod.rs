//! Stitch geometry library.
//!
//! Maps a stitch type and fidelity tier to a parametric curve (Catmull-Rom
//! through hand-authored control points) and a tube mesh swept along it.
//! Both are pure functions of `(type, fidelity)`; [`GeometryCache`] memoizes
//! them so tessellation is not repeated per frame.

mod cache;
mod profiles;
mod tube;

use glam::Vec3;
use loopwork_config::Fidelity;

use crate::constants::{
    HIGH_CURVE_SEGMENTS, HIGH_TUBE_SIDES, STANDARD_CURVE_SEGMENTS, STANDARD_TUBE_SIDES,
    YARN_RADIUS,
};
use crate::types::StitchType;

pub use cache::{CacheStats, GeometryCache};
pub use profiles::control_points;
pub use tube::sweep_tube;

/// Memoization key for generated geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryKey {
    pub stitch: StitchType,
    pub fidelity: Fidelity,
}

impl GeometryKey {
    pub fn new(stitch: StitchType, fidelity: Fidelity) -> Self {
        Self { stitch, fidelity }
    }
}

/// Curve segments per control-point span for a fidelity tier
pub fn curve_segments(fidelity: Fidelity) -> usize {
    match fidelity {
        Fidelity::Standard => STANDARD_CURVE_SEGMENTS,
        Fidelity::High => HIGH_CURVE_SEGMENTS,
    }
}

/// Tube sides for a fidelity tier
pub fn tube_sides(fidelity: Fidelity) -> usize {
    match fidelity {
        Fidelity::Standard => STANDARD_TUBE_SIDES,
        Fidelity::High => HIGH_TUBE_SIDES,
    }
}

/// Tessellated stitch curve in the stitch-local frame
#[derive(Debug, Clone, PartialEq)]
pub struct CurveDefinition {
    pub stitch: StitchType,
    pub fidelity: Fidelity,
    /// Authored control points
    pub control_points: Vec<Vec3>,
    /// Tessellated polyline passing through every control point
    pub points: Vec<Vec3>,
}

impl CurveDefinition {
    /// Number of line segments in the polyline
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Vertices needed to draw the polyline as segment pairs
    pub fn line_vertex_count(&self) -> usize {
        self.segment_count() * 2
    }

    /// Iterate over consecutive point pairs
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDescriptor {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshDescriptor {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Positions in index order, one entry per triangle corner
    pub fn triangle_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.indices
            .iter()
            .map(|&i| Vec3::from(self.positions[i as usize]))
    }

    /// Convert to a Bevy render mesh
    #[cfg(feature = "bevy")]
    pub fn to_bevy_mesh(&self) -> bevy::prelude::Mesh {
        use bevy::asset::RenderAssetUsages;
        use bevy::mesh::{Indices, PrimitiveTopology};
        use bevy::prelude::Mesh;

        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone());
        mesh.insert_indices(Indices::U32(self.indices.clone()));
        mesh
    }
}

/// Tessellate the curve for a stitch type.
pub fn curve_for(stitch: StitchType, fidelity: Fidelity) -> CurveDefinition {
    let control_points: Vec<Vec3> = control_points(stitch)
        .iter()
        .map(|&p| Vec3::from(p))
        .collect();
    let points = catmull_rom(&control_points, curve_segments(fidelity));

    CurveDefinition {
        stitch,
        fidelity,
        control_points,
        points,
    }
}

/// Build the yarn tube mesh for a stitch type.
pub fn tube_mesh_for(stitch: StitchType, fidelity: Fidelity) -> MeshDescriptor {
    let curve = curve_for(stitch, fidelity);
    sweep_tube(&curve.points, YARN_RADIUS, tube_sides(fidelity))
}

/// Uniform Catmull-Rom spline through `points`, ends clamped.
///
/// Produces `(n - 1) * segments + 1` points for `n >= 2` control points.
pub fn catmull_rom(points: &[Vec3], segments: usize) -> Vec<Vec3> {
    if points.len() < 2 || segments == 0 {
        return points.to_vec();
    }

    let n = points.len();
    let mut out = Vec::with_capacity((n - 1) * segments + 1);
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];

        for step in 0..segments {
            let t = step as f32 / segments as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let point = 0.5
                * ((2.0 * p1)
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3);
            out.push(point);
        }
    }
    out.push(points[n - 1]);
    out
}
