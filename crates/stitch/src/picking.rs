//! Nearest-stitch hit testing for pointer interaction.
//!
//! Queries are answered with a linear scan over placements using planar
//! (x, y) distance, so depth offsets from spiral growth or loop modifiers do
//! not hide a stitch from the pointer.

use glam::Vec3;
use loopwork_config::DEFAULT_HIT_RADIUS;

use crate::types::{StitchId, StitchPlacement};

/// Epsilon for ray/plane parallelism
const EPSILON: f32 = 1e-6;

/// Nearest placement to `query` within `radius`.
///
/// Distance is measured in the xy plane. Ties keep the placement encountered
/// first, so both halves of an increase resolve to the earlier one.
pub fn nearest(
    query: Vec3,
    placements: &[StitchPlacement],
    radius: f32,
) -> Option<&StitchPlacement> {
    let target = query.truncate();
    let mut best: Option<(&StitchPlacement, f32)> = None;

    for placement in placements {
        let distance = placement.position.truncate().distance(target);
        if distance > radius {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((placement, distance)),
        }
    }

    best.map(|(placement, _)| placement)
}

/// Intersect a pointer ray with the plane `z = plane_z`.
///
/// Returns `None` when the ray is parallel to the plane or points away.
pub fn project_ray(origin: Vec3, direction: Vec3, plane_z: f32) -> Option<Vec3> {
    if direction.z.abs() < EPSILON {
        return None;
    }
    let t = (plane_z - origin.z) / direction.z;
    if t < 0.0 {
        return None;
    }
    Some(origin + direction * t)
}

/// Hit tester with a fixed pick radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTester {
    radius: f32,
}

impl Default for HitTester {
    fn default() -> Self {
        Self {
            radius: DEFAULT_HIT_RADIUS,
        }
    }
}

impl HitTester {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Identity of the stitch under `point`, if any
    pub fn pick(&self, point: Vec3, placements: &[StitchPlacement]) -> Option<StitchId> {
        nearest(point, placements, self.radius).map(StitchPlacement::id)
    }

    /// Pick along a pointer ray projected onto the chart plane
    pub fn pick_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        placements: &[StitchPlacement],
    ) -> Option<StitchId> {
        let point = project_ray(origin, direction, 0.0)?;
        self.pick(point, placements)
    }
}
