//! Radial (crochet in the round) placement.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use loopwork_config::LayoutParams;

use super::emit_cell;
use crate::constants::RADIAL_START_ANGLE;
use crate::types::{Chart, StitchPlacement};

/// Place each row on a ring of radius `base_radius + row * row_spacing`.
///
/// Cells share the ring evenly in reading order starting at the bottom
/// (`-pi/2`), odd rows are rotated by half a step so stitches interlock, and
/// depth grows by `spiral_depth_increment` per row. Orientation follows the
/// counter-clockwise tangent.
pub fn layout_radial(chart: &Chart, params: &LayoutParams) -> Vec<StitchPlacement> {
    let mut placements = Vec::with_capacity(super::placement_count(chart));

    for (row, cells) in chart.rows() {
        if cells.is_empty() {
            continue;
        }

        let angle_step = TAU / cells.len() as f32;
        let stagger = if row % 2 == 1 { angle_step * 0.5 } else { 0.0 };
        let radius = params.base_radius + row as f32 * params.row_spacing;
        let z = row as f32 * params.spiral_depth_increment;

        for (index, cell) in cells.iter().enumerate() {
            let angle = RADIAL_START_ANGLE + index as f32 * angle_step + stagger;
            let nominal = Vec3::new(radius * angle.cos(), radius * angle.sin(), z);
            emit_cell(&mut placements, cell, nominal, angle + FRAC_PI_2);
        }
    }

    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StitchCell, StitchType};
    use std::f32::consts::FRAC_PI_3;

    #[test]
    fn test_single_ring_of_six() {
        // One ring of six plain stitches
        let chart = Chart::from_rows(&[vec![StitchType::Single; 6]]);
        let params = LayoutParams::radial(0.3, 0.35);
        let placements = layout_radial(&chart, &params);
        assert_eq!(placements.len(), 6);

        for (k, placement) in placements.iter().enumerate() {
            let radius = placement.position.truncate().length();
            assert!((radius - 0.3).abs() < 1e-6);

            let expected = RADIAL_START_ANGLE + k as f32 * FRAC_PI_3;
            let actual = placement.position.y.atan2(placement.position.x);
            let diff = (actual - expected).rem_euclid(TAU);
            assert!(diff < 1e-5 || TAU - diff < 1e-5, "stitch {k}: {actual} vs {expected}");
            assert_eq!(placement.position.z, 0.0);
        }
    }

    #[test]
    fn test_rings_grow_and_stagger() {
        let chart = Chart::from_rows(&[vec![StitchType::Single; 4], vec![StitchType::Single; 4]]);
        let params = LayoutParams::radial(0.3, 0.35);
        let placements = layout_radial(&chart, &params);

        let outer = placements[4];
        assert!((outer.position.truncate().length() - 0.65).abs() < 1e-6);
        assert!((outer.position.z - params.spiral_depth_increment).abs() < 1e-7);

        // Half of a quarter turn
        let angle = outer.position.y.atan2(outer.position.x);
        let expected = RADIAL_START_ANGLE + std::f32::consts::FRAC_PI_4;
        assert!((angle - expected).abs() < 1e-5);
    }

    #[test]
    fn test_sparse_rows_keep_ring_radius() {
        // Row 1 is absent; row 2 still sits on ring 2
        let chart = Chart::from_cells(vec![
            StitchCell::new(0, 0, StitchType::Single),
            StitchCell::new(0, 1, StitchType::Single),
            StitchCell::new(2, 0, StitchType::Increase),
        ])
        .unwrap();
        let params = LayoutParams::radial(0.3, 0.35);
        let placements = layout_radial(&chart, &params);
        assert_eq!(placements.len(), 4);

        let halves: Vec<&StitchPlacement> = placements.iter().filter(|p| p.row == 2).collect();
        assert_eq!(halves.len(), 2);
        let nominal = (halves[0].position + halves[1].position) * 0.5;
        assert!((nominal.truncate().length() - 1.0).abs() < 1e-5);
        assert!((nominal.z - 2.0 * params.spiral_depth_increment).abs() < 1e-6);

        for p in &placements {
            assert!(p.position.is_finite());
            assert!(p.orientation.is_finite());
        }
    }

    #[test]
    fn test_zero_depth_increment_flattens() {
        let chart = Chart::from_rows(&[vec![StitchType::Single; 3], vec![StitchType::Single; 3]]);
        let mut params = LayoutParams::default();
        params.spiral_depth_increment = 0.0;
        let placements = layout_radial(&chart, &params);
        assert!(placements.iter().all(|p| p.position.z == 0.0));
    }

    #[test]
    fn test_orientation_is_tangent() {
        let chart = Chart::from_rows(&[vec![StitchType::Single; 4]]);
        let placements = layout_radial(&chart, &LayoutParams::default());
        for p in &placements {
            let heading = Vec3::new(p.orientation.cos(), p.orientation.sin(), 0.0);
            assert!(heading.dot(p.position.normalize()).abs() < 1e-5);
        }
    }
}
