//! Rectilinear (flat knitting) placement.

use glam::Vec3;
use loopwork_config::LayoutParams;

use super::emit_cell;
use crate::constants::RECTILINEAR_ORIENTATION;
use crate::types::{Chart, StitchPlacement};

/// Place cells on a grid centred on the origin.
///
/// `x = column * spacing - half_width + parity`, where odd rows shift by
/// half a cell like brickwork; `y = row * spacing * row_height_ratio -
/// half_height`; depth grows by `flat_depth_increment` per row. Output keeps
/// chart reading order.
pub fn layout_rectilinear(chart: &Chart, params: &LayoutParams) -> Vec<StitchPlacement> {
    let spacing = params.stitch_spacing;
    let row_height = spacing * params.row_height_ratio;
    let half_width = chart.max_column().unwrap_or(0) as f32 * spacing * 0.5;
    let half_height = chart.max_row().unwrap_or(0) as f32 * row_height * 0.5;

    let mut placements = Vec::with_capacity(super::placement_count(chart));
    for cell in chart.cells() {
        let parity = if cell.row % 2 == 1 { spacing * 0.5 } else { 0.0 };
        let nominal = Vec3::new(
            cell.column as f32 * spacing - half_width + parity,
            cell.row as f32 * row_height - half_height,
            cell.row as f32 * params.flat_depth_increment,
        );
        emit_cell(&mut placements, cell, nominal, RECTILINEAR_ORIENTATION);
    }

    placements
}
