//! Layout engine: chart cells to 3D stitch placements.
//!
//! Two topologies are supported, selected by the caller:
//! - **Radial**: rows become concentric rings, staggered by half a stitch on
//!   odd rows, with depth growing per ring
//! - **Rectilinear**: rows stack upward in a brick-offset grid
//!
//! Both share the same increase splitting and loop-modifier displacement,
//! applied after the base position is known. Layout is a pure function:
//! identical inputs always give bit-identical placements.

mod modifiers;
mod radial;
mod rectilinear;

use glam::Vec3;
use loopwork_config::{LayoutParams, Topology};
use tracing::debug;

use crate::constants::{INCREASE_LATERAL_OFFSET, INCREASE_SPREAD_ANGLE};
use crate::types::{Chart, StitchCell, StitchPlacement};
use crate::validation::{validate_layout_params, LayoutError};

pub use modifiers::loop_offset;
pub use radial::layout_radial;
pub use rectilinear::layout_rectilinear;

/// Compute placements for every cell of `chart`.
///
/// Increase cells yield two placements, every other cell yields one. An
/// empty chart yields an empty list. Parameters are validated first so bad
/// input fails before any geometry is produced.
pub fn layout(
    chart: &Chart,
    topology: Topology,
    params: &LayoutParams,
) -> Result<Vec<StitchPlacement>, LayoutError> {
    validate_layout_params(params)?;

    if chart.is_empty() {
        return Ok(Vec::new());
    }

    let placements = match topology {
        Topology::Radial => layout_radial(chart, params),
        Topology::Rectilinear => layout_rectilinear(chart, params),
    };

    debug!(
        "layout: {} cells -> {} placements ({:?})",
        chart.len(),
        placements.len(),
        topology
    );

    Ok(placements)
}

/// Number of placements a chart produces, without computing positions
pub fn placement_count(chart: &Chart) -> usize {
    chart
        .cells()
        .iter()
        .map(|cell| if cell.stitch.is_increase() { 2 } else { 1 })
        .sum()
}

/// Push the placement(s) for one cell at its nominal position.
///
/// `orientation` is the row heading at the cell. Increases split into two
/// halves displaced along that heading in opposite directions with their
/// orientations spread apart; the loop modifier offset is applied last.
pub(crate) fn emit_cell(
    out: &mut Vec<StitchPlacement>,
    cell: &StitchCell,
    nominal: Vec3,
    orientation: f32,
) {
    let offset = loop_offset(&cell.modifiers);
    let base = StitchPlacement {
        row: cell.row,
        column: cell.column,
        position: nominal + offset,
        orientation,
        color: cell.stitch.category(),
        stitch: cell.stitch,
    };

    if !cell.stitch.is_increase() {
        out.push(base);
        return;
    }

    let heading = Vec3::new(orientation.cos(), orientation.sin(), 0.0);
    let lateral = heading * INCREASE_LATERAL_OFFSET;
    out.push(StitchPlacement {
        position: nominal - lateral + offset,
        orientation: orientation - INCREASE_SPREAD_ANGLE,
        ..base
    });
    out.push(StitchPlacement {
        position: nominal + lateral + offset,
        orientation: orientation + INCREASE_SPREAD_ANGLE,
        ..base
    });
}
