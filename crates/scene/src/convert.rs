//! Conversions between wire payloads and stitch engine types.

use loopwork_ipc::{CellRecord, ChartDocument, GeometryInfo, StitchRef};
use stitch::{BuildStats, CellSpec, Chart, ChartError, Modifier, StitchId, StitchType};

/// Resolve one wire cell; unknown stitch tags fall back, unknown modifiers are dropped
pub fn cell_spec(record: &CellRecord) -> CellSpec {
    CellSpec {
        row: record.row,
        column: record.column,
        stitch: StitchType::from_tag(&record.stitch),
        modifiers: record
            .modifiers
            .iter()
            .filter_map(|tag| Modifier::from_tag(tag))
            .collect(),
    }
}

/// Build a validated chart from a wire document
pub fn chart_from_document(document: &ChartDocument) -> Result<Chart, ChartError> {
    Chart::from_specs(document.cells.iter().map(cell_spec))
}

pub fn stitch_ref(id: StitchId) -> StitchRef {
    StitchRef {
        row: id.row,
        column: id.column,
    }
}

pub fn geometry_info(
    version: Option<u64>,
    placements: usize,
    draw_calls: usize,
    build: Option<BuildStats>,
    vertices: usize,
    capacity: usize,
) -> GeometryInfo {
    GeometryInfo {
        version,
        placements,
        vertices,
        capacity,
        reallocated: build.is_some_and(|stats| stats.reallocated),
        draw_calls,
    }
}
