//! Main IPC message enums for communication between the surface and the core.

use loopwork_config::{Fidelity, Topology, VisualizationConfig};
use serde::{Deserialize, Serialize};

use crate::types::{ChartDocument, GeometryInfo, StitchRef};

/// Messages from the rendering surface to the stitch core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SurfaceToCore {
    /// A new or edited chart
    LoadChart(ChartDocument),

    /// Switch between radial and rectilinear layout
    SetTopology { topology: Topology },

    /// Switch geometry detail
    SetFidelity { fidelity: Fidelity },

    /// Replace the whole visualization configuration
    UpdateConfig(VisualizationConfig),

    /// Pointer moved to a world-space point on the chart plane
    PointerMoved { point: [f32; 3] },

    /// Pointer clicked at a world-space point on the chart plane
    PointerClicked { point: [f32; 3] },

    /// Frame tick with elapsed seconds since the previous frame
    Frame { dt: f32 },

    /// Scene is being torn down
    Dispose,
}

/// Messages from the stitch core to the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CoreToSurface {
    /// Vertex stream or buckets changed and should be re-uploaded
    GeometryUpdated(GeometryInfo),

    /// Stitch under the pointer changed
    HoverChanged { stitch: Option<StitchRef> },

    /// Clicked stitch changed
    SelectionChanged { stitch: Option<StitchRef> },

    /// Active fidelity tier
    FidelityChanged { fidelity: Fidelity },

    /// All GPU-side resources may be released
    Disposed,

    /// Error notification
    Error { code: String, message: String },
}
