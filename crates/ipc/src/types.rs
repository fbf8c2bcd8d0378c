//! Payload types carried by IPC messages.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;

/// Chart as sent by the pattern parser or editor.
///
/// Tags stay as raw strings here; the core resolves them so unknown tags can
/// fall back instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    /// Monotonic edit counter; older versions are discarded by the core
    pub version: u64,
    pub cells: Vec<CellRecord>,
}

impl ChartDocument {
    /// Decode a chart document from JSON
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        serde_json::from_str(json).map_err(IpcError::Decode)
    }
}

/// One chart cell on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub row: i64,
    /// Omitted for crochet rounds; assigned in reading order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,
    /// Stitch tag such as `sc`, `inc` or `k`
    #[serde(rename = "type")]
    pub stitch: String,
    /// Loop modifier tags such as `blo` or `flo`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

impl CellRecord {
    pub fn new(row: i64, column: Option<i64>, stitch: impl Into<String>) -> Self {
        Self {
            row,
            column,
            stitch: stitch.into(),
            modifiers: Vec::new(),
        }
    }
}

/// Stitch identity reported to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StitchRef {
    pub row: u32,
    pub column: u32,
}

/// Summary of a geometry rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryInfo {
    /// Chart version the geometry was built from
    pub version: Option<u64>,
    pub placements: usize,
    /// Active vertices in the position stream
    pub vertices: usize,
    /// Allocated vertex capacity
    pub capacity: usize,
    /// Whether the surface must recreate its GPU vertex buffer
    pub reallocated: bool,
    /// Instanced draws needed for the current buckets
    pub draw_calls: usize,
}
