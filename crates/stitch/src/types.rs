//! Core chart and placement types.
//!
//! A chart is the abstract, externally produced description of a pattern.
//! Placements are derived from it by the layout engine and never patched
//! incrementally.

use std::collections::{BTreeSet, HashMap, HashSet};

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::validation::ChartError;

/// Type of stitch in a chart cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StitchType {
    /// Plain short stitch, also the fallback for unrecognized tags
    #[default]
    Single = 0,
    /// Taller stitch with one wrap
    HalfDouble = 1,
    /// Taller stitch with two wraps
    Double = 2,
    /// Tallest stitch with three wraps
    Treble = 3,
    /// Two stitches worked into one
    Increase = 4,
    /// Two stitches worked together into one
    Decrease = 5,
    /// Foundation chain loop
    Chain = 6,
    /// Slip stitch
    Slip = 7,
    /// Closed cluster bulging toward the viewer
    Bobble = 8,
    /// Folded cluster
    Popcorn = 9,
    /// Loose pulled-up cluster
    Puff = 10,
    /// Knit stitch (flat knitting)
    Knit = 11,
    /// Purl stitch (flat knitting)
    Purl = 12,
}

impl StitchType {
    /// Every stitch type, in tag order
    pub const ALL: [StitchType; 13] = [
        Self::Single,
        Self::HalfDouble,
        Self::Double,
        Self::Treble,
        Self::Increase,
        Self::Decrease,
        Self::Chain,
        Self::Slip,
        Self::Bobble,
        Self::Popcorn,
        Self::Puff,
        Self::Knit,
        Self::Purl,
    ];

    /// Resolve a textual tag from the pattern parser.
    ///
    /// Matching ignores case, whitespace, `-` and `_`. Unknown tags resolve
    /// to [`StitchType::Single`] so a lossy chart still renders.
    pub fn from_tag(tag: &str) -> Self {
        match Self::parse_tag(tag) {
            Some(stitch) => stitch,
            None => {
                warn!("Unknown stitch tag {:?}, using single stitch", tag);
                Self::default()
            }
        }
    }

    /// Resolve a textual tag, returning `None` for unknown tags
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        let stitch = match normalized.as_str() {
            "sc" | "single" | "singlecrochet" | "x" => Self::Single,
            "hdc" | "htr" | "halfdouble" | "halfdoublecrochet" => Self::HalfDouble,
            "dc" | "double" | "doublecrochet" => Self::Double,
            "tr" | "trc" | "treble" | "triple" => Self::Treble,
            "inc" | "increase" | "v" => Self::Increase,
            "dec" | "decrease" | "sc2tog" | "a" => Self::Decrease,
            "ch" | "chain" => Self::Chain,
            "sl" | "slst" | "slip" | "slipstitch" => Self::Slip,
            "bobble" | "bo" => Self::Bobble,
            "popcorn" | "pc" => Self::Popcorn,
            "puff" => Self::Puff,
            "k" | "knit" => Self::Knit,
            "p" | "purl" => Self::Purl,
            _ => return None,
        };
        Some(stitch)
    }

    /// Canonical short tag
    pub fn tag(self) -> &'static str {
        match self {
            Self::Single => "sc",
            Self::HalfDouble => "hdc",
            Self::Double => "dc",
            Self::Treble => "tr",
            Self::Increase => "inc",
            Self::Decrease => "dec",
            Self::Chain => "ch",
            Self::Slip => "sl",
            Self::Bobble => "bobble",
            Self::Popcorn => "popcorn",
            Self::Puff => "puff",
            Self::Knit => "k",
            Self::Purl => "p",
        }
    }

    /// Semantic category used for color resolution
    pub fn category(self) -> StitchCategory {
        match self {
            Self::Increase => StitchCategory::Increase,
            Self::Decrease => StitchCategory::Decrease,
            Self::Chain | Self::Slip => StitchCategory::Foundation,
            Self::Bobble | Self::Popcorn | Self::Puff => StitchCategory::Textured,
            _ => StitchCategory::Standard,
        }
    }

    /// Whether one cell of this type produces two placements
    pub fn is_increase(self) -> bool {
        matches!(self, Self::Increase)
    }
}

/// Semantic grouping of stitch types; doubles as the color id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StitchCategory {
    #[default]
    Standard,
    Increase,
    Decrease,
    Foundation,
    Textured,
}

/// Color identifier resolved against a palette at batch time
pub type ColorId = StitchCategory;

/// Loop selection modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Worked into the back loop only (pushed away from the viewer)
    BackLoop,
    /// Worked into the front loop only (pulled toward the viewer)
    FrontLoop,
}

impl Modifier {
    /// Resolve a modifier tag; unknown tags are dropped
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "blo" | "backloop" | "backlooponly" => Some(Self::BackLoop),
            "flo" | "frontloop" | "frontlooponly" => Some(Self::FrontLoop),
            _ => {
                debug!("Ignoring unknown modifier tag {:?}", tag);
                None
            }
        }
    }
}

/// Identifies one stitch in a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StitchId {
    pub row: u32,
    pub column: u32,
}

/// One typed cell of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchCell {
    pub row: u32,
    pub column: u32,
    pub stitch: StitchType,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
}

impl StitchCell {
    /// Create a cell without modifiers
    pub fn new(row: u32, column: u32, stitch: StitchType) -> Self {
        Self {
            row,
            column,
            stitch,
            modifiers: BTreeSet::new(),
        }
    }

    /// Add a modifier (builder style)
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn id(&self) -> StitchId {
        StitchId {
            row: self.row,
            column: self.column,
        }
    }
}

/// A cell as delivered by the parser, before column assignment.
///
/// Crochet charts usually omit the column; it is assigned from reading
/// order within the row.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSpec {
    pub row: i64,
    pub column: Option<i64>,
    pub stitch: StitchType,
    pub modifiers: BTreeSet<Modifier>,
}

/// Ordered, validated collection of stitch cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    cells: Vec<StitchCell>,
}

impl Chart {
    /// An empty chart
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a chart from cells in reading order.
    ///
    /// Fails if two cells share a `(row, column)` pair.
    pub fn from_cells(cells: Vec<StitchCell>) -> Result<Self, ChartError> {
        let mut seen = HashSet::with_capacity(cells.len());
        for cell in &cells {
            if !seen.insert(cell.id()) {
                return Err(ChartError::DuplicateCell {
                    row: cell.row,
                    column: cell.column,
                });
            }
        }
        Ok(Self { cells })
    }

    /// Build a chart from parser records, assigning implicit columns.
    ///
    /// A record without a column takes the next free column in its row.
    pub fn from_specs(specs: impl IntoIterator<Item = CellSpec>) -> Result<Self, ChartError> {
        let mut next_column: HashMap<u32, u32> = HashMap::new();
        let mut cells = Vec::new();

        for spec in specs {
            let row = u32::try_from(spec.row).map_err(|_| ChartError::NegativeRow(spec.row))?;
            let column = match spec.column {
                Some(column) => u32::try_from(column).map_err(|_| ChartError::NegativeColumn {
                    row: spec.row,
                    column,
                })?,
                None => *next_column.get(&row).unwrap_or(&0),
            };
            let next = next_column.entry(row).or_insert(0);
            *next = (*next).max(column.saturating_add(1));

            cells.push(StitchCell {
                row,
                column,
                stitch: spec.stitch,
                modifiers: spec.modifiers,
            });
        }

        Self::from_cells(cells)
    }

    /// Build a crochet-style chart from per-row stitch lists
    pub fn from_rows(rows: &[Vec<StitchType>]) -> Self {
        let cells = rows
            .iter()
            .enumerate()
            .flat_map(|(row, stitches)| {
                stitches
                    .iter()
                    .enumerate()
                    .map(move |(column, &stitch)| {
                        StitchCell::new(row as u32, column as u32, stitch)
                    })
            })
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[StitchCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Highest row index, or `None` for an empty chart
    pub fn max_row(&self) -> Option<u32> {
        self.cells.iter().map(|c| c.row).max()
    }

    /// Highest column index, or `None` for an empty chart
    pub fn max_column(&self) -> Option<u32> {
        self.cells.iter().map(|c| c.column).max()
    }

    /// Cells grouped by row in ascending row order, reading order kept
    pub fn rows(&self) -> Vec<(u32, Vec<&StitchCell>)> {
        let mut rows: Vec<(u32, Vec<&StitchCell>)> = Vec::new();
        let mut index: HashMap<u32, usize> = HashMap::new();
        for cell in &self.cells {
            match index.get(&cell.row) {
                Some(&i) => rows[i].1.push(cell),
                None => {
                    index.insert(cell.row, rows.len());
                    rows.push((cell.row, vec![cell]));
                }
            }
        }
        rows.sort_by_key(|(row, _)| *row);
        rows
    }
}

/// Resolved position and orientation for one chart cell.
///
/// Orientation is the heading of the row tangent in the xy plane. The
/// stitch's local +y (height) axis maps to the right-hand normal of that
/// heading, which points outward on a counter-clockwise ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchPlacement {
    pub row: u32,
    pub column: u32,
    pub position: Vec3,
    pub orientation: f32,
    pub color: ColorId,
    pub stitch: StitchType,
}

impl StitchPlacement {
    pub fn id(&self) -> StitchId {
        StitchId {
            row: self.row,
            column: self.column,
        }
    }

    /// Rotation taking local stitch coordinates into world space
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_z(self.orientation + std::f32::consts::PI)
    }

    /// Local-to-world transform with stitch height scaled by `height_scale`
    pub fn transform(&self, height_scale: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, height_scale, 1.0),
            self.rotation(),
            self.position,
        )
    }
}
