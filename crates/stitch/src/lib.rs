//! Loopwork stitch engine - procedural geometry and layout for stitch charts
//!
//! This crate turns an abstract chart of typed stitch cells into renderable data:
//! - [`types`] - Stitch types, charts and placements
//! - [`geometry`] - Per-type curves and tube meshes with an explicit cache
//! - [`layout`] - Radial and rectilinear placement of chart cells
//! - [`buffer`] - Growable vertex stream with in-place reuse
//! - [`batch`] - Instance buckets keyed by stitch type and color
//! - [`picking`] - Nearest-stitch hit testing
//! - [`pipeline`] - Dirty-tracked orchestration of all of the above
//!
//! Rendering itself happens elsewhere; the optional `bevy` feature converts
//! tube meshes into Bevy meshes.

pub mod batch;
pub mod buffer;
pub mod constants;
pub mod geometry;
pub mod layout;
pub mod picking;
pub mod pipeline;
pub mod types;
pub mod validation;

pub use batch::*;
pub use buffer::*;
pub use constants::*;
pub use geometry::*;
pub use layout::*;
pub use picking::*;
pub use pipeline::*;
pub use types::*;
pub use validation::*;
