//! Hand-authored control points for each stitch type.
//!
//! Local frame: +x runs across the row, +y is stitch height from the base of
//! the loop, +z points toward the viewer. Widths stay within about 0.1 of the
//! origin so neighbouring stitches on the smallest ring do not overlap.

use crate::types::StitchType;

type Points = &'static [[f32; 3]];

/// Compact loop with a V-shaped top
const SINGLE: Points = &[
    [-0.06, 0.0, 0.0],
    [-0.07, 0.08, 0.01],
    [-0.05, 0.15, 0.02],
    [0.0, 0.12, 0.03],
    [0.05, 0.15, 0.02],
    [0.07, 0.08, 0.01],
    [0.06, 0.0, 0.0],
];

/// Post with one wrap crossing the front
const HALF_DOUBLE: Points = &[
    [-0.05, 0.0, 0.0],
    [-0.06, 0.09, 0.01],
    [0.05, 0.12, 0.035],
    [-0.05, 0.15, 0.01],
    [-0.05, 0.22, 0.02],
    [0.0, 0.19, 0.03],
    [0.05, 0.22, 0.02],
    [0.06, 0.1, 0.01],
    [0.05, 0.0, 0.0],
];

/// Taller post with two wraps
const DOUBLE: Points = &[
    [-0.05, 0.0, 0.0],
    [-0.06, 0.08, 0.01],
    [0.05, 0.11, 0.035],
    [-0.05, 0.14, 0.01],
    [0.05, 0.17, 0.035],
    [-0.05, 0.2, 0.01],
    [-0.05, 0.3, 0.02],
    [0.0, 0.27, 0.03],
    [0.05, 0.3, 0.02],
    [0.06, 0.14, 0.01],
    [0.05, 0.0, 0.0],
];

/// Tallest post with three wraps
const TREBLE: Points = &[
    [-0.05, 0.0, 0.0],
    [-0.06, 0.08, 0.01],
    [0.05, 0.11, 0.035],
    [-0.05, 0.14, 0.01],
    [0.05, 0.17, 0.035],
    [-0.05, 0.2, 0.01],
    [0.05, 0.23, 0.035],
    [-0.05, 0.26, 0.01],
    [-0.05, 0.4, 0.02],
    [0.0, 0.37, 0.03],
    [0.05, 0.4, 0.02],
    [0.06, 0.2, 0.01],
    [0.05, 0.0, 0.0],
];

/// Two legs fanning out from a shared base
const INCREASE: Points = &[
    [-0.1, 0.16, 0.02],
    [-0.05, 0.08, 0.02],
    [0.0, 0.0, 0.0],
    [0.05, 0.08, 0.02],
    [0.1, 0.16, 0.02],
];

/// Two legs converging into one top
const DECREASE: Points = &[
    [-0.1, 0.0, 0.0],
    [-0.05, 0.08, 0.02],
    [0.0, 0.16, 0.03],
    [0.05, 0.08, 0.02],
    [0.1, 0.0, 0.0],
];

/// Flat closed oval
const CHAIN: Points = &[
    [-0.07, 0.0, 0.0],
    [-0.05, 0.04, 0.01],
    [0.0, 0.05, 0.015],
    [0.05, 0.04, 0.01],
    [0.07, 0.0, 0.0],
    [0.05, -0.04, -0.01],
    [0.0, -0.05, -0.015],
    [-0.05, -0.04, -0.01],
    [-0.07, 0.0, 0.0],
];

/// Low hook barely above the previous row
const SLIP: Points = &[
    [-0.04, 0.0, 0.0],
    [-0.03, 0.04, 0.01],
    [0.0, 0.05, 0.02],
    [0.03, 0.04, 0.01],
    [0.04, 0.0, 0.0],
];

const BOBBLE: Points = &[
    [-0.05, 0.0, 0.0],
    [-0.09, 0.06, 0.04],
    [-0.07, 0.14, 0.07],
    [0.0, 0.17, 0.08],
    [0.07, 0.14, 0.07],
    [0.09, 0.06, 0.04],
    [0.05, 0.0, 0.0],
];

const POPCORN: Points = &[
    [-0.05, 0.0, 0.0],
    [-0.08, 0.08, 0.03],
    [-0.06, 0.16, 0.06],
    [0.0, 0.12, 0.09],
    [0.06, 0.16, 0.06],
    [0.08, 0.08, 0.03],
    [0.05, 0.0, 0.0],
];

const PUFF: Points = &[
    [-0.04, 0.0, 0.0],
    [-0.08, 0.1, 0.03],
    [-0.05, 0.2, 0.04],
    [0.0, 0.22, 0.05],
    [0.05, 0.2, 0.04],
    [0.08, 0.1, 0.03],
    [0.04, 0.0, 0.0],
];

/// Knit V, legs meeting at the bottom
const KNIT: Points = &[
    [-0.08, 0.2, 0.0],
    [-0.05, 0.1, 0.02],
    [0.0, 0.02, 0.03],
    [0.05, 0.1, 0.02],
    [0.08, 0.2, 0.0],
];

/// Purl bump lying across the stitch
const PURL: Points = &[
    [-0.09, 0.08, 0.0],
    [-0.05, 0.12, 0.03],
    [0.0, 0.13, 0.04],
    [0.05, 0.12, 0.03],
    [0.09, 0.08, 0.0],
];

/// Control points for a stitch type
pub fn control_points(stitch: StitchType) -> Points {
    match stitch {
        StitchType::Single => SINGLE,
        StitchType::HalfDouble => HALF_DOUBLE,
        StitchType::Double => DOUBLE,
        StitchType::Treble => TREBLE,
        StitchType::Increase => INCREASE,
        StitchType::Decrease => DECREASE,
        StitchType::Chain => CHAIN,
        StitchType::Slip => SLIP,
        StitchType::Bobble => BOBBLE,
        StitchType::Popcorn => POPCORN,
        StitchType::Puff => PUFF,
        StitchType::Knit => KNIT,
        StitchType::Purl => PURL,
    }
}
