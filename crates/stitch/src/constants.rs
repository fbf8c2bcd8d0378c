/// Angle of the first stitch in every ring (bottom of the circle).
pub const RADIAL_START_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;

/// Orientation offset applied to each half of an increase (halves sit pi/3 apart).
pub const INCREASE_SPREAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

/// Lateral displacement of each increase half along the row tangent.
pub const INCREASE_LATERAL_OFFSET: f32 = 0.04;

/// Depth displacement for back-loop-only and front-loop-only stitches.
pub const LOOP_DEPTH_OFFSET: f32 = 0.05;

/// Orientation of stitches in rectilinear rows (worked right to left, height along +y).
pub const RECTILINEAR_ORIENTATION: f32 = std::f32::consts::PI;

/// Yarn radius used for tube meshes.
pub const YARN_RADIUS: f32 = 0.012;

/// Curve segments per control-point span at standard fidelity.
pub const STANDARD_CURVE_SEGMENTS: usize = 6;

/// Curve segments per control-point span at high fidelity.
pub const HIGH_CURVE_SEGMENTS: usize = 16;

/// Tube sides at standard fidelity.
pub const STANDARD_TUBE_SIDES: usize = 6;

/// Tube sides at high fidelity.
pub const HIGH_TUBE_SIDES: usize = 12;

/// Floats per vertex in the position stream.
pub const FLOATS_PER_VERTEX: usize = 3;
