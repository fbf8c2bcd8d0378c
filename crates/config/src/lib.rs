//! Shared configuration for Loopwork
//!
//! This crate provides the single source of truth for layout dimensions,
//! geometry fidelity and picking settings shared by the stitch engine and
//! the message-driven scene controller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default radius of the first ring in radial layouts (world units)
pub const DEFAULT_BASE_RADIUS: f32 = 0.3;

/// Default distance between consecutive rings (world units)
pub const DEFAULT_ROW_SPACING: f32 = 0.35;

/// Default vertical scale applied to stitch geometry
pub const DEFAULT_HEIGHT_SCALE: f32 = 1.0;

/// Default depth step per row in radial layouts (0 disables depth separation)
pub const DEFAULT_SPIRAL_DEPTH_INCREMENT: f32 = 0.02;

/// Default cell width in rectilinear layouts
pub const DEFAULT_STITCH_SPACING: f32 = 0.3;

/// Default row height as a fraction of the cell width
pub const DEFAULT_ROW_HEIGHT_RATIO: f32 = 0.8;

/// Default depth step per row in rectilinear layouts
pub const DEFAULT_FLAT_DEPTH_INCREMENT: f32 = 0.002;

/// Default pointer pick radius (world units)
pub const DEFAULT_HIT_RADIUS: f32 = 0.15;

/// Errors raised when a configuration cannot be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("Failed to decode configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Geometric layout family used to place stitches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Crochet worked in the round: rows become concentric rings
    #[default]
    Radial,
    /// Flat knitting: rows stack upward in a brick-offset grid
    Rectilinear,
}

/// Tessellation density tier for generated stitch geometry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    /// Fewer curve segments and tube sides, tuned for throughput
    #[default]
    Standard,
    /// Smoother curves and rounder tubes
    High,
}

impl Fidelity {
    /// Whether this is the high detail tier
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// Short label for status displays
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::High => "high",
        }
    }
}

/// Primitive layout of the generated vertex stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexMode {
    /// Line-segment pairs tracing stitch outlines (and connectors)
    #[default]
    Lines,
    /// Triangle list built from swept tube meshes
    Triangles,
}

/// Dimensional parameters consumed by both layout topologies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Radius of ring 0 in radial layouts
    pub base_radius: f32,
    /// Radial distance between consecutive rings
    pub row_spacing: f32,
    /// Vertical scale applied to stitch geometry
    pub height_scale: f32,
    /// Depth step per ring (0 disables depth separation)
    pub spiral_depth_increment: f32,
    /// Cell width in rectilinear layouts
    pub stitch_spacing: f32,
    /// Row height as a fraction of `stitch_spacing`
    pub row_height_ratio: f32,
    /// Depth step per row in rectilinear layouts
    pub flat_depth_increment: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            base_radius: DEFAULT_BASE_RADIUS,
            row_spacing: DEFAULT_ROW_SPACING,
            height_scale: DEFAULT_HEIGHT_SCALE,
            spiral_depth_increment: DEFAULT_SPIRAL_DEPTH_INCREMENT,
            stitch_spacing: DEFAULT_STITCH_SPACING,
            row_height_ratio: DEFAULT_ROW_HEIGHT_RATIO,
            flat_depth_increment: DEFAULT_FLAT_DEPTH_INCREMENT,
        }
    }
}

impl LayoutParams {
    /// Create radial parameters with the given ring start and spacing
    pub fn radial(base_radius: f32, row_spacing: f32) -> Self {
        Self {
            base_radius,
            row_spacing,
            ..Self::default()
        }
    }

    /// Create rectilinear parameters with the given cell width
    pub fn rectilinear(stitch_spacing: f32) -> Self {
        Self {
            stitch_spacing,
            ..Self::default()
        }
    }

    /// Named values in a fixed order, used for validation and diagnostics
    pub fn named_values(&self) -> [(&'static str, f32); 7] {
        [
            ("base_radius", self.base_radius),
            ("row_spacing", self.row_spacing),
            ("height_scale", self.height_scale),
            ("spiral_depth_increment", self.spiral_depth_increment),
            ("stitch_spacing", self.stitch_spacing),
            ("row_height_ratio", self.row_height_ratio),
            ("flat_depth_increment", self.flat_depth_increment),
        ]
    }

    /// Reject NaN, infinite or negative dimensions
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named_values() {
            check_non_negative(name, value)?;
        }
        Ok(())
    }
}

/// RGBA colors per stitch category, resolved at batch time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub standard: [f32; 4],
    pub increase: [f32; 4],
    pub decrease: [f32; 4],
    pub foundation: [f32; 4],
    pub textured: [f32; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            standard: [0.93, 0.89, 0.82, 1.0],
            increase: [0.36, 0.72, 0.45, 1.0],
            decrease: [0.86, 0.38, 0.35, 1.0],
            foundation: [0.55, 0.55, 0.62, 1.0],
            textured: [0.80, 0.62, 0.30, 1.0],
        }
    }
}

/// Complete visualization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct VisualizationConfig {
    /// Layout family
    pub topology: Topology,
    /// Geometry detail tier
    pub fidelity: Fidelity,
    /// Vertex stream primitive layout
    pub vertex_mode: VertexMode,
    /// Dimensional layout parameters
    pub layout: LayoutParams,
    /// Emit row and column connector segments between stitches
    pub connectors_enabled: bool,
    /// Pointer pick radius in world units
    pub hit_radius: f32,
    /// Category colors
    pub palette: Palette,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            topology: Topology::default(),
            fidelity: Fidelity::default(),
            vertex_mode: VertexMode::default(),
            layout: LayoutParams::default(),
            connectors_enabled: true,
            hit_radius: DEFAULT_HIT_RADIUS,
            palette: Palette::default(),
        }
    }
}

impl VisualizationConfig {
    /// Create a default config for the given topology
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            ..Self::default()
        }
    }

    /// Decode and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        check_non_negative("hit_radius", self.hit_radius)
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidValue {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value < 0.0 {
        return Err(ConfigError::InvalidValue {
            name,
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}
