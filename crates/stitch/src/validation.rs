//! Error types and fail-fast checks for chart and parameter input.

use loopwork_config::{ConfigError, LayoutParams};
use thiserror::Error;

/// Malformed chart input
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Duplicate cell at row {row}, column {column}")]
    DuplicateCell { row: u32, column: u32 },
    #[error("Negative row index: {0}")]
    NegativeRow(i64),
    #[error("Negative column index {column} in row {row}")]
    NegativeColumn { row: i64, column: i64 },
}

/// Layout parameters that would produce garbage geometry
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid layout parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

/// Vertex storage could not grow
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("Failed to allocate vertex storage for {requested} floats")]
    Allocation { requested: usize },
}

/// Validate layout parameters before any placement is computed.
///
/// NaN, infinite and negative dimensions are caller contract violations.
pub fn validate_layout_params(params: &LayoutParams) -> Result<(), LayoutError> {
    params.validate().map_err(|err| match err {
        ConfigError::InvalidValue { name, value, .. } => {
            LayoutError::InvalidParameter { name, value }
        }
        // LayoutParams::validate only reports value errors
        ConfigError::Json(_) => LayoutError::InvalidParameter {
            name: "layout",
            value: f32::NAN,
        },
    })
}

/// Check a finite, non-negative scalar passed per call, such as the frame delta
pub fn validate_scalar(name: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_params_pass() {
        assert!(validate_layout_params(&LayoutParams::default()).is_ok());
    }

    #[test]
    fn test_nan_radius_fails_fast() {
        let params = LayoutParams::radial(f32::NAN, 0.35);
        let err = validate_layout_params(&params).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InvalidParameter {
                name: "base_radius",
                ..
            }
        ));
    }

    #[test]
    fn test_scalar_checks() {
        assert!(validate_scalar("hit_radius", 0.15).is_ok());
        assert!(validate_scalar("hit_radius", -0.1).is_err());
        assert!(validate_scalar("dt", f32::INFINITY).is_err());
    }
}
