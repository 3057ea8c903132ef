use serde::{Deserialize, Serialize};

use crate::geometry::Axis;

/// Errors returned by the beam-profile pipeline.
///
/// Every error aborts the current evaluation; no partial metrics are produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BeamProfileError {
    #[error("invalid {axis} geometry: {fault}")]
    InvalidGeometry { axis: Axis, fault: GeometryFault },
    #[error("intensity grid length mismatch (expected {expected} samples, got {got})")]
    GridShape { expected: usize, got: usize },
    #[error("{axis} centroid {coord} maps to index {index}, outside 0..{pixels}")]
    OutOfRangeCentroid {
        axis: Axis,
        coord: f64,
        index: i64,
        pixels: usize,
    },
    #[error("{axis} centroid coordinate {coord} is not finite")]
    NonFiniteCentroid { axis: Axis, coord: f64 },
    #[error("slice index {index} out of range (len={len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("intensity sample {index} is {value}; samples must be finite and non-negative")]
    InvalidIntensity { index: usize, value: f64 },
    #[error("degenerate intensity distribution (len={len}, weight_sum={weight_sum})")]
    DegenerateDistribution { len: usize, weight_sum: f64 },
}

/// Reason an axis cannot be mapped between index and physical space.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryFault {
    #[error("{pixels} pixel(s) leave no centre offset to derive a step from")]
    TooFewPixels { pixels: usize },
    #[error("half-width {half_width} must be finite and non-negative")]
    BadHalfWidth { half_width: f64 },
    #[error("zero half-width cannot place a centroid")]
    ZeroHalfWidth,
}

/// Coarse error category reported across the request/response boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidGeometry,
    OutOfRangeCentroid,
    IndexOutOfRange,
    DegenerateDistribution,
}

impl BeamProfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGeometry { .. } | Self::GridShape { .. } => ErrorKind::InvalidGeometry,
            Self::OutOfRangeCentroid { .. } | Self::NonFiniteCentroid { .. } => {
                ErrorKind::OutOfRangeCentroid
            }
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::InvalidIntensity { .. } | Self::DegenerateDistribution { .. } => {
                ErrorKind::DegenerateDistribution
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_shape_is_reported_as_invalid_geometry() {
        let err = BeamProfileError::GridShape {
            expected: 9,
            got: 8,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
        assert!(err.to_string().contains("expected 9"));
    }

    #[test]
    fn bad_sample_is_a_degenerate_distribution() {
        let err = BeamProfileError::InvalidIntensity {
            index: 2,
            value: -1.5,
        };
        assert_eq!(err.kind(), ErrorKind::DegenerateDistribution);
        assert!(err.to_string().contains("sample 2 is -1.5"));
    }

    #[test]
    fn geometry_message_names_axis_and_fault() {
        let err = BeamProfileError::InvalidGeometry {
            axis: Axis::Y,
            fault: GeometryFault::TooFewPixels { pixels: 1 },
        };
        let msg = err.to_string();
        assert!(msg.starts_with("invalid y geometry"), "{msg}");
        assert!(msg.contains("1 pixel(s)"), "{msg}");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::DegenerateDistribution).unwrap();
        assert_eq!(json, "\"degenerate_distribution\"");
    }
}
