//! Detector geometry and per-axis index/physical mapping.

use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{BeamProfileError, GeometryFault};

/// Physical centroid position, in the same length units as the half-widths.
pub type CentroidCoordinate = Point2<f64>;

/// Detector axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Rectangular detector: physical half-widths and pixel counts per axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorGeometry {
    pub x_half_width: f64,
    pub y_half_width: f64,
    pub x_pixels: usize,
    pub y_pixels: usize,
}

impl DetectorGeometry {
    #[inline]
    pub fn half_width(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_half_width,
            Axis::Y => self.y_half_width,
        }
    }

    #[inline]
    pub fn pixels(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x_pixels,
            Axis::Y => self.y_pixels,
        }
    }

    /// Build the mapping for one axis of this detector.
    pub fn axis_mapping(&self, axis: Axis) -> Result<AxisMapping, BeamProfileError> {
        build_axis_mapping(self.half_width(axis), self.pixels(axis))
            .map_err(|fault| BeamProfileError::InvalidGeometry { axis, fault })
    }
}

/// Index <-> physical mapping along one detector axis.
///
/// Pixel `center_index` sits at physical coordinate zero and neighbouring
/// pixels are `step` apart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    pub center_index: usize,
    pub step: f64,
}

impl AxisMapping {
    /// Physical coordinate of a (possibly fractional) index.
    #[inline]
    pub fn to_physical(&self, index: f64) -> f64 {
        (index - self.center_index as f64) * self.step
    }
}

/// Map a half-width and pixel count to a centre index and per-pixel step.
///
/// `center_index = round((pixels - 1) / 2)` with ties rounded to even, and
/// `step = half_width / center_index`. A single-pixel (or empty) axis has no
/// defined step and is rejected, as is a non-finite or negative half-width.
pub fn build_axis_mapping(half_width: f64, pixels: usize) -> Result<AxisMapping, GeometryFault> {
    if !half_width.is_finite() || half_width < 0.0 {
        return Err(GeometryFault::BadHalfWidth { half_width });
    }
    if pixels == 0 {
        return Err(GeometryFault::TooFewPixels { pixels });
    }
    let center_index = ((pixels - 1) as f64 / 2.0).round_ties_even() as usize;
    if center_index == 0 {
        return Err(GeometryFault::TooFewPixels { pixels });
    }
    Ok(AxisMapping {
        center_index,
        step: half_width / center_index as f64,
    })
}
