//! Core types and numerics for beam-quality extraction from a detector grid.
//!
//! This crate is intentionally small and purely numerical. It does *not*
//! know how detector data reaches it; callers hand over a
//! [`DetectorGeometry`], a row-major [`IntensityGridView`] and the physical
//! centroid coordinate, and get a [`BeamMetrics`] back.
//!
//! Pipeline:
//! 1. Map each axis' half-width and pixel count to a centre index and a
//!    per-pixel physical step ([`build_axis_mapping`]).
//! 2. Map the physical centroid to the nearest grid index on each axis
//!    ([`locate_centroid_index`], [`resolve_centroid_index`]).
//! 3. Copy the column and the row through that index
//!    ([`extract_column`], [`extract_row`]).
//! 4. Compute the intensity-weighted sigma and the Gaussian FWHM of each
//!    slice in index units ([`weighted_sigma`], [`fwhm`]).
//! 5. Scale by the axis step into physical units ([`evaluate`]).

mod centroid;
mod error;
mod evaluate;
mod geometry;
mod grid;
mod logger;
mod params;
mod stats;

pub use centroid::{locate_centroid_index, resolve_centroid_index, CentroidIndex};
pub use error::{BeamProfileError, ErrorKind, GeometryFault};
pub use evaluate::{evaluate, evaluate_with, BeamMetrics, RESULT_LEN};
pub use geometry::{build_axis_mapping, Axis, AxisMapping, CentroidCoordinate, DetectorGeometry};
pub use grid::{extract_column, extract_row, IntensityGrid, IntensityGridView};
pub use params::{CentroidRangePolicy, EvaluateParams};
pub use stats::{fwhm, weighted_mean_index, weighted_sigma, SliceStats, FWHM_PER_SIGMA};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, resolve_level, LOG_ENV};
