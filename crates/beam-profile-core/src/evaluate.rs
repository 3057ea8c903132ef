use serde::{Deserialize, Serialize};

use crate::{
    extract_column, extract_row, Axis, BeamProfileError, CentroidCoordinate, CentroidIndex,
    DetectorGeometry, EvaluateParams, IntensityGridView, SliceStats,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of values in [`BeamMetrics::to_array`].
pub const RESULT_LEN: usize = 6;

/// Beam-quality metrics of one detector evaluation, in physical units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeamMetrics {
    pub y_fwhm: f64,
    pub x_fwhm: f64,
    pub y_sigma: f64,
    pub x_sigma: f64,
    pub x_centroid: f64,
    pub y_centroid: f64,
}

impl BeamMetrics {
    /// Fixed output order:
    /// `[y_fwhm, x_fwhm, y_sigma, x_sigma, x_centroid, y_centroid]`.
    pub fn to_array(&self) -> [f64; RESULT_LEN] {
        [
            self.y_fwhm,
            self.x_fwhm,
            self.y_sigma,
            self.x_sigma,
            self.x_centroid,
            self.y_centroid,
        ]
    }

    pub fn from_array(values: [f64; RESULT_LEN]) -> Self {
        let [y_fwhm, x_fwhm, y_sigma, x_sigma, x_centroid, y_centroid] = values;
        Self {
            y_fwhm,
            x_fwhm,
            y_sigma,
            x_sigma,
            x_centroid,
            y_centroid,
        }
    }
}

/// Evaluate with [`EvaluateParams::default`] (out-of-range centroids fail).
pub fn evaluate(
    geometry: &DetectorGeometry,
    grid: &IntensityGridView<'_>,
    centroid: &CentroidCoordinate,
) -> Result<BeamMetrics, BeamProfileError> {
    evaluate_with(geometry, grid, centroid, &EvaluateParams::default())
}

/// Measure FWHM and sigma along the row and column through the centroid.
///
/// The centroid coordinate is supplied by the caller, not derived from the
/// grid, and is passed through to the result unchanged.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(geometry, grid, centroid, params),
        fields(width = grid.width, height = grid.height)
    )
)]
pub fn evaluate_with(
    geometry: &DetectorGeometry,
    grid: &IntensityGridView<'_>,
    centroid: &CentroidCoordinate,
    params: &EvaluateParams,
) -> Result<BeamMetrics, BeamProfileError> {
    if grid.width != geometry.x_pixels || grid.height != geometry.y_pixels {
        return Err(BeamProfileError::GridShape {
            expected: geometry.x_pixels.saturating_mul(geometry.y_pixels),
            got: grid.data.len(),
        });
    }

    let x_map = geometry.axis_mapping(Axis::X)?;
    let y_map = geometry.axis_mapping(Axis::Y)?;
    log::debug!("x mapping {x_map:?}, y mapping {y_map:?}");

    let index = CentroidIndex::locate(geometry, &x_map, &y_map, centroid, params.centroid_policy)?;

    let col = extract_column(grid, index.x_index)?;
    let row = extract_row(grid, index.y_index)?;

    let col_stats = SliceStats::compute(&col)?;
    let row_stats = SliceStats::compute(&row)?;
    log::debug!("column stats {col_stats:?}, row stats {row_stats:?}");

    let (y_sigma, y_fwhm) = col_stats.scaled(y_map.step);
    let (x_sigma, x_fwhm) = row_stats.scaled(x_map.step);

    Ok(BeamMetrics {
        y_fwhm,
        x_fwhm,
        y_sigma,
        x_sigma,
        x_centroid: centroid.x,
        y_centroid: centroid.y,
    })
}
