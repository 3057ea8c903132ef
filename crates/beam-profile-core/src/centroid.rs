//! Nearest-pixel placement of a physical centroid coordinate.

use serde::{Deserialize, Serialize};

use crate::{
    Axis, AxisMapping, BeamProfileError, CentroidCoordinate, CentroidRangePolicy,
    DetectorGeometry, GeometryFault,
};

/// Grid indices of the pixel nearest to the centroid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CentroidIndex {
    pub x_index: usize,
    pub y_index: usize,
}

impl CentroidIndex {
    /// Place `coord` on the grid described by `geometry` and the per-axis mappings.
    pub fn locate(
        geometry: &DetectorGeometry,
        x_map: &AxisMapping,
        y_map: &AxisMapping,
        coord: &CentroidCoordinate,
        policy: CentroidRangePolicy,
    ) -> Result<Self, BeamProfileError> {
        Ok(Self {
            x_index: locate_on_axis(Axis::X, geometry, x_map, coord.x, policy)?,
            y_index: locate_on_axis(Axis::Y, geometry, y_map, coord.y, policy)?,
        })
    }
}

fn locate_on_axis(
    axis: Axis,
    geometry: &DetectorGeometry,
    map: &AxisMapping,
    coord: f64,
    policy: CentroidRangePolicy,
) -> Result<usize, BeamProfileError> {
    let raw = locate_centroid_index(axis, coord, geometry.half_width(axis), map.center_index)?;
    let index = resolve_centroid_index(axis, coord, raw, geometry.pixels(axis), policy)?;
    log::debug!("{axis} centroid {coord} -> raw index {raw}, resolved {index}");
    Ok(index)
}

/// Map a physical coordinate to a raw (unchecked) grid index on one axis.
///
/// `index = trunc(coord / half_width * center_index) + center_index`. The
/// scaled term is truncated toward zero, not rounded, so the result can
/// differ by one from the rounding used to derive `center_index`. The result
/// may fall outside the pixel range; see [`resolve_centroid_index`].
pub fn locate_centroid_index(
    axis: Axis,
    coord: f64,
    half_width: f64,
    center_index: usize,
) -> Result<i64, BeamProfileError> {
    if half_width == 0.0 {
        return Err(BeamProfileError::InvalidGeometry {
            axis,
            fault: GeometryFault::ZeroHalfWidth,
        });
    }
    if !half_width.is_finite() || half_width < 0.0 {
        return Err(BeamProfileError::InvalidGeometry {
            axis,
            fault: GeometryFault::BadHalfWidth { half_width },
        });
    }
    if !coord.is_finite() {
        return Err(BeamProfileError::NonFiniteCentroid { axis, coord });
    }
    let offset = (coord / half_width * center_index as f64).trunc();
    Ok((offset as i64).saturating_add(center_index as i64))
}

/// Apply the range policy to a raw centroid index.
///
/// Indices inside `0..pixels` pass through unchanged. Outside that range,
/// [`CentroidRangePolicy::Fail`] reports [`BeamProfileError::OutOfRangeCentroid`]
/// and [`CentroidRangePolicy::Clamp`] snaps to the nearest edge pixel.
pub fn resolve_centroid_index(
    axis: Axis,
    coord: f64,
    raw: i64,
    pixels: usize,
    policy: CentroidRangePolicy,
) -> Result<usize, BeamProfileError> {
    let last = pixels as i64 - 1;
    if (0..=last).contains(&raw) {
        return Ok(raw as usize);
    }
    match policy {
        CentroidRangePolicy::Clamp if pixels > 0 => {
            let clamped = raw.clamp(0, last) as usize;
            log::warn!("{axis} centroid {coord} maps to index {raw}; clamped to {clamped}");
            Ok(clamped)
        }
        _ => Err(BeamProfileError::OutOfRangeCentroid {
            axis,
            coord,
            index: raw,
            pixels,
        }),
    }
}
