use serde::{Deserialize, Serialize};

use crate::BeamProfileError;

/// Borrowed detector intensities.
#[derive(Clone, Copy, Debug)]
pub struct IntensityGridView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f64], // row-major (row = y), len = w*h
}

/// Owned detector intensities, `height` rows of `width` samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntensityGrid {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl IntensityGrid {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self, BeamProfileError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, BeamProfileError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        if rows.iter().any(|r| r.len() != width) {
            return Err(BeamProfileError::GridShape {
                expected: width.saturating_mul(height),
                got: data.len(),
            });
        }
        Self::new(width, height, data)
    }

    pub fn view(&self) -> IntensityGridView<'_> {
        IntensityGridView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

impl IntensityGridView<'_> {
    /// Check that the buffer length matches the declared shape.
    pub fn validate(&self) -> Result<(), BeamProfileError> {
        check_len(self.width, self.height, self.data.len())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

fn check_len(width: usize, height: usize, got: usize) -> Result<(), BeamProfileError> {
    // saturates to usize::MAX, which no buffer length can match
    let expected = width.saturating_mul(height);
    if got != expected {
        return Err(BeamProfileError::GridShape { expected, got });
    }
    Ok(())
}

/// Copy row `y_index` (varies over x, length `width`).
pub fn extract_row(grid: &IntensityGridView<'_>, y_index: usize) -> Result<Vec<f64>, BeamProfileError> {
    grid.validate()?;
    if y_index >= grid.height {
        return Err(BeamProfileError::IndexOutOfRange {
            index: y_index,
            len: grid.height,
        });
    }
    let start = y_index * grid.width;
    Ok(grid.data[start..start + grid.width].to_vec())
}

/// Copy column `x_index` (varies over y, length `height`).
pub fn extract_column(
    grid: &IntensityGridView<'_>,
    x_index: usize,
) -> Result<Vec<f64>, BeamProfileError> {
    grid.validate()?;
    if x_index >= grid.width {
        return Err(BeamProfileError::IndexOutOfRange {
            index: x_index,
            len: grid.width,
        });
    }
    Ok(grid
        .data
        .iter()
        .skip(x_index)
        .step_by(grid.width)
        .copied()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> IntensityGrid {
        let data = (0..width * height).map(|v| v as f64).collect();
        IntensityGrid::new(width, height, data).unwrap()
    }

    #[test]
    fn row_and_column_follow_row_major_layout() {
        // 3 wide, 2 tall:
        // 0 1 2
        // 3 4 5
        let grid = ramp(3, 2);
        let view = grid.view();
        assert_eq!(extract_row(&view, 1).unwrap(), vec![3.0, 4.0, 5.0]);
        assert_eq!(extract_column(&view, 2).unwrap(), vec![2.0, 5.0]);
        assert_eq!(view.get(1, 1), Some(4.0));
        assert_eq!(view.get(3, 0), None);
    }

    #[test]
    fn out_of_range_slice_index_is_an_error() {
        let grid = ramp(3, 2);
        let view = grid.view();
        assert_eq!(
            extract_row(&view, 2).unwrap_err(),
            BeamProfileError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            extract_column(&view, 3).unwrap_err(),
            BeamProfileError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn slices_are_independent_copies() {
        let mut grid = ramp(2, 2);
        let row = extract_row(&grid.view(), 0).unwrap();
        grid.data[0] = 100.0;
        assert_eq!(row, vec![0.0, 1.0]);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert_eq!(
            IntensityGrid::new(3, 3, vec![0.0; 8]).unwrap_err(),
            BeamProfileError::GridShape {
                expected: 9,
                got: 8
            }
        );
        let ragged = vec![vec![0.0, 1.0], vec![2.0]];
        assert!(IntensityGrid::from_rows(&ragged).is_err());

        let view = IntensityGridView {
            width: 2,
            height: 2,
            data: &[0.0; 3],
        };
        assert!(extract_row(&view, 0).is_err());
    }

    #[test]
    fn huge_declared_shape_is_a_mismatch_not_a_panic() {
        let view = IntensityGridView {
            width: 1 << 33,
            height: 1 << 33,
            data: &[0.0; 9],
        };
        assert_eq!(
            view.validate().unwrap_err(),
            BeamProfileError::GridShape {
                expected: usize::MAX,
                got: 9
            }
        );
        assert!(extract_column(&view, 0).is_err());
        assert!(IntensityGrid::new(usize::MAX, 2, vec![0.0; 4]).is_err());
    }

    #[test]
    fn from_rows_keeps_row_order() {
        let grid = IntensityGrid::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!((grid.width, grid.height), (2, 2));
        assert_eq!(grid.data, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
