use serde::{Deserialize, Serialize};

/// What to do when the centroid maps outside the detector's pixel range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentroidRangePolicy {
    /// Abort with [`crate::BeamProfileError::OutOfRangeCentroid`].
    #[default]
    Fail,
    /// Snap to the nearest edge pixel and log a warning.
    Clamp,
}

/// Tunables for [`crate::evaluate_with`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateParams {
    #[serde(default)]
    pub centroid_policy: CentroidRangePolicy,
}
