//! Intensity-weighted moments of a 1-D slice, in index units.
//!
//! Sample `i` of a slice is treated as a weight at integer position `i`.
//! All sums are accumulated left to right in a single pass so results are
//! reproducible bit for bit.

use serde::{Deserialize, Serialize};

use crate::BeamProfileError;

/// FWHM / sigma ratio of a Gaussian, truncated to three decimals
/// (`2 * sqrt(2 ln 2) = 2.35482...`).
pub const FWHM_PER_SIGMA: f64 = 2.355;

/// Weighted centre of mass `sum(i * w_i) / sum(w_i)`.
///
/// Weights must be finite and non-negative.
pub fn weighted_mean_index(data: &[f64]) -> Result<f64, BeamProfileError> {
    let mut sum = 0.0;
    let mut sum_weights = 0.0;
    for (i, &w) in data.iter().enumerate() {
        if !w.is_finite() || w < 0.0 {
            return Err(BeamProfileError::InvalidIntensity { index: i, value: w });
        }
        sum += i as f64 * w;
        sum_weights += w;
    }
    if sum_weights == 0.0 || !sum_weights.is_finite() {
        return Err(BeamProfileError::DegenerateDistribution {
            len: data.len(),
            weight_sum: sum_weights,
        });
    }
    Ok(sum / sum_weights)
}

/// Reliability-weighted standard deviation around [`weighted_mean_index`].
///
/// `sqrt( sum(w_i (i - mean)^2) / ((n - 1) / n * sum(w_i)) )`. The Bessel
/// factor scales the weight sum, so a single-sample slice has a zero
/// denominator and is rejected.
pub fn weighted_sigma(data: &[f64]) -> Result<f64, BeamProfileError> {
    let mean = weighted_mean_index(data)?;

    let mut sum = 0.0;
    let mut sum_weights = 0.0;
    for (i, &w) in data.iter().enumerate() {
        let d = i as f64 - mean;
        sum += w * d * d;
        sum_weights += w;
    }

    let n = data.len() as f64;
    let denom = (n - 1.0) / n * sum_weights;
    if denom == 0.0 {
        return Err(BeamProfileError::DegenerateDistribution {
            len: data.len(),
            weight_sum: sum_weights,
        });
    }
    let variance = sum / denom;
    if !variance.is_finite() || variance < 0.0 {
        return Err(BeamProfileError::DegenerateDistribution {
            len: data.len(),
            weight_sum: sum_weights,
        });
    }
    Ok(variance.sqrt())
}

/// Gaussian FWHM estimate, `FWHM_PER_SIGMA * weighted_sigma(data)`.
pub fn fwhm(data: &[f64]) -> Result<f64, BeamProfileError> {
    Ok(FWHM_PER_SIGMA * weighted_sigma(data)?)
}

/// All three moments of one slice, in index units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliceStats {
    pub mean: f64,
    pub sigma: f64,
    pub fwhm: f64,
}

impl SliceStats {
    pub fn compute(data: &[f64]) -> Result<Self, BeamProfileError> {
        let mean = weighted_mean_index(data)?;
        let sigma = weighted_sigma(data)?;
        Ok(Self {
            mean,
            sigma,
            fwhm: FWHM_PER_SIGMA * sigma,
        })
    }

    /// Scale sigma and FWHM by a per-pixel physical step.
    pub fn scaled(&self, step: f64) -> (f64, f64) {
        (self.sigma * step, self.fwhm * step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn mean_of_centred_delta() {
        assert_eq!(weighted_mean_index(&[0.0, 0.0, 1.0, 0.0, 0.0]).unwrap(), 2.0);
    }

    #[test]
    fn mean_of_two_point_mass() {
        assert_relative_eq!(weighted_mean_index(&[1.0, 0.0, 0.0, 3.0]).unwrap(), 2.25);
    }

    #[test]
    fn delta_has_zero_sigma() {
        let data = [0.0, 0.0, 10.0, 0.0, 0.0];
        assert_eq!(weighted_sigma(&data).unwrap(), 0.0);
        assert_eq!(fwhm(&data).unwrap(), 0.0);
    }

    #[test]
    fn sigma_applies_bessel_factor_to_weight_sum() {
        // mean = 1, sum w (i - mean)^2 = 2, denom = 2/3 * 3 = 2
        let data = [1.0, 1.0, 1.0];
        assert_relative_eq!(weighted_sigma(&data).unwrap(), 1.0, epsilon = 1e-12);

        // mean = 1, numerator = 2 * 1 = 2, denom = 2/3 * 4
        let data = [1.0, 2.0, 1.0];
        assert_relative_eq!(
            weighted_sigma(&data).unwrap(),
            (2.0_f64 / (2.0 / 3.0 * 4.0)).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn fwhm_is_fixed_multiple_of_sigma() {
        let data = [0.5, 2.0, 7.0, 3.0, 0.25, 0.0, 1.0];
        let sigma = weighted_sigma(&data).unwrap();
        assert_abs_diff_eq!(fwhm(&data).unwrap(), 2.355 * sigma, epsilon = 1e-12);
    }

    #[test]
    fn zero_weights_are_degenerate() {
        let err = weighted_mean_index(&[0.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            BeamProfileError::DegenerateDistribution {
                len: 3,
                weight_sum: 0.0
            }
        );
        assert!(weighted_sigma(&[0.0, 0.0]).is_err());
        assert!(weighted_mean_index(&[]).is_err());
    }

    #[test]
    fn negative_weight_is_rejected() {
        // positive weight sum, but the variance term would go negative
        let data = [-1.0, 0.0, 2.0];
        assert_eq!(
            weighted_mean_index(&data).unwrap_err(),
            BeamProfileError::InvalidIntensity {
                index: 0,
                value: -1.0
            }
        );
        assert!(weighted_sigma(&data).is_err());
        assert!(fwhm(&data).is_err());
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = weighted_sigma(&[1.0, bad, 1.0]).unwrap_err();
            assert!(
                matches!(err, BeamProfileError::InvalidIntensity { index: 1, .. }),
                "{err:?}"
            );
        }
    }

    #[test]
    fn overflowing_weights_never_yield_nan() {
        let data = [f64::MAX, f64::MAX, f64::MAX];
        match weighted_sigma(&data) {
            Ok(sigma) => assert!(sigma.is_finite() && sigma >= 0.0),
            Err(err) => assert!(matches!(err, BeamProfileError::DegenerateDistribution { .. })),
        }
    }

    #[test]
    fn single_sample_is_degenerate_for_sigma() {
        assert_eq!(weighted_mean_index(&[5.0]).unwrap(), 0.0);
        assert!(matches!(
            weighted_sigma(&[5.0]).unwrap_err(),
            BeamProfileError::DegenerateDistribution { len: 1, .. }
        ));
    }

    #[test]
    fn gaussian_profile_recovers_sigma() {
        let true_sigma = 4.0;
        let data: Vec<f64> = (0..101)
            .map(|i| {
                let d = i as f64 - 50.0;
                (-0.5 * d * d / (true_sigma * true_sigma)).exp()
            })
            .collect();
        let stats = SliceStats::compute(&data).unwrap();
        assert_relative_eq!(stats.mean, 50.0, epsilon = 1e-9);
        // Bessel factor inflates by sqrt(n / (n - 1))
        assert_relative_eq!(stats.sigma, true_sigma * (101.0_f64 / 100.0).sqrt(), epsilon = 1e-6);
        assert_eq!(stats.fwhm, FWHM_PER_SIGMA * stats.sigma);
    }
}
