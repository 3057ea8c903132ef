//! Host-session port.
//!
//! An optical-design host launches the evaluator as a user operand: it
//! exposes four numeric argument slots, the detector object the first slot
//! names, and a fixed-length result buffer it reads back once the operand
//! finishes. [`OperandHost`] abstracts that session; [`run_operand`] drives
//! one evaluation through it.

use crate::core::{
    evaluate_with, BeamMetrics, BeamProfileError, CentroidCoordinate, DetectorGeometry,
    EvaluateParams, IntensityGrid, RESULT_LEN,
};
use crate::io::{BeamProfileIoError, BeamProfileRequest, MAX_RESULT_SLOTS};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors raised while talking to the host.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("host session rejected: {0}")]
    Session(String),
    #[error("detector argument {0} is not a valid object number")]
    DetectorArgument(f64),
    #[error("detector object {0} not found")]
    UnknownDetector(u32),
    #[error("result buffer holds {capacity} values, need {needed}")]
    ResultCapacity { capacity: usize, needed: usize },
    #[error("result buffer of {capacity} values exceeds the limit of {max}")]
    ResultCapacityTooLarge { capacity: usize, max: usize },
    #[error("results were not accepted by the host: {0}")]
    WriteRejected(String),
    #[error(transparent)]
    Evaluate(#[from] BeamProfileError),
    #[error(transparent)]
    Io(#[from] BeamProfileIoError),
}

/// The four operand argument slots.
///
/// Slot 0 carries the detector object number; slots 1..3 are reserved and
/// currently ignored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperandArguments(pub [f64; 4]);

impl OperandArguments {
    /// Detector object number from slot 0, truncated toward zero.
    pub fn detector(&self) -> Result<u32, HostError> {
        let raw = self.0[0];
        if !raw.is_finite() || raw < 0.0 || raw > u32::MAX as f64 {
            return Err(HostError::DetectorArgument(raw));
        }
        Ok(raw.trunc() as u32)
    }
}

/// Everything the host knows about one detector at evaluation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorSnapshot {
    pub geometry: DetectorGeometry,
    pub grid: IntensityGrid,
    pub centroid: CentroidCoordinate,
}

impl DetectorSnapshot {
    pub fn into_request(self, detector: u32) -> BeamProfileRequest {
        BeamProfileRequest {
            detector,
            geometry: self.geometry,
            grid: self.grid,
            centroid: self.centroid,
        }
    }
}

/// A live host session.
pub trait OperandHost {
    /// Verify the session may run an operand (license and launch mode).
    fn check_session(&self) -> Result<(), HostError>;
    fn arguments(&self) -> OperandArguments;
    /// Length of the result buffer the host reads back.
    fn result_capacity(&self) -> usize;
    fn detector_snapshot(&self, detector: u32) -> Result<DetectorSnapshot, HostError>;
    fn write_results(&mut self, results: &[f64]) -> Result<(), HostError>;
}

/// Run one operand evaluation against `host`.
///
/// Nothing is written back unless every step succeeds.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(host, params)))]
pub fn run_operand<H: OperandHost + ?Sized>(
    host: &mut H,
    params: &EvaluateParams,
) -> Result<BeamMetrics, HostError> {
    host.check_session()?;
    let detector = host.arguments().detector()?;
    let capacity = host.result_capacity();
    if capacity < RESULT_LEN {
        return Err(HostError::ResultCapacity {
            capacity,
            needed: RESULT_LEN,
        });
    }
    if capacity > MAX_RESULT_SLOTS {
        return Err(HostError::ResultCapacityTooLarge {
            capacity,
            max: MAX_RESULT_SLOTS,
        });
    }

    let snapshot = host.detector_snapshot(detector)?;
    log::info!(
        "detector {detector}: {}x{} pixels",
        snapshot.geometry.x_pixels,
        snapshot.geometry.y_pixels
    );
    let metrics = evaluate_with(
        &snapshot.geometry,
        &snapshot.grid.view(),
        &snapshot.centroid,
        params,
    )?;

    let mut results = vec![0.0; capacity];
    results[..RESULT_LEN].copy_from_slice(&metrics.to_array());
    host.write_results(&results)?;
    Ok(metrics)
}

/// How the host launched this process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMode {
    Operand,
    Standalone,
    Extension,
    Plugin,
}

fn default_mode() -> HostMode {
    HostMode::Operand
}

fn default_license() -> bool {
    true
}

fn default_capacity() -> usize {
    RESULT_LEN
}

/// A detector object stored in a [`Scene`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDetector {
    pub object: u32,
    #[serde(flatten)]
    pub snapshot: DetectorSnapshot,
}

/// Serializable description of a host session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_mode")]
    pub mode: HostMode,
    #[serde(default = "default_license")]
    pub license_valid: bool,
    pub arguments: OperandArguments,
    #[serde(default = "default_capacity")]
    pub result_capacity: usize,
    pub detectors: Vec<SceneDetector>,
}

/// [`OperandHost`] backed by an in-memory [`Scene`], e.g. loaded from JSON.
#[derive(Clone, Debug)]
pub struct SceneHost {
    scene: Scene,
    results: Option<Vec<f64>>,
}

impl SceneHost {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            results: None,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BeamProfileIoError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::new(serde_json::from_str(&raw)?))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The result buffer written by the last successful run.
    pub fn results(&self) -> Option<&[f64]> {
        self.results.as_deref()
    }
}

impl OperandHost for SceneHost {
    fn check_session(&self) -> Result<(), HostError> {
        if !self.scene.license_valid {
            return Err(HostError::Session("license is not valid for API use".into()));
        }
        if self.scene.mode != HostMode::Operand {
            return Err(HostError::Session(format!(
                "started in the wrong mode: expected operand, found {:?}",
                self.scene.mode
            )));
        }
        Ok(())
    }

    fn arguments(&self) -> OperandArguments {
        self.scene.arguments
    }

    fn result_capacity(&self) -> usize {
        self.scene.result_capacity
    }

    fn detector_snapshot(&self, detector: u32) -> Result<DetectorSnapshot, HostError> {
        self.scene
            .detectors
            .iter()
            .find(|d| d.object == detector)
            .map(|d| d.snapshot.clone())
            .ok_or(HostError::UnknownDetector(detector))
    }

    fn write_results(&mut self, results: &[f64]) -> Result<(), HostError> {
        if results.len() != self.scene.result_capacity {
            return Err(HostError::WriteRejected(format!(
                "expected {} values, got {}",
                self.scene.result_capacity,
                results.len()
            )));
        }
        self.results = Some(results.to_vec());
        Ok(())
    }
}
