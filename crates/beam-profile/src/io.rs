//! JSON request/response types and run configuration.

use crate::core::{
    evaluate_with, BeamMetrics, BeamProfileError, CentroidCoordinate, DetectorGeometry,
    ErrorKind, EvaluateParams, IntensityGrid, RESULT_LEN,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum BeamProfileIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn read_json<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T, BeamProfileIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), BeamProfileIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Largest output slot array this crate will allocate. Hosts read back a
/// handful of values; anything larger is a corrupt or hostile capacity.
pub const MAX_RESULT_SLOTS: usize = 4096;

/// One evaluation request: everything the core needs for one detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamProfileRequest {
    /// Host-side detector identifier, echoed for bookkeeping only.
    #[serde(default)]
    pub detector: u32,
    pub geometry: DetectorGeometry,
    pub grid: IntensityGrid,
    pub centroid: CentroidCoordinate,
}

impl BeamProfileRequest {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BeamProfileIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BeamProfileIoError> {
        write_json(self, path)
    }

    /// Run the pipeline on this request.
    pub fn evaluate(&self, params: &EvaluateParams) -> Result<BeamMetrics, BeamProfileError> {
        evaluate_with(&self.geometry, &self.grid.view(), &self.centroid, params)
    }
}

/// Failure signal handed back across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&BeamProfileError> for ResponseError {
    fn from(err: &BeamProfileError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Either the six result values or an error; never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamProfileResponse {
    Result([f64; RESULT_LEN]),
    Error(ResponseError),
}

impl BeamProfileResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Result(_))
    }

    /// The metrics of a successful response.
    pub fn metrics(&self) -> Option<BeamMetrics> {
        match self {
            Self::Result(values) => Some(BeamMetrics::from_array(*values)),
            Self::Error(_) => None,
        }
    }

    /// Render into a fixed-length output slot array, zero-padded.
    ///
    /// Returns `None` for an error response, or when `capacity` is outside
    /// `RESULT_LEN..=MAX_RESULT_SLOTS`.
    pub fn to_slots(&self, capacity: usize) -> Option<Vec<f64>> {
        match self {
            Self::Result(values) if (RESULT_LEN..=MAX_RESULT_SLOTS).contains(&capacity) => {
                let mut slots = vec![0.0; capacity];
                slots[..RESULT_LEN].copy_from_slice(values);
                Some(slots)
            }
            _ => None,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BeamProfileIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BeamProfileIoError> {
        write_json(self, path)
    }
}

impl From<Result<BeamMetrics, BeamProfileError>> for BeamProfileResponse {
    fn from(res: Result<BeamMetrics, BeamProfileError>) -> Self {
        match res {
            Ok(metrics) => Self::Result(metrics.to_array()),
            Err(err) => Self::Error(ResponseError::from(&err)),
        }
    }
}

/// Serve one request. Failures are logged and folded into the response.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(request, params), fields(detector = request.detector))
)]
pub fn serve(request: &BeamProfileRequest, params: &EvaluateParams) -> BeamProfileResponse {
    let res = request.evaluate(params);
    if let Err(err) = &res {
        log::error!("detector {}: {err}", request.detector);
    }
    res.into()
}

fn default_result_slots() -> usize {
    RESULT_LEN
}

/// Configuration for a file-driven evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamProfileConfig {
    pub request_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub params: EvaluateParams,
    /// Length of the output slot array written next to the response.
    #[serde(default = "default_result_slots")]
    pub result_slots: usize,
}

impl BeamProfileConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BeamProfileIoError> {
        read_json(path)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BeamProfileIoError> {
        write_json(self, path)
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("beam_profile_report.json"))
    }

    /// Load the request this config points at.
    pub fn load_request(&self) -> Result<BeamProfileRequest, BeamProfileIoError> {
        BeamProfileRequest::load_json(&self.request_path)
    }
}

/// What a config-driven run writes to its output path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamProfileReport {
    pub request_path: String,
    pub detector: u32,
    pub params: EvaluateParams,
    pub response: BeamProfileResponse,
    #[serde(default)]
    pub slots: Option<Vec<f64>>,
}

impl BeamProfileReport {
    /// Serve the request referenced by `cfg` and build the report.
    pub fn run(cfg: &BeamProfileConfig) -> Result<Self, BeamProfileIoError> {
        let request = cfg.load_request()?;
        let response = serve(&request, &cfg.params);
        let slots = response.to_slots(cfg.result_slots);
        Ok(Self {
            request_path: cfg.request_path.clone(),
            detector: request.detector,
            params: cfg.params.clone(),
            response,
            slots,
        })
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BeamProfileIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BeamProfileIoError> {
        write_json(self, path)
    }
}
