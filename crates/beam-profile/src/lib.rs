//! Beam-quality evaluation for optical detector data.
//!
//! This crate provides:
//! - a re-export of the numerical pipeline as [`core`],
//! - a request/response port ([`serve`]) with JSON I/O and run configs,
//! - a host-session port ([`host::OperandHost`]) that mirrors how an
//!   optical-design application launches a user operand, with a
//!   JSON-backed implementation ([`host::SceneHost`]),
//! - (feature `cli`) the `beam-profile` binary.
//!
//! ## Quickstart
//!
//! ```no_run
//! use beam_profile::{serve, BeamProfileRequest};
//! use beam_profile::core::EvaluateParams;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = BeamProfileRequest::load_json("request.json")?;
//! let response = serve(&request, &EvaluateParams::default());
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

pub use beam_profile_core as core;

pub mod host;
mod io;

pub use beam_profile_core::{BeamMetrics, BeamProfileError, DetectorGeometry, IntensityGrid};
pub use io::{
    serve, BeamProfileConfig, BeamProfileIoError, BeamProfileReport, BeamProfileRequest,
    BeamProfileResponse, ResponseError, MAX_RESULT_SLOTS,
};
