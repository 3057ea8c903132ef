use std::path::PathBuf;
use std::process::ExitCode;

use beam_profile::core::{init_with_level, CentroidRangePolicy, EvaluateParams};
use beam_profile::host::{run_operand, HostError, SceneHost};
use beam_profile::{
    serve, BeamProfileConfig, BeamProfileIoError, BeamProfileReport, BeamProfileRequest,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "beam-profile", version, about = "Beam FWHM and sigma from detector data")]
struct Cli {
    /// Log verbosity written to stderr.
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
    /// Emit `tracing` spans (with timings) instead of plain log lines.
    #[cfg(feature = "tracing")]
    #[arg(long, value_enum, global = true)]
    trace: Option<TraceFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a single request file.
    Evaluate {
        #[arg(long)]
        request: PathBuf,
        /// Write the response here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Snap an out-of-range centroid to the detector edge instead of failing.
        #[arg(long)]
        clamp_centroid: bool,
    },
    /// Run a JSON config and write its report.
    Run {
        #[arg(long)]
        config: PathBuf,
    },
    /// Run as a host operand against a scene file.
    Operand {
        #[arg(long)]
        scene: PathBuf,
        /// Write the result slots here instead of stdout.
        #[arg(long)]
        results: Option<PathBuf>,
        #[arg(long)]
        clamp_centroid: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TraceFormat {
    Text,
    Json,
}

impl Cli {
    fn init_logging(&self) {
        let level = self.log_level.into();
        #[cfg(feature = "tracing")]
        let traced = self
            .trace
            .map(|format| beam_profile::core::init_tracing(level, format == TraceFormat::Json))
            .is_some();
        #[cfg(not(feature = "tracing"))]
        let traced = false;
        if !traced {
            let _ = init_with_level(level);
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] BeamProfileIoError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("evaluation failed")]
    Evaluation,
}

fn params(clamp_centroid: bool) -> EvaluateParams {
    EvaluateParams {
        centroid_policy: if clamp_centroid {
            CentroidRangePolicy::Clamp
        } else {
            CentroidRangePolicy::Fail
        },
    }
}

fn emit(json: String, path: Option<PathBuf>) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(&path, json).map_err(|source| CliError::Write { path, source }),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Evaluate {
            request,
            output,
            clamp_centroid,
        } => {
            let request = BeamProfileRequest::load_json(&request)?;
            let response = serve(&request, &params(clamp_centroid));
            emit(serde_json::to_string_pretty(&response)?, output)?;
            if !response.is_ok() {
                return Err(CliError::Evaluation);
            }
        }
        Command::Run { config } => {
            let cfg = BeamProfileConfig::load_json(&config)?;
            let report = BeamProfileReport::run(&cfg)?;
            let out = cfg.output_path();
            report.write_json(&out)?;
            log::info!("report written to {}", out.display());
            if !report.response.is_ok() {
                return Err(CliError::Evaluation);
            }
        }
        Command::Operand {
            scene,
            results,
            clamp_centroid,
        } => {
            let mut host = SceneHost::load_json(&scene)?;
            let metrics = run_operand(&mut host, &params(clamp_centroid))?;
            log::info!("metrics: {metrics:?}");
            let slots = host
                .results()
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| metrics.to_array().to_vec());
            emit(serde_json::to_string_pretty(&slots)?, results)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
