//! Stderr logging for the evaluator.
//!
//! Lines look like `[elapsed LEVEL target] message`. Install once at startup
//! with `init_with_level`; hosts that already own a logger skip it. The
//! `BEAM_PROFILE_LOG` environment variable overrides the requested level.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable that overrides the level passed by the caller.
pub const LOG_ENV: &str = "BEAM_PROFILE_LOG";

struct BeamLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for BeamLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<BeamLogger> = OnceLock::new();

// `beam_profile_core::stats` -> `stats`; foreign targets are left alone.
fn short_target(target: &str) -> &str {
    ["beam_profile_core::", "beam_profile::"]
        .iter()
        .find_map(|prefix| target.strip_prefix(prefix))
        .unwrap_or(target)
}

/// Resolve the effective level: a parseable `override_level` wins over
/// `requested`.
pub fn resolve_level(requested: LevelFilter, override_level: Option<&str>) -> LevelFilter {
    match override_level.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("ignoring {LOG_ENV}={raw:?}: not a log level");
            requested
        }),
        None => requested,
    }
}

/// Install the stderr logger at `level`, unless `BEAM_PROFILE_LOG` says
/// otherwise.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let level = resolve_level(level, std::env::var(LOG_ENV).ok().as_deref());
        let logger = LOGGER.get_or_init(|| BeamLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber instead of the plain logger.
///
/// `RUST_LOG` takes precedence; otherwise `level` (after the
/// `BEAM_PROFILE_LOG` override) sets the filter. `log` records from the
/// pipeline are bridged into the subscriber, and each `evaluate_with` /
/// `run_operand` span reports its duration on close.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    let level = resolve_level(level, std::env::var(LOG_ENV).ok().as_deref());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_ascii_lowercase()));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.with_timer(fmt::time::Uptime::default()).finish().try_init()
    };
}
