//! Stderr logging for conversion tools.
//!
//! Records from the `koordinat*` crates print as
//! `[elapsed LEVEL crate] message`; records from other crates are dropped.
//! Install with [`init_with_level`] or [`init_from_env`], or switch to a
//! `tracing` subscriber with `init_tracing` under the `tracing` feature.

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

/// Environment variable read by [`init_from_env`].
pub const LOG_LEVEL_ENV: &str = "RUST_LOG";

const CRATE_PREFIX: &str = "koordinat";

struct ConversionLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for ConversionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(CRATE_PREFIX)
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

static LOGGER: OnceLock<ConversionLogger> = OnceLock::new();

/// `koordinat_height::geoid` → `koordinat_height`.
fn short_target(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

/// Level named by `value` (`"debug"`, `"WARN"`, ...), or `fallback`.
fn level_or(value: Option<&str>, fallback: LevelFilter) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(fallback)
}

/// Install the stderr logger at `level`.
///
/// Only the first call installs; later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| ConversionLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}

/// Install the stderr logger at the level named by `$RUST_LOG` (default `info`).
pub fn init_from_env() -> Result<(), log::SetLoggerError> {
    let value = std::env::var(LOG_LEVEL_ENV).ok();
    init_with_level(level_or(value.as_deref(), LevelFilter::Info))
}

/// Install a `tracing` subscriber filtered by `$RUST_LOG`, defaulting to
/// `info` for the `koordinat*` crates.
///
/// Span close events carry the timing of the instrumented conversion entry
/// points. `log` records are bridged by `tracing-subscriber`'s default
/// features.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "koordinat=info,koordinat_core=info,koordinat_parse=info,\
             koordinat_mgrs=info,koordinat_height=info",
        )
    });
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
