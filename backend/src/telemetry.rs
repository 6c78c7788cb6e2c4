//! Tracing subscriber initialisation.
//!
//! `RUST_LOG` takes precedence over the configured level. File output rotates
//! daily and is written through a non-blocking worker; keep the returned
//! [`TelemetryGuard`] alive for the lifetime of the process so buffered lines
//! are flushed on exit.

use std::io;

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::{LogFormat, LogOutput, LogSettings};

/// Failures while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level `{level}`: {source}")]
    Filter { level: String, source: ParseError },
    #[error("failed to create log directory: {0}")]
    Directory(#[from] io::Error),
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Flushes buffered log lines when dropped.
#[must_use = "dropping the guard stops the background log writer"]
pub struct TelemetryGuard {
    _worker: WorkerGuard,
}

fn env_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|source| TelemetryError::Filter {
            level: level.to_owned(),
            source,
        }),
    }
}

fn writer(settings: &LogSettings) -> Result<(NonBlocking, WorkerGuard), TelemetryError> {
    Ok(match settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
        LogOutput::File => {
            std::fs::create_dir_all(&settings.directory)?;
            let appender = tracing_appender::rolling::daily(&settings.directory, &settings.filename);
            tracing_appender::non_blocking(appender)
        }
    })
}

/// Install the global subscriber described by `settings`.
///
/// # Errors
/// Returns [`TelemetryError`] when the level is not a valid filter directive,
/// the log directory cannot be created, or a subscriber is already installed.
pub fn init(settings: &LogSettings) -> Result<TelemetryGuard, TelemetryError> {
    let filter = env_filter(&settings.level)?;
    let (writer, worker) = writer(settings)?;
    let ansi = settings.output != LogOutput::File;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);
    let installed = match settings.format {
        LogFormat::Json => builder.json().with_ansi(false).try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|err| TelemetryError::Install(err.to_string()))?;
    Ok(TelemetryGuard { _worker: worker })
}
