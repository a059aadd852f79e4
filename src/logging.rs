// src/logging.rs

//! Logging setup for `herdsman` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `HERDSMAN_LOG` environment variable (any `EnvFilter` directive)
//! 3. default to `info`
//!
//! Every line goes to `<logging dir>/<file name>`; it is mirrored to stdout
//! unless the config (or `--quiet`) turns that off.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;
use crate::config::LoggingSection;

pub const LOG_ENV_VAR: &str = "HERDSMAN_LOG";

/// Initialise the global logging subscriber.
///
/// Creates the log directory (recursively) if it does not exist yet and
/// returns the path of the log file being appended to.
pub fn init_logging(logging: &LoggingSection, cli_level: Option<LogLevel>) -> Result<PathBuf> {
    fs::create_dir_all(&logging.dir)
        .with_context(|| format!("creating log directory {:?}", logging.dir))?;

    let log_path = logging.dir.join(&logging.file_name);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {:?}", log_path))?;

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    let stdout_layer = logging.stdout.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stdout)
    });

    tracing_subscriber::registry()
        .with(filter(cli_level))
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("installing the global tracing subscriber")?;

    Ok(log_path)
}

fn filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(lvl) => EnvFilter::new(lvl.as_str()),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}
