// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every overridable setting is an `Option` here: `None` means "use the
//! config file value, or the built-in default".

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Overrides;

/// Command-line arguments for `herdsman`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "herdsman",
    version,
    about = "Discover workload scripts in a directory, run them all concurrently and report how each one ended.",
    long_about = None
)]
pub struct CliArgs {
    /// Name of (or path to) the directory holding workload files.
    ///
    /// Searched for below `--root`. Default: `sub_processes`.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub sub_processes_dir: Option<String>,

    /// Entry function invoked in each workload file. Default: `main`.
    #[arg(short = 'm', long, value_name = "SYMBOL")]
    pub main_method: Option<String>,

    /// Directory for the log file, created if missing. Default: `logs`.
    #[arg(short = 'l', long, value_name = "DIR")]
    pub logging_dir: Option<PathBuf>,

    /// Directory the workload directory is searched under.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to a config file (TOML).
    ///
    /// When omitted, `Herdsman.toml` is read if it exists in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HERDSMAN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Only write logs to the log file, not to stdout.
    #[arg(long)]
    pub quiet: bool,

    /// Write a JSON status export of every workload here once the run ends.
    #[arg(long, value_name = "PATH")]
    pub status_file: Option<PathBuf>,

    /// How often running workloads are reported (e.g. `60s`, `500ms`, `1m`).
    #[arg(long, value_name = "DURATION")]
    pub liveness_interval: Option<String>,

    /// Discover and print workloads, but don't start any of them.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Settings that take precedence over the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            sub_processes_dir: self.sub_processes_dir.clone(),
            entry_symbol: self.main_method.clone(),
            logging_dir: self.logging_dir.clone(),
            liveness_interval: self.liveness_interval.clone(),
            quiet: self.quiet,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
