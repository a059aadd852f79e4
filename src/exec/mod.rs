// src/exec/mod.rs

//! Process execution layer.
//!
//! This module actually runs workloads with `tokio::process::Command` and
//! reports how each process ended.
//!
//! - [`launcher`] provides the `ProcessLauncher` trait, the
//!   `LaunchedProcess` channels a handle keeps, and the production
//!   `RealProcessLauncher`. Tests swap in a fake launcher.
//! - [`process_runner`] owns a spawned child: it forwards output to the log,
//!   waits for the exit and honours kill requests.
//! - [`outcome`] maps OS exit statuses onto [`ExitOutcome`].

pub mod launcher;
pub mod outcome;
pub mod process_runner;

pub use launcher::{LaunchedProcess, ProcessControl, ProcessLauncher, RealProcessLauncher};
pub use outcome::ExitOutcome;
