// src/lib.rs

pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod handle;
pub mod logging;
pub mod report;
pub mod supervisor;
pub mod types;
pub mod workload;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_effective};
use crate::discovery::{DiscoveryRequest, ScriptLoader, discover};
use crate::errors::HerdsmanError;
use crate::exec::{ProcessLauncher, RealProcessLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::supervisor::{RunSummary, Supervisor};
use crate::workload::WorkloadReference;

/// Resolve the effective configuration: CLI flags over config file over
/// built-in defaults.
pub fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let cfg = load_effective(args.config.as_deref(), args.overrides())?;
    Ok(cfg)
}

/// High-level entry point used by `main.rs`, after logging is set up.
///
/// This wires together:
/// - discovery of the workload directory
/// - the supervisor, with real OS processes
/// - the optional JSON status export
///
/// Returns an error (and so a non-zero exit) only for fatal conditions;
/// workloads that fail are reported, not propagated.
pub async fn run(args: &CliArgs, cfg: &ConfigFile) -> Result<()> {
    if args.dry_run {
        let request = discovery_request(cfg)?;
        let loader = ScriptLoader::with_runtimes(&cfg.runtime);
        let references = discover(&RealFileSystem, &request, &loader);
        print_dry_run(cfg, &references);
        if references.is_empty() {
            return Err(HerdsmanError::NoWorkloads.into());
        }
        return Ok(());
    }

    info!("Starting main process");
    let launcher: Arc<dyn ProcessLauncher> = Arc::new(RealProcessLauncher);
    let summary = supervise(&RealFileSystem, cfg, launcher).await?;

    if let Some(path) = &args.status_file {
        report::write_status_file(path, &summary.records())?;
        info!(path = ?path, "status file written");
    }

    info!("Main process completed");
    Ok(())
}

/// Discover workloads through `fs` and supervise them with `launcher` until
/// every one of them is terminal.
pub async fn supervise(
    fs: &dyn FileSystem,
    cfg: &ConfigFile,
    launcher: Arc<dyn ProcessLauncher>,
) -> Result<RunSummary> {
    let request = discovery_request(cfg)?;
    let loader = ScriptLoader::with_runtimes(&cfg.runtime);
    let references = discover(fs, &request, &loader);
    debug!(count = references.len(), "workloads discovered");

    let span = info_span!("supervisor", dir = %request.sub_dir);
    let summary = Supervisor::new(launcher)
        .with_options(cfg.monitor)
        .with_span(span)
        .run(references)
        .await?;
    Ok(summary)
}

/// Build the discovery request described by `cfg`.
///
/// Without a configured root the current working directory is searched.
pub fn discovery_request(cfg: &ConfigFile) -> Result<DiscoveryRequest> {
    let root = match &cfg.discovery.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("resolving the current directory")?,
    };

    Ok(DiscoveryRequest::new(root, cfg.discovery.sub_processes_dir.clone())
        .with_entry_symbol(cfg.discovery.entry_symbol.clone())
        .with_ignore(cfg.discovery.ignore.iter().cloned()))
}

/// Simple dry-run output: print the workloads and how each would be started.
fn print_dry_run(cfg: &ConfigFile, references: &[WorkloadReference]) {
    println!("herdsman dry-run");
    println!(
        "  discovery.sub_processes_dir = {}",
        cfg.discovery.sub_processes_dir
    );
    println!("  discovery.entry_symbol = {}", cfg.discovery.entry_symbol);
    println!(
        "  monitor.liveness_interval = {:?}",
        cfg.monitor.liveness_interval
    );
    println!("  log file = {}", cfg.log_file().display());
    println!();

    println!("workloads ({}):", references.len());
    for reference in references {
        println!("  - {}", reference.name);
        println!("      file: {}", reference.path().display());
        println!("      runtime: {}", reference.entry.runtime);
        println!("      cmd: {}", reference.entry.display_command());
    }

    debug!("dry-run complete (no execution)");
}
