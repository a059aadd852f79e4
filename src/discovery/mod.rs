// src/discovery/mod.rs

//! Workload discovery.
//!
//! Turns "a root, a directory name and an ignore set" into an ordered list
//! of [`WorkloadReference`]s:
//!
//! - [`search`] locates the workload directory below the root.
//! - [`loader`] binds each candidate file to a typed entry point.
//!
//! Discovery never fails the run by itself: a missing directory yields an
//! empty list and unresolvable files are dropped with a warning. Deciding
//! that "nothing to run" is fatal is the supervisor's job.

pub mod loader;
pub mod search;

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::errors::HerdsmanError;
use crate::fs::FileSystem;
use crate::workload::WorkloadReference;

pub use loader::{EntryLoader, LoadFailure, RuntimeSpec, ScriptLoader};
pub use search::{find_dir, locate_workload_dir};

/// Files and directories skipped by default (package markers and caches).
pub const DEFAULT_IGNORE: [&str; 3] = ["__init__.py", "__pycache__", "__init__"];

/// Everything discovery needs to know.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub root: PathBuf,
    pub sub_dir: String,
    pub entry_symbol: String,
    /// Names skipped both as file names and as file stems.
    pub ignore: BTreeSet<String>,
}

impl DiscoveryRequest {
    pub fn new(root: impl Into<PathBuf>, sub_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            sub_dir: sub_dir.into(),
            entry_symbol: "main".to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_entry_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.entry_symbol = symbol.into();
        self
    }

    pub fn with_ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = names.into_iter().map(Into::into).collect();
        self
    }

    fn is_ignored(&self, file_name: &str, stem: &str) -> bool {
        self.ignore.contains(file_name) || self.ignore.contains(stem)
    }
}

/// Discover workloads, in file name order.
pub fn discover(
    fs: &dyn FileSystem,
    request: &DiscoveryRequest,
    loader: &dyn EntryLoader,
) -> Vec<WorkloadReference> {
    info!(
        root = ?request.root,
        sub_dir = %request.sub_dir,
        "searching for workload directory"
    );

    let dir = match locate_workload_dir(fs, &request.root, &request.sub_dir, &request.ignore) {
        Ok(dir) => dir,
        Err(err) => {
            warn!(error = %err, "no workloads discovered");
            return Vec::new();
        }
    };

    let mut files = match fs.read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            let err = HerdsmanError::Discovery(format!("reading {:?}: {e:#}", dir));
            warn!(error = %err, "no workloads discovered");
            return Vec::new();
        }
    };
    files.retain(|p| fs.is_file(p));
    files.sort();

    let mut references = Vec::new();
    let mut names: HashSet<String> = HashSet::new();

    for path in files {
        let (Some(file_name), Some(stem)) = (
            path.file_name().and_then(|n| n.to_str()),
            path.file_stem().and_then(|n| n.to_str()),
        ) else {
            debug!(path = ?path, "skipping file with non UTF-8 name");
            continue;
        };

        if request.is_ignored(file_name, stem) {
            debug!(path = ?path, "ignored");
            continue;
        }

        let entry = match loader.resolve(fs, &path, &request.entry_symbol) {
            Ok(entry) => entry,
            Err(failure) => {
                let err = HerdsmanError::EntryResolution {
                    path: path.clone(),
                    reason: failure.to_string(),
                };
                warn!(error = %err, "dropping workload");
                continue;
            }
        };

        if !names.insert(stem.to_string()) {
            warn!(
                path = ?path,
                workload = %stem,
                "another file already provides this workload name; dropping"
            );
            continue;
        }

        references.push(WorkloadReference::new(stem, entry));
    }

    let found: Vec<&str> = references.iter().map(|r| r.name.as_str()).collect();
    info!(dir = ?dir, workloads = ?found, "discovered workloads");

    references
}
