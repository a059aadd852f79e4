#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use herdsman::config::{ConfigFile, RawConfigFile};
use herdsman::discovery::RuntimeSpec;
use tempfile::TempDir;

/// Builder for a temporary project tree holding a workload directory.
///
/// ```text
/// <tempdir>/            <- root
///   <nested...>/<name>/ <- workload directory
///     backup.sh
///     __init__.py
/// ```
pub struct WorkloadDirBuilder {
    root: TempDir,
    dir: PathBuf,
}

impl WorkloadDirBuilder {
    /// Workload directory `sub_processes` directly under the root.
    pub fn new() -> Self {
        Self::at("sub_processes")
    }

    /// Workload directory at `relative` (may be nested) under the root.
    pub fn at(relative: impl AsRef<Path>) -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let dir = root.path().join(relative);
        fs::create_dir_all(&dir).expect("failed to create workload dir");
        Self { root, dir }
    }

    /// Add `<name>.sh` defining `main` with `body`.
    pub fn with_sh(self, name: &str, body: &str) -> Self {
        self.with_sh_function(name, "main", body)
    }

    /// Add `<name>.sh` defining function `symbol` with `body`.
    pub fn with_sh_function(self, name: &str, symbol: &str, body: &str) -> Self {
        let contents = format!("#!/bin/sh\n\n{symbol}() {{\n    {body}\n}}\n");
        self.with_file(&format!("{name}.sh"), &contents)
    }

    /// Add an arbitrary file to the workload directory.
    pub fn with_file(self, file_name: &str, contents: &str) -> Self {
        fs::write(self.dir.join(file_name), contents).expect("failed to write workload file");
        self
    }

    /// Add an arbitrary directory inside the workload directory.
    pub fn with_subdir(self, name: &str) -> Self {
        fs::create_dir_all(self.dir.join(name)).expect("failed to create subdir");
        self
    }

    pub fn build(self) -> WorkloadDir {
        WorkloadDir {
            root: self.root,
            dir: self.dir,
        }
    }
}

impl Default for WorkloadDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built workload tree; deleted when dropped.
pub struct WorkloadDir {
    root: TempDir,
    dir: PathBuf,
}

impl WorkloadDir {
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Name of the workload directory, as given to `--sub-processes-dir`.
    pub fn dir_name(&self) -> String {
        self.dir
            .file_name()
            .and_then(|n| n.to_str())
            .expect("workload dir has a UTF-8 name")
            .to_string()
    }

    /// Config rooted at this tree, logging into `<root>/logs`.
    pub fn config(&self) -> ConfigFileBuilder {
        ConfigFileBuilder::new()
            .root(self.root())
            .sub_processes_dir(&self.dir_name())
            .log_dir(self.root().join("logs"))
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.discovery.root = Some(root.into());
        self
    }

    pub fn sub_processes_dir(mut self, dir: &str) -> Self {
        self.config.discovery.sub_processes_dir = dir.to_string();
        self
    }

    pub fn entry_symbol(mut self, symbol: &str) -> Self {
        self.config.discovery.entry_symbol = symbol.to_string();
        self
    }

    pub fn ignore(mut self, name: &str) -> Self {
        self.config.discovery.ignore.push(name.to_string());
        self
    }

    pub fn liveness_interval(mut self, interval: &str) -> Self {
        self.config.monitor.liveness_interval = interval.to_string();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.logging.dir = dir.into();
        self
    }

    pub fn runtime(mut self, extension: &str, spec: RuntimeSpec) -> Self {
        self.config.runtime.insert(extension.to_string(), spec);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
