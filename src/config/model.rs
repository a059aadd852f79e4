use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::discovery::{DEFAULT_IGNORE, RuntimeSpec};
use crate::supervisor::MonitorOptions;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [discovery]
/// sub_processes_dir = "sub_processes"
/// entry_symbol = "main"
/// ignore = ["__init__.py", "__pycache__", "__init__"]
///
/// [logging]
/// dir = "logs"
/// stdout = true
///
/// [monitor]
/// liveness_interval = "60s"
///
/// [runtime.rb]
/// program = "ruby"
/// args = ["-e", "load ARGV[0]; {symbol}", "{path}"]
/// definition = "(?m)^\\s*def\\s+{symbol}\\b"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub monitor: MonitorSection,

    /// Extra or overriding runtimes keyed by file extension.
    #[serde(default)]
    pub runtime: BTreeMap<String, RuntimeSpec>,
}

/// `[discovery]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySection {
    /// Directory searched for below `root`, or a path to it.
    #[serde(default = "default_sub_processes_dir")]
    pub sub_processes_dir: String,

    /// Entry function invoked in every workload file.
    #[serde(default = "default_entry_symbol")]
    pub entry_symbol: String,

    /// File names / stems that are never workloads.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Search root; the current directory when unset.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_sub_processes_dir() -> String {
    "sub_processes".to_string()
}

fn default_entry_symbol() -> String {
    "main".to_string()
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect()
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            sub_processes_dir: default_sub_processes_dir(),
            entry_symbol: default_entry_symbol(),
            ignore: default_ignore(),
            root: None,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Directory holding the log file; created if missing.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_log_file")]
    pub file_name: String,

    /// Mirror log lines to stdout.
    #[serde(default = "default_true")]
    pub stdout: bool,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_file() -> String {
    "herdsman.log".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_name: default_log_file(),
            stdout: true,
        }
    }
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    /// Duration string such as `"60s"`, `"250ms"`, `"1m"`.
    #[serde(default = "default_liveness_interval")]
    pub liveness_interval: String,
}

fn default_liveness_interval() -> String {
    "60s".to_string()
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            liveness_interval: default_liveness_interval(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so holders can rely on
/// a valid entry symbol, parseable intervals and compilable runtimes.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub discovery: DiscoverySection,
    pub logging: LoggingSection,
    pub monitor: MonitorOptions,
    pub runtime: BTreeMap<String, RuntimeSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        discovery: DiscoverySection,
        logging: LoggingSection,
        monitor: MonitorOptions,
        runtime: BTreeMap<String, RuntimeSpec>,
    ) -> Self {
        Self {
            discovery,
            logging,
            monitor,
            runtime,
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.logging.dir.join(&self.logging.file_name)
    }
}

/// Values given on the command line; `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub sub_processes_dir: Option<String>,
    pub entry_symbol: Option<String>,
    pub logging_dir: Option<PathBuf>,
    pub liveness_interval: Option<String>,
    pub quiet: bool,
}

impl RawConfigFile {
    /// Layer command-line values on top of this config.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(root) = overrides.root {
            self.discovery.root = Some(root);
        }
        if let Some(dir) = overrides.sub_processes_dir {
            self.discovery.sub_processes_dir = dir;
        }
        if let Some(symbol) = overrides.entry_symbol {
            self.discovery.entry_symbol = symbol;
        }
        if let Some(dir) = overrides.logging_dir {
            self.logging.dir = dir;
        }
        if let Some(interval) = overrides.liveness_interval {
            self.monitor.liveness_interval = interval;
        }
        if overrides.quiet {
            self.logging.stdout = false;
        }
        self
    }
}
