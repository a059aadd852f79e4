// src/discovery/loader.rs

//! The single boundary that turns a workload file into a typed
//! [`EntryPoint`].
//!
//! Files are matched to a [`RuntimeSpec`] by extension. A runtime describes
//! the program to run, an argument template and (optionally) a regex template
//! that must match the file for the entry symbol to count as defined. Both
//! templates understand `{path}` and `{symbol}`.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::fs::FileSystem;
use crate::workload::EntryPoint;

/// Why a file could not be bound to an entry point.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadFailure {
    #[error("file has no extension")]
    NoExtension,

    #[error("no runtime configured for '.{0}' files")]
    UnsupportedExtension(String),

    #[error("cannot read source: {0}")]
    Unreadable(String),

    #[error("entry symbol '{symbol}' is not defined")]
    SymbolNotDefined { symbol: String },

    #[error("runtime '{runtime}' has an invalid definition pattern: {reason}")]
    InvalidDefinition { runtime: String, reason: String },
}

/// How to run files of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeSpec {
    /// Program to execute, looked up on `PATH`.
    pub program: String,

    /// Argument template.
    #[serde(default)]
    pub args: Vec<String>,

    /// Regex template proving the entry symbol exists in the source.
    ///
    /// `{symbol}` is substituted regex-escaped. `None` skips the check.
    #[serde(default)]
    pub definition: Option<String>,
}

impl RuntimeSpec {
    /// POSIX shell: source the file, then call the entry function.
    pub fn shell() -> Self {
        Self {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                ". \"$0\" && {symbol}".to_string(),
                "{path}".to_string(),
            ],
            definition: Some(r"(?m)^\s*(function\s+)?{symbol}\s*\(\s*\)".to_string()),
        }
    }

    /// Python: execute the file as a module and call the entry function.
    ///
    /// An exception escaping the entry function exits non-zero.
    pub fn python() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec![
                "-c".to_string(),
                "import runpy, sys; sys.exit(runpy.run_path(sys.argv[1])[\"{symbol}\"]())"
                    .to_string(),
                "{path}".to_string(),
            ],
            definition: Some(r"(?m)^def\s+{symbol}\s*\(".to_string()),
        }
    }

    /// Compile the definition pattern for `symbol`, if there is one.
    pub fn definition_regex(&self, symbol: &str) -> Result<Option<Regex>, regex::Error> {
        self.definition
            .as_ref()
            .map(|template| Regex::new(&template.replace("{symbol}", &regex::escape(symbol))))
            .transpose()
    }
}

/// Resolves workload files to entry points.
pub trait EntryLoader: Send + Sync {
    fn resolve(
        &self,
        fs: &dyn FileSystem,
        path: &Path,
        symbol: &str,
    ) -> Result<EntryPoint, LoadFailure>;
}

/// Extension-keyed loader used in production.
#[derive(Debug, Clone)]
pub struct ScriptLoader {
    runtimes: BTreeMap<String, RuntimeSpec>,
}

impl Default for ScriptLoader {
    fn default() -> Self {
        let mut runtimes = BTreeMap::new();
        runtimes.insert("sh".to_string(), RuntimeSpec::shell());
        runtimes.insert("py".to_string(), RuntimeSpec::python());
        Self { runtimes }
    }
}

impl ScriptLoader {
    /// Built-in runtimes, overridden or extended by `extra`.
    pub fn with_runtimes(extra: &BTreeMap<String, RuntimeSpec>) -> Self {
        let mut loader = Self::default();
        for (ext, spec) in extra {
            loader.runtimes.insert(ext.clone(), spec.clone());
        }
        loader
    }

    pub fn runtime(&self, extension: &str) -> Option<&RuntimeSpec> {
        self.runtimes.get(extension)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.runtimes.keys().map(String::as_str)
    }
}

impl EntryLoader for ScriptLoader {
    fn resolve(
        &self,
        fs: &dyn FileSystem,
        path: &Path,
        symbol: &str,
    ) -> Result<EntryPoint, LoadFailure> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(LoadFailure::NoExtension)?;
        let spec = self
            .runtimes
            .get(ext)
            .ok_or_else(|| LoadFailure::UnsupportedExtension(ext.to_string()))?;

        let definition = spec
            .definition_regex(symbol)
            .map_err(|e| LoadFailure::InvalidDefinition {
                runtime: ext.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(re) = definition {
            let source = fs
                .read_to_string(path)
                .map_err(|e| LoadFailure::Unreadable(format!("{e:#}")))?;
            if !re.is_match(&source) {
                return Err(LoadFailure::SymbolNotDefined {
                    symbol: symbol.to_string(),
                });
            }
        }

        let path_str = path.to_string_lossy();
        let args = spec
            .args
            .iter()
            .map(|a| a.replace("{path}", &path_str).replace("{symbol}", symbol))
            .collect();

        Ok(EntryPoint {
            path: path.to_path_buf(),
            symbol: symbol.to_string(),
            runtime: ext.to_string(),
            program: spec.program.clone(),
            args,
        })
    }
}
