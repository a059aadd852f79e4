// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::WorkloadStatus;

#[derive(Error, Debug)]
pub enum HerdsmanError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Cannot resolve entry point in {path:?}: {reason}")]
    EntryResolution { path: PathBuf, reason: String },

    #[error("No workloads discovered")]
    NoWorkloads,

    #[error("Unknown workload: {0}")]
    UnknownWorkload(String),

    #[error("Duplicate workload name: {0}")]
    DuplicateWorkload(String),

    #[error("Failed to spawn workload '{workload}': {reason}")]
    Spawn { workload: String, reason: String },

    #[error("Invalid transition for workload '{workload}': cannot {operation} while {from}")]
    InvalidTransition {
        workload: String,
        from: WorkloadStatus,
        operation: &'static str,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HerdsmanError>;
