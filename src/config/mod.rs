// src/config/mod.rs

//! Configuration loading and validation for herdsman.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer CLI values on top (`loader.rs`).
//! - Validate identifiers, durations and runtimes (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_effective, load_from_path};
pub use model::{
    ConfigFile, DiscoverySection, LoggingSection, MonitorSection, Overrides, RawConfigFile,
};
