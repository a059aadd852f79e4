use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, Overrides, RawConfigFile};
use crate::errors::Result;

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "Herdsman.toml";

/// Read and deserialize a config file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a config file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the effective configuration for a run.
///
/// - An explicitly given `path` must exist.
/// - Otherwise [`DEFAULT_CONFIG_FILE`] is read if present, and built-in
///   defaults are used if not.
///
/// Command-line `overrides` are applied before validation, so they are
/// checked exactly like file values.
pub fn load_effective(path: Option<&Path>, overrides: Overrides) -> Result<ConfigFile> {
    let raw = match path {
        Some(path) => load_from_path(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using config file from working directory");
                load_from_path(&default_path)?
            } else {
                RawConfigFile::default()
            }
        }
    };

    ConfigFile::try_from(raw.apply(overrides))
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
