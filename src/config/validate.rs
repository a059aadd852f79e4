use regex::Regex;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HerdsmanError, Result};
use crate::supervisor::{MAX_LIVENESS_INTERVAL, MonitorOptions};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HerdsmanError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let monitor = MonitorOptions {
            liveness_interval: liveness_interval(&raw)?,
        };
        Ok(ConfigFile::new_unchecked(
            raw.discovery,
            raw.logging,
            monitor,
            raw.runtime,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_discovery(cfg)?;
    validate_logging(cfg)?;
    liveness_interval(cfg)?;
    validate_runtimes(cfg)?;
    Ok(())
}

fn validate_discovery(cfg: &RawConfigFile) -> Result<()> {
    if cfg.discovery.sub_processes_dir.trim().is_empty() {
        return Err(HerdsmanError::ConfigError(
            "[discovery].sub_processes_dir must not be empty".to_string(),
        ));
    }

    // The symbol ends up inside runtime argument templates, so it has to be a
    // plain identifier.
    let ident = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(anyhow::Error::from)?;
    if !ident.is_match(&cfg.discovery.entry_symbol) {
        return Err(HerdsmanError::ConfigError(format!(
            "[discovery].entry_symbol must be an identifier (got '{}')",
            cfg.discovery.entry_symbol
        )));
    }
    Ok(())
}

fn validate_logging(cfg: &RawConfigFile) -> Result<()> {
    if cfg.logging.file_name.trim().is_empty() {
        return Err(HerdsmanError::ConfigError(
            "[logging].file_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn liveness_interval(cfg: &RawConfigFile) -> Result<std::time::Duration> {
    let raw = &cfg.monitor.liveness_interval;
    let interval = parse_duration(raw).map_err(|e| {
        HerdsmanError::ConfigError(format!("[monitor].liveness_interval: {e}"))
    })?;
    if interval.is_zero() {
        return Err(HerdsmanError::ConfigError(
            "[monitor].liveness_interval must be greater than zero".to_string(),
        ));
    }
    if interval > MAX_LIVENESS_INTERVAL {
        return Err(HerdsmanError::ConfigError(format!(
            "[monitor].liveness_interval must be at most {}h (got '{}')",
            MAX_LIVENESS_INTERVAL.as_secs() / 3600,
            raw
        )));
    }
    Ok(interval)
}

fn validate_runtimes(cfg: &RawConfigFile) -> Result<()> {
    for (ext, spec) in cfg.runtime.iter() {
        if ext.is_empty() || ext.contains('.') {
            return Err(HerdsmanError::ConfigError(format!(
                "runtime key '{}' must be a bare file extension",
                ext
            )));
        }
        if spec.program.trim().is_empty() {
            return Err(HerdsmanError::ConfigError(format!(
                "[runtime.{}].program must not be empty",
                ext
            )));
        }
        if let Err(e) = spec.definition_regex(&cfg.discovery.entry_symbol) {
            return Err(HerdsmanError::ConfigError(format!(
                "[runtime.{}].definition is not a valid pattern: {}",
                ext, e
            )));
        }
    }
    Ok(())
}
