// src/report.rs

//! Structured status records for handles.
//!
//! A [`StatusRecord`] is a pure snapshot of one [`Handle`]; it can be taken
//! while the workload is still running. Records serialize to JSON of the
//! shape:
//!
//! ```json
//! {
//!   "name": "backup",
//!   "status": "Completed",
//!   "start_time": { "timestamp": 1760601600.25, "human_readable": "2025-10-16 10:00:00" },
//!   "end_time": { "timestamp": 1760601601.5, "human_readable": "2025-10-16 10:00:01" },
//!   "run_duration": { "total_seconds": 1.25, "human_readable": "0:00:01.250000" },
//!   "failure": null
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::errors::Result;
use crate::handle::Handle;
use crate::types::WorkloadStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestampRecord {
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
    pub human_readable: String,
}

impl From<DateTime<Local>> for TimestampRecord {
    fn from(time: DateTime<Local>) -> Self {
        Self {
            timestamp: time.timestamp_micros() as f64 / 1_000_000.0,
            human_readable: time.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationRecord {
    pub total_seconds: f64,
    pub human_readable: String,
}

impl From<Duration> for DurationRecord {
    fn from(duration: Duration) -> Self {
        Self {
            total_seconds: duration.as_secs_f64(),
            human_readable: human_duration(duration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    pub name: String,
    pub status: WorkloadStatus,
    pub start_time: Option<TimestampRecord>,
    pub end_time: Option<TimestampRecord>,
    pub run_duration: DurationRecord,
    pub failure: Option<String>,
}

impl From<&Handle> for StatusRecord {
    fn from(handle: &Handle) -> Self {
        Self {
            name: handle.name().to_string(),
            status: handle.status(),
            start_time: handle.start_time().map(TimestampRecord::from),
            end_time: handle.end_time().map(TimestampRecord::from),
            run_duration: handle.run_duration().into(),
            failure: handle.failure().map(str::to_string),
        }
    }
}

/// Snapshot every handle, in registry order.
pub fn records<'a>(handles: impl IntoIterator<Item = &'a Handle>) -> Vec<StatusRecord> {
    handles.into_iter().map(StatusRecord::from).collect()
}

/// Pretty-printed JSON array of records.
pub fn to_json(records: &[StatusRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write the JSON export to `path`, creating parent directories.
pub fn write_status_file(path: &Path, records: &[StatusRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating dir {:?}", parent))?;
        }
    }
    let json = to_json(records)?;
    std::fs::write(path, json).with_context(|| format!("writing status file {:?}", path))?;
    Ok(())
}

/// Format a duration as `H:MM:SS[.ffffff]`, prefixed with days when needed.
pub fn human_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let micros = duration.subsec_micros();

    let mut out = String::new();
    if days == 1 {
        out.push_str("1 day, ");
    } else if days > 1 {
        out.push_str(&format!("{days} days, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn human_duration_matches_clock_format() {
        assert_eq!(human_duration(Duration::ZERO), "0:00:00");
        assert_eq!(human_duration(Duration::from_millis(1_250)), "0:00:01.250000");
        assert_eq!(human_duration(Duration::from_secs(3_725)), "1:02:05");
        assert_eq!(human_duration(Duration::from_secs(86_400 + 61)), "1 day, 0:01:01");
        assert_eq!(
            human_duration(Duration::from_secs(3 * 86_400)),
            "3 days, 0:00:00"
        );
    }

    #[test]
    fn timestamps_keep_subsecond_precision() {
        let time = Local.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
        let record = TimestampRecord::from(time);
        assert_eq!(record.timestamp, 1_700_000_000.5);
        assert_eq!(record.human_readable, time.format("%Y-%m-%d %H:%M:%S").to_string());
    }

    #[test]
    fn duration_record_serializes_both_forms() {
        let value = serde_json::to_value(DurationRecord::from(Duration::from_secs(90))).unwrap();
        assert_eq!(value["total_seconds"], 90.0);
        assert_eq!(value["human_readable"], "0:01:30");
    }
}
