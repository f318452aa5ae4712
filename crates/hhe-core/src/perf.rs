//! Performance measurement write path
//!
//! Each role opens one time log and one memory log under a stamped filename
//! that embeds the run parameters. Every event writes `timestamp : message`
//! to the time log; the memory log gets the same line plus five per-process
//! memory snapshots under the same timestamp, read from the OS.
//!
//! Logging is best effort: a failed measurement write is reported through
//! `tracing` and never aborts the run being measured.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::error::CoreResult;
use crate::params::{file_stamp, Parameters};

/// `(memory log label, /proc/self/status key)` pairs sampled per event.
const MEMORY_METRICS: [(&str, &str); 5] = [
    ("SWAP", "VmSwap:"),
    ("RAM Peak", "VmHWM:"),
    ("RAM", "VmRSS:"),
    ("Virtual Memory Peak", "VmPeak:"),
    ("Virtual Memory", "VmSize:"),
];

pub struct PerfLogger {
    files: Mutex<LogFiles>,
}

struct LogFiles {
    time: File,
    memory: File,
}

impl PerfLogger {
    /// Opens the two measurement files for `role` (e.g. `client_HHE`).
    pub fn create(params: &Parameters, role: &str) -> CoreResult<Self> {
        let filename = format!("{}{role}.txt", params.file_prefix(&file_stamp()));

        let time_path = params.time_log_dir().join(&filename);
        let memory_path = params.memory_log_dir().join(&filename);

        let time = open_log(&time_path)?;
        let memory = open_log(&memory_path)?;
        tracing::info!(
            time_log = %time_path.display(),
            memory_log = %memory_path.display(),
            "performance measurement files opened"
        );

        Ok(Self {
            files: Mutex::new(LogFiles { time, memory }),
        })
    }

    /// Records one timestamped event in both logs.
    pub fn log(&self, message: &str) {
        if let Err(e) = self.write_event(message) {
            tracing::warn!(error = %e, "performance measurement write failed");
        }
    }

    fn write_event(&self, message: &str) -> std::io::Result<()> {
        let timestamp = chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S%.6f")
            .to_string();
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);

        writeln!(files.time, "{timestamp} : {message}")?;
        files.time.flush()?;

        writeln!(files.memory, "{timestamp} : {message}")?;
        for (label, key) in MEMORY_METRICS {
            writeln!(files.memory, "{timestamp} {label}: {}", memory_snapshot(key))?;
        }
        files.memory.flush()?;
        Ok(())
    }
}

fn open_log(path: &Path) -> CoreResult<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Reads one `Vm*` metric from the per-process status exposure.
#[cfg(target_os = "linux")]
fn memory_snapshot(key: &str) -> String {
    let Ok(status) = fs::read_to_string("/proc/self/status") else {
        return "0 kB".to_string();
    };
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix(key) {
            return format!("{} kB", rest.trim().trim_end_matches(" kB").trim());
        }
    }
    "0 kB".to_string()
}

/// Platforms without a per-process status exposure report zeros.
#[cfg(not(target_os = "linux"))]
fn memory_snapshot(_key: &str) -> String {
    "0 kB".to_string()
}
