//! Log Store - day-partitioned, append-only event files
//!
//! Each calendar date has one JSON Lines partition. Appends never rewrite a
//! partition: a record is a single `write` to a file opened in append mode.
//! When an append would push a partition past the rotation threshold, the
//! current contents are frozen into `archive/` and the live partition is
//! atomically replaced by one holding only the new record.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{parse_partition_file_name, LogConfig};
use crate::types::{Event, Severity};
use crate::utils::{atomic_write, cleanup_temp_files, AtomicError};

use super::rotation;

/// Temp files younger than this may belong to a write in progress
const STALE_TEMP_AGE: Duration = Duration::from_secs(60);

/// Result type for LogStore operations
pub type LogStoreResult<T> = Result<T, LogStoreError>;

/// Errors that can occur in LogStore operations
#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Atomic write failed: {0}")]
    Atomic(#[from] AtomicError),
    #[error("No free archive name for {0}")]
    ArchiveNameExhausted(PathBuf),
}

/// What an append did to the partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was added to the end of the partition
    Appended,
    /// The previous contents were archived and the partition restarted
    Rotated { archive: PathBuf },
}

/// The LogStore owns all partition and archive files under the log directory
pub struct LogStore {
    config: LogConfig,
    /// Serializes size check, rotation and append within this process
    write_lock: Mutex<()>,
}

impl LogStore {
    /// Create a store without touching the filesystem
    ///
    /// Directories are created on first append.
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Create the log directory and clear temp files left by a crash
    pub fn open(config: LogConfig) -> LogStoreResult<Self> {
        fs::create_dir_all(config.log_dir())?;

        let cleaned = cleanup_temp_files(config.log_dir(), STALE_TEMP_AGE)?;
        if cleaned > 0 {
            info!(count = cleaned, dir = %config.log_dir().display(), "Removed stale temp files");
        }

        Ok(Self::new(config))
    }

    /// Get the configuration
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Append an event to its date's partition
    ///
    /// The record is synced to disk before this returns. Errors are returned
    /// as values; nothing here panics on I/O failure.
    pub fn append(&self, event: &Event) -> LogStoreResult<AppendOutcome> {
        let date = event.date();
        let path = self.config.partition_path(date);

        let mut line = event.to_json_line()?;
        line.push('\n');

        let _guard = self.write_lock.lock();

        fs::create_dir_all(self.config.log_dir())?;

        let current_size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        if current_size > 0 && current_size + line.len() as u64 > self.config.rotation_bytes {
            let archive = rotation::archive_partition(&self.config, date, &path)?;
            if let Err(e) = atomic_write(&path, line.as_bytes()) {
                // The archive still shares the live inode; drop it so later
                // appends can't reach it
                if let Err(unlink) = fs::remove_file(&archive) {
                    warn!(
                        archive = %archive.display(),
                        error = %unlink,
                        "Failed to discard archive after aborted rotation"
                    );
                }
                return Err(e.into());
            }

            info!(
                partition = %path.display(),
                archive = %archive.display(),
                archived_bytes = current_size,
                "Rotated partition"
            );
            return Ok(AppendOutcome::Rotated { archive });
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // A crash mid-write can leave an unterminated line; start on a fresh one
        if current_size > 0 && !ends_with_newline(&path, current_size)? {
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        debug!(partition = %path.display(), kind = %event.kind, category = %event.category, "Appended event");
        Ok(AppendOutcome::Appended)
    }

    /// Read all events for `date` in append order
    ///
    /// A missing partition yields an empty list. Malformed lines are skipped
    /// and I/O failures degrade to an empty list; both are reported through
    /// `tracing` only.
    pub fn read(&self, date: NaiveDate, severity: Option<Severity>) -> Vec<Event> {
        let path = self.config.partition_path(date);
        match load_partition(&path) {
            Ok(events) => filter_severity(events, severity),
            Err(e) => {
                warn!(partition = %path.display(), error = %e, "Failed to read partition");
                Vec::new()
            }
        }
    }

    /// Read every partition from `from` to `to` inclusive, oldest first
    pub fn read_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        severity: Option<Severity>,
    ) -> Vec<Event> {
        if from > to {
            warn!(%from, %to, "Empty date range");
            return Vec::new();
        }

        from.iter_days()
            .take_while(|date| *date <= to)
            .flat_map(|date| self.read(date, severity))
            .collect()
    }

    /// Fatal events for `date`
    pub fn fatal_errors(&self, date: NaiveDate) -> Vec<Event> {
        self.read(date, Some(Severity::Fatal))
    }

    /// The `limit` most recent events for `date`, newest first
    pub fn latest(&self, date: NaiveDate, limit: usize) -> Vec<Event> {
        let mut events = self.read(date, None);
        events.reverse();
        events.truncate(limit);
        events
    }

    /// Dates that currently have a partition, oldest first
    pub fn list_dates(&self) -> Vec<NaiveDate> {
        let entries = match fs::read_dir(self.config.log_dir()) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(dir = %self.config.log_dir().display(), error = %e, "Failed to list partitions");
                }
                return Vec::new();
            }
        };

        let mut dates: Vec<NaiveDate> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                parse_partition_file_name(name.to_str()?)
            })
            .collect();
        dates.sort();
        dates
    }

    /// Hold the writer lock while `f` runs
    pub(crate) fn with_write_lock<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.write_lock.lock();
        f()
    }
}

fn filter_severity(events: Vec<Event>, severity: Option<Severity>) -> Vec<Event> {
    match severity {
        Some(wanted) => events.into_iter().filter(|e| e.severity == wanted).collect(),
        None => events,
    }
}

/// Parse a partition or archive file, skipping lines that don't parse
pub(crate) fn load_partition(path: &Path) -> LogStoreResult<Vec<Event>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let terminated = bytes.last() == Some(&b'\n');
    let lines: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
    let last_index = lines.len().saturating_sub(1);
    let mut events = Vec::new();

    for (line_num, raw) in lines.into_iter().enumerate() {
        let line = String::from_utf8_lossy(raw);
        if line.trim().is_empty() {
            continue;
        }

        match Event::from_json_line(&line) {
            Ok(event) => events.push(event),
            // Unterminated tail: a write still in flight, or cut by a crash
            Err(e) if line_num == last_index && !terminated => {
                debug!(path = %path.display(), error = %e, "Skipping incomplete last line");
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = line_num + 1,
                    error = %e,
                    "Skipping malformed event"
                );
            }
        }
    }

    Ok(events)
}

/// Count records in a file without fully decoding them
pub(crate) fn count_lines(path: &Path) -> LogStoreResult<usize> {
    let bytes = fs::read(path)?;
    Ok(bytes
        .split(|b| *b == b'\n')
        .filter(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .count())
}

fn ends_with_newline(path: &Path, size: u64) -> io::Result<bool> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(size - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
