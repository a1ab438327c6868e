//! Partition rotation and archive listing
//!
//! Provides functionality for:
//! - Freezing a full partition under `archive/` with a unique name
//! - Listing archives with their size and record count

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDate;
use tracing::warn;

use crate::config::{partition_file_name, LogConfig, PARTITION_EXTENSION, PARTITION_PREFIX};
use crate::utils::{archive_stamp, link_no_clobber, now_local, AtomicError};

use super::store::{count_lines, LogStore, LogStoreError, LogStoreResult};

/// Suffixes tried when several rotations share the same second
const MAX_ARCHIVE_ATTEMPTS: usize = 100;

/// Information about an archive file
#[derive(Debug, Clone)]
pub struct ArchiveInfo {
    /// Path to the archive file
    pub path: PathBuf,
    /// Partition date the archive was taken from
    pub date: Option<NaiveDate>,
    /// Size in bytes
    pub size: u64,
    /// Number of events in the archive
    pub event_count: usize,
    /// Last write to the partition before it was frozen
    pub modified: Option<SystemTime>,
}

/// Freeze the live partition under a name that has never been used
///
/// The archive is a hard link, so the live path can be replaced afterwards
/// without touching it. Returns the archive path.
pub(crate) fn archive_partition(
    config: &LogConfig,
    date: NaiveDate,
    live: &Path,
) -> LogStoreResult<PathBuf> {
    let dir = config.archive_dir();
    let base = partition_file_name(date);
    let base = base
        .strip_suffix(PARTITION_EXTENSION)
        .unwrap_or(&base)
        .trim_end_matches('.');
    let stamp = archive_stamp(&now_local());

    for attempt in 0..MAX_ARCHIVE_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{base}.{stamp}.{PARTITION_EXTENSION}")
        } else {
            format!("{base}.{stamp}.{attempt}.{PARTITION_EXTENSION}")
        };
        let candidate = dir.join(name);

        match link_no_clobber(live, &candidate) {
            Ok(()) => return Ok(candidate),
            Err(AtomicError::DestinationExists(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(LogStoreError::ArchiveNameExhausted(dir))
}

/// Recover the partition date from an archive file name
fn parse_archive_date(name: &str) -> Option<NaiveDate> {
    let rest = name.strip_prefix(PARTITION_PREFIX)?;
    if !name.ends_with(PARTITION_EXTENSION) {
        return None;
    }
    NaiveDate::parse_from_str(rest.get(..10)?, "%Y-%m-%d").ok()
}

impl LogStore {
    /// List all archive files, oldest name first
    ///
    /// Entries that can't be read are logged and left out.
    pub fn list_archives(&self) -> LogStoreResult<Vec<ArchiveInfo>> {
        let archive_dir = self.config().archive_dir();

        let entries = match fs::read_dir(&archive_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut archives = Vec::new();

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            let Some(date) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_archive_date)
            else {
                continue;
            };

            let (metadata, event_count) = match entry
                .metadata()
                .map_err(LogStoreError::from)
                .and_then(|m| Ok((m, count_lines(&path)?)))
            {
                Ok(found) => found,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable archive");
                    continue;
                }
            };
            archives.push(ArchiveInfo {
                event_count,
                path,
                date: Some(date),
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }

        // Names embed date then rotation stamp
        archives.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        Ok(archives)
    }

    /// Get total size of all archives in bytes
    pub fn total_archive_size(&self) -> LogStoreResult<u64> {
        let archives = self.list_archives()?;
        Ok(archives.iter().map(|a| a.size).sum())
    }
}
