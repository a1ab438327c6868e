//! Storage statistics for the log directory
//!
//! Provides statistics about the files on disk:
//! - Partition and archive counts
//! - Storage size information
//! - Date span covered by live partitions

use std::fs;

use chrono::NaiveDate;
use tracing::warn;

use super::store::{count_lines, LogStore, LogStoreResult};

/// Statistics about the files owned by a LogStore
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Number of live partitions
    pub partition_count: usize,
    /// Total size of live partitions in bytes
    pub partition_size: u64,
    /// Total number of events in live partitions
    pub partition_event_count: usize,
    /// Number of archive files
    pub archive_count: usize,
    /// Total size of archives in bytes
    pub archive_size: u64,
    /// Total number of events in archives
    pub archived_event_count: usize,
    /// Oldest date with a live partition
    pub oldest_date: Option<NaiveDate>,
    /// Newest date with a live partition
    pub newest_date: Option<NaiveDate>,
}

impl StorageStats {
    /// Calculate total events
    pub fn total_events(&self) -> usize {
        self.partition_event_count + self.archived_event_count
    }

    /// Calculate total storage size
    pub fn total_size(&self) -> u64 {
        self.partition_size + self.archive_size
    }

    /// Format size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.2} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }
}

impl LogStore {
    /// Collect storage statistics for partitions and archives
    pub fn storage_stats(&self) -> LogStoreResult<StorageStats> {
        let mut stats = StorageStats::default();

        let dates = self.list_dates();
        stats.oldest_date = dates.first().copied();
        stats.newest_date = dates.last().copied();

        for date in &dates {
            let path = self.config().partition_path(*date);
            // A partition can disappear under cleanup between listing and stat
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            let event_count = match count_lines(&path) {
                Ok(count) => count,
                Err(e) => {
                    warn!(partition = %path.display(), error = %e, "Skipping unreadable partition");
                    continue;
                }
            };
            stats.partition_count += 1;
            stats.partition_size += metadata.len();
            stats.partition_event_count += event_count;
        }

        let archives = self.list_archives()?;
        stats.archive_count = archives.len();
        stats.archive_size = archives.iter().map(|a| a.size).sum();
        stats.archived_event_count = archives.iter().map(|a| a.event_count).sum();

        Ok(stats)
    }
}
