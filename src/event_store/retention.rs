//! Partition retention management
//!
//! Handles cleanup of partitions (and, by policy, archives) based on age.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use crate::config::{parse_partition_file_name, ArchivePolicy};

use super::store::LogStore;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

impl LogStore {
    /// Delete partitions last modified more than `retention_days` ago
    ///
    /// Archives are only touched when the configured [`ArchivePolicy`] is
    /// `PruneExpired`. Returns the number of files deleted; failures are
    /// logged and skipped.
    pub fn cleanup(&self, retention_days: u64) -> usize {
        let retention = Duration::from_secs(retention_days.saturating_mul(SECS_PER_DAY));
        let cutoff = SystemTime::now()
            .checked_sub(retention)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        self.with_write_lock(|| {
            let mut deleted = remove_expired(self.config().log_dir(), cutoff, |name| {
                parse_partition_file_name(name).is_some()
            });

            if self.config().archive_policy == ArchivePolicy::PruneExpired {
                deleted += remove_expired(&self.config().archive_dir(), cutoff, |name| {
                    name.ends_with(crate::config::PARTITION_EXTENSION)
                });
            }

            if deleted > 0 {
                info!(deleted, retention_days, "Removed expired error logs");
            }
            deleted
        })
    }

    /// Run [`cleanup`](Self::cleanup) with the configured retention period
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup(self.config().retention_days)
    }
}

fn remove_expired(dir: &Path, cutoff: SystemTime, is_candidate: impl Fn(&str) -> bool) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %dir.display(), error = %e, "Failed to scan for expired logs");
            }
            return 0;
        }
    };

    let mut deleted_count = 0;

    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();

        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if is_candidate(name) => {}
            _ => continue,
        }

        let expired = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(|modified| modified < cutoff)
            .unwrap_or(false);
        if !expired {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => deleted_count += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove expired log"),
        }
    }

    deleted_count
}
