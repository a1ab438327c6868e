//! Atomic file operations
//!
//! This module provides utilities for atomic file writes so a partition is
//! never observed half-written, even after a crash.
//!
//! # Pattern
//!
//! 1. Write to a temporary file next to the target (`<name>.<pid>.tmp`)
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! Archives are frozen with a hard link, which fails instead of replacing an
//! existing file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use thiserror::Error;

/// Result type for atomic operations
pub type AtomicResult<T> = Result<T, AtomicError>;

/// Errors that can occur during atomic operations
#[derive(Debug, Error)]
pub enum AtomicError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),
}

const TEMP_SUFFIX: &str = ".tmp";

/// Temp path for `path`, unique per process
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.{}{}", name, std::process::id(), TEMP_SUFFIX))
}

/// Atomically replace `path` with `content`
///
/// # Example
///
/// ```ignore
/// atomic_write("logs/errors-2026-03-14.jsonl", b"{...}\n")?;
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> AtomicResult<()> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let write_result = (|| -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if write_result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    write_result?;

    Ok(())
}

/// Give `from` a second name `to`, failing if `to` already exists
///
/// Both names refer to the same contents afterwards; renaming or replacing
/// `from` later leaves `to` untouched.
pub fn link_no_clobber<P1, P2>(from: P1, to: P2) -> AtomicResult<()>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let to = to.as_ref();
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::hard_link(from.as_ref(), to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(AtomicError::DestinationExists(to.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Clean up temp files left behind by interrupted writes
///
/// Only files older than `min_age` are removed so writes in flight in other
/// processes are left alone.
pub fn cleanup_temp_files<P: AsRef<Path>>(dir: P, min_age: Duration) -> AtomicResult<usize> {
    let dir = dir.as_ref();
    let mut cleaned = 0;

    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = SystemTime::now()
        .checked_sub(min_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_temp = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(TEMP_SUFFIX))
            .unwrap_or(false);
        if !is_temp {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        if matches!(modified, Ok(m) if m <= cutoff) {
            fs::remove_file(&path)?;
            cleaned += 1;
        }
    }

    Ok(cleaned)
}
