//! Utility functions and helpers
//!
//! Atomic file writes, local-time helpers and process counters.

pub mod atomic;
pub mod process;
pub mod time;

pub use atomic::{atomic_write, cleanup_temp_files, link_no_clobber, AtomicError, AtomicResult};
pub use process::sample_resource_usage;
pub use time::{archive_stamp, hour_bucket, now_local};
