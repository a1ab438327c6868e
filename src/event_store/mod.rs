//! Log Store Module
//!
//! This module owns every file under the log directory:
//! - `LogStore`: appends events to day partitions and reads them back
//! - rotation: freezes full partitions into `archive/`
//! - retention: removes partitions (and optionally archives) past their age
//! - `StorageStats`: file counts and sizes
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌──────────────┐    ┌────────────────────┐    ┌──────────────┐
//! │ Handler │───►│ lock + size  │───►│ over threshold?    │───►│ link archive │
//! │ append  │    │ check        │    │ no: O_APPEND line  │    │ replace live │
//! └─────────┘    └──────────────┘    └────────────────────┘    └──────────────┘
//!
//! Read Path:
//! ┌──────────────────────┐    ┌─────────────────────┐
//! │ errors-YYYY-MM-DD    │───►│ skip malformed lines│───► Vec<Event>
//! │ .jsonl (or nothing)  │    │ filter severity     │
//! └──────────────────────┘    └─────────────────────┘
//! ```

mod retention;
mod rotation;
mod stats;
mod store;

pub use rotation::ArchiveInfo;
pub use stats::StorageStats;
pub use store::{AppendOutcome, LogStore, LogStoreError, LogStoreResult};
