//! Faultlog
//!
//! An embedded error log for server applications: failures are classified,
//! scrubbed of credentials and email addresses, written to daily JSON Lines
//! partitions with size-based rotation, and summarized for operators.
//!
//! # Features
//!
//! - **Classifier boundary**: database, system and application failures in,
//!   a [`Verdict`] out
//! - **Redaction**: credential values and emails never reach disk
//! - **Append-only partitions**: one file per day, rotated into `archive/`
//! - **Retention**: explicit cleanup of expired partitions
//! - **Statistics**: counts, hourly histogram, top messages
//!
//! # Modules
//!
//! - `types`: Event schema, verdicts and summaries
//! - `sanitize`: Redaction and truncation of free text
//! - `event_store`: Partition files, rotation, retention
//! - `stats`: Summaries over stored events
//! - `handler`: The `classify_*` API called by the host application
//! - `config`: Construction-time settings
//! - `utils`: Atomic writes, time helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use faultlog::{ErrorHandler, LogConfig, RequestContext, StatsAggregator};
//!
//! let config = LogConfig::from_env().unwrap_or_default();
//! let handler = Arc::new(ErrorHandler::from_config(config));
//!
//! let ctx = RequestContext::new().with_user("alice", "sess-1");
//! let verdict = handler.classify_query_failure("SELECT * FROM orders", "timeout", 2006, false, &ctx);
//! if verdict.should_continue() {
//!     // show verdict.user_message and carry on
//! }
//!
//! let stats = StatsAggregator::new(Arc::clone(handler.store()));
//! let today = chrono::Local::now().date_naive();
//! println!("{} errors today", stats.summarize_date(today).total);
//! ```

pub mod config;
pub mod event_store;
pub mod handler;
pub mod sanitize;
pub mod stats;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{ArchivePolicy, ConfigError, LogConfig};
pub use event_store::{AppendOutcome, ArchiveInfo, LogStore, LogStoreError, StorageStats};
pub use handler::ErrorHandler;
pub use sanitize::sanitize;
pub use stats::{summarize, StatsAggregator};
pub use types::{
    Actor, Category, ErrorSummary, Event, EventKind, MessageCount, Origin, RequestContext,
    ResourceUsage, Severity, Verdict,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
