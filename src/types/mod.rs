//! Data types for the error log
//!
//! This module contains the record schema and the values handed back to
//! callers of the handler and the statistics aggregator.

mod context;
mod event;
mod summary;
mod verdict;

pub use context::RequestContext;
pub use event::{Actor, Category, Event, EventKind, Origin, ResourceUsage, Severity};
pub use summary::{ErrorSummary, MessageCount, TOP_MESSAGES};
pub use verdict::Verdict;

/// Actor recorded when the caller has no authenticated user
pub const ANONYMOUS_USER: &str = "anonymous";

/// Default user for serde deserialization
pub fn default_actor_user() -> String {
    ANONYMOUS_USER.to_string()
}

/// Check if value is zero (for skip_serializing_if)
pub fn is_zero(val: &i64) -> bool {
    *val == 0
}
