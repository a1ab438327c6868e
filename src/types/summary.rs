//! Summary types for error statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Category, EventKind};

/// Number of distinct messages kept in [`ErrorSummary::top_messages`]
pub const TOP_MESSAGES: usize = 10;

/// A distinct message and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCount {
    pub message: String,
    pub count: usize,
}

/// Point-in-time statistics over a sequence of events
///
/// Derived on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub total: usize,
    pub fatal: usize,
    pub warning: usize,
    #[serde(rename = "byCategory")]
    pub by_category: BTreeMap<Category, usize>,
    #[serde(rename = "byKind")]
    pub by_kind: BTreeMap<EventKind, usize>,
    /// Keyed by the timestamp truncated to the hour (`YYYY-MM-DD HH:00`).
    ///
    /// The date stays in the key, so a multi-day summary keeps one bucket per
    /// day and hour rather than folding days onto a 24-slot clock.
    #[serde(rename = "byHour")]
    pub by_hour: BTreeMap<String, usize>,
    #[serde(rename = "topMessages")]
    pub top_messages: Vec<MessageCount>,
}

impl ErrorSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Share of fatal events, 0.0 for an empty summary
    pub fn fatal_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.fatal as f64 / self.total as f64
        }
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn kind_count(&self, kind: EventKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}
