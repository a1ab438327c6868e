//! Event types for the error log
//!
//! An [`Event`] is one structured failure record. Events are immutable once
//! built and are stored one per line in the day's partition file.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{default_actor_user, is_zero, ANONYMOUS_USER};
use crate::sanitize;

/// Origin domain of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Database connection or query failure
    Database,
    /// Runtime fault raised by the host process
    System,
    /// Fault reported by application code
    Application,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Database => write!(f, "database"),
            EventKind::System => write!(f, "system"),
            EventKind::Application => write!(f, "application"),
        }
    }
}

/// Failure category
///
/// Unrecognized category strings in stored data deserialize to
/// [`Category::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Connection,
    Query,
    FileOperation,
    Permission,
    Validation,
    System,
    Fatal,
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Parse a category name, mapping anything unrecognized to `Unknown`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "connection" => Category::Connection,
            "query" => Category::Query,
            "file_operation" => Category::FileOperation,
            "permission" => Category::Permission,
            "validation" => Category::Validation,
            "system" => Category::System,
            "fatal" => Category::Fatal,
            _ => Category::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Connection => "connection",
            Category::Query => "query",
            Category::FileOperation => "file_operation",
            Category::Permission => "permission",
            Category::Validation => "validation",
            Category::System => "system",
            Category::Fatal => "fatal",
            Category::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the caller's operation could proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The operation could not proceed
    Fatal,
    /// The operation continued after the failure
    Warning,
}

impl Severity {
    pub fn from_fatal(fatal: bool) -> Self {
        if fatal {
            Severity::Fatal
        } else {
            Severity::Warning
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Fatal => write!(f, "fatal"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Who triggered the failing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(default = "default_actor_user")]
    pub user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session: String,
}

impl Actor {
    pub fn new(user: impl Into<String>, session: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            user: if user.trim().is_empty() {
                ANONYMOUS_USER.to_string()
            } else {
                user
            },
            session: session.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user == ANONYMOUS_USER
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            user: ANONYMOUS_USER.to_string(),
            session: String::new(),
        }
    }
}

/// Request the failure happened in; all fields empty outside a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(rename = "remoteAddr", default, skip_serializing_if = "String::is_empty")]
    pub remote_addr: String,
    #[serde(rename = "requestPath", default, skip_serializing_if = "String::is_empty")]
    pub request_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(rename = "userAgent", default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
}

impl Origin {
    pub fn is_empty(&self) -> bool {
        self.remote_addr.is_empty()
            && self.request_path.is_empty()
            && self.method.is_empty()
            && self.user_agent.is_empty()
    }
}

/// Process memory counters, recorded on system events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    #[serde(rename = "memoryBytes")]
    pub memory_bytes: u64,
    #[serde(rename = "peakMemoryBytes")]
    pub peak_memory_bytes: u64,
}

/// One structured failure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Local wall-clock time, second precision
    #[serde(rename = "ts")]
    pub timestamp: NaiveDateTime,

    pub kind: EventKind,

    pub category: Category,

    pub severity: Severity,

    pub message: String,

    /// Origin-specific code, 0 when not applicable
    #[serde(rename = "errorCode", default, skip_serializing_if = "is_zero")]
    pub error_code: i64,

    /// Free-text payload (error text, file path, ...)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,

    /// Structured payload (query preview, host, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,

    #[serde(default)]
    pub actor: Actor,

    #[serde(default, skip_serializing_if = "Origin::is_empty")]
    pub origin: Origin,

    #[serde(rename = "resourceUsage", default, skip_serializing_if = "Option::is_none")]
    pub resource_usage: Option<ResourceUsage>,
}

impl Event {
    /// Create a new event stamped with the current local time
    pub fn new(
        kind: EventKind,
        category: Category,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: crate::utils::now_local(),
            kind,
            category,
            severity,
            message: message.into(),
            error_code: 0,
            detail: String::new(),
            context: BTreeMap::new(),
            actor: Actor::default(),
            origin: Origin::default(),
            resource_usage: None,
        }
    }

    /// Override the timestamp (sub-second precision is dropped)
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);
        self
    }

    pub fn with_error_code(mut self, code: i64) -> Self {
        self.error_code = code;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_resource_usage(mut self, usage: Option<ResourceUsage>) -> Self {
        self.resource_usage = usage;
        self
    }

    /// Run every free-text field through the sanitizer
    ///
    /// The handler calls this before an event reaches the store.
    pub fn sanitized(mut self) -> Self {
        self.message = sanitize::sanitize(&self.message);
        self.detail = sanitize::sanitize(&self.detail);
        self.context = sanitize::sanitize_context(&self.context);
        self.origin.request_path = sanitize::sanitize(&self.origin.request_path);
        self.origin.user_agent = sanitize::sanitize(&self.origin.user_agent);
        self
    }

    /// Calendar date of the partition this event belongs to
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Serialize event to a single JSON line (without the newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
