//! Error Classifier/Handler
//!
//! The boundary the rest of the application calls. Each `classify_*` method
//! takes the raw failure context, builds a sanitized [`Event`], hands it to
//! the [`LogStore`] and returns a [`Verdict`]. Storage faults are logged and
//! swallowed: a verdict is always produced.
//!
//! Construct one `ErrorHandler` at startup and share it (`Arc<ErrorHandler>`)
//! with every component that reports failures.

pub mod codes;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::LogConfig;
use crate::event_store::{AppendOutcome, LogStore};
use crate::sanitize::{sanitize, truncate};
use crate::types::{Category, Event, EventKind, RequestContext, Severity, Verdict};
use crate::utils::sample_resource_usage;

/// Characters of a failed query kept in the stored record
pub const QUERY_PREVIEW_CHARS: usize = 200;

pub const CONNECTION_USER_MESSAGE: &str = "Connection failed. Please try again later.";
pub const FATAL_USER_MESSAGE: &str = "The request could not be completed. Please try again later.";
pub const DATA_USER_MESSAGE: &str = "Some data could not be loaded.";
pub const INTERNAL_USER_MESSAGE: &str = "An internal error occurred.";

/// Classifies failures, records them and tells the caller how to proceed
pub struct ErrorHandler {
    store: Arc<LogStore>,
    debug_mode: AtomicBool,
}

impl ErrorHandler {
    /// Create a handler over an existing store; debug mode comes from its config
    pub fn new(store: Arc<LogStore>) -> Self {
        let debug_mode = AtomicBool::new(store.config().debug_mode);
        Self { store, debug_mode }
    }

    /// Open a store for `config` and wrap it
    ///
    /// If the log directory cannot be prepared the handler still works;
    /// appends will report their own failures.
    pub fn from_config(config: LogConfig) -> Self {
        let store = match LogStore::open(config.clone()) {
            Ok(store) => store,
            Err(e) => {
                warn!(dir = %config.log_dir().display(), error = %e, "Error log directory unavailable");
                LogStore::new(config)
            }
        };
        Self::new(Arc::new(store))
    }

    pub fn store(&self) -> &Arc<LogStore> {
        &self.store
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode.load(Ordering::Relaxed)
    }

    /// Toggle whether verdicts carry technical detail
    pub fn set_debug_mode(&self, enabled: bool) {
        self.debug_mode.store(enabled, Ordering::Relaxed);
    }

    /// A database connection could not be established; always fatal
    pub fn classify_connection_failure(
        &self,
        host: &str,
        user: &str,
        detail: &str,
        ctx: &RequestContext,
    ) -> Verdict {
        let event = Event::new(
            EventKind::Database,
            Category::Connection,
            Severity::Fatal,
            "Database connection failed",
        )
        .with_detail(detail)
        .with_context("host", host)
        .with_context("db_user", user);

        let (event, recorded) = self.record(event, ctx);
        self.verdict(true, CONNECTION_USER_MESSAGE, &event.detail, recorded)
    }

    /// A query failed; fatal only if the caller says it cannot continue
    pub fn classify_query_failure(
        &self,
        query: &str,
        detail: &str,
        code: i64,
        explicitly_fatal: bool,
        ctx: &RequestContext,
    ) -> Verdict {
        let preview = truncate(&sanitize(query), QUERY_PREVIEW_CHARS).into_owned();

        let event = Event::new(
            EventKind::Database,
            Category::Query,
            Severity::from_fatal(explicitly_fatal),
            "Database query failed",
        )
        .with_error_code(code)
        .with_detail(detail)
        .with_context("query", preview);

        let (event, recorded) = self.record(event, ctx);
        let user_message = if explicitly_fatal {
            FATAL_USER_MESSAGE
        } else {
            DATA_USER_MESSAGE
        };
        self.verdict(explicitly_fatal, user_message, &event.detail, recorded)
    }

    /// A runtime fault raised by the host process
    ///
    /// The category comes from [`codes::category_for_code`]; severity
    /// follows `explicitly_fatal` only.
    pub fn classify_system_fault(
        &self,
        message: &str,
        source_location: &str,
        code: i64,
        explicitly_fatal: bool,
        ctx: &RequestContext,
    ) -> Verdict {
        let mut event = Event::new(
            EventKind::System,
            codes::category_for_code(code),
            Severity::from_fatal(explicitly_fatal),
            message,
        )
        .with_error_code(code)
        .with_resource_usage(sample_resource_usage());
        if !source_location.is_empty() {
            event = event.with_context("source", source_location);
        }

        let (event, recorded) = self.record(event, ctx);
        let technical = match event.context.get("source") {
            Some(source) => format!("{} at {}", event.message, source),
            None => event.message.clone(),
        };
        self.verdict(explicitly_fatal, INTERNAL_USER_MESSAGE, &technical, recorded)
    }

    /// A fault reported by application code
    pub fn classify_application_fault(
        &self,
        message: &str,
        context: &BTreeMap<String, String>,
        details: &str,
        explicitly_fatal: bool,
        ctx: &RequestContext,
    ) -> Verdict {
        let mut event = Event::new(
            EventKind::Application,
            Category::System,
            Severity::from_fatal(explicitly_fatal),
            message,
        )
        .with_detail(details);
        for (key, value) in context {
            event = event.with_context(key.as_str(), value.as_str());
        }

        let (event, recorded) = self.record(event, ctx);
        let user_message = if explicitly_fatal {
            FATAL_USER_MESSAGE
        } else {
            INTERNAL_USER_MESSAGE
        };
        let technical = if event.detail.is_empty() {
            &event.message
        } else {
            &event.detail
        };
        self.verdict(explicitly_fatal, user_message, technical, recorded)
    }

    /// Sanitize and persist; returns the stored form and whether it landed
    fn record(&self, event: Event, ctx: &RequestContext) -> (Event, bool) {
        let event = event
            .with_actor(ctx.actor.clone())
            .with_origin(ctx.origin.clone())
            .sanitized();

        match self.store.append(&event) {
            Ok(AppendOutcome::Appended) => (event, true),
            Ok(AppendOutcome::Rotated { archive }) => {
                debug!(archive = %archive.display(), "Error log rotated");
                (event, true)
            }
            Err(e) => {
                error!(
                    error = %e,
                    kind = %event.kind,
                    category = %event.category,
                    severity = %event.severity,
                    message = %event.message,
                    "Failed to record error event"
                );
                (event, false)
            }
        }
    }

    fn verdict(&self, fatal: bool, user_message: &str, technical: &str, recorded: bool) -> Verdict {
        let technical_detail = (self.debug_mode() && !technical.is_empty()).then(|| technical.to_string());
        Verdict::new(fatal, user_message)
            .with_technical_detail(technical_detail)
            .with_recorded(recorded)
    }
}
