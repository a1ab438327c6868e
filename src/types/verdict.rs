//! Classifier result returned to callers

use serde::{Deserialize, Serialize};

/// What the caller should do after a failure was classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The caller's operation cannot proceed
    pub fatal: bool,
    /// Generic text that is safe to show to end users
    #[serde(rename = "userMessage")]
    pub user_message: String,
    /// Sanitized technical detail, only populated in debug mode
    #[serde(rename = "technicalDetail", skip_serializing_if = "Option::is_none")]
    pub technical_detail: Option<String>,
    /// Whether the event reached the log store
    pub recorded: bool,
}

impl Verdict {
    pub fn new(fatal: bool, user_message: impl Into<String>) -> Self {
        Self {
            fatal,
            user_message: user_message.into(),
            technical_detail: None,
            recorded: false,
        }
    }

    pub fn with_technical_detail(mut self, detail: Option<String>) -> Self {
        self.technical_detail = detail;
        self
    }

    pub fn with_recorded(mut self, recorded: bool) -> Self {
        self.recorded = recorded;
        self
    }

    /// True when the caller should continue after presenting the message
    pub fn should_continue(&self) -> bool {
        !self.fatal
    }
}
