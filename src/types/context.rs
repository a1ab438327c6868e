//! Per-request context passed along with a failure

use super::{Actor, Origin};

/// Actor and origin of the inbound request a failure happened in
///
/// `RequestContext::default()` is the sentinel used outside a request:
/// anonymous actor, empty origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Actor,
    pub origin: Origin,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>, session: impl Into<String>) -> Self {
        self.actor = Actor::new(user, session);
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.origin.remote_addr = addr.into();
        self
    }

    pub fn with_request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.origin.method = method.into();
        self.origin.request_path = path.into();
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.origin.user_agent = agent.into();
        self
    }
}
