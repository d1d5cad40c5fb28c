//! Caller identity
//!
//! Identifies the authenticated actor behind a request. Threaded explicitly
//! through every handler call so there is no hidden ambient state; the actor
//! string is what lands in `created_by` audit columns.

use uuid::Uuid;

/// Identity of the caller executing an operation.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// Authenticated user, when one is bound to the request
    pub user_id: Option<Uuid>,

    /// Correlation ID for request tracing
    pub correlation_id: Uuid,

    /// Request endpoint, used in the fallback audit identifier
    pub endpoint: String,
}

impl CallerIdentity {
    /// Create an unauthenticated identity for a request.
    pub fn new(correlation_id: Uuid, endpoint: impl Into<String>) -> Self {
        Self {
            user_id: None,
            correlation_id,
            endpoint: endpoint.into(),
        }
    }

    /// Bind an authenticated user to this identity.
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Stable audit string for this caller.
    ///
    /// Falls back to a synthesized identifier when no user is bound.
    pub fn actor(&self) -> String {
        match self.user_id {
            Some(user_id) => user_id.to_string(),
            None => format!("unauthenticated:{}:{}", self.correlation_id, self.endpoint),
        }
    }
}
