//! Caller request context.
//!
//! The context carries authorization and tenant scoping for a single call.
//! Storage layers receive it alongside every operation but the facade never
//! looks inside it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization and tenant scope for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Correlation identifier, generated when not supplied.
    pub request_id: String,
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub is_admin: bool,
}

impl RequestContext {
    /// Create an unscoped, non-admin context with a fresh request ID.
    pub fn new() -> Self {
        Self {
            request_id: format!("req-{}", Uuid::new_v4()),
            user_id: None,
            project_id: None,
            is_admin: false,
        }
    }

    /// Create an admin context, as used by management tooling.
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            ..Self::new()
        }
    }

    /// Scope the context to a user and project.
    pub fn with_scope(mut self, user_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.project_id = Some(project_id.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
