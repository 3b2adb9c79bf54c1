//! Session context carrying the authenticated user and selected facility.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Role;

/// Context for the current authenticated request or monitoring session.
///
/// Passed explicitly into the route resolver and services so that every
/// operation knows *who* is acting and which facility they are bound to —
/// never read from ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Display name (convenience field from JWT claims).
    pub username: String,
    /// The user's role at the time the token was issued.
    pub role: Role,
    /// The facility bound to this account. For Master this is only a
    /// default; the route resolver honors the requested key instead.
    pub facility_key: String,
    /// Best-effort source IP of the request.
    pub ip_address: Option<String>,
}

impl SessionContext {
    /// Creates a new session context.
    pub fn new(
        user_id: Uuid,
        username: impl Into<String>,
        role: Role,
        facility_key: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            facility_key: facility_key.into(),
            ip_address: None,
        }
    }

    /// Attach the request source IP.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Whether this session may read audit logs belonging to `owner_id`.
    pub fn can_read_logs_of(&self, owner_id: Uuid) -> bool {
        self.role.is_privileged() || self.user_id == owner_id
    }
}
