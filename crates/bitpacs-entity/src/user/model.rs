//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// A portal user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email (unique).
    pub email: String,
    /// Argon2id password hash. Never serialized to API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The user's role.
    pub role: Role,
    /// Facility this account is bound to. Ignored for Master, who may
    /// select any facility at request time.
    pub facility_key: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public view of the user, safe to return from the API.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            facility_key: self.facility_key.clone(),
        }
    }
}

/// User fields exposed through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// The user's role.
    pub role: Role,
    /// Facility this account is bound to.
    pub facility_key: String,
}
