//! Login and identity service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bitpacs_auth::{JwtEncoder, PasswordHasher};
use bitpacs_core::{AppError, AppResult};
use bitpacs_database::repositories::UserRepository;
use bitpacs_entity::user::PublicUser;

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Signed access token.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: PublicUser,
}

/// Authenticates users and issues access tokens.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserRepository>,
    hasher: PasswordHasher,
    encoder: JwtEncoder,
}

impl AuthService {
    /// Create the service.
    pub fn new(users: Arc<UserRepository>, hasher: PasswordHasher, encoder: JwtEncoder) -> Self {
        Self {
            users,
            hasher,
            encoder,
        }
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown email and wrong password produce the same error so the
    /// login form cannot be used to enumerate accounts.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let matches = self
            .hasher
            .verify_password(&request.password, &user.password_hash)?;
        if !matches {
            tracing::warn!(email = %request.email, "Failed login attempt");
            return Err(invalid_credentials());
        }

        let (token, expires_at) = self.encoder.generate_access_token(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            token,
            expires_at,
            user: user.public(),
        })
    }

    /// The current user's profile, straight from storage so role or
    /// facility changes show up without re-login.
    pub async fn me(&self, user_id: Uuid) -> AppResult<PublicUser> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User account no longer exists"))?;
        Ok(user.public())
    }
}

fn invalid_credentials() -> AppError {
    AppError::authentication("Invalid email or password")
}
