//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! validates it, and injects a session context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use bitpacs_core::error::AppError;
use bitpacs_entity::SessionContext;

use crate::state::AppState;

/// Extracted authenticated session context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionContext);

impl AuthUser {
    /// Returns the inner `SessionContext`.
    pub fn context(&self) -> &SessionContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = SessionContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode_access_token(token)?;

        let mut ctx = SessionContext::new(
            claims.user_id(),
            claims.name.clone(),
            claims.role,
            claims.facility_key.clone(),
        );

        if let Some(ip) = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
        {
            ctx = ctx.with_ip(ip.trim());
        }

        Ok(AuthUser(ctx))
    }
}
