//! Auth handlers: login and me.

use axum::extract::State;
use axum::Json;

use bitpacs_core::error::AppError;
use bitpacs_entity::user::PublicUser;
use bitpacs_service::{LoginRequest, LoginResponse};

use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.auth_service.login(&req).await?;
    Ok(Json(response))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state.auth_service.me(auth.user_id).await?;
    Ok(Json(user))
}
