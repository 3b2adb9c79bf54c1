//! Study log handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use bitpacs_core::error::AppError;
use bitpacs_core::types::PageResponse;
use bitpacs_entity::audit::{StudyLog, StudyLogWithActor};
use bitpacs_service::RecordStudyLogRequest;

use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/logs
///
/// Records a view/download performed by the authenticated user. The
/// actor and source IP come from the session, never from the body.
pub async fn record(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RecordStudyLogRequest>,
) -> Result<(StatusCode, Json<StudyLog>), AppError> {
    let saved = state.study_log_service.record(auth.context(), req).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/logs/user/{id}?page=&per_page=
pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<StudyLog>>, AppError> {
    let page = state
        .study_log_service
        .list_for_user(auth.context(), user_id, &pagination.into_page_request())
        .await?;
    Ok(Json(page))
}

/// GET /api/logs?page=&per_page=
pub async fn list_all(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PageResponse<StudyLogWithActor>>, AppError> {
    let page = state
        .study_log_service
        .list_all(auth.context(), &pagination.into_page_request())
        .await?;
    Ok(Json(page))
}
