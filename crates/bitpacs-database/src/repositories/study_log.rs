//! Study log repository implementation.
//!
//! The study log is append-only: this repository exposes insert and
//! read paths, nothing else.

use sqlx::PgPool;
use uuid::Uuid;

use bitpacs_core::error::{AppError, ErrorKind};
use bitpacs_core::result::AppResult;
use bitpacs_core::types::{PageRequest, PageResponse};
use bitpacs_entity::audit::{CreateStudyLog, StudyLog, StudyLogWithActor};

/// Repository for study access log entries.
#[derive(Debug, Clone)]
pub struct StudyLogRepository {
    pool: PgPool,
}

impl StudyLogRepository {
    /// Create a new study log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a study log entry. The timestamp is assigned here, not
    /// taken from the client.
    pub async fn create(&self, entry: &CreateStudyLog) -> AppResult<StudyLog> {
        sqlx::query_as::<_, StudyLog>(
            "INSERT INTO study_logs \
             (user_id, action, study_id, study_instance_uid, patient_name, \
              study_description, modality, \"timestamp\", ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8) \
             RETURNING *",
        )
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(&entry.study_id)
        .bind(&entry.study_instance_uid)
        .bind(&entry.patient_name)
        .bind(&entry.study_description)
        .bind(&entry.modality)
        .bind(&entry.ip_address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create study log entry", e)
        })
    }

    /// List entries for a single user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StudyLog>> {
        let items = sqlx::query_as::<_, StudyLog>(
            "SELECT * FROM study_logs WHERE user_id = $1 \
             ORDER BY \"timestamp\" DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list study logs", e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM study_logs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count study logs", e)
        })?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List all entries joined with actor identity, newest first.
    pub async fn list_all(&self, page: &PageRequest) -> AppResult<PageResponse<StudyLogWithActor>> {
        let items = sqlx::query_as::<_, StudyLogWithActor>(
            "SELECT l.id, l.user_id, u.name AS user_name, u.email AS user_email, \
                    l.action, l.study_id, l.study_instance_uid, l.patient_name, \
                    l.study_description, l.modality, l.\"timestamp\", l.ip_address \
             FROM study_logs l \
             JOIN users u ON u.id = l.user_id \
             ORDER BY l.\"timestamp\" DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list study logs", e)
        })?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM study_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count study logs", e)
            })?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
