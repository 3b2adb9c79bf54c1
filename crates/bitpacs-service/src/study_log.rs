//! Study access log service.
//!
//! Records who viewed or downloaded which study and answers history
//! queries. Entries are written against the authenticated actor only;
//! a client cannot log an action on another user's behalf. Reads are
//! gated by role: a user sees their own history, privileged roles see
//! everyone's.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use bitpacs_core::types::{PageRequest, PageResponse};
use bitpacs_core::{AppError, AppResult};
use bitpacs_database::repositories::{StudyLogRepository, UserRepository};
use bitpacs_entity::audit::{CreateStudyLog, StudyLog, StudyLogAction, StudyLogWithActor};
use bitpacs_entity::SessionContext;

/// Persistence seam for study log entries.
#[async_trait]
pub trait StudyLogStore: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: &CreateStudyLog) -> AppResult<StudyLog>;
    /// Page through one user's entries, newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StudyLog>>;
    /// Page through all entries with actor identity, newest first.
    async fn list_all(&self, page: &PageRequest) -> AppResult<PageResponse<StudyLogWithActor>>;
}

/// Lookup seam for user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether an account with this ID exists.
    async fn exists(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
impl StudyLogStore for StudyLogRepository {
    async fn append(&self, entry: &CreateStudyLog) -> AppResult<StudyLog> {
        self.create(entry).await
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StudyLog>> {
        StudyLogRepository::list_for_user(self, user_id, page).await
    }

    async fn list_all(&self, page: &PageRequest) -> AppResult<PageResponse<StudyLogWithActor>> {
        StudyLogRepository::list_all(self, page).await
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        UserRepository::exists(self, id).await
    }
}

/// Payload for recording a study access.
///
/// `action` stays a raw string here so an unknown value becomes a
/// validation error with nothing persisted, not a deserialization
/// rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordStudyLogRequest {
    /// What the user did, `"VIEW"` or `"DOWNLOAD"`.
    pub action: String,
    /// Orthanc study identifier.
    pub study_id: String,
    /// DICOM StudyInstanceUID.
    #[serde(default)]
    pub study_instance_uid: Option<String>,
    /// Patient name for history display.
    #[serde(default)]
    pub patient_name: Option<String>,
    /// Study description.
    #[serde(default)]
    pub study_description: Option<String>,
    /// Study modality.
    #[serde(default)]
    pub modality: Option<String>,
}

/// Orchestrates study log writes and role-gated reads.
#[derive(Clone)]
pub struct StudyLogService {
    logs: Arc<dyn StudyLogStore>,
    users: Arc<dyn UserDirectory>,
}

impl StudyLogService {
    /// Create the service over its storage seams.
    pub fn new(logs: Arc<dyn StudyLogStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { logs, users }
    }

    /// Record an action performed by the session's user.
    ///
    /// The actor and source IP come from the session, never from the
    /// payload. The timestamp is assigned at write time by storage.
    pub async fn record(
        &self,
        session: &SessionContext,
        request: RecordStudyLogRequest,
    ) -> AppResult<StudyLog> {
        let action: StudyLogAction = request.action.parse()?;
        if request.study_id.trim().is_empty() {
            return Err(AppError::validation("study_id must not be empty"));
        }

        let entry = CreateStudyLog {
            user_id: session.user_id,
            action,
            study_id: request.study_id,
            study_instance_uid: request.study_instance_uid,
            patient_name: request.patient_name,
            study_description: request.study_description,
            modality: request.modality,
            ip_address: session.ip_address.clone(),
        };

        let saved = self.logs.append(&entry).await?;
        tracing::info!(
            user_id = %saved.user_id,
            action = %saved.action,
            study_id = %saved.study_id,
            "Study access recorded"
        );
        Ok(saved)
    }

    /// One user's history, newest first.
    ///
    /// A non-privileged session may only read its own history; anything
    /// else is an authorization error, not an empty page.
    pub async fn list_for_user(
        &self,
        session: &SessionContext,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StudyLog>> {
        if !session.can_read_logs_of(owner_id) {
            return Err(AppError::authorization(
                "Cannot read another user's study history",
            ));
        }
        if !self.users.exists(owner_id).await? {
            return Err(AppError::not_found(format!("User {owner_id} not found")));
        }
        self.logs.list_for_user(owner_id, page).await
    }

    /// Every user's history with actor identity. Privileged roles only.
    pub async fn list_all(
        &self,
        session: &SessionContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StudyLogWithActor>> {
        if !session.role.is_privileged() {
            return Err(AppError::authorization(
                "Only administrators may read the full study log",
            ));
        }
        self.logs.list_all(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpacs_entity::user::Role;
    use chrono::Utc;
    use tokio::sync::Mutex;

    struct MemoryStore {
        entries: Mutex<Vec<StudyLog>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StudyLogStore for MemoryStore {
        async fn append(&self, entry: &CreateStudyLog) -> AppResult<StudyLog> {
            let saved = StudyLog {
                id: Uuid::new_v4(),
                user_id: entry.user_id,
                action: entry.action,
                study_id: entry.study_id.clone(),
                study_instance_uid: entry.study_instance_uid.clone(),
                patient_name: entry.patient_name.clone(),
                study_description: entry.study_description.clone(),
                modality: entry.modality.clone(),
                timestamp: Utc::now(),
                ip_address: entry.ip_address.clone(),
            };
            self.entries.lock().await.push(saved.clone());
            Ok(saved)
        }

        async fn list_for_user(
            &self,
            user_id: Uuid,
            page: &PageRequest,
        ) -> AppResult<PageResponse<StudyLog>> {
            let entries = self.entries.lock().await;
            let mut mine: Vec<_> = entries
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect();
            mine.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            let total = mine.len() as u64;
            let items = mine
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect();
            Ok(PageResponse::new(items, page.page, page.page_size, total))
        }

        async fn list_all(
            &self,
            page: &PageRequest,
        ) -> AppResult<PageResponse<StudyLogWithActor>> {
            let entries = self.entries.lock().await;
            let total = entries.len() as u64;
            let items = entries
                .iter()
                .map(|e| StudyLogWithActor {
                    id: e.id,
                    user_id: e.user_id,
                    user_name: "someone".to_string(),
                    user_email: "someone@example.com".to_string(),
                    action: e.action,
                    study_id: e.study_id.clone(),
                    study_instance_uid: e.study_instance_uid.clone(),
                    patient_name: e.patient_name.clone(),
                    study_description: e.study_description.clone(),
                    modality: e.modality.clone(),
                    timestamp: e.timestamp,
                    ip_address: e.ip_address.clone(),
                })
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect();
            Ok(PageResponse::new(items, page.page, page.page_size, total))
        }
    }

    struct AllUsersExist;

    #[async_trait]
    impl UserDirectory for AllUsersExist {
        async fn exists(&self, _id: Uuid) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn service() -> StudyLogService {
        StudyLogService::new(Arc::new(MemoryStore::new()), Arc::new(AllUsersExist))
    }

    fn clinician(id: Uuid) -> SessionContext {
        SessionContext::new(id, "dr", Role::Clinician, "fazenda").with_ip("10.0.0.7")
    }

    fn request(study_id: &str) -> RecordStudyLogRequest {
        RecordStudyLogRequest {
            action: "VIEW".to_string(),
            study_id: study_id.to_string(),
            study_instance_uid: Some("1.2.840.113619.2.1".to_string()),
            patient_name: Some("SILVA^MARIA".to_string()),
            study_description: Some("TC CRANIO".to_string()),
            modality: Some("CT".to_string()),
        }
    }

    #[tokio::test]
    async fn test_record_binds_actor_and_ip_from_session() {
        let svc = service();
        let actor = Uuid::new_v4();
        let saved = svc.record(&clinician(actor), request("study-1")).await.unwrap();

        assert_eq!(saved.user_id, actor);
        assert_eq!(saved.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(saved.action, StudyLogAction::View);
    }

    #[tokio::test]
    async fn test_record_rejects_unknown_action() {
        let svc = service();
        let mut req = request("study-1");
        req.action = "PRINT".to_string();
        let err = svc
            .record(&clinician(Uuid::new_v4()), req)
            .await
            .unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_record_rejects_empty_study_id() {
        let svc = service();
        let err = svc
            .record(&clinician(Uuid::new_v4()), request("   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_own_history_is_readable() {
        let svc = service();
        let actor = Uuid::new_v4();
        let session = clinician(actor);
        svc.record(&session, request("study-1")).await.unwrap();
        svc.record(&session, request("study-2")).await.unwrap();

        let page = svc
            .list_for_user(&session, actor, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
    }

    #[tokio::test]
    async fn test_foreign_history_denied_for_clinician() {
        let svc = service();
        let session = clinician(Uuid::new_v4());
        let err = svc
            .list_for_user(&session, Uuid::new_v4(), &PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_admin_reads_any_history_and_full_log() {
        let svc = service();
        let actor = Uuid::new_v4();
        svc.record(&clinician(actor), request("study-1")).await.unwrap();

        let admin = SessionContext::new(Uuid::new_v4(), "admin", Role::Admin, "fazenda");
        let theirs = svc
            .list_for_user(&admin, actor, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(theirs.total_items, 1);

        let all = svc.list_all(&admin, &PageRequest::default()).await.unwrap();
        assert_eq!(all.total_items, 1);
    }

    #[tokio::test]
    async fn test_full_log_denied_for_non_privileged() {
        let svc = service();
        let err = svc
            .list_all(&clinician(Uuid::new_v4()), &PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Authorization);
    }
}
