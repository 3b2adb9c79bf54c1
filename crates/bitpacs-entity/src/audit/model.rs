//! Study log entry entity model.
//!
//! Entries are append-only: there is no update or delete path anywhere
//! in the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use bitpacs_core::AppError;

/// The action a study log entry records.
///
/// This is a closed set; anything else is rejected at the boundary and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "study_log_action", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum StudyLogAction {
    /// The user opened a study in the viewer.
    View,
    /// The user downloaded a study.
    Download,
}

impl StudyLogAction {
    /// Return the action as its canonical wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Download => "DOWNLOAD",
        }
    }
}

impl fmt::Display for StudyLogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StudyLogAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEW" => Ok(Self::View),
            "DOWNLOAD" => Ok(Self::Download),
            _ => Err(AppError::validation(format!(
                "Invalid action type: '{s}'. Use 'VIEW' or 'DOWNLOAD'"
            ))),
        }
    }
}

/// An immutable study log entry recording a view or download.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudyLog {
    /// Unique entry identifier, assigned by storage.
    pub id: Uuid,
    /// The user who performed the action.
    pub user_id: Uuid,
    /// What the user did.
    pub action: StudyLogAction,
    /// Orthanc study identifier.
    pub study_id: String,
    /// DICOM StudyInstanceUID, when the client supplies it.
    pub study_instance_uid: Option<String>,
    /// Patient name, denormalized for fast history display.
    pub patient_name: Option<String>,
    /// Study description.
    pub study_description: Option<String>,
    /// Study modality (CT, MR, ...).
    pub modality: Option<String>,
    /// When the action occurred (UTC, set at write time).
    pub timestamp: DateTime<Utc>,
    /// Best-effort source IP of the actor.
    pub ip_address: Option<String>,
}

/// Data required to create a new study log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudyLog {
    /// The user who performed the action.
    pub user_id: Uuid,
    /// What the user did.
    pub action: StudyLogAction,
    /// Orthanc study identifier.
    pub study_id: String,
    /// DICOM StudyInstanceUID.
    pub study_instance_uid: Option<String>,
    /// Patient name.
    pub patient_name: Option<String>,
    /// Study description.
    pub study_description: Option<String>,
    /// Study modality.
    pub modality: Option<String>,
    /// Best-effort source IP.
    pub ip_address: Option<String>,
}

/// Study log entry joined with actor identity, for the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudyLogWithActor {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The user who performed the action.
    pub user_id: Uuid,
    /// Actor display name.
    pub user_name: String,
    /// Actor email.
    pub user_email: String,
    /// What the user did.
    pub action: StudyLogAction,
    /// Orthanc study identifier.
    pub study_id: String,
    /// DICOM StudyInstanceUID.
    pub study_instance_uid: Option<String>,
    /// Patient name.
    pub patient_name: Option<String>,
    /// Study description.
    pub study_description: Option<String>,
    /// Study modality.
    pub modality: Option<String>,
    /// When the action occurred.
    pub timestamp: DateTime<Utc>,
    /// Best-effort source IP.
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!("VIEW".parse::<StudyLogAction>().unwrap(), StudyLogAction::View);
        assert_eq!(
            "DOWNLOAD".parse::<StudyLogAction>().unwrap(),
            StudyLogAction::Download
        );
    }

    #[test]
    fn test_action_parse_rejects_unknown() {
        assert!("INVALID".parse::<StudyLogAction>().is_err());
        // lowercase is not accepted on the wire
        assert!("view".parse::<StudyLogAction>().is_err());
    }

    #[test]
    fn test_action_wire_format() {
        let json = serde_json::to_string(&StudyLogAction::Download).unwrap();
        assert_eq!(json, "\"DOWNLOAD\"");
    }
}
