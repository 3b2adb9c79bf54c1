//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the portal.
///
/// Roles form a partial order: Master > Admin > {Clinician, Nurse}.
/// Only Master may switch between facilities; Master and Admin may read
/// other users' audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    /// Cross-facility superuser.
    Master,
    /// Facility administrator.
    Admin,
    /// Physician — views and downloads studies at their facility.
    Clinician,
    /// Nurse — views studies at their facility.
    Nurse,
}

impl Role {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Master => 4,
            Self::Admin => 3,
            Self::Clinician | Self::Nurse => 2,
        }
    }

    /// Whether this role may select an arbitrary facility per request.
    ///
    /// Every other role is pinned to the facility bound to its account.
    pub fn can_switch_facility(&self) -> bool {
        matches!(self, Self::Master)
    }

    /// Whether this role may read audit logs belonging to other users.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Master | Self::Admin)
    }

    /// Return the role as its canonical string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "Master",
            Self::Admin => "Admin",
            Self::Clinician => "Clinician",
            Self::Nurse => "Nurse",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = bitpacs_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "master" => Ok(Self::Master),
            "admin" => Ok(Self::Admin),
            "clinician" | "medico" => Ok(Self::Clinician),
            "nurse" | "enfermeiro" => Ok(Self::Nurse),
            _ => Err(bitpacs_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: Master, Admin, Clinician, Nurse"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(Role::Master.privilege_level() > Role::Admin.privilege_level());
        assert!(Role::Admin.privilege_level() > Role::Nurse.privilege_level());
        assert_eq!(
            Role::Clinician.privilege_level(),
            Role::Nurse.privilege_level()
        );
    }

    #[test]
    fn test_only_master_switches_facility() {
        assert!(Role::Master.can_switch_facility());
        assert!(!Role::Admin.can_switch_facility());
        assert!(!Role::Clinician.can_switch_facility());
        assert!(!Role::Nurse.can_switch_facility());
    }

    #[test]
    fn test_audit_privilege() {
        assert!(Role::Master.is_privileged());
        assert!(Role::Admin.is_privileged());
        assert!(!Role::Nurse.is_privileged());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("master".parse::<Role>().unwrap(), Role::Master);
        assert_eq!("Medico".parse::<Role>().unwrap(), Role::Clinician);
        assert_eq!("ENFERMEIRO".parse::<Role>().unwrap(), Role::Nurse);
        assert!("root".parse::<Role>().is_err());
    }
}
