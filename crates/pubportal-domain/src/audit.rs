//! Audit trail actions.

use serde::{Deserialize, Serialize};

/// Action recorded in the audit log.
///
/// Wire format: SCREAMING_SNAKE_CASE string, compatible with rows written by
/// the legacy portal (`LOGIN`, `DELETE_ALL`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    AddAdmin,
    RemoveAdmin,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::AddAdmin => "ADD_ADMIN",
            Self::RemoveAdmin => "REMOVE_ADMIN",
        }
    }
}
