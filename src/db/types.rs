use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
pub(crate) enum SessionStatus {
    Active,
    Completed,
    Terminated,
}

impl SessionStatus {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Terminated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "audit_status", rename_all = "snake_case")]
pub(crate) enum AuditStatus {
    Connected,
    StartedTest,
    Submitted,
    KickedOut,
}
