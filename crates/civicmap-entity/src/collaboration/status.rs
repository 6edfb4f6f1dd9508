//! Collaboration lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a collaboration request.
///
/// Created `pending`; `accepted` and `declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "collaboration_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CollaborationStatus {
    /// Awaiting a decision.
    Pending,
    /// The request was approved.
    Accepted,
    /// The request was declined.
    Declined,
}

impl CollaborationStatus {
    /// Check if the status is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Declined)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CollaborationStatus {
    type Err = civicmap_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            _ => Err(civicmap_core::AppError::validation(format!(
                "Invalid collaboration status: '{s}'. Expected one of: pending, accepted, declined"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!CollaborationStatus::Pending.is_terminal());
        assert!(CollaborationStatus::Accepted.is_terminal());
        assert!(CollaborationStatus::Declined.is_terminal());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "pending".parse::<CollaborationStatus>().unwrap(),
            CollaborationStatus::Pending
        );
        assert_eq!(
            "ACCEPTED".parse::<CollaborationStatus>().unwrap(),
            CollaborationStatus::Accepted
        );
        assert!("cancelled".parse::<CollaborationStatus>().is_err());
    }
}
