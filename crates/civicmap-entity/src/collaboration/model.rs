//! Collaboration entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::CollaborationStatus;

/// A request by a user to assist on a specific incident.
///
/// At most one collaboration may exist per (incident, user) pair — enforced
/// by a unique constraint at the data layer and re-checked with a friendly
/// error at the validation layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collaboration {
    /// Unique collaboration identifier.
    pub id: i64,
    /// The incident the request targets.
    pub incident_id: i64,
    /// The user who initiated the request.
    pub user_id: i64,
    /// When the request was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// Last day of the proposed collaboration; strictly in the future at creation.
    pub end_date: NaiveDate,
    /// Free-text motivation (optional).
    pub motivation: Option<String>,
    /// Free-text alternative proposal (optional).
    pub other_option: Option<String>,
    /// Current lifecycle state.
    pub status: CollaborationStatus,
}

impl Collaboration {
    /// Check whether the collaboration window has passed.
    ///
    /// Expiry only gates the accept transition; there is no background sweep.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date <= today
    }
}

/// Data required to create a new collaboration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCollaboration {
    /// Target incident.
    pub incident_id: i64,
    /// Requesting user.
    pub user_id: i64,
    /// Proposed end date.
    pub end_date: NaiveDate,
    /// Motivation text.
    pub motivation: Option<String>,
    /// Alternative proposal text.
    pub other_option: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(end_date: NaiveDate) -> Collaboration {
        Collaboration {
            id: 1,
            incident_id: 10,
            user_id: 20,
            created_at: Utc::now(),
            end_date,
            motivation: None,
            other_option: None,
            status: CollaborationStatus::Pending,
        }
    }

    #[test]
    fn test_expiry_is_inclusive_of_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert!(sample(today).is_expired(today));
        assert!(sample(today.pred_opt().unwrap()).is_expired(today));
        assert!(!sample(today.succ_opt().unwrap()).is_expired(today));
    }
}
