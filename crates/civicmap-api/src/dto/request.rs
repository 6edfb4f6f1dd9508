//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use civicmap_service::collaboration::CreateCollaboration;

/// Body of `POST /api/collaborations`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCollaborationRequest {
    /// Target incident.
    pub incident_id: i64,
    /// Last day of the proposed collaboration.
    pub end_date: NaiveDate,
    /// Motivation text.
    #[validate(length(max = 2000, message = "La motivation est trop longue"))]
    pub motivation: Option<String>,
    /// Alternative proposal text.
    #[validate(length(max = 255, message = "La proposition alternative est trop longue"))]
    pub other_option: Option<String>,
}

impl CreateCollaborationRequest {
    /// Convert into the service-layer input.
    pub fn into_input(self) -> CreateCollaboration {
        CreateCollaboration {
            incident_id: self.incident_id,
            end_date: self.end_date,
            motivation: self.motivation,
            other_option: self.other_option,
        }
    }
}

/// Body of `POST /api/collaborations/accept` and `/decline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationActionRequest {
    /// The collaboration to act on.
    pub collaboration_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default_to_none() {
        let req: CreateCollaborationRequest =
            serde_json::from_str(r#"{"incident_id": 5, "end_date": "2030-01-01"}"#).unwrap();
        assert_eq!(req.incident_id, 5);
        assert!(req.motivation.is_none());
        assert!(req.other_option.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_overlong_other_option_rejected() {
        let req = CreateCollaborationRequest {
            incident_id: 5,
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            motivation: None,
            other_option: Some("x".repeat(300)),
        };
        assert!(req.validate().is_err());
    }
}
