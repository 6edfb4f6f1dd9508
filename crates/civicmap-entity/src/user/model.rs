//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A registered user of the platform.
///
/// Account management belongs to the identity service; this crate only reads
/// the fields the collaboration workflow consumes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Email address. May be empty for accounts created through other channels.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Organisation the user belongs to (shown in notification texts).
    pub organisation: Option<String>,
    /// Account type.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check whether the user can receive email.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }

    /// Organisation name for display, falling back to the user's full name.
    pub fn organisation_label(&self) -> String {
        match &self.organisation {
            Some(org) if !org.trim().is_empty() => org.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(email: &str, organisation: Option<&str>) -> User {
        User {
            id: 1,
            email: email.to_string(),
            first_name: "Awa".to_string(),
            last_name: "Diarra".to_string(),
            organisation: organisation.map(String::from),
            role: UserRole::Elu,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_email() {
        assert!(sample("a@x.com", None).has_email());
        assert!(!sample("", None).has_email());
        assert!(!sample("   ", None).has_email());
    }

    #[test]
    fn test_organisation_label_falls_back_to_name() {
        assert_eq!(
            sample("a@x.com", Some("Mairie de Bamako")).organisation_label(),
            "Mairie de Bamako"
        );
        assert_eq!(sample("a@x.com", None).organisation_label(), "Awa Diarra");
        assert_eq!(sample("a@x.com", Some("")).organisation_label(), "Awa Diarra");
    }
}
