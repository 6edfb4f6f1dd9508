//! Incident entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Triage state of a reported incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "incident_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    /// Reported by a citizen, not yet handled.
    Declared,
    /// An organisation took ownership.
    Taken,
    /// Resolved and closed.
    Resolved,
}

impl IncidentStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declared => "declared",
            Self::Taken => "taken",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reported incident in a geographic zone.
///
/// The collaboration workflow reads incidents but never writes them; incident
/// CRUD lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Incident {
    /// Unique incident identifier.
    pub id: i64,
    /// Short title shown in notifications.
    pub title: String,
    /// Name of the zone the incident was reported in.
    pub zone: String,
    /// Longer description (optional).
    pub description: Option<String>,
    /// Triage state.
    pub status: IncidentStatus,
    /// The citizen who reported the incident.
    pub reported_by: Option<i64>,
    /// The responsible party who took ownership (may be unset).
    pub taken_by: Option<i64>,
    /// When the incident was reported.
    pub created_at: DateTime<Utc>,
}
