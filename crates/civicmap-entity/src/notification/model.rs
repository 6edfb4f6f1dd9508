//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted in-app notification, distinct from the emailed one.
///
/// Rows are created only by the collaboration side-effect dispatcher and
/// cascade-deleted with their collaboration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: i64,
    /// The recipient user.
    pub user_id: i64,
    /// Display text.
    pub message: String,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has read this notification.
    pub read: bool,
    /// The collaboration that triggered this notification.
    pub collaboration_id: i64,
}

/// Data required to create a new notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// Recipient user.
    pub user_id: i64,
    /// Display text.
    pub message: String,
    /// Triggering collaboration.
    pub collaboration_id: i64,
}
