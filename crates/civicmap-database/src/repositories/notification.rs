//! Notification repository implementation.

use sqlx::PgPool;

use civicmap_core::error::{AppError, ErrorKind};
use civicmap_core::result::AppResult;
use civicmap_core::types::pagination::{PageRequest, PageResponse};
use civicmap_entity::notification::model::{NewNotification, Notification};

/// Repository for notification rows.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a notification.
    pub async fn create(&self, new: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, message, collaboration_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.user_id)
        .bind(&new.message)
        .bind(new.collaboration_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create notification", e)
        })
    }

    /// List notifications for a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
                })?;

        let rows = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
        })?;

        Ok(PageResponse::new(rows, page.page, page.page_size, total as u64))
    }

    /// Mark a notification as read. Returns false when no row matched.
    pub async fn mark_read(&self, notification_id: i64, user_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(notification_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to mark notification read", e)
                })?;
        Ok(result.rows_affected() > 0)
    }
}
