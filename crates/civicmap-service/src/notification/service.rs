//! Notification service.

use std::sync::Arc;

use civicmap_core::error::AppError;
use civicmap_core::result::AppResult;
use civicmap_core::types::pagination::{PageRequest, PageResponse};
use civicmap_database::repositories::notification::NotificationRepository;
use civicmap_entity::notification::model::Notification;

use crate::context::RequestContext;

/// Unknown notification id, or owned by another user.
pub const MSG_NOTIFICATION_NOT_FOUND: &str = "Notification non trouvée";

/// Manages the caller's in-app notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    /// Notification repository.
    notification_repo: Arc<NotificationRepository>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notification_repo: Arc<NotificationRepository>) -> Self {
        Self { notification_repo }
    }

    /// Lists notifications for the current user, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.notification_repo.find_by_user(ctx.user_id, &page).await
    }

    /// Marks one of the caller's notifications as read. Idempotent.
    pub async fn mark_read(&self, ctx: &RequestContext, notification_id: i64) -> AppResult<()> {
        let updated = self
            .notification_repo
            .mark_read(notification_id, ctx.user_id)
            .await?;
        if !updated {
            return Err(AppError::not_found(MSG_NOTIFICATION_NOT_FOUND));
        }
        Ok(())
    }
}
