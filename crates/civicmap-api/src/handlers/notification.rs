//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use civicmap_core::types::pagination::PageResponse;
use civicmap_entity::notification::model::Notification;

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Notification>>>, ApiError> {
    let page = state
        .notification_service
        .list(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(MessageResponse::new("Notification marquée comme lue")))
}
