//! Collaboration handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use validator::Validate;

use civicmap_core::error::AppError;
use civicmap_core::types::pagination::PageResponse;
use civicmap_entity::collaboration::model::Collaboration;

use crate::dto::request::{CollaborationActionRequest, CreateCollaborationRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/collaborations
pub async fn create_collaboration(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateCollaborationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Collaboration>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let collaboration = state
        .collaboration_service
        .create(&auth, req.into_input())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(collaboration))))
}

/// GET /api/collaborations
pub async fn list_collaborations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Collaboration>>>, ApiError> {
    let page = state
        .collaboration_service
        .list(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/collaborations/accept
pub async fn accept_collaboration(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CollaborationActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .collaboration_service
        .accept(&auth, req.collaboration_id)
        .await?;
    Ok(Json(MessageResponse::new("Collaboration acceptée avec succès")))
}

/// POST /api/collaborations/decline
pub async fn decline_collaboration(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CollaborationActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .collaboration_service
        .decline(req.collaboration_id)
        .await?;
    Ok(Json(MessageResponse::new("Collaboration déclinée")))
}
