//! Collaboration lifecycle controller.
//!
//! Creation runs validation and recipient resolution inside a single
//! transaction so that the missing-recipient rollback can never race a
//! concurrent create for the same (incident, user) pair; the unique
//! constraint stays as the last-resort duplicate guard.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use civicmap_core::error::{AppError, ErrorKind};
use civicmap_core::result::AppResult;
use civicmap_core::types::pagination::{PageRequest, PageResponse};
use civicmap_database::repositories::collaboration::CollaborationRepository;
use civicmap_database::repositories::incident::IncidentRepository;
use civicmap_database::repositories::user::UserRepository;
use civicmap_entity::collaboration::model::{Collaboration, NewCollaboration};
use civicmap_entity::collaboration::status::CollaborationStatus;

use super::dispatch::{CollaborationDispatcher, DispatchPlan, plan_request_dispatch};
use crate::context::RequestContext;

/// A collaboration already exists for this (incident, user) pair.
pub const MSG_DUPLICATE: &str =
    "Une collaboration existe déjà pour cet utilisateur sur cet incident";
/// The proposed end date is not in the future.
pub const MSG_END_DATE: &str = "La date de fin doit être dans le futur";
/// Unknown collaboration id.
pub const MSG_NOT_FOUND: &str = "Collaboration non trouvée";
/// The target incident does not exist.
pub const MSG_UNKNOWN_INCIDENT: &str = "L'incident demandé n'existe pas";
/// Only the requesting user may accept.
pub const MSG_FORBIDDEN_ACCEPT: &str =
    "Vous n'êtes pas autorisé à accepter cette collaboration";
/// The collaboration was already accepted.
pub const MSG_ALREADY_ACCEPTED: &str = "Cette collaboration a déjà été acceptée";
/// The collaboration window has passed.
pub const MSG_EXPIRED: &str = "Cette collaboration a expiré";
/// The responsible party has no email address, so the notify contract
/// cannot be fulfilled.
pub const MSG_UNREACHABLE_RECIPIENT: &str =
    "Le responsable de cet incident ne peut pas être notifié";

/// Input for creating a collaboration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollaboration {
    /// Target incident.
    pub incident_id: i64,
    /// Last day of the proposed collaboration.
    pub end_date: NaiveDate,
    /// Free-text motivation (optional).
    pub motivation: Option<String>,
    /// Free-text alternative proposal (optional).
    pub other_option: Option<String>,
}

/// Manages the collaboration lifecycle: request, accept, decline.
#[derive(Debug, Clone)]
pub struct CollaborationService {
    /// Connection pool, for the transactional creation path.
    pool: PgPool,
    /// Collaboration repository.
    collab_repo: Arc<CollaborationRepository>,
    /// Incident repository (read-only).
    incident_repo: Arc<IncidentRepository>,
    /// User repository (read-only).
    user_repo: Arc<UserRepository>,
    /// Side-effect dispatcher.
    dispatcher: CollaborationDispatcher,
}

impl CollaborationService {
    /// Creates a new collaboration service.
    pub fn new(
        pool: PgPool,
        collab_repo: Arc<CollaborationRepository>,
        incident_repo: Arc<IncidentRepository>,
        user_repo: Arc<UserRepository>,
        dispatcher: CollaborationDispatcher,
    ) -> Self {
        Self {
            pool,
            collab_repo,
            incident_repo,
            user_repo,
            dispatcher,
        }
    }

    /// Create a collaboration request on behalf of the authenticated caller.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateCollaboration,
    ) -> AppResult<Collaboration> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        if self
            .collab_repo
            .exists_on(&mut *tx, req.incident_id, ctx.user_id)
            .await?
        {
            return Err(AppError::validation(MSG_DUPLICATE));
        }

        validate_end_date(req.end_date, Utc::now().date_naive())?;

        let incident = self
            .incident_repo
            .find_by_id(&mut *tx, req.incident_id)
            .await?
            .ok_or_else(|| AppError::validation(MSG_UNKNOWN_INCIDENT))?;

        let requester = self
            .user_repo
            .find_by_id(&mut *tx, ctx.user_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("Authenticated user {} not found", ctx.user_id))
            })?;

        let new = NewCollaboration {
            incident_id: req.incident_id,
            user_id: ctx.user_id,
            end_date: req.end_date,
            motivation: req.motivation,
            other_option: req.other_option,
        };
        let collaboration = self
            .collab_repo
            .insert(&mut *tx, &new)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Conflict => AppError::validation(MSG_DUPLICATE),
                _ => e,
            })?;

        let recipient = match incident.taken_by {
            Some(recipient_id) => self.user_repo.find_by_id(&mut *tx, recipient_id).await?,
            None => None,
        };
        let plan = plan_request_dispatch(&incident, recipient.as_ref(), &requester);

        if let DispatchPlan::MissingEmail { recipient_id } = plan {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
            })?;
            warn!(
                incident_id = incident.id,
                user_id = ctx.user_id,
                recipient_id,
                "Responsible party has no email address, collaboration request rolled back"
            );
            return Err(AppError::conflict(MSG_UNREACHABLE_RECIPIENT));
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        info!(
            collaboration_id = collaboration.id,
            incident_id = collaboration.incident_id,
            user_id = collaboration.user_id,
            "Collaboration requested"
        );

        self.dispatcher.dispatch_request(&collaboration, plan).await;

        Ok(collaboration)
    }

    /// Accept a collaboration. Only the original requesting user may accept.
    pub async fn accept(
        &self,
        ctx: &RequestContext,
        collaboration_id: i64,
    ) -> AppResult<Collaboration> {
        let collaboration = self
            .collab_repo
            .find_by_id(collaboration_id)
            .await?
            .ok_or_else(|| AppError::not_found(MSG_NOT_FOUND))?;

        accept_guard(&collaboration, ctx.user_id, Utc::now().date_naive())?;

        self.collab_repo
            .update_status(collaboration.id, CollaborationStatus::Accepted)
            .await?;

        info!(
            collaboration_id = collaboration.id,
            user_id = ctx.user_id,
            "Collaboration accepted"
        );

        Ok(Collaboration {
            status: CollaborationStatus::Accepted,
            ..collaboration
        })
    }

    /// Decline a collaboration (administrative path, not caller-gated).
    ///
    /// Unconditional once the record is found: the status flips to
    /// `declined` and the requesting user is emailed. No in-app
    /// notification row persists after a decline.
    pub async fn decline(&self, collaboration_id: i64) -> AppResult<Collaboration> {
        let collaboration = self
            .collab_repo
            .find_by_id(collaboration_id)
            .await?
            .ok_or_else(|| AppError::not_found(MSG_NOT_FOUND))?;

        self.collab_repo
            .update_status(collaboration.id, CollaborationStatus::Declined)
            .await?;

        let declined = Collaboration {
            status: CollaborationStatus::Declined,
            ..collaboration
        };

        info!(
            collaboration_id = declined.id,
            user_id = declined.user_id,
            "Collaboration declined"
        );

        match self.user_repo.get(declined.user_id).await {
            Ok(Some(requester)) => {
                self.dispatcher.dispatch_decline(&declined, &requester).await;
            }
            Ok(None) => {
                warn!(
                    collaboration_id = declined.id,
                    user_id = declined.user_id,
                    "Requesting user no longer exists, skipping decline email"
                );
            }
            Err(e) => {
                warn!(
                    collaboration_id = declined.id,
                    error = %e,
                    "Failed to load requesting user, skipping decline email"
                );
            }
        }

        Ok(declined)
    }

    /// List collaborations visible to the caller: requested by them or on
    /// incidents they are responsible for.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Collaboration>> {
        self.collab_repo.find_visible_to(ctx.user_id, &page).await
    }
}

/// The end date must be strictly in the future at creation time.
fn validate_end_date(end_date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if end_date <= today {
        return Err(AppError::validation(MSG_END_DATE));
    }
    Ok(())
}

/// Preconditions for the accept transition, checked in order.
fn accept_guard(collaboration: &Collaboration, caller_id: i64, today: NaiveDate) -> AppResult<()> {
    if collaboration.user_id != caller_id {
        return Err(AppError::forbidden(MSG_FORBIDDEN_ACCEPT));
    }
    if collaboration.status == CollaborationStatus::Accepted {
        return Err(AppError::validation(MSG_ALREADY_ACCEPTED));
    }
    if collaboration.is_expired(today) {
        return Err(AppError::validation(MSG_EXPIRED));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn collaboration(
        user_id: i64,
        status: CollaborationStatus,
        end_date: NaiveDate,
    ) -> Collaboration {
        Collaboration {
            id: 1,
            incident_id: 10,
            user_id,
            created_at: Utc::now(),
            end_date,
            motivation: None,
            other_option: None,
            status,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        today().succ_opt().unwrap()
    }

    #[test]
    fn test_end_date_must_be_strictly_future() {
        assert!(validate_end_date(tomorrow(), today()).is_ok());

        let err = validate_end_date(today(), today()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, MSG_END_DATE);

        assert!(validate_end_date(today().pred_opt().unwrap(), today()).is_err());
    }

    #[test]
    fn test_accept_requires_requesting_user() {
        let collab = collaboration(1, CollaborationStatus::Pending, tomorrow());
        let err = accept_guard(&collab, 2, today()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert_eq!(err.message, MSG_FORBIDDEN_ACCEPT);
    }

    #[test]
    fn test_accept_rejects_already_accepted() {
        let collab = collaboration(1, CollaborationStatus::Accepted, tomorrow());
        let err = accept_guard(&collab, 1, today()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, MSG_ALREADY_ACCEPTED);
    }

    #[test]
    fn test_accept_rejects_expired() {
        let collab = collaboration(1, CollaborationStatus::Pending, today());
        let err = accept_guard(&collab, 1, today()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, MSG_EXPIRED);
    }

    #[test]
    fn test_accept_allows_pending_and_future() {
        let collab = collaboration(1, CollaborationStatus::Pending, tomorrow());
        assert!(accept_guard(&collab, 1, today()).is_ok());
    }

    #[test]
    fn test_accept_allows_previously_declined() {
        // The guard mirrors the source: only `accepted` blocks the transition.
        let collab = collaboration(1, CollaborationStatus::Declined, tomorrow());
        assert!(accept_guard(&collab, 1, today()).is_ok());
    }

    #[test]
    fn test_wrong_caller_checked_before_state() {
        // Precondition order: authorization comes before state conflicts.
        let collab = collaboration(1, CollaborationStatus::Accepted, today());
        let err = accept_guard(&collab, 2, today()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
