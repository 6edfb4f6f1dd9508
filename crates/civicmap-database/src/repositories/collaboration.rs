//! Collaboration repository implementation.

use sqlx::PgPool;

use civicmap_core::error::{AppError, ErrorKind};
use civicmap_core::result::AppResult;
use civicmap_core::types::pagination::{PageRequest, PageResponse};
use civicmap_entity::collaboration::model::{Collaboration, NewCollaboration};
use civicmap_entity::collaboration::status::CollaborationStatus;

/// Repository for collaboration rows.
///
/// `exists_on` and `insert` are generic over the executor so the service can
/// run the whole creation sequence inside one transaction.
#[derive(Debug, Clone)]
pub struct CollaborationRepository {
    pool: PgPool,
}

impl CollaborationRepository {
    /// Create a new collaboration repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a collaboration already exists for an (incident, user) pair.
    pub async fn exists_on<'e, E>(
        &self,
        executor: E,
        incident_id: i64,
        user_id: i64,
    ) -> AppResult<bool>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM collaborations WHERE incident_id = $1 AND user_id = $2)",
        )
        .bind(incident_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check for existing collaboration", e)
        })
    }

    /// Insert a new collaboration with status `pending`.
    ///
    /// A unique-constraint violation on (incident_id, user_id) is mapped to a
    /// conflict error so callers can translate it into the same friendly
    /// message as the pre-check.
    pub async fn insert<'e, E>(&self, executor: E, new: &NewCollaboration) -> AppResult<Collaboration>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, Collaboration>(
            "INSERT INTO collaborations (incident_id, user_id, end_date, motivation, other_option, status) \
             VALUES ($1, $2, $3, $4, $5, 'pending') RETURNING *",
        )
        .bind(new.incident_id)
        .bind(new.user_id)
        .bind(new.end_date)
        .bind(new.motivation.as_deref())
        .bind(new.other_option.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Collaboration already exists for this user and incident")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to insert collaboration", e)
            }
        })
    }

    /// Fetch a collaboration by id.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Collaboration>> {
        sqlx::query_as::<_, Collaboration>("SELECT * FROM collaborations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to fetch collaboration", e)
            })
    }

    /// Set the lifecycle status of a collaboration.
    pub async fn update_status(&self, id: i64, status: CollaborationStatus) -> AppResult<()> {
        sqlx::query("UPDATE collaborations SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update collaboration status", e)
            })?;
        Ok(())
    }

    /// List collaborations visible to a user: the ones they requested plus the
    /// ones on incidents they are responsible for.
    pub async fn find_visible_to(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Collaboration>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM collaborations c \
             LEFT JOIN incidents i ON i.id = c.incident_id \
             WHERE c.user_id = $1 OR i.taken_by = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count collaborations", e)
        })?;

        let rows = sqlx::query_as::<_, Collaboration>(
            "SELECT c.* FROM collaborations c \
             LEFT JOIN incidents i ON i.id = c.incident_id \
             WHERE c.user_id = $1 OR i.taken_by = $1 \
             ORDER BY c.created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list collaborations", e)
        })?;

        Ok(PageResponse::new(rows, page.page, page.page_size, total as u64))
    }
}

/// Check whether a sqlx error is a PostgreSQL unique-constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
