//! Incident repository — read-only access for the collaboration workflow.

use sqlx::PgPool;

use civicmap_core::error::{AppError, ErrorKind};
use civicmap_core::result::AppResult;
use civicmap_entity::incident::model::Incident;

/// Read-only repository for incident rows.
#[derive(Debug, Clone)]
pub struct IncidentRepository {
    pool: PgPool,
}

impl IncidentRepository {
    /// Create a new incident repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch an incident by id, on any executor (pool or open transaction).
    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> AppResult<Option<Incident>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, Incident>("SELECT * FROM incidents WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch incident", e))
    }

    /// Fetch an incident by id using the repository's own pool.
    pub async fn get(&self, id: i64) -> AppResult<Option<Incident>> {
        self.find_by_id(&self.pool, id).await
    }
}
