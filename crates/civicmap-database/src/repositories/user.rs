//! User repository — read-only access for the collaboration workflow.

use sqlx::PgPool;

use civicmap_core::error::{AppError, ErrorKind};
use civicmap_core::result::AppResult;
use civicmap_entity::user::model::User;

/// Read-only repository for user rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a user by id, on any executor (pool or open transaction).
    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> AppResult<Option<User>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch user", e))
    }

    /// Fetch a user by id using the repository's own pool.
    pub async fn get(&self, id: i64) -> AppResult<Option<User>> {
        self.find_by_id(&self.pool, id).await
    }
}
