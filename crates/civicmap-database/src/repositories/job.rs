//! Job repository — persistence behind the background queue.

use sqlx::PgPool;
use uuid::Uuid;

use civicmap_core::error::{AppError, ErrorKind};
use civicmap_core::result::AppResult;
use civicmap_entity::job::model::Job;

/// Repository for background job rows.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new job.
    pub async fn create(&self, job: &Job) -> AppResult<Job> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (id, job_type, queue, priority, payload, status, attempts, max_attempts, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(job.id)
        .bind(&job.job_type)
        .bind(&job.queue)
        .bind(job.priority)
        .bind(&job.payload)
        .bind(job.status)
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))
    }

    /// Atomically claim the next pending job in a queue.
    ///
    /// `FOR UPDATE SKIP LOCKED` lets multiple workers poll the same queue
    /// without claiming the same row twice.
    pub async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'running', worker_id = $2, attempts = attempts + 1, updated_at = NOW() \
             WHERE id = (\
                 SELECT id FROM jobs \
                 WHERE queue = $1 AND status = 'pending' \
                 ORDER BY priority DESC, created_at ASC \
                 LIMIT 1 FOR UPDATE SKIP LOCKED\
             ) RETURNING *",
        )
        .bind(queue)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    /// Mark a job as completed.
    pub async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE jobs SET status = 'completed', updated_at = NOW() WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark job completed", e)
            })?;
        Ok(())
    }

    /// Mark a job as failed with an error message.
    pub async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'failed', error_message = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job failed", e))?;
        Ok(())
    }

    /// Put a job back in the queue for another attempt.
    pub async fn retry(&self, job_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'pending', worker_id = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to retry job", e))?;
        Ok(())
    }
}
