//! Job queue abstraction for enqueuing and dequeuing background jobs.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use civicmap_core::error::AppError;
use civicmap_core::result::AppResult;
use civicmap_database::repositories::job::JobRepository;
use civicmap_entity::job::model::Job;
use civicmap_entity::job::status::{JobPriority, JobStatus};

/// Parameters for creating a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreateParams {
    /// Type of job (e.g. `"send_email"`).
    pub job_type: String,
    /// Queue name (e.g. `"mail"`, `"default"`).
    pub queue: String,
    /// Priority level.
    pub priority: JobPriority,
    /// Job payload as JSON.
    pub payload: serde_json::Value,
    /// Maximum attempts before the job is marked failed.
    pub max_attempts: i32,
}

/// Job queue for enqueuing and dequeuing work.
#[derive(Debug, Clone)]
pub struct JobQueue {
    /// Job repository for database persistence.
    repo: Arc<JobRepository>,
    /// Worker identifier for claiming jobs.
    worker_id: String,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(repo: Arc<JobRepository>, worker_id: String) -> Self {
        Self { repo, worker_id }
    }

    /// Enqueue a new job.
    pub async fn enqueue(&self, params: JobCreateParams) -> AppResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_type: params.job_type,
            queue: params.queue,
            priority: params.priority,
            payload: params.payload,
            error_message: None,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: params.max_attempts,
            worker_id: None,
            created_at: now,
            updated_at: now,
        };

        let job = self
            .repo
            .create(&job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue job: {e}")))?;

        debug!(
            job_id = %job.id,
            job_type = %job.job_type,
            queue = %job.queue,
            "Enqueued job"
        );

        Ok(job)
    }

    /// Dequeue the next available job from the specified queues.
    pub async fn dequeue(&self, queues: &[&str]) -> AppResult<Option<Job>> {
        for queue in queues {
            let job = self.repo.claim_next(queue, &self.worker_id).await?;

            if let Some(job) = job {
                debug!(
                    job_id = %job.id,
                    job_type = %job.job_type,
                    queue = %job.queue,
                    "Dequeued job"
                );
                return Ok(Some(job));
            }
        }

        Ok(None)
    }

    /// Mark a job as completed successfully.
    pub async fn complete(&self, job_id: Uuid) -> AppResult<()> {
        self.repo.mark_completed(job_id).await?;
        debug!(job_id = %job_id, "Job completed");
        Ok(())
    }

    /// Mark a job as failed.
    pub async fn fail(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        self.repo.mark_failed(job_id, error).await?;
        debug!(job_id = %job_id, error, "Job failed");
        Ok(())
    }

    /// Put a failed job back in the queue for another attempt.
    pub async fn retry(&self, job_id: Uuid) -> AppResult<()> {
        self.repo.retry(job_id).await?;
        debug!(job_id = %job_id, "Job requeued for retry");
        Ok(())
    }
}
