//! Job executor — dispatches jobs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use civicmap_core::error::AppError;
use civicmap_entity::job::model::Job;

/// Trait for job handler implementations.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes.
    fn job_type(&self) -> &str;

    /// Execute the job with the given payload.
    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution.
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure — do not retry.
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure — may retry.
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches jobs to the appropriate handler based on `job_type`.
#[derive(Debug, Default)]
pub struct JobExecutor {
    /// Registered job handlers by type.
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a job handler.
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        info!(job_type = %job_type, "Registered job handler");
        self.handlers.insert(job_type, handler);
    }

    /// Execute a job by dispatching to the correct handler.
    pub async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let handler = self.handlers.get(&job.job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                job.job_type
            ))
        })?;

        handler.execute(job).await
    }

    /// Check if a handler is registered for a job type.
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use civicmap_entity::job::status::{JobPriority, JobStatus};
    use uuid::Uuid;

    #[derive(Debug)]
    struct EchoHandler;

    #[async_trait]
    impl JobHandler for EchoHandler {
        fn job_type(&self) -> &str {
            "echo"
        }

        async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
            Ok(Some(job.payload.clone()))
        }
    }

    fn job(job_type: &str) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            job_type: job_type.to_string(),
            queue: "default".to_string(),
            priority: JobPriority::Normal,
            payload: serde_json::json!({"ping": "pong"}),
            error_message: None,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: 3,
            worker_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_dispatches_to_registered_handler() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(EchoHandler));
        assert!(executor.has_handler("echo"));

        let result = executor.execute(&job("echo")).await.unwrap();
        assert_eq!(result, Some(serde_json::json!({"ping": "pong"})));
    }

    #[tokio::test]
    async fn test_unknown_job_type_is_permanent_failure() {
        let executor = JobExecutor::new();
        let err = executor.execute(&job("mystery")).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
