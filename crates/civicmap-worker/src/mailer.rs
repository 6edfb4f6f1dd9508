//! Queue-backed implementation of the [`Mailer`] seam.

use std::sync::Arc;

use async_trait::async_trait;

use civicmap_core::result::AppResult;
use civicmap_core::traits::mailer::{EmailMessage, Mailer};
use civicmap_entity::job::status::JobPriority;

use crate::jobs::email::SEND_EMAIL_JOB;
use crate::queue::{JobCreateParams, JobQueue};

/// Queue name for outbound mail jobs.
pub const MAIL_QUEUE: &str = "mail";

/// A [`Mailer`] that persists each message as a `send_email` job.
///
/// Enqueue is synchronous (a single insert); delivery happens later in the
/// worker with the queue's retry policy.
#[derive(Debug, Clone)]
pub struct QueuedMailer {
    /// Backing job queue.
    queue: Arc<JobQueue>,
    /// Delivery attempts per message.
    max_attempts: i32,
}

impl QueuedMailer {
    /// Creates a new queue-backed mailer.
    pub fn new(queue: Arc<JobQueue>, max_attempts: i32) -> Self {
        Self {
            queue,
            max_attempts,
        }
    }
}

#[async_trait]
impl Mailer for QueuedMailer {
    async fn enqueue(&self, message: &EmailMessage) -> AppResult<()> {
        let params = JobCreateParams {
            job_type: SEND_EMAIL_JOB.to_string(),
            queue: MAIL_QUEUE.to_string(),
            priority: JobPriority::Normal,
            payload: serde_json::to_value(message)?,
            max_attempts: self.max_attempts,
        };

        self.queue.enqueue(params).await?;
        Ok(())
    }
}
