//! Worker runner — main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{error, info, trace, warn};

use civicmap_core::config::worker::WorkerConfig;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Main worker runner that polls queues and executes jobs.
#[derive(Debug)]
pub struct WorkerRunner {
    /// Job queue for polling.
    queue: Arc<JobQueue>,
    /// Job executor for dispatching.
    executor: Arc<JobExecutor>,
    /// Worker configuration.
    config: WorkerConfig,
    /// Worker identifier.
    worker_id: String,
    /// Queues to poll (in priority order).
    queues: Vec<String>,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<JobExecutor>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            executor,
            config,
            worker_id,
            queues: vec!["mail".to_string(), "default".to_string()],
        }
    }

    /// Set the queues to poll.
    pub fn with_queues(mut self, queues: Vec<String>) -> Self {
        self.queues = queues;
        self
    }

    /// Start the worker runner — runs until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            worker_id = %self.worker_id,
            concurrency = self.config.concurrency,
            poll_interval = self.config.poll_interval_seconds,
            queues = ?self.queues,
            "Worker started"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.concurrency));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!(worker_id = %self.worker_id, "Worker received shutdown signal");
                        break;
                    }
                }
                _ = self.poll_and_execute(&semaphore) => {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                info!(worker_id = %self.worker_id, "Worker shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        info!(
            worker_id = %self.worker_id,
            "Worker waiting for in-flight jobs to complete"
        );

        let max_permits = self.config.concurrency as u32;
        let _ = time::timeout(Duration::from_secs(30), semaphore.acquire_many(max_permits)).await;

        info!(worker_id = %self.worker_id, "Worker shut down complete");
    }

    /// Poll for a job and execute it if available.
    async fn poll_and_execute(&self, semaphore: &Arc<tokio::sync::Semaphore>) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                trace!("All worker slots occupied, waiting...");
                return;
            }
        };

        let queue_refs: Vec<&str> = self.queues.iter().map(|s| s.as_str()).collect();

        match self.queue.dequeue(&queue_refs).await {
            Ok(Some(job)) => {
                let queue = Arc::clone(&self.queue);
                let executor = Arc::clone(&self.executor);
                let job_id = job.id;
                let job_type = job.job_type.clone();
                let attempts = job.attempts;
                let max_attempts = job.max_attempts;

                tokio::spawn(async move {
                    let _permit = permit;

                    info!(
                        job_id = %job_id,
                        job_type = %job_type,
                        attempt = attempts,
                        max_attempts,
                        "Processing job"
                    );

                    match executor.execute(&job).await {
                        Ok(_) => {
                            if let Err(e) = queue.complete(job_id).await {
                                error!(job_id = %job_id, error = %e, "Failed to mark job completed");
                            }
                        }
                        Err(JobExecutionError::Transient(msg)) => {
                            warn!(job_id = %job_id, error = %msg, "Job failed (transient)");
                            // attempts was already incremented by the claim.
                            if attempts < max_attempts {
                                if let Err(e) = queue.retry(job_id).await {
                                    error!(job_id = %job_id, error = %e, "Failed to retry job");
                                }
                            } else if let Err(e) = queue.fail(job_id, &msg).await {
                                error!(job_id = %job_id, error = %e, "Failed to mark job failed");
                            }
                        }
                        Err(JobExecutionError::Permanent(msg)) => {
                            error!(job_id = %job_id, error = %msg, "Job failed permanently");
                            if let Err(e) = queue.fail(job_id, &msg).await {
                                error!(job_id = %job_id, error = %e, "Failed to mark job failed");
                            }
                        }
                        Err(JobExecutionError::Internal(err)) => {
                            let msg = err.to_string();
                            error!(job_id = %job_id, error = %msg, "Job internal error");
                            if let Err(e) = queue.fail(job_id, &msg).await {
                                error!(job_id = %job_id, error = %e, "Failed to mark job failed");
                            }
                        }
                    }
                });
            }
            Ok(None) => {
                drop(permit);
                trace!("No jobs available in queues");
            }
            Err(e) => {
                drop(permit);
                error!(error = %e, "Failed to dequeue job");
            }
        }
    }
}
