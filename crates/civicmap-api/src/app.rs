//! Application bootstrap — wires repositories, services, worker, and router.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::watch;
use tracing::info;

use civicmap_core::config::AppConfig;
use civicmap_core::error::AppError;
use civicmap_core::traits::mailer::Mailer;
use civicmap_database::repositories::collaboration::CollaborationRepository;
use civicmap_database::repositories::incident::IncidentRepository;
use civicmap_database::repositories::job::JobRepository;
use civicmap_database::repositories::notification::NotificationRepository;
use civicmap_database::repositories::user::UserRepository;
use civicmap_service::collaboration::{CollaborationDispatcher, CollaborationService};
use civicmap_service::notification::NotificationService;
use civicmap_worker::executor::JobExecutor;
use civicmap_worker::jobs::email::EmailJobHandler;
use civicmap_worker::mailer::QueuedMailer;
use civicmap_worker::queue::JobQueue;
use civicmap_worker::runner::WorkerRunner;

use crate::router::build_router;
use crate::state::AppState;

/// Runs the Civicmap server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    // ── Repositories ─────────────────────────────────────────────
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let incident_repo = Arc::new(IncidentRepository::new(db_pool.clone()));
    let collab_repo = Arc::new(CollaborationRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));
    let job_repo = Arc::new(JobRepository::new(db_pool.clone()));

    // ── Job queue & mailer ───────────────────────────────────────
    let worker_id = format!("worker-{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let job_queue = Arc::new(JobQueue::new(Arc::clone(&job_repo), worker_id.clone()));
    let mailer: Arc<dyn Mailer> = Arc::new(QueuedMailer::new(
        Arc::clone(&job_queue),
        config.mail.max_attempts,
    ));

    // ── Services ─────────────────────────────────────────────────
    let dispatcher =
        CollaborationDispatcher::new(Arc::clone(&notification_repo), Arc::clone(&mailer));
    let collaboration_service = Arc::new(CollaborationService::new(
        db_pool.clone(),
        Arc::clone(&collab_repo),
        Arc::clone(&incident_repo),
        Arc::clone(&user_repo),
        dispatcher,
    ));
    let notification_service = Arc::new(NotificationService::new(Arc::clone(&notification_repo)));

    // ── Shutdown channel & worker ────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let _worker_handle = if config.worker.enabled {
        let mut job_executor = JobExecutor::new();
        job_executor.register(Arc::new(EmailJobHandler::new(config.mail.clone())));
        let job_executor = Arc::new(job_executor);

        let worker_runner = WorkerRunner::new(
            Arc::clone(&job_queue),
            job_executor,
            config.worker.clone(),
            worker_id,
        );

        let worker_cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            worker_runner.run(worker_cancel).await;
        }))
    } else {
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let app_state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        collaboration_service,
        notification_service,
    };

    let app = build_router(app_state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Civicmap server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
    }
}
