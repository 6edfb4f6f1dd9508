//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use civicmap_core::config::AppConfig;
use civicmap_service::collaboration::CollaborationService;
use civicmap_service::notification::NotificationService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Collaboration lifecycle service.
    pub collaboration_service: Arc<CollaborationService>,
    /// Notification service.
    pub notification_service: Arc<NotificationService>,
}
