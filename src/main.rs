//! Civicmap server — civic incident-reporting backend.
//!
//! Main entry point: loads configuration, initializes tracing, runs
//! migrations, and starts the HTTP server plus the background worker.

use tracing_subscriber::EnvFilter;

use civicmap_core::config::AppConfig;
use civicmap_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("CIVICMAP_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    let pool = civicmap_database::connection::create_pool(&config.database).await?;

    civicmap_database::migration::run_migrations(&pool).await?;

    civicmap_api::app::run_server(config, pool).await
}
