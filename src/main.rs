use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

use job_tracker::app_state::AppState;
use job_tracker::config::AppConfig;
use job_tracker::db::{self, ApplicationStore, MemoryApplicationStore, PgApplicationStore};
use job_tracker::routes;
use job_tracker::services::{scraper::JobScraper, storage::DocumentStore};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing job tracker server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);
    routes::metrics::describe_metrics();

    // Record store: Postgres when configured, otherwise process memory
    let store: Arc<dyn ApplicationStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to PostgreSQL database");
            let pool = db::init_pool(database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Running database migrations");
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            Arc::new(PgApplicationStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; applications are kept in memory only");
            Arc::new(MemoryApplicationStore::new())
        }
    };

    // Document storage on local disk
    tracing::info!(upload_dir = %config.upload_dir, "Preparing upload directories");
    let documents = DocumentStore::new(&config.upload_dir);
    documents
        .ensure_layout()
        .await
        .expect("Failed to create upload directories");

    let scraper = JobScraper::new(Duration::from_secs(config.scrape_timeout_secs))
        .expect("Failed to initialize job posting scraper");

    let state = AppState::new(store, documents, scraper);

    let app = routes::router(state, Path::new(&config.upload_dir), config.max_body_bytes)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        );

    tracing::info!("Starting job tracker on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
