use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::services::storage::UPLOADS_PREFIX;

pub mod applications;
pub mod health;
pub mod metrics;
pub mod scrape;

/// Build the HTTP API: application CRUD, scraping, health and the static
/// mount serving stored documents from `upload_dir`.
///
/// `max_body_bytes` bounds JSON bodies. Document uploads are not size-limited.
pub fn router(state: AppState, upload_dir: &Path, max_body_bytes: usize) -> Router {
    let collection = get(applications::list_applications)
        .post(applications::create_application.layer(DefaultBodyLimit::disable()));
    let item = get(applications::get_application)
        .put(applications::update_application)
        .delete(applications::delete_application);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/applications", collection.clone())
        .route("/applications/", collection)
        .route("/applications/stats", get(applications::application_stats))
        .route("/applications/{id}", item)
        .route("/scrape", post(scrape::scrape_job))
        .nest_service(&format!("/{UPLOADS_PREFIX}"), ServeDir::new(upload_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_body_bytes))
}
