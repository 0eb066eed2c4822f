use std::sync::Arc;

use crate::db::ApplicationStore;
use crate::services::{applications::ApplicationService, scraper::JobScraper, storage::DocumentStore};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub applications: ApplicationService,
    pub scraper: Arc<JobScraper>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        documents: DocumentStore,
        scraper: JobScraper,
    ) -> Self {
        Self {
            applications: ApplicationService::new(store, Arc::new(documents)),
            scraper: Arc::new(scraper),
        }
    }
}
