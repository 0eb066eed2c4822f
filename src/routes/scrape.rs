use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::application::MAX_URL_LEN;
use crate::models::scrape::{ScrapeRequest, ScrapedJob};

/// POST /scrape: fetch a job posting and guess its title, company and
/// description for pre-filling the application form.
pub async fn scrape_job(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapedJob>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url must not be empty".into()));
    }
    if request.url.len() > MAX_URL_LEN {
        return Err(AppError::Validation(format!(
            "url must be at most {MAX_URL_LEN} characters"
        )));
    }

    metrics::counter!("scrape_requests_total").increment(1);
    match state.scraper.scrape(&request.url).await {
        Ok(job) => Ok(Json(job)),
        Err(e) => {
            metrics::counter!("scrape_failures_total").increment(1);
            Err(e.into())
        }
    }
}
