use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Register descriptions for the counters this service emits.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "applications_created_total",
        "Job applications created"
    );
    metrics::describe_counter!(
        "applications_deleted_total",
        "Job applications deleted"
    );
    metrics::describe_counter!(
        "scrape_requests_total",
        "Job posting scrape requests received"
    );
    metrics::describe_counter!(
        "scrape_failures_total",
        "Job posting scrape requests that failed"
    );
}

/// GET /metrics: Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
