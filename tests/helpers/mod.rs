//! Test helper utilities for driving the router in-process
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use job_tracker::app_state::AppState;
use job_tracker::db::MemoryApplicationStore;
use job_tracker::routes;
use job_tracker::services::{scraper::JobScraper, storage::DocumentStore};

use crate::fixtures::{ApplicationFixture, RESUME_BYTES};

const BOUNDARY: &str = "job-tracker-test-boundary";

/// Router over an in-memory store, with uploads in a temporary directory.
pub struct TestApp {
    pub router: Router,
    pub uploads: TempDir,
}

pub fn test_app() -> TestApp {
    let uploads = TempDir::new().expect("Failed to create temp dir");
    let documents = DocumentStore::new(uploads.path());
    let scraper = JobScraper::new(Duration::from_secs(5)).expect("Failed to build scraper");
    let state = AppState::new(Arc::new(MemoryApplicationStore::new()), documents, scraper);
    let router = routes::router(state, uploads.path(), 10 * 1024 * 1024);

    TestApp { router, uploads }
}

impl TestApp {
    /// Send a request and return the status with the raw body.
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, body)
    }

    /// Send a request and parse the body as JSON.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send_raw(request).await;
        let json = serde_json::from_slice(&body)
            .unwrap_or_else(|_| panic!("Non-JSON body: {}", String::from_utf8_lossy(&body)));
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(empty_request(Method::GET, uri)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(empty_request(Method::DELETE, uri)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::PUT, uri, &body)).await
    }

    /// Create an application from a fixture with a resume attached.
    pub async fn create(&self, fixture: &ApplicationFixture) -> Uuid {
        let request = multipart_request(
            "/applications/",
            &fixture.fields(),
            &[("resume", "resume.pdf", RESUME_BYTES)],
        );
        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("create response has an id")
    }
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Build a `multipart/form-data` POST from text fields and
/// `(field, filename, contents)` files.
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("valid request")
}
