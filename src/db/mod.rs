use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::models::application::{
    ApplicationChanges, ApplicationFilter, ApplicationStats, JobApplication,
};

pub mod memory;
pub mod queries;

pub use memory::MemoryApplicationStore;
pub use queries::PgApplicationStore;

/// Initialize PostgreSQL connection pool
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Persistence for job application records.
///
/// Lists are ordered by `applied_date` descending, ties broken by `id`
/// descending, and `total` counts every filtered row regardless of paging.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, application: &JobApplication) -> Result<JobApplication, sqlx::Error>;

    /// Filtered count plus the requested page of records.
    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<(i64, Vec<JobApplication>), sqlx::Error>;

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>, sqlx::Error>;

    /// Apply `changes`; `None` when the record does not exist.
    async fn update(
        &self,
        id: Uuid,
        changes: &ApplicationChanges,
    ) -> Result<Option<JobApplication>, sqlx::Error>;

    /// Remove a record, returning it so its documents can be cleaned up.
    async fn delete(&self, id: Uuid) -> Result<Option<JobApplication>, sqlx::Error>;

    /// Dashboard counters relative to `today` (UTC).
    async fn stats(&self, today: NaiveDate) -> Result<ApplicationStats, sqlx::Error>;

    /// Connectivity check for health reporting.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

/// Start of the weekly window relative to `today`.
pub(crate) fn week_start(today: NaiveDate) -> NaiveDate {
    today - chrono::Duration::days(7)
}

/// Start of the monthly window relative to `today`.
pub(crate) fn month_start(today: NaiveDate) -> NaiveDate {
    today - chrono::Duration::days(30)
}
