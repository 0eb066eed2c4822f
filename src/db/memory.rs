use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{month_start, week_start, ApplicationStore};
use crate::models::application::{
    ApplicationChanges, ApplicationFilter, ApplicationStats, JobApplication,
};

/// Process-local application store, used when no database is configured.
#[derive(Default)]
pub struct MemoryApplicationStore {
    records: RwLock<HashMap<Uuid, JobApplication>>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, application: &JobApplication) -> Result<JobApplication, sqlx::Error> {
        let mut records = self.records.write().await;
        if records.contains_key(&application.id) {
            return Err(sqlx::Error::Protocol(format!(
                "duplicate application id {}",
                application.id
            )));
        }
        records.insert(application.id, application.clone());
        Ok(application.clone())
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<(i64, Vec<JobApplication>), sqlx::Error> {
        let records = self.records.read().await;
        let mut matching: Vec<&JobApplication> =
            records.values().filter(|app| filter.matches(app)).collect();
        matching.sort_by_key(|app| Reverse((app.applied_date, app.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((total, page))
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>, sqlx::Error> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ApplicationChanges,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|app| {
            app.apply(changes);
            app.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<JobApplication>, sqlx::Error> {
        Ok(self.records.write().await.remove(&id))
    }

    async fn stats(&self, today: NaiveDate) -> Result<ApplicationStats, sqlx::Error> {
        let records = self.records.read().await;
        let week = week_start(today);
        let month = month_start(today);

        let mut stats = ApplicationStats::empty();
        for app in records.values() {
            let day = app.applied_date.date_naive();
            stats.total += 1;
            stats.daily += i64::from(day == today);
            stats.weekly += i64::from(day >= week);
            stats.monthly += i64::from(day >= month);
            *stats.by_status.entry(app.status).or_default() += 1;
        }

        Ok(stats)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
