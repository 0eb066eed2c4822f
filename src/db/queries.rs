use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{month_start, week_start, ApplicationStore};
use crate::models::application::{
    ApplicationChanges, ApplicationFilter, ApplicationStats, ApplicationStatus, JobApplication,
};

const COLUMNS: &str = "id, company_name, job_title, job_description, job_url, resume_path, \
     cover_letter_path, referrer_name, referrer_email, recruiter_name, recruiter_email, \
     status, is_tailored, my_location, applied_date";

/// Postgres-backed application store.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn application_from_row(row: &PgRow) -> Result<JobApplication, sqlx::Error> {
    let status_str: String = row.try_get("status")?;
    let status = status_str
        .parse::<ApplicationStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(JobApplication {
        id: row.try_get("id")?,
        company_name: row.try_get("company_name")?,
        job_title: row.try_get("job_title")?,
        job_description: row.try_get("job_description")?,
        job_url: row.try_get("job_url")?,
        resume_path: row.try_get("resume_path")?,
        cover_letter_path: row.try_get("cover_letter_path")?,
        referrer_name: row.try_get("referrer_name")?,
        referrer_email: row.try_get("referrer_email")?,
        recruiter_name: row.try_get("recruiter_name")?,
        recruiter_email: row.try_get("recruiter_email")?,
        status,
        is_tailored: row.try_get("is_tailored")?,
        my_location: row.try_get("my_location")?,
        applied_date: row.try_get("applied_date")?,
    })
}

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ApplicationFilter) {
    qb.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (");
        let mut columns = qb.separated(" OR ");
        for column in ["company_name", "job_title", "referrer_name", "recruiter_name"] {
            columns.push(format!("{column} ILIKE "));
            columns.push_bind_unseparated(pattern.clone());
        }
        qb.push(")");
    }

    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status.as_str());
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, application: &JobApplication) -> Result<JobApplication, sqlx::Error> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO job_applications (
                id, company_name, job_title, job_description, job_url, resume_path,
                cover_letter_path, referrer_name, referrer_email, recruiter_name,
                recruiter_email, status, is_tailored, my_location, applied_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(application.id)
        .bind(&application.company_name)
        .bind(&application.job_title)
        .bind(&application.job_description)
        .bind(&application.job_url)
        .bind(&application.resume_path)
        .bind(&application.cover_letter_path)
        .bind(&application.referrer_name)
        .bind(&application.referrer_email)
        .bind(&application.recruiter_name)
        .bind(&application.recruiter_email)
        .bind(application.status.as_str())
        .bind(application.is_tailored)
        .bind(&application.my_location)
        .bind(application.applied_date)
        .fetch_one(&self.pool)
        .await?;

        application_from_row(&row)
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<(i64, Vec<JobApplication>), sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM job_applications");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM job_applications"));
        push_filters(&mut select, filter);
        select.push(" ORDER BY applied_date DESC, id DESC LIMIT ");
        select.push_bind(filter.limit);
        select.push(" OFFSET ");
        select.push_bind(filter.skip);

        let rows = select.build().fetch_all(&self.pool).await?;
        let applications = rows
            .iter()
            .map(application_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, applications))
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM job_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(application_from_row).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ApplicationChanges,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE job_applications SET ");
        let mut sets = qb.separated(", ");
        if let Some(status) = changes.status {
            sets.push("status = ");
            sets.push_bind_unseparated(status.as_str());
        }
        let text_columns = [
            ("referrer_name", &changes.referrer_name),
            ("referrer_email", &changes.referrer_email),
            ("recruiter_name", &changes.recruiter_name),
            ("recruiter_email", &changes.recruiter_email),
            ("my_location", &changes.my_location),
        ];
        for (column, value) in text_columns {
            if let Some(value) = value {
                sets.push(format!("{column} = "));
                sets.push_bind_unseparated(value.clone());
            }
        }
        if let Some(is_tailored) = changes.is_tailored {
            sets.push("is_tailored = ");
            sets.push_bind_unseparated(is_tailored);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {COLUMNS}"));

        let row = qb.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(application_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<Option<JobApplication>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "DELETE FROM job_applications WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(application_from_row).transpose()
    }

    async fn stats(&self, today: NaiveDate) -> Result<ApplicationStats, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE (applied_date AT TIME ZONE 'UTC')::date = $1) AS daily,
                   COUNT(*) FILTER (WHERE (applied_date AT TIME ZONE 'UTC')::date >= $2) AS weekly,
                   COUNT(*) FILTER (WHERE (applied_date AT TIME ZONE 'UTC')::date >= $3) AS monthly
            FROM job_applications
            "#,
        )
        .bind(today)
        .bind(week_start(today))
        .bind(month_start(today))
        .fetch_one(&self.pool)
        .await?;

        let mut stats = ApplicationStats::empty();
        stats.total = row.try_get("total")?;
        stats.daily = row.try_get("daily")?;
        stats.weekly = row.try_get("weekly")?;
        stats.monthly = row.try_get("monthly")?;

        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM job_applications GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            let status_str: String = row.try_get("status")?;
            match status_str.parse::<ApplicationStatus>() {
                Ok(status) => {
                    stats.by_status.insert(status, row.try_get("count")?);
                }
                Err(_) => tracing::warn!(status = %status_str, "ignoring unknown status in stats"),
            }
        }

        Ok(stats)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
