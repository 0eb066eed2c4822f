use std::sync::Arc;

use chrono::Utc;
use garde::Validate;
use uuid::Uuid;

use crate::db::ApplicationStore;
use crate::error::AppError;
use crate::models::application::{
    non_blank, ApplicationChanges, ApplicationFilter, ApplicationPage, ApplicationStats,
    ApplicationStatus, JobApplication, ListApplicationsQuery, NewApplication, UploadedFile,
};
use crate::services::storage::{DocumentKind, DocumentStore};

/// Largest page a single list call returns.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Record store operations tying the database rows to their documents.
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
    documents: Arc<DocumentStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn ApplicationStore>, documents: Arc<DocumentStore>) -> Self {
        Self { store, documents }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Persist the uploaded documents, then the record referencing them.
    ///
    /// Nothing is inserted if a document cannot be written; documents written
    /// for a failed request are removed again.
    pub async fn create(
        &self,
        new: NewApplication,
        resume: Option<UploadedFile>,
        cover_letter: Option<UploadedFile>,
    ) -> Result<JobApplication, AppError> {
        new.validate()?;
        let resume = resume
            .filter(|file| !file.data.is_empty())
            .ok_or_else(|| AppError::Validation("resume: a non-empty file is required".into()))?;

        let id = Uuid::now_v7();
        let resume_path = self
            .documents
            .store(DocumentKind::Resume, &resume.filename, &resume.data, id)
            .await?;

        let cover_letter_path = match cover_letter {
            Some(file) => {
                match self
                    .documents
                    .store(DocumentKind::CoverLetter, &file.filename, &file.data, id)
                    .await
                {
                    Ok(path) => Some(path),
                    Err(e) => {
                        self.discard_documents(id, &[resume_path.as_str()]).await;
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        let application = JobApplication {
            id,
            company_name: new.company_name.trim().to_string(),
            job_title: new.job_title.trim().to_string(),
            job_description: new.job_description,
            job_url: non_blank(new.job_url),
            resume_path,
            cover_letter_path,
            referrer_name: non_blank(new.referrer_name),
            referrer_email: non_blank(new.referrer_email),
            recruiter_name: non_blank(new.recruiter_name),
            recruiter_email: non_blank(new.recruiter_email),
            status: new.status,
            is_tailored: new.is_tailored,
            my_location: non_blank(new.my_location),
            applied_date: Utc::now(),
        };

        match self.store.insert(&application).await {
            Ok(saved) => {
                metrics::counter!("applications_created_total").increment(1);
                tracing::info!(
                    application_id = %saved.id,
                    company = %saved.company_name,
                    job_title = %saved.job_title,
                    "application created"
                );
                Ok(saved)
            }
            Err(e) => {
                self.discard_documents(id, &application.document_paths())
                    .await;
                Err(e.into())
            }
        }
    }

    /// Filtered, newest-first page of applications.
    pub async fn list(&self, query: ListApplicationsQuery) -> Result<ApplicationPage, AppError> {
        if query.limit == 0 || query.limit > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        let status = non_blank(query.status)
            .as_deref()
            .map(ApplicationStatus::parse_input)
            .transpose()?;

        let filter = ApplicationFilter {
            search: non_blank(query.search).map(|s| s.trim().to_string()),
            status,
            skip: i64::from(query.skip),
            limit: i64::from(query.limit),
        };

        let (total, applications) = self.store.list(&filter).await?;
        tracing::debug!(total, returned = applications.len(), "listed applications");

        Ok(ApplicationPage::new(
            total,
            applications,
            filter.skip,
            filter.limit,
        ))
    }

    pub async fn get(&self, id: Uuid) -> Result<JobApplication, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(AppError::application_not_found)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: ApplicationChanges,
    ) -> Result<JobApplication, AppError> {
        let updated = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(AppError::application_not_found)?;

        tracing::info!(application_id = %id, status = %updated.status, "application updated");
        Ok(updated)
    }

    /// Remove the record, then best-effort remove its documents.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self
            .store
            .delete(id)
            .await?
            .ok_or_else(AppError::application_not_found)?;

        self.discard_documents(id, &removed.document_paths()).await;
        metrics::counter!("applications_deleted_total").increment(1);
        tracing::info!(application_id = %id, "application deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<ApplicationStats, AppError> {
        Ok(self.store.stats(Utc::now().date_naive()).await?)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        Ok(self.store.ping().await?)
    }

    async fn discard_documents(&self, id: Uuid, paths: &[&str]) {
        for path in paths {
            if let Err(e) = self.documents.delete(path).await {
                tracing::warn!(application_id = %id, path, error = %e, "failed to remove document");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryApplicationStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn service(temp: &TempDir) -> ApplicationService {
        ApplicationService::new(
            Arc::new(MemoryApplicationStore::new()),
            Arc::new(DocumentStore::new(temp.path())),
        )
    }

    fn new_application(company: &str) -> NewApplication {
        NewApplication {
            job_title: "Platform Engineer".to_string(),
            company_name: company.to_string(),
            job_description: "Keep the lights on".to_string(),
            referrer_name: Some(String::new()),
            ..Default::default()
        }
    }

    fn resume() -> Option<UploadedFile> {
        Some(UploadedFile {
            filename: "cv.pdf".to_string(),
            data: b"%PDF-1.4".to_vec(),
        })
    }

    /// Store whose inserts always fail; reads behave as an empty store.
    struct FailingInsertStore;

    #[async_trait::async_trait]
    impl ApplicationStore for FailingInsertStore {
        async fn insert(&self, _: &JobApplication) -> Result<JobApplication, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn list(
            &self,
            _: &ApplicationFilter,
        ) -> Result<(i64, Vec<JobApplication>), sqlx::Error> {
            Ok((0, Vec::new()))
        }

        async fn get(&self, _: Uuid) -> Result<Option<JobApplication>, sqlx::Error> {
            Ok(None)
        }

        async fn update(
            &self,
            _: Uuid,
            _: &ApplicationChanges,
        ) -> Result<Option<JobApplication>, sqlx::Error> {
            Ok(None)
        }

        async fn delete(&self, _: Uuid) -> Result<Option<JobApplication>, sqlx::Error> {
            Ok(None)
        }

        async fn stats(&self, _: NaiveDate) -> Result<ApplicationStats, sqlx::Error> {
            Ok(ApplicationStats::empty())
        }

        async fn ping(&self) -> Result<(), sqlx::Error> {
            Ok(())
        }
    }

    fn query() -> ListApplicationsQuery {
        ListApplicationsQuery {
            skip: 0,
            limit: 50,
            search: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_stores_documents_under_record_id() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);
        let cover = Some(UploadedFile {
            filename: "letter.docx".to_string(),
            data: b"hello".to_vec(),
        });

        let app = svc
            .create(new_application("Acme"), resume(), cover)
            .await
            .unwrap();

        assert_eq!(app.resume_path, format!("uploads/resumes/{}_resume.pdf", app.id));
        assert_eq!(
            app.cover_letter_path,
            Some(format!("uploads/cover_letters/{}_cover_letter.docx", app.id))
        );
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert_eq!(app.referrer_name, None);
        assert!(temp
            .path()
            .join(format!("resumes/{}_resume.pdf", app.id))
            .exists());
    }

    #[tokio::test]
    async fn test_create_requires_resume_contents() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);

        let empty = Some(UploadedFile {
            filename: "cv.pdf".to_string(),
            data: Vec::new(),
        });
        let err = svc
            .create(new_application("Acme"), empty, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = svc
            .create(new_application("Acme"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(svc.list(query()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_company_without_writing_files() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);

        let err = svc
            .create(new_application(" "), resume(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!temp.path().join("resumes").exists());
    }

    #[tokio::test]
    async fn test_failed_insert_removes_written_documents() {
        let temp = TempDir::new().unwrap();
        let svc = ApplicationService::new(
            Arc::new(FailingInsertStore),
            Arc::new(DocumentStore::new(temp.path())),
        );
        let cover = Some(UploadedFile {
            filename: "letter.txt".to_string(),
            data: b"hello".to_vec(),
        });

        let err = svc
            .create(new_application("Acme"), resume(), cover)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        for dir in ["resumes", "cover_letters"] {
            let left = std::fs::read_dir(temp.path().join(dir))
                .map(|entries| entries.count())
                .unwrap_or(0);
            assert_eq!(left, 0, "{dir} still holds documents");
        }
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);

        let mut ids = std::collections::HashSet::new();
        for _ in 0..20 {
            let app = svc
                .create(new_application("Acme"), resume(), None)
                .await
                .unwrap();
            assert!(ids.insert(app.id));
        }
    }

    #[tokio::test]
    async fn test_list_rejects_out_of_range_limit_and_unknown_status() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);

        let mut q = query();
        q.limit = 0;
        assert!(matches!(svc.list(q).await, Err(AppError::Validation(_))));

        let mut q = query();
        q.limit = MAX_PAGE_SIZE + 1;
        assert!(matches!(svc.list(q).await, Err(AppError::Validation(_))));

        let mut q = query();
        q.status = Some("Hired".to_string());
        assert!(matches!(svc.list(q).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_documents_and_is_not_repeatable() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);

        let app = svc
            .create(new_application("Acme"), resume(), None)
            .await
            .unwrap();
        let on_disk = svc.documents().resolve(&app.resume_path).unwrap();
        assert!(on_disk.exists());

        svc.delete(app.id).await.unwrap();
        assert!(!on_disk.exists());
        assert!(matches!(svc.get(app.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(app.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_document_already_gone() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);

        let app = svc
            .create(new_application("Acme"), resume(), None)
            .await
            .unwrap();
        std::fs::remove_file(svc.documents().resolve(&app.resume_path).unwrap()).unwrap();

        svc.delete(app.id).await.unwrap();
    }
}
