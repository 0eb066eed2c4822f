use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::application::{
    non_blank, ApplicationChanges, ApplicationPage, ApplicationStats, ApplicationStatus,
    CreateApplicationResponse, JobApplication, ListApplicationsQuery, MessageResponse,
    NewApplication, UpdateApplicationRequest, UploadedFile,
};

/// POST /applications/: multipart form with the application fields, a
/// `resume` file and an optional `cover_letter` file.
pub async fn create_application(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CreateApplicationResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let mut new = NewApplication::default();
    let mut resume = None;
    let mut cover_letter = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "resume" || name == "cover_letter" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            let file = UploadedFile {
                filename,
                data: data.to_vec(),
            };
            if name == "resume" {
                resume = Some(file);
            } else if !(file.data.is_empty() && file.filename.is_empty()) {
                cover_letter = Some(file);
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "job_title" => new.job_title = value,
            "company_name" => new.company_name = value,
            "job_description" => new.job_description = value,
            "job_url" => new.job_url = non_blank(Some(value)),
            "referrer_name" => new.referrer_name = non_blank(Some(value)),
            "referrer_email" => new.referrer_email = non_blank(Some(value)),
            "recruiter_name" => new.recruiter_name = non_blank(Some(value)),
            "recruiter_email" => new.recruiter_email = non_blank(Some(value)),
            "my_location" => new.my_location = non_blank(Some(value)),
            "status" => {
                if !value.trim().is_empty() {
                    new.status = ApplicationStatus::parse_input(&value)?;
                }
            }
            "is_tailored" => new.is_tailored = parse_flag(&value)?,
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let application = state
        .applications
        .create(new, resume, cover_letter)
        .await?;

    Ok(Json(CreateApplicationResponse {
        message: "Application created successfully".to_string(),
        id: application.id,
    }))
}

/// GET /applications/: search, filter and paginate.
pub async fn list_applications(
    State(state): State<AppState>,
    query: Result<Query<ListApplicationsQuery>, QueryRejection>,
) -> Result<Json<ApplicationPage>, AppError> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(Json(state.applications.list(query).await?))
}

/// GET /applications/stats: dashboard counters.
pub async fn application_stats(
    State(state): State<AppState>,
) -> Result<Json<ApplicationStats>, AppError> {
    Ok(Json(state.applications.stats().await?))
}

/// GET /applications/{id}
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobApplication>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.applications.get(id).await?))
}

/// PUT /applications/{id}: partial update of the mutable fields.
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateApplicationRequest>, JsonRejection>,
) -> Result<Json<JobApplication>, AppError> {
    let id = parse_id(&id)?;
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let changes = ApplicationChanges::try_from(request)?;
    Ok(Json(state.applications.update(id, changes).await?))
}

/// DELETE /applications/{id}
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    state.applications.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Application deleted successfully".to_string(),
    }))
}

/// Ids that cannot name a record are reported the same way as unknown ids.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::application_not_found())
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" | "" => Ok(false),
        other => Err(AppError::Validation(format!(
            "is_tailored: expected a boolean, got '{other}'"
        ))),
    }
}
