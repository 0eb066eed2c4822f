use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use uuid::Uuid;

/// Longest value accepted for short text columns (names, emails, location).
pub const MAX_TEXT_LEN: usize = 255;

/// Longest value accepted for URL and path columns.
pub const MAX_URL_LEN: usize = 512;

/// Where an application stands in the hiring pipeline.
///
/// The set is closed: serialized, parsed and stored with exactly these
/// spellings.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Rejected,
    Assessment,
    Interview,
    Offer,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Parse user input into a status, reporting the allowed values on failure.
    pub fn parse_input(raw: &str) -> Result<Self, InputError> {
        raw.trim()
            .parse()
            .map_err(|_| InputError::Status(raw.to_string()))
    }

    fn allowed_values() -> String {
        Self::iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Rejected user input outside of the garde-validated create payload.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid status '{0}'. Must be one of: {allowed}", allowed = ApplicationStatus::allowed_values())]
    Status(String),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub job_url: Option<String>,
    pub resume_path: String,
    pub cover_letter_path: Option<String>,
    pub referrer_name: Option<String>,
    pub referrer_email: Option<String>,
    pub recruiter_name: Option<String>,
    pub recruiter_email: Option<String>,
    pub status: ApplicationStatus,
    pub is_tailored: bool,
    pub my_location: Option<String>,
    pub applied_date: DateTime<Utc>,
}

impl JobApplication {
    /// Stored document paths owned by this record.
    pub fn document_paths(&self) -> Vec<&str> {
        std::iter::once(self.resume_path.as_str())
            .chain(self.cover_letter_path.as_deref())
            .collect()
    }

    /// Apply explicitly provided changes; omitted fields are left untouched.
    pub fn apply(&mut self, changes: &ApplicationChanges) {
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(value) = &changes.referrer_name {
            self.referrer_name = value.clone();
        }
        if let Some(value) = &changes.referrer_email {
            self.referrer_email = value.clone();
        }
        if let Some(value) = &changes.recruiter_name {
            self.recruiter_name = value.clone();
        }
        if let Some(value) = &changes.recruiter_email {
            self.recruiter_email = value.clone();
        }
        if let Some(is_tailored) = changes.is_tailored {
            self.is_tailored = is_tailored;
        }
        if let Some(value) = &changes.my_location {
            self.my_location = value.clone();
        }
    }
}

/// Descriptive fields submitted with a new application.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewApplication {
    #[garde(length(chars, max = 255), custom(not_blank))]
    pub job_title: String,

    #[garde(length(chars, max = 255), custom(not_blank))]
    pub company_name: String,

    #[garde(custom(not_blank))]
    pub job_description: String,

    #[garde(length(chars, max = 512))]
    pub job_url: Option<String>,

    #[garde(length(chars, max = 255))]
    pub referrer_name: Option<String>,

    #[garde(length(chars, max = 255))]
    pub referrer_email: Option<String>,

    #[garde(length(chars, max = 255))]
    pub recruiter_name: Option<String>,

    #[garde(length(chars, max = 255))]
    pub recruiter_email: Option<String>,

    #[garde(length(chars, max = 255))]
    pub my_location: Option<String>,

    #[garde(skip)]
    pub status: ApplicationStatus,

    #[garde(skip)]
    pub is_tailored: bool,
}

fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be empty"));
    }
    Ok(())
}

/// An uploaded document as received from the client.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// JSON body of `PUT /applications/{id}`.
///
/// For the optional text fields, an omitted key leaves the stored value alone,
/// while `null` or `""` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub referrer_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub referrer_email: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub recruiter_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub recruiter_email: Option<Option<String>>,

    #[serde(default)]
    pub is_tailored: Option<bool>,

    #[serde(default, deserialize_with = "present")]
    pub my_location: Option<Option<String>>,
}

/// Marks a key as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validated partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationChanges {
    pub status: Option<ApplicationStatus>,
    pub referrer_name: Option<Option<String>>,
    pub referrer_email: Option<Option<String>>,
    pub recruiter_name: Option<Option<String>>,
    pub recruiter_email: Option<Option<String>>,
    pub is_tailored: Option<bool>,
    pub my_location: Option<Option<String>>,
}

impl ApplicationChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl TryFrom<UpdateApplicationRequest> for ApplicationChanges {
    type Error = InputError;

    fn try_from(req: UpdateApplicationRequest) -> Result<Self, Self::Error> {
        let status = req
            .status
            .as_deref()
            .map(ApplicationStatus::parse_input)
            .transpose()?;

        Ok(Self {
            status,
            referrer_name: clearable("referrer_name", req.referrer_name)?,
            referrer_email: clearable("referrer_email", req.referrer_email)?,
            recruiter_name: clearable("recruiter_name", req.recruiter_name)?,
            recruiter_email: clearable("recruiter_email", req.recruiter_email)?,
            is_tailored: req.is_tailored,
            my_location: clearable("my_location", req.my_location)?,
        })
    }
}

fn clearable(
    field: &'static str,
    value: Option<Option<String>>,
) -> Result<Option<Option<String>>, InputError> {
    match value {
        None => Ok(None),
        Some(inner) => {
            let inner = non_blank(inner);
            if let Some(text) = &inner {
                if text.chars().count() > MAX_TEXT_LEN {
                    return Err(InputError::TooLong {
                        field,
                        max: MAX_TEXT_LEN,
                    });
                }
            }
            Ok(Some(inner))
        }
    }
}

/// Collapse blank text to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Query string of `GET /applications/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListApplicationsQuery {
    #[serde(default)]
    pub skip: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,

    pub search: Option<String>,

    pub status: Option<String>,
}

fn default_limit() -> u32 {
    50
}

/// Normalized list filter handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationFilter {
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl ApplicationFilter {
    /// Case-insensitive substring match across company, title and contact names.
    pub fn matches(&self, application: &JobApplication) -> bool {
        if let Some(status) = self.status {
            if application.status != status {
                return false;
            }
        }

        let Some(search) = &self.search else {
            return true;
        };
        let needle = search.to_lowercase();
        [
            Some(application.company_name.as_str()),
            Some(application.job_title.as_str()),
            application.referrer_name.as_deref(),
            application.recruiter_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }
}

/// One page of list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationPage {
    pub total: i64,
    pub applications: Vec<JobApplication>,
    pub page: i64,
    pub total_pages: i64,
}

impl ApplicationPage {
    pub fn new(total: i64, applications: Vec<JobApplication>, skip: i64, limit: i64) -> Self {
        let limit = limit.max(1);
        Self {
            total,
            applications,
            page: skip / limit + 1,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Dashboard counters over all stored applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: i64,
    pub daily: i64,
    pub weekly: i64,
    pub monthly: i64,
    pub by_status: BTreeMap<ApplicationStatus, i64>,
}

impl ApplicationStats {
    /// Zeroed counters with every status present.
    pub fn empty() -> Self {
        Self {
            total: 0,
            daily: 0,
            weekly: 0,
            monthly: 0,
            by_status: ApplicationStatus::iter().map(|s| (s, 0)).collect(),
        }
    }
}

/// Response of `POST /applications/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateApplicationResponse {
    pub message: String,
    pub id: Uuid,
}

/// Response carrying a human-readable message only.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
