use serde::{Deserialize, Serialize};

/// Title used when no extractor finds a job title.
pub const UNKNOWN_POSITION: &str = "Unknown Position";

/// Company used when no extractor finds an employer.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Description used when neither the extractors nor the page body yield text.
pub const NO_DESCRIPTION: &str = "No description available";

/// Request to pre-fill an application from a job posting URL.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// Fields extracted from a job posting. Every field is always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedJob {
    pub job_title: String,
    pub company_name: String,
    pub job_description: String,
}
