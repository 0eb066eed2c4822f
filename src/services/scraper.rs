//! Job posting scraper.
//!
//! Fetches a job posting and guesses its title, company and description by
//! walking a short, ordered list of extractors per field. The first extractor
//! that produces non-empty text wins; when none does, a fixed placeholder is
//! used so callers always receive three populated fields.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::models::scrape::{ScrapedJob, NO_DESCRIPTION, UNKNOWN_COMPANY, UNKNOWN_POSITION};

static TITLE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)title|job-title|position").expect("valid regex"));
static COMPANY_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)company|employer|organization").expect("valid regex"));
static DESCRIPTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)description|job-description|details").expect("valid regex"));

static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static WITH_CLASS: LazyLock<Selector> = LazyLock::new(|| selector("[class]"));
static WITH_ID: LazyLock<Selector> = LazyLock::new(|| selector("[id]"));
static HIRING_ORGANIZATION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[itemprop="hiringOrganization"]"#));
static ITEMPROP_NAME: LazyLock<Selector> = LazyLock::new(|| selector(r#"[itemprop="name"]"#));
static ITEMPROP_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[itemprop="description"]"#));
static MAIN_CONTENT: LazyLock<[Selector; 3]> =
    LazyLock::new(|| [selector("main"), selector("article"), selector("div.content")]);

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// One heuristic in a field's fallback chain.
type Extractor = fn(&Html) -> Option<String>;

const TITLE_EXTRACTORS: &[Extractor] = &[first_heading, document_title, title_class];

const COMPANY_EXTRACTORS: &[Extractor] = &[company_class, hiring_organization, itemprop_name];

const DESCRIPTION_EXTRACTORS: &[Extractor] =
    &[description_class, itemprop_description, description_id];

fn first_heading(doc: &Html) -> Option<String> {
    first_text(doc, &H1)
}

fn document_title(doc: &Html) -> Option<String> {
    first_text(doc, &TITLE)
}

fn title_class(doc: &Html) -> Option<String> {
    first_with_class(doc, &TITLE_CLASS)
}

fn company_class(doc: &Html) -> Option<String> {
    first_with_class(doc, &COMPANY_CLASS)
}

fn hiring_organization(doc: &Html) -> Option<String> {
    first_text(doc, &HIRING_ORGANIZATION)
}

fn itemprop_name(doc: &Html) -> Option<String> {
    first_text(doc, &ITEMPROP_NAME)
}

fn description_class(doc: &Html) -> Option<String> {
    first_with_class(doc, &DESCRIPTION_PATTERN)
}

fn itemprop_description(doc: &Html) -> Option<String> {
    first_text(doc, &ITEMPROP_DESCRIPTION)
}

fn description_id(doc: &Html) -> Option<String> {
    first_with_id(doc, &DESCRIPTION_PATTERN)
}

/// HTTP client that fetches job postings and extracts prefill fields.
pub struct JobScraper {
    http: reqwest::Client,
}

impl JobScraper {
    pub fn new(timeout: Duration) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }

    /// Fetch `url` and extract the job title, company and description.
    ///
    /// Either all three fields are returned or an error is; there are no
    /// partial results and no retries.
    pub async fn scrape(&self, url: &str) -> Result<ScrapedJob, ScrapeError> {
        let url = Url::parse(url.trim()).map_err(|e| ScrapeError::InvalidUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        tracing::info!(%url, "fetching job posting");
        let response = self.http.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(ScrapeError::Status(response.status()));
        }

        let html = response.text().await?;
        let job = extract_job_fields(&html);

        tracing::info!(
            %url,
            job_title = %job.job_title,
            company_name = %job.company_name,
            "extracted job posting"
        );
        Ok(job)
    }
}

/// Apply the extractor chains to a raw HTML document.
pub fn extract_job_fields(html: &str) -> ScrapedJob {
    let document = Html::parse_document(html);

    let job_title = first_match(&document, TITLE_EXTRACTORS)
        .unwrap_or_else(|| UNKNOWN_POSITION.to_string());
    let company_name = first_match(&document, COMPANY_EXTRACTORS)
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
    let job_description = first_match(&document, DESCRIPTION_EXTRACTORS)
        .or_else(|| main_content(&document))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    ScrapedJob {
        job_title,
        company_name,
        job_description,
    }
}

fn first_match(document: &Html, extractors: &[Extractor]) -> Option<String> {
    extractors.iter().find_map(|extract| extract(document))
}

/// Text of the first `<main>`, `<article>` or `<div class="content">`,
/// whichever kind exists first in that order.
fn main_content(document: &Html) -> Option<String> {
    MAIN_CONTENT
        .iter()
        .find_map(|sel| document.select(sel).next())
        .and_then(element_text)
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().and_then(element_text)
}

fn first_with_class(document: &Html, pattern: &Regex) -> Option<String> {
    document
        .select(&WITH_CLASS)
        .find(|el| el.value().classes().any(|class| pattern.is_match(class)))
        .and_then(element_text)
}

fn first_with_id(document: &Html, pattern: &Regex) -> Option<String> {
    document
        .select(&WITH_ID)
        .find(|el| el.value().id().is_some_and(|id| pattern.is_match(id)))
        .and_then(element_text)
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch URL: {0}")]
    Status(reqwest::StatusCode),
}
