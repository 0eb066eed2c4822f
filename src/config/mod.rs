use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string. When unset, records live in memory only.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Directory holding uploaded resumes and cover letters.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Largest accepted JSON request body, in bytes. Uploads are unbounded.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Timeout for fetching job postings, in seconds.
    #[serde(default = "default_scrape_timeout_secs")]
    pub scrape_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_scrape_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Parse configuration from explicit key/value pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
