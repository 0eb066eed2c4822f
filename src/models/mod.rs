pub mod application;
pub mod scrape;
