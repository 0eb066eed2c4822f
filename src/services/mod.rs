pub mod applications;
pub mod scraper;
pub mod storage;
