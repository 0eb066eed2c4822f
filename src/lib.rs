//! Job Application Tracker
//!
//! Record keeping for job applications: a CRUD store over application
//! records, local-disk storage for uploaded resumes and cover letters, and a
//! best-effort scraper that pre-fills a posting's title, company and
//! description from its URL.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
