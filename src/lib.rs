pub mod api;
pub mod app_state;
pub mod config;
pub mod digest;
pub mod enricher;
pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod health;
pub mod mail;
pub mod notification;
pub mod references;
pub mod report;
pub mod store;
