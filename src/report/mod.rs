//! Rendering of the filtered digest.

pub mod html;
pub mod plaintext;
pub mod subject;

use chrono::{DateTime, Utc};
use crate::extractor::FilteredListing;

pub use subject::reply_subject;

pub const REPORT_TITLE: &str = "Job Alerts";

/// Both bodies of the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub plaintext: String,
    pub html: String,
}

/// Render `listings`, in order, for the alert titled `subject`.
pub fn build(listings: &[FilteredListing], subject: &str, now: DateTime<Utc>) -> Report {
    let date = format_date(now);
    Report {
        plaintext: plaintext::render(listings, &date),
        html: html::render(listings, subject, &date),
    }
}

/// `16 October 2026`
pub fn format_date(now: DateTime<Utc>) -> String {
    now.format("%d %B %Y").to_string()
}
