//! Job references found in an alert body.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use regex::Regex;
use url::Url;

/// Number of characters in a valid job id.
pub const REFERENCE_LEN: usize = 10;

/// Identifier of one listing. Always exactly [`REFERENCE_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobReference(String);

impl JobReference {
    pub fn parse(candidate: &str) -> Option<Self> {
        (candidate.chars().count() == REFERENCE_LEN).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical listing URL for this reference under `base`.
    pub fn listing_url(&self, base: &Url) -> String {
        format!("{}{}", base, self.0)
    }
}

impl Display for JobReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds listing links under a base URL.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    pattern: Regex,
}

impl ReferenceExtractor {
    pub fn new(base: &Url) -> Self {
        let pattern = format!(r"{}\d+", regex::escape(base.as_str()));
        Self {
            // an escaped literal followed by \d+ always compiles
            pattern: Regex::new(&pattern).expect("Failed to compile listing link regex"),
        }
    }

    /// Every distinct reference in `body`. Digit runs that are not exactly
    /// ten characters long are skipped.
    pub fn extract(&self, body: &str) -> BTreeSet<JobReference> {
        self.pattern
            .find_iter(body)
            .filter_map(|m| m.as_str().rsplit('/').next())
            .filter_map(JobReference::parse)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LISTING_BASE_URL;

    fn extractor() -> ReferenceExtractor {
        ReferenceExtractor::new(&Url::parse(DEFAULT_LISTING_BASE_URL).unwrap())
    }

    fn ids(set: &BTreeSet<JobReference>) -> Vec<&str> {
        set.iter().map(JobReference::as_str).collect()
    }

    #[test]
    fn keeps_only_ten_digit_ids() {
        let body = "Senior Engineer\nhttps://www.linkedin.com/comm/jobs/view/1234567890\n\
                    Intern\nhttps://www.linkedin.com/comm/jobs/view/98765\n";
        assert_eq!(ids(&extractor().extract(body)), vec!["1234567890"]);
    }

    #[test]
    fn rejects_nine_and_eleven_digit_runs() {
        let body = "https://www.linkedin.com/comm/jobs/view/123456789 \
                    https://www.linkedin.com/comm/jobs/view/12345678901";
        assert!(extractor().extract(body).is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let link = "https://www.linkedin.com/comm/jobs/view/1234567890/?trackingId=abc";
        let body = format!("{link}\n{link}\nhttps://www.linkedin.com/comm/jobs/view/0987654321");
        assert_eq!(
            ids(&extractor().extract(&body)),
            vec!["0987654321", "1234567890"]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let body = "a https://www.linkedin.com/comm/jobs/view/2222222222 b https://www.linkedin.com/comm/jobs/view/1111111111";
        let once = extractor().extract(body);
        let twice = extractor().extract(&format!("{body}\n{body}"));
        assert_eq!(once, twice);
    }

    #[test]
    fn links_under_other_prefixes_are_ignored() {
        let body = "https://www.linkedin.com/jobs/view/1234567890 https://example.com/comm/jobs/view/1234567890";
        assert!(extractor().extract(body).is_empty());
    }

    #[test]
    fn base_url_is_matched_literally() {
        let base = Url::parse("http://127.0.0.1:8080/jobs.view/").unwrap();
        let body = "http://127.0.0.1:8080/jobsXview/1234567890 http://127.0.0.1:8080/jobs.view/5555555555";
        let found = ReferenceExtractor::new(&base).extract(body);
        assert_eq!(ids(&found), vec!["5555555555"]);
    }

    #[test]
    fn listing_url_appends_the_id() {
        let base = Url::parse(DEFAULT_LISTING_BASE_URL).unwrap();
        let reference = JobReference::parse("1234567890").unwrap();
        assert_eq!(
            reference.listing_url(&base),
            "https://www.linkedin.com/comm/jobs/view/1234567890"
        );
    }

    #[test]
    fn parse_enforces_length() {
        assert!(JobReference::parse("123456789").is_none());
        assert!(JobReference::parse("12345678901").is_none());
        assert!(JobReference::parse("1234567890").is_some());
    }
}
