/// Language recorded when the description cannot be classified.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Title used when the listing page has no `<title>`.
pub const NO_TITLE: &str = "No Title Found";

/// What the scanner captured from one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub title: Option<String>,
    pub description: Vec<String>,
}

impl ListingPage {
    pub fn title_or_sentinel(&self) -> &str {
        self.title.as_deref().unwrap_or(NO_TITLE)
    }

    /// Description fragments joined the way the classifier expects them.
    pub fn description_text(&self) -> String {
        self.description.join("\n")
    }
}

/// Fields parsed out of a listing title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFields {
    pub company: String,
    pub job_title: String,
    pub place: String,
}

/// A job reference turned into a structured record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedListing {
    pub title: String,
    pub company: String,
    pub place: String,
    pub url: String,
    pub description_language: String,
}

/// The part of a listing that ends up in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredListing {
    pub job_title: String,
    pub company: String,
    pub place: String,
    pub url: String,
}

impl FilteredListing {
    pub fn new(
        job_title: impl Into<String>,
        company: impl Into<String>,
        place: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            job_title: job_title.into(),
            company: company.into(),
            place: place.into(),
            url: url.into(),
        }
    }

    /// Last path segment of the listing URL, i.e. the job id.
    pub fn id(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

impl From<EnrichedListing> for FilteredListing {
    fn from(listing: EnrichedListing) -> Self {
        Self {
            job_title: listing.title,
            company: listing.company,
            place: listing.place,
            url: listing.url,
        }
    }
}
