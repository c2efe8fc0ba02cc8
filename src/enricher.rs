use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::extractor::{EnrichedListing, TitleError, language, parse_title, scan_listing};
use crate::fetcher::{FetchError, Fetcher};
use crate::references::JobReference;

#[derive(Error, Debug)]
pub enum EnrichError {
    /// The listing title is not in the expected format. Aborts the batch.
    #[error("unparseable listing {reference}: {source}")]
    Title {
        reference: JobReference,
        #[source]
        source: TitleError,
    },

    #[error("enrichment cancelled")]
    Cancelled,
}

/// Turns job references into listings by fetching and scanning their pages.
#[derive(Debug, Clone)]
pub struct Enricher {
    fetcher: Fetcher,
    base_url: Url,
}

impl Enricher {
    pub fn new(fetcher: Fetcher, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }

    /// Fetch and parse one listing.
    ///
    /// `Ok(None)` means the page could not be fetched and the reference is
    /// dropped for this run; there is no retry.
    #[instrument(skip_all, fields(reference = %reference))]
    pub async fn enrich(
        &self,
        reference: &JobReference,
        cancel: &CancellationToken,
    ) -> Result<Option<EnrichedListing>, EnrichError> {
        let url = reference.listing_url(&self.base_url);
        let parsed_url = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Dropping {}: invalid listing url {}: {}", reference, url, e);
                return Ok(None);
            }
        };

        let fetched = tokio::select! {
            _ = cancel.cancelled() => return Err(EnrichError::Cancelled),
            fetched = self.fetcher.fetch(&parsed_url) => fetched,
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                log_dropped(reference, &e);
                return Ok(None);
            }
        };

        debug!("Fetched {} as {:?}", page.url_final, page.charset);
        let listing = scan_listing(&page.body_utf8);
        let fields =
            parse_title(listing.title_or_sentinel()).map_err(|source| EnrichError::Title {
                reference: reference.clone(),
                source,
            })?;
        let description_language = language::classify(&listing.description_text());

        debug!(
            "Enriched {}: {} at {} ({})",
            reference, fields.job_title, fields.company, description_language
        );

        Ok(Some(EnrichedListing {
            title: fields.job_title,
            company: fields.company,
            place: fields.place,
            url,
            description_language,
        }))
    }
}

fn log_dropped(reference: &JobReference, error: &FetchError) {
    if error.is_timeout() {
        warn!("Dropping {}: listing fetch timed out", reference);
    } else {
        warn!("Dropping {}: {}", reference, error);
    }
}
