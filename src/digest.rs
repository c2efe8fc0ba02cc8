//! One digest run: stored alert in, filtered reply out.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::enricher::{EnrichError, Enricher};
use crate::extractor::FilteredListing;
use crate::fetcher::{FetchError, Fetcher};
use crate::filter;
use crate::mail::{self, MailSender, OutgoingReply};
use crate::notification::{self, InboundMail, SnsEvent, TriggerError};
use crate::references::ReferenceExtractor;
use crate::report::{self, Report};
use crate::store::MessageStore;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("rejected notification: {0}")]
    Trigger(#[from] TriggerError),

    #[error("failed to load stored message: {0:#}")]
    Store(anyhow::Error),

    #[error(transparent)]
    Enrich(#[from] EnrichError),

    #[error("digest run exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("failed to send reply: {0:#}")]
    Send(anyhow::Error),

    #[error("failed to set up listing fetcher: {0}")]
    Fetcher(#[from] FetchError),
}

/// Result of the extraction and filtering pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub listings: Vec<FilteredListing>,
    pub report: Report,
}

/// Decode → extract → enrich → filter → build.
#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: ReferenceExtractor,
    enricher: Enricher,
    accepted_languages: BTreeSet<String>,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(config.fetch_timeout())?;
        Ok(Self {
            extractor: ReferenceExtractor::new(config.listing_base_url()),
            enricher: Enricher::new(fetcher, config.listing_base_url().clone()),
            accepted_languages: config.accepted_languages().clone(),
        })
    }

    /// Listings worth reporting from a plain-text alert body, in ascending
    /// id order. Enrichment is sequential.
    pub async fn collect(
        &self,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FilteredListing>, EnrichError> {
        let references = self.extractor.extract(body);
        info!("Found {} job references", references.len());

        let mut listings = Vec::new();
        for reference in &references {
            let Some(listing) = self.enricher.enrich(reference, cancel).await? else {
                continue;
            };
            if filter::accept(&listing, &self.accepted_languages) {
                listings.push(listing.into());
            } else {
                info!(
                    "Filtered out {} (language {})",
                    reference, listing.description_language
                );
            }
        }
        Ok(listings)
    }

    pub async fn run(
        &self,
        raw: &[u8],
        subject: &str,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Digest, EnrichError> {
        let body = mail::decode(raw);
        let listings = self.collect(&body, cancel).await?;
        let report = report::build(&listings, subject, now);
        Ok(Digest { listings, report })
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestOutcome {
    pub message_id: String,
    pub recipient: String,
    pub subject: String,
    pub listings: usize,
}

/// Handles trigger notifications end to end.
pub struct DigestService {
    config: Arc<Config>,
    pipeline: Pipeline,
    store: Arc<dyn MessageStore>,
    sender: Arc<dyn MailSender>,
}

impl DigestService {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn MessageStore>,
        sender: Arc<dyn MailSender>,
    ) -> Result<Self, DigestError> {
        let pipeline = Pipeline::new(&config)?;
        Ok(Self {
            config,
            pipeline,
            store,
            sender,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate the notification, then run the digest under the configured
    /// deadline. Nothing is sent unless every step before sending succeeded.
    pub async fn handle(
        &self,
        event: SnsEvent,
        cancel: &CancellationToken,
    ) -> Result<DigestOutcome, DigestError> {
        let inbound = event.into_inbound().inspect_err(|e| {
            error!("Mail body is not retrievable, skipping: {}", e);
        })?;
        notification::check_sender_domain(&inbound, self.config.email_domain()).inspect_err(
            |e| {
                error!("Skipping message {}: {}", inbound.message_id, e);
            },
        )?;

        info!("Accepting message: {}", inbound.message_id);

        let deadline = self.config.run_deadline();
        let run_cancel = cancel.child_token();
        let outcome = tokio::time::timeout(deadline, self.process(&inbound, &run_cancel)).await;
        run_cancel.cancel();

        match outcome {
            Ok(result) => result.inspect_err(|e| error!("Digest run failed: {}", e)),
            Err(_) => {
                error!("Digest run for {} exceeded {:?}", inbound.message_id, deadline);
                Err(DigestError::DeadlineExceeded(deadline))
            }
        }
    }

    #[instrument(skip_all, fields(message_id = %inbound.message_id))]
    async fn process(
        &self,
        inbound: &InboundMail,
        cancel: &CancellationToken,
    ) -> Result<DigestOutcome, DigestError> {
        let raw = self
            .store
            .load(&inbound.location)
            .await
            .map_err(DigestError::Store)?;

        let digest = self
            .pipeline
            .run(&raw, &inbound.subject, Utc::now(), cancel)
            .await?;

        let reply = OutgoingReply {
            to: inbound.sender.clone(),
            subject: report::reply_subject(digest.listings.len(), &inbound.subject),
            report: digest.report,
        };

        self.sender.send(&reply).await.map_err(DigestError::Send)?;
        info!(
            "Sent digest with {} listings to {}",
            digest.listings.len(),
            reply.to
        );

        Ok(DigestOutcome {
            message_id: inbound.message_id.clone(),
            recipient: reply.to,
            subject: reply.subject,
            listings: digest.listings.len(),
        })
    }
}
