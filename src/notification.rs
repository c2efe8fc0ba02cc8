//! Inbound trigger: an SNS-wrapped SES receipt notification.
//!
//! The outer event carries the SES notification as a JSON string. Only the
//! pieces the digest needs are modelled.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Only messages stored by this action can be loaded.
pub const STORED_ACTION: &str = "S3";

static SENDER_DOMAIN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(.*)$").expect("Failed to compile sender domain regex"));

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("notification has no records")]
    NoRecords,

    #[error("malformed notification message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("mail body is not stored (action type {0:?})")]
    NotStored(String),

    #[error("stored action lacks {0}")]
    MissingLocation(&'static str),

    #[error("sender domain {domain:?} is not accepted")]
    SenderDomain { domain: String },
}

#[derive(Debug, Deserialize)]
pub struct SnsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SnsRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SnsRecord {
    #[serde(rename = "Sns")]
    pub sns: SnsMessage,
}

#[derive(Debug, Deserialize)]
pub struct SnsMessage {
    #[serde(rename = "MessageId")]
    pub message_id: String,
    /// JSON-encoded [`SesNotification`].
    #[serde(rename = "Message")]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SesNotification {
    pub mail: SesMail,
    pub receipt: SesReceipt,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SesMail {
    pub source: String,
    pub common_headers: CommonHeaders,
}

#[derive(Debug, Deserialize)]
pub struct CommonHeaders {
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct SesReceipt {
    pub action: ReceiptAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub bucket_name: Option<String>,
    pub object_key: Option<String>,
}

/// Where a raw message was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub bucket: String,
    pub key: String,
}

/// What the pipeline needs from a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMail {
    pub message_id: String,
    pub sender: String,
    pub subject: String,
    pub location: StoredMessage,
}

impl InboundMail {
    /// Everything after the `@` in the sender address, or `""`.
    pub fn sender_domain(&self) -> &str {
        sender_domain(&self.sender)
    }
}

pub fn sender_domain(sender: &str) -> &str {
    SENDER_DOMAIN_REGEX
        .captures(sender)
        .and_then(|captures| captures.get(1))
        .map_or("", |m| m.as_str())
}

impl SnsEvent {
    /// Validate the first record and pull out the stored message location.
    pub fn into_inbound(self) -> Result<InboundMail, TriggerError> {
        let record = self
            .records
            .into_iter()
            .next()
            .ok_or(TriggerError::NoRecords)?;
        let notification: SesNotification = serde_json::from_str(&record.sns.message)?;

        let action = notification.receipt.action;
        if action.kind != STORED_ACTION {
            return Err(TriggerError::NotStored(action.kind));
        }

        let bucket = action
            .bucket_name
            .ok_or(TriggerError::MissingLocation("bucketName"))?;
        let key = action
            .object_key
            .ok_or(TriggerError::MissingLocation("objectKey"))?;

        Ok(InboundMail {
            message_id: record.sns.message_id,
            sender: notification.mail.source,
            subject: notification.mail.common_headers.subject,
            location: StoredMessage { bucket, key },
        })
    }
}

/// Reject senders outside `domain`, when a domain is configured.
pub fn check_sender_domain(mail: &InboundMail, domain: Option<&str>) -> Result<(), TriggerError> {
    match domain {
        Some(expected) if !mail.sender_domain().eq_ignore_ascii_case(expected) => {
            Err(TriggerError::SenderDomain {
                domain: mail.sender_domain().to_string(),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::json;

    pub fn event(action_type: &str, sender: &str, subject: &str) -> serde_json::Value {
        let message = json!({
            "mail": {
                "source": sender,
                "commonHeaders": { "subject": subject }
            },
            "receipt": {
                "action": {
                    "type": action_type,
                    "bucketName": "incoming",
                    "objectKey": "abc123"
                }
            }
        });
        json!({
            "Records": [{
                "Sns": {
                    "MessageId": "msg-1",
                    "Message": message.to_string()
                }
            }]
        })
    }
}
