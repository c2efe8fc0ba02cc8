use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use jobdigest::{
    config::Config,
    digest::{DigestService, Pipeline},
    mail::{MailSender, OutgoingReply},
    notification::SnsEvent,
    store::FsMessageStore,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const DESCRIPTION: &str = "Join our platform team to build and run the services that power thousands of customers every day.";

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<OutgoingReply>>,
}

#[async_trait]
impl MailSender for RecordingSender {
    async fn send(&self, reply: &OutgoingReply) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(reply.clone());
        Ok(())
    }
}

fn config(server: &MockServer) -> Config {
    Config::new("digest@example.com")
        .with_listing_base_url(&format!("{}/comm/jobs/view/", server.uri()))
        .unwrap()
        .with_fetch_timeout(Duration::from_secs(5))
}

fn alert(base: &str) -> String {
    format!(
        concat!(
            "From: jobs-listings@linkedin.com\r\n",
            "Subject: 2 new jobs for Rust Engineer\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/alternative; boundary=\"alt\"\r\n",
            "\r\n",
            "--alt\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "\r\n",
            "Senior Engineer\r\n",
            "View job: {base}1234567890/?trk=eml\r\n",
            "\r\n",
            "Intern\r\n",
            "View job: {base}98765\r\n",
            "--alt\r\n",
            "Content-Type: text/html; charset=utf-8\r\n",
            "\r\n",
            "<a href=\"{base}5555555555\">ignored html link</a>\r\n",
            "--alt--\r\n",
        ),
        base = base
    )
}

fn event(sender: &str, subject: &str) -> SnsEvent {
    let message = json!({
        "mail": { "source": sender, "commonHeaders": { "subject": subject } },
        "receipt": { "action": { "type": "S3", "bucketName": "incoming", "objectKey": "msg-42" } }
    });
    serde_json::from_value(json!({
        "Records": [{ "Sns": { "MessageId": "sns-42", "Message": message.to_string() } }]
    }))
    .unwrap()
}

async fn mount_listing(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/comm/jobs/view/1234567890"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_bytes(format!(
                    r#"<html><head><title>Acme Corp hiring Senior Engineer in Springfield | LinkedIn</title></head><body><div class="description__text description__text--rich">{DESCRIPTION}</div></body></html>"#
                ))
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn run_service(server: &MockServer) -> (Arc<RecordingSender>, jobdigest::digest::DigestOutcome) {
    let config = config(server);
    let base = config.listing_base_url().to_string();

    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("incoming")).unwrap();
    std::fs::write(dir.path().join("incoming/msg-42"), alert(&base)).unwrap();

    let sender = Arc::new(RecordingSender::default());
    let service = DigestService::new(
        Arc::new(config),
        Arc::new(FsMessageStore::new(dir.path())),
        sender.clone(),
    )
    .unwrap();

    let outcome = service
        .handle(
            event("me@example.com", "2 new jobs for Rust Engineer"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    (sender, outcome)
}

#[tokio::test]
async fn stored_alert_becomes_filtered_digest() {
    let server = MockServer::start().await;
    mount_listing(&server, 200).await;

    let (sender, outcome) = run_service(&server).await;
    assert_eq!(outcome.listings, 1);
    assert_eq!(outcome.message_id, "sns-42");

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let reply = &sent[0];
    assert_eq!(reply.to, "me@example.com");
    assert_eq!(reply.subject, "Hey: 1 new jobs  for Rust Engineer");

    let expected = format!(
        "1. Senior Engineer, Acme Corp, Springfield, {}/comm/jobs/view/1234567890",
        server.uri()
    );
    assert!(reply.report.plaintext.lines().any(|line| line == expected));
    assert!(reply.report.html.contains(">1234567890</a>"));
}

#[tokio::test]
async fn failed_listing_fetch_yields_zero_entries() {
    let server = MockServer::start().await;
    mount_listing(&server, 500).await;

    let (sender, outcome) = run_service(&server).await;
    assert_eq!(outcome.listings, 0);

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent[0].subject, "Hey: 0 new jobs  for Rust Engineer");
    assert!(!sent[0].report.plaintext.contains("1. "));
    assert!(!sent[0].report.html.contains("<tbody><tr"));
}

#[tokio::test]
async fn non_english_listing_is_filtered_unless_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/comm/jobs/view/1234567890"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(
                    r#"<title>Acme hiring Entwickler in Berlin | LinkedIn</title><div class="description__text description__text--rich">Wir suchen eine erfahrene Entwicklerin oder einen erfahrenen Entwickler für unser Team in Berlin. Sie arbeiten eng mit unseren Kunden zusammen und entwickeln neue Produkte.</div>"#,
                )
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&server)
        .await;

    let body = format!("{}/comm/jobs/view/1234567890", server.uri());
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
    let raw = format!("Subject: s\r\n\r\n{body}");

    let english_only = Pipeline::new(&config(&server)).unwrap();
    let digest = english_only
        .run(raw.as_bytes(), "s", now, &CancellationToken::new())
        .await
        .unwrap();
    assert!(digest.listings.is_empty());

    let german_too = Pipeline::new(&config(&server).with_accepted_languages(["en", "de"])).unwrap();
    let digest = german_too
        .run(raw.as_bytes(), "s", now, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(digest.listings.len(), 1);
    assert_eq!(digest.listings[0].job_title, "Entwickler");
    assert!(
        digest
            .report
            .plaintext
            .contains("These are your filtered job alerts for 05 March 2024")
    );
}
