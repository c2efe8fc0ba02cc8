use std::sync::Arc;

use anyhow::Result;
use jobdigest::{
    api,
    app_state::AppState,
    config::Config,
    digest::DigestService,
    mail::SmtpMailSender,
    store::FsMessageStore,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Arc::new(Config::from_env()?);
    info!(
        "Starting digest service on {} (languages: {:?})",
        config.bind_addr(),
        config.accepted_languages()
    );

    let store = Arc::new(FsMessageStore::new(config.message_store_root()));
    let sender = Arc::new(SmtpMailSender::new(config.from_address(), config.smtp())?);
    let service = DigestService::new(config.clone(), store, sender)?;

    let shutdown = CancellationToken::new();
    let app = api::router(AppState::new(service, shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Received shutdown signal, cancelling in-flight digests...");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
