use crate::digest::DigestService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DigestService>,
    /// Cancelled on shutdown; in-flight runs stop enriching.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: DigestService, shutdown: CancellationToken) -> Self {
        Self {
            service: Arc::new(service),
            shutdown,
        }
    }
}
