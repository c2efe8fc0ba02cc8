use axum::{Json, extract::State};
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    accepted_languages: Vec<String>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.shutdown.is_cancelled() {
        "SHUTTING_DOWN"
    } else {
        "OK"
    };
    Json(HealthResponse {
        status: status.to_string(),
        accepted_languages: state
            .service
            .config()
            .accepted_languages()
            .iter()
            .cloned()
            .collect(),
    })
}
