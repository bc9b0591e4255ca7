//! Service info and health check handlers

use axum::{extract::State, Json};

use crate::models::{HealthResponse, ServiceInfo, SERVICE_NAME};
use crate::AppState;

pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    let status = state.registry.status();
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        email_model: status.email_model,
        url_model: status.url_model,
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.registry.status();
    Json(HealthResponse {
        status: "ok",
        email_model: status.email_model,
        url_model: status.url_model,
        models_loaded_at: status.loaded_at,
    })
}
