//! Prediction handlers

use axum::{extract::State, Json};

use crate::logic::model::{self, ExtensionScore, ModelRegistry, PredictionResult};
use crate::logic::DetectError;
use crate::models::{DualResponse, TextRequest, UrlPredictionResponse, UrlRequest};
use crate::{AppError, AppResult, AppState};

/// Run a model call on the blocking pool
async fn run_model<T, F>(state: &AppState, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&ModelRegistry) -> Result<T, DetectError> + Send + 'static,
{
    let registry = state.registry.clone();
    tokio::task::spawn_blocking(move || f(registry.as_ref()))
        .await
        .map_err(|e| AppError::InternalError(format!("Inference task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Classify a single URL
pub async fn url(
    State(state): State<AppState>,
    Json(req): Json<UrlRequest>,
) -> AppResult<Json<UrlPredictionResponse>> {
    let (result, features_used) = run_model(&state, move |registry| {
        let result = model::infer_url(&req.url, registry)?;
        Ok((result, registry.feature_names()?.to_vec()))
    })
    .await?;

    Ok(Json(UrlPredictionResponse { result, features_used }))
}

/// Classify email text
pub async fn email(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> AppResult<Json<PredictionResult>> {
    let result = run_model(&state, move |registry| model::infer_email(&req.text, registry)).await?;
    Ok(Json(result))
}

/// Email verdict plus a verdict per embedded URL
pub async fn dual(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> AppResult<Json<DualResponse>> {
    let response = run_model(&state, move |registry| {
        let verdict = model::analyze_dual(&req.text, registry)?;
        let features_used = if verdict.url_results.is_empty() {
            Vec::new()
        } else {
            registry.feature_names()?.to_vec()
        };
        Ok(DualResponse::from_verdict(verdict, &features_used))
    })
    .await?;

    Ok(Json(response))
}

/// Single-score endpoint for the browser extension
pub async fn extension(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> AppResult<Json<ExtensionScore>> {
    let score = run_model(&state, move |registry| model::classify_extension(&req.text, registry)).await?;
    Ok(Json(score))
}
