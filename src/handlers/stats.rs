//! Dashboard statistics handler

use axum::Json;

use crate::models::TrainingStats;

pub async fn training() -> Json<TrainingStats> {
    Json(TrainingStats::current())
}
