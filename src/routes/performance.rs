use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::response::{AppError, SuccessResponse};
use crate::services::performance::PerformanceSummary;
use crate::services::recommend::RecommendationSet;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyQuery {
    student_id: String,
    concept_id: String,
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<SuccessResponse<PerformanceSummary>>, AppError> {
    if query.student_id.trim().is_empty() || query.concept_id.trim().is_empty() {
        return Err(AppError::validation("studentId and conceptId are required"));
    }

    // Zero-valued baseline for unseen keys, never a 404.
    let summary = state.engine().get_summary(&query.student_id, &query.concept_id);
    Ok(Json(SuccessResponse::new(summary)))
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<SuccessResponse<RecommendationSet>>, AppError> {
    if query.student_id.trim().is_empty() || query.concept_id.trim().is_empty() {
        return Err(AppError::validation("studentId and conceptId are required"));
    }

    let set = state
        .engine()
        .recommendations(&query.student_id, &query.concept_id);
    Ok(Json(SuccessResponse::new(set)))
}
