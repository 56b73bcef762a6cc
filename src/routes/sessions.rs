use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::response::{AppError, SuccessResponse};
use crate::services::engine::{SessionInfo, SessionStart};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    student_id: String,
    concept_id: String,
    #[serde(default)]
    initial_difficulty: Option<f64>,
}

pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SuccessResponse<SessionStart>>, AppError> {
    if req.student_id.trim().is_empty() || req.concept_id.trim().is_empty() {
        return Err(AppError::validation("studentId and conceptId are required"));
    }

    let start = state
        .engine()
        .start_session(&req.student_id, &req.concept_id, req.initial_difficulty);

    tracing::info!(
        student_id = %req.student_id,
        concept_id = %req.concept_id,
        session_id = %start.session_id,
        "adaptive session started"
    );

    Ok(Json(SuccessResponse::new(start)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SuccessResponse<SessionInfo>>, AppError> {
    state
        .engine()
        .session(&session_id)
        .map(|session| Json(SuccessResponse::new(session)))
        .ok_or_else(|| AppError::not_found(format!("session {session_id} not found")))
}
