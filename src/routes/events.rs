use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::response::{AppError, SuccessResponse};
use crate::services::engine::EventAck;
use crate::services::events::EventError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventRequest {
    student_id: String,
    concept_id: String,
    session_id: String,
    event_type: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    idempotency_key: Option<String>,
}

pub async fn record_event(
    State(state): State<AppState>,
    Json(req): Json<RecordEventRequest>,
) -> Result<Json<SuccessResponse<EventAck>>, AppError> {
    if req.student_id.trim().is_empty() || req.concept_id.trim().is_empty() {
        return Err(AppError::validation("studentId and conceptId are required"));
    }

    let ack = state
        .engine()
        .record_raw_event(
            &req.student_id,
            &req.concept_id,
            &req.session_id,
            &req.event_type,
            req.data,
            req.idempotency_key.as_deref(),
        )
        .map_err(|err| match err {
            EventError::InvalidEventKind(_) => AppError::invalid_event_kind(err.to_string()),
        })?;

    Ok(Json(SuccessResponse::new(ack)))
}
