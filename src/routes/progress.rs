use axum::extract::{Path, State};
use axum::Json;

use crate::response::{AppError, SuccessResponse};
use crate::services::progress::{self, ProgressSummary};
use crate::state::AppState;

pub async fn get_progress(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<SuccessResponse<ProgressSummary>>, AppError> {
    if student_id.trim().is_empty() {
        return Err(AppError::validation("studentId is required"));
    }

    let summaries = state.engine().student_summaries(&student_id);
    let summary = progress::progress_summary(&student_id, &summaries, &state.graph());
    Ok(Json(SuccessResponse::new(summary)))
}
