use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::response::{AppError, SuccessResponse};
use crate::services::path_planner::{self, PathError, PlannedPath, Strategy};
use crate::state::AppState;

const DEFAULT_MAX_CONCEPTS: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPathRequest {
    student_id: String,
    target_concepts: Vec<String>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    max_concepts: Option<usize>,
}

pub async fn plan_path(
    State(state): State<AppState>,
    Json(req): Json<PlanPathRequest>,
) -> Result<Json<SuccessResponse<PlannedPath>>, AppError> {
    if req.student_id.trim().is_empty() {
        return Err(AppError::validation("studentId is required"));
    }

    let strategy = match req.strategy.as_deref() {
        None => Strategy::Adaptive,
        Some(raw) => Strategy::parse(raw).map_err(|err| AppError::validation(err.to_string()))?,
    };
    let max_concepts = req.max_concepts.unwrap_or(DEFAULT_MAX_CONCEPTS).max(1);

    let summaries = state.engine().student_summaries(&req.student_id);
    let graph = state.graph();

    let path = path_planner::plan_path(
        &graph,
        &summaries,
        &req.target_concepts,
        strategy,
        max_concepts,
    )
    .map_err(|err| match err {
        PathError::CyclicPrerequisites(_) => AppError::cyclic_prerequisites(err.to_string()),
        PathError::NoTargets => AppError::validation(err.to_string()),
        PathError::UnknownStrategy(_) => AppError::validation(err.to_string()),
    })?;

    Ok(Json(SuccessResponse::new(path)))
}
