use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::response::{AppError, SuccessResponse};
use crate::services::assessment::{self, Assessment};
use crate::services::concept_graph::ConceptNode;
use crate::state::AppState;

pub async fn list_concepts(
    State(state): State<AppState>,
) -> Json<SuccessResponse<Vec<ConceptNode>>> {
    Json(SuccessResponse::new(state.graph().nodes().to_vec()))
}

pub async fn get_concept(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
) -> Result<Json<SuccessResponse<ConceptNode>>, AppError> {
    state
        .graph()
        .get(&concept_id)
        .cloned()
        .map(|node| Json(SuccessResponse::new(node)))
        .ok_or_else(|| AppError::not_found(format!("concept {concept_id} not found")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessRequest {
    student_id: String,
}

pub async fn assess_skill(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    Json(req): Json<AssessRequest>,
) -> Result<Json<SuccessResponse<Assessment>>, AppError> {
    if req.student_id.trim().is_empty() {
        return Err(AppError::validation("studentId is required"));
    }

    let graph = state.graph();
    let concept = graph
        .get(&concept_id)
        .ok_or_else(|| AppError::not_found(format!("cannot assess: concept {concept_id} not found")))?;

    let summary = state.engine().get_summary(&req.student_id, &concept_id);
    Ok(Json(SuccessResponse::new(assessment::assess_skill(
        concept, &summary,
    ))))
}
