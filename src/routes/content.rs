use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::response::{AppError, SuccessResponse};
use crate::services::concept_graph::ConceptNode;
use crate::services::content::{self, ContentKind, GeneratedContent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    student_id: String,
    concept_id: String,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    difficulty_level: Option<f64>,
    #[serde(default)]
    learning_style: Option<String>,
}

pub async fn generate_content(
    State(state): State<AppState>,
    Json(req): Json<GenerateContentRequest>,
) -> Result<Json<SuccessResponse<GeneratedContent>>, AppError> {
    if req.student_id.trim().is_empty() || req.concept_id.trim().is_empty() {
        return Err(AppError::validation("studentId and conceptId are required"));
    }

    let kind = match req.content_type.as_deref() {
        None => ContentKind::Explanation,
        Some(raw) => ContentKind::parse(raw)
            .ok_or_else(|| AppError::validation(format!("unknown content type: {raw}")))?,
    };

    let summary = state.engine().get_summary(&req.student_id, &req.concept_id);

    // Unknown concepts still get content; the planner is the only consumer
    // that insists on graph membership.
    let graph = state.graph();
    let concept = graph.get(&req.concept_id).cloned().unwrap_or(ConceptNode {
        id: req.concept_id.clone(),
        name: req.concept_id.clone(),
        description: String::new(),
        prerequisites: vec![],
    });

    let difficulty = req
        .difficulty_level
        .unwrap_or(summary.difficulty_preference)
        .clamp(0.0, 1.0);
    let learning_style = req.learning_style.as_deref().unwrap_or("visual");

    let generated = content::generate_content(
        &state.llm(),
        state.runtime().is_llm_enabled(),
        &concept,
        &summary,
        kind,
        difficulty,
        learning_style,
    )
    .await;

    Ok(Json(SuccessResponse::new(generated)))
}
