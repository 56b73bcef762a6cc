//! Operation table: every named operation maps to exactly one handler,
//! registered once at startup.

mod concepts;
mod content;
mod events;
mod health;
mod paths;
mod performance;
mod progress;
mod sessions;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/info", get(health::info))
        .route("/api/concepts", get(concepts::list_concepts))
        .route("/api/concepts/:concept_id", get(concepts::get_concept))
        .route("/api/concepts/:concept_id/assess", post(concepts::assess_skill))
        .route("/api/adaptive/sessions", post(sessions::start_session))
        .route("/api/adaptive/sessions/:session_id", get(sessions::get_session))
        .route("/api/adaptive/events", post(events::record_event))
        .route("/api/adaptive/performance", get(performance::get_summary))
        .route(
            "/api/adaptive/recommendations",
            get(performance::get_recommendations),
        )
        .route("/api/adaptive/path", post(paths::plan_path))
        .route("/api/adaptive/content", post(content::generate_content))
        .route("/api/students/:student_id/progress", get(progress::get_progress))
        .with_state(state)
}
