#![allow(dead_code)]

pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::services::concept_graph::ConceptGraph;
use crate::services::engine::LearningEngine;
use crate::services::llm_provider::LlmProvider;
use crate::state::AppState;

pub fn create_app(config: &Config) -> axum::Router {
    let graph = match ConceptGraph::from_file(&config.concept_graph_path) {
        Ok(graph) => graph,
        Err(err) => {
            tracing::warn!(error = %err, path = %config.concept_graph_path, "concept graph not loaded, using built-in fallback");
            ConceptGraph::fallback()
        }
    };

    let engine = LearningEngine::new(config.engine.clone());
    let llm = LlmProvider::from_env();

    let state = AppState::new(Arc::new(engine), Arc::new(graph), Arc::new(llm));

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
