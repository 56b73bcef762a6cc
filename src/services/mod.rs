pub mod assessment;
pub mod concept_graph;
pub mod content;
pub mod engine;
pub mod events;
pub mod llm_provider;
pub mod path_planner;
pub mod performance;
pub mod progress;
pub mod recommend;
