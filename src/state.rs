use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::services::concept_graph::ConceptGraph;
use crate::services::engine::LearningEngine;
use crate::services::llm_provider::LlmProvider;

/// Runtime toggles mutable without a restart, mirroring config flags
/// that operators flip while the process is up.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub llm_enabled: AtomicBool,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self {
            llm_enabled: AtomicBool::new(true),
        }
    }

    pub fn is_llm_enabled(&self) -> bool {
        self.llm_enabled.load(Ordering::Relaxed)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit per-process context. Every operation receives this instead of
/// reaching for module-level storage.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    engine: Arc<LearningEngine>,
    graph: Arc<ConceptGraph>,
    llm: Arc<LlmProvider>,
    runtime: Arc<RuntimeConfig>,
}

impl AppState {
    pub fn new(
        engine: Arc<LearningEngine>,
        graph: Arc<ConceptGraph>,
        llm: Arc<LlmProvider>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            engine,
            graph,
            llm,
            runtime: Arc::new(RuntimeConfig::new()),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn engine(&self) -> Arc<LearningEngine> {
        Arc::clone(&self.engine)
    }

    pub fn graph(&self) -> Arc<ConceptGraph> {
        Arc::clone(&self.graph)
    }

    pub fn llm(&self) -> Arc<LlmProvider> {
        Arc::clone(&self.llm)
    }

    pub fn runtime(&self) -> Arc<RuntimeConfig> {
        Arc::clone(&self.runtime)
    }
}
