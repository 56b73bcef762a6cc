//! In-memory adaptive learning engine: the ordered event history, the
//! summary table, and the session registry live here, owned by an explicit
//! engine value instead of module-level storage.
//!
//! Concurrency model: a registry of per-(student, concept) states, each
//! behind its own mutex. Recording an event takes exactly one per-key lock,
//! so writers on the same key are serialized while unrelated keys proceed in
//! parallel.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::services::events::{EventError, EventKind, LearningEvent};
use crate::services::performance::{
    apply_event, PerformanceSummary, MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use crate::services::recommend::{recommend, RecommendationSet};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cap on retained events per key; the oldest are dropped past this.
    /// Summary counters are unaffected by trimming.
    pub max_events_per_key: usize,
    /// Cap on remembered idempotency keys per key.
    pub max_idempotency_keys: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events_per_key: 512,
            max_idempotency_keys: 128,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct StudentConceptKey {
    student_id: String,
    concept_id: String,
}

#[derive(Debug)]
struct ConceptState {
    summary: PerformanceSummary,
    events: VecDeque<LearningEvent>,
    seen_idempotency: VecDeque<String>,
}

impl ConceptState {
    fn new(student_id: &str, concept_id: &str) -> Self {
        Self {
            summary: PerformanceSummary::zero(student_id, concept_id),
            events: VecDeque::new(),
            seen_idempotency: VecDeque::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub student_id: String,
    pub concept_id: String,
    pub started_at: DateTime<Utc>,
    pub initial_difficulty: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    pub session_id: String,
    pub student_id: String,
    pub concept_id: String,
    pub initial_difficulty: f64,
    pub current_mastery: f64,
    pub recommendations: Vec<String>,
}

/// Snapshot returned from `record_event`: the updated summary plus the
/// immediate recommendation lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAck {
    pub summary: PerformanceSummary,
    pub recommendations: Vec<String>,
    pub deduplicated: bool,
}

pub struct LearningEngine {
    config: EngineConfig,
    states: RwLock<HashMap<StudentConceptKey, Arc<Mutex<ConceptState>>>>,
    sessions: RwLock<HashMap<String, SessionInfo>>,
}

impl LearningEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            states: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn start_session(
        &self,
        student_id: &str,
        concept_id: &str,
        initial_difficulty: Option<f64>,
    ) -> SessionStart {
        let initial_difficulty = initial_difficulty
            .unwrap_or(crate::services::performance::DEFAULT_DIFFICULTY)
            .clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);

        let state = self.state_for(student_id, concept_id);
        let (current_mastery, recommendations) = {
            let mut state = state.lock();
            state.summary.difficulty_preference = initial_difficulty;
            state.summary.last_accessed = Utc::now();
            let recs = recommend(&state.summary);
            (state.summary.mastery_level, recs.action_lines())
        };

        let session = SessionInfo {
            session_id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            concept_id: concept_id.to_string(),
            started_at: Utc::now(),
            initial_difficulty,
            questions_answered: 0,
            correct_answers: 0,
        };
        let session_id = session.session_id.clone();
        self.sessions.write().insert(session_id.clone(), session);

        SessionStart {
            session_id,
            student_id: student_id.to_string(),
            concept_id: concept_id.to_string(),
            initial_difficulty,
            current_mastery,
            recommendations,
        }
    }

    pub fn session(&self, session_id: &str) -> Option<SessionInfo> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Records one event and synchronously folds it into the summary, all
    /// under the per-key lock. The kind has already been validated at the
    /// boundary; `record_raw_event` validates again for direct callers.
    pub fn record_event(
        &self,
        student_id: &str,
        concept_id: &str,
        session_id: &str,
        kind: EventKind,
        data: Value,
        idempotency_key: Option<&str>,
    ) -> EventAck {
        let event = LearningEvent {
            student_id: student_id.to_string(),
            concept_id: concept_id.to_string(),
            session_id: session_id.to_string(),
            kind,
            timestamp: Utc::now(),
            data,
        };

        let state = self.state_for(student_id, concept_id);
        let ack = {
            let mut state = state.lock();

            if let Some(key) = idempotency_key {
                if state.seen_idempotency.iter().any(|seen| seen == key) {
                    let recs = recommend(&state.summary);
                    return EventAck {
                        summary: state.summary.clone(),
                        recommendations: recs.action_lines(),
                        deduplicated: true,
                    };
                }
                if state.seen_idempotency.len() == self.config.max_idempotency_keys {
                    state.seen_idempotency.pop_front();
                }
                state.seen_idempotency.push_back(key.to_string());
            }

            if state.events.len() == self.config.max_events_per_key {
                state.events.pop_front();
            }
            state.events.push_back(event.clone());

            apply_event(&mut state.summary, &event);

            let recs = recommend(&state.summary);
            EventAck {
                summary: state.summary.clone(),
                recommendations: recs.action_lines(),
                deduplicated: false,
            }
        };

        self.update_session_counters(session_id, kind);

        tracing::debug!(
            student_id,
            concept_id,
            kind = kind.as_str(),
            mastery = ack.summary.mastery_level,
            difficulty = ack.summary.difficulty_preference,
            "learning event folded"
        );

        ack
    }

    /// Boundary variant taking the raw event kind string.
    pub fn record_raw_event(
        &self,
        student_id: &str,
        concept_id: &str,
        session_id: &str,
        raw_kind: &str,
        data: Value,
        idempotency_key: Option<&str>,
    ) -> Result<EventAck, EventError> {
        let kind = EventKind::parse(raw_kind)?;
        Ok(self.record_event(student_id, concept_id, session_id, kind, data, idempotency_key))
    }

    /// Read-only summary accessor; zero-valued baseline when nothing has
    /// been recorded for the key.
    pub fn get_summary(&self, student_id: &str, concept_id: &str) -> PerformanceSummary {
        let key = StudentConceptKey {
            student_id: student_id.to_string(),
            concept_id: concept_id.to_string(),
        };
        match self.states.read().get(&key) {
            Some(state) => state.lock().summary.clone(),
            None => PerformanceSummary::zero(student_id, concept_id),
        }
    }

    pub fn recommendations(&self, student_id: &str, concept_id: &str) -> RecommendationSet {
        recommend(&self.get_summary(student_id, concept_id))
    }

    /// All summaries for one student, keyed by concept.
    pub fn student_summaries(&self, student_id: &str) -> HashMap<String, PerformanceSummary> {
        self.states
            .read()
            .iter()
            .filter(|(key, _)| key.student_id == student_id)
            .map(|(key, state)| (key.concept_id.clone(), state.lock().summary.clone()))
            .collect()
    }

    /// Retained events for a key, oldest first.
    pub fn events(&self, student_id: &str, concept_id: &str) -> Vec<LearningEvent> {
        let key = StudentConceptKey {
            student_id: student_id.to_string(),
            concept_id: concept_id.to_string(),
        };
        match self.states.read().get(&key) {
            Some(state) => state.lock().events.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn state_for(&self, student_id: &str, concept_id: &str) -> Arc<Mutex<ConceptState>> {
        let key = StudentConceptKey {
            student_id: student_id.to_string(),
            concept_id: concept_id.to_string(),
        };

        if let Some(state) = self.states.read().get(&key) {
            return Arc::clone(state);
        }

        let mut states = self.states.write();
        Arc::clone(
            states
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(ConceptState::new(student_id, concept_id)))),
        )
    }

    fn update_session_counters(&self, session_id: &str, kind: EventKind) {
        if !kind.is_answer() {
            return;
        }
        let mut sessions = self.sessions.write();
        if let Some(session) = sessions.get_mut(session_id) {
            session.questions_answered += 1;
            if kind == EventKind::AnswerCorrect {
                session.correct_answers += 1;
            }
        }
    }
}
