//! Learning event types. The event kind is a closed enum validated at the
//! boundary; anything else is rejected before it reaches the updater.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AnswerCorrect,
    AnswerIncorrect,
    HintUsed,
    TimeSpent,
}

impl EventKind {
    pub fn parse(raw: &str) -> Result<Self, EventError> {
        match raw {
            "answer_correct" => Ok(Self::AnswerCorrect),
            "answer_incorrect" => Ok(Self::AnswerIncorrect),
            "hint_used" => Ok(Self::HintUsed),
            "time_spent" => Ok(Self::TimeSpent),
            other => Err(EventError::InvalidEventKind(other.to_string())),
        }
    }

    pub fn is_answer(self) -> bool {
        matches!(self, Self::AnswerCorrect | Self::AnswerIncorrect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnswerCorrect => "answer_correct",
            Self::AnswerIncorrect => "answer_incorrect",
            Self::HintUsed => "hint_used",
            Self::TimeSpent => "time_spent",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid event kind: {0}")]
    InvalidEventKind(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningEvent {
    pub student_id: String,
    pub concept_id: String,
    pub session_id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl LearningEvent {
    /// Seconds reported by a `time_spent` event, zero when absent or malformed.
    pub fn time_taken_seconds(&self) -> f64 {
        self.data
            .get("timeTakenSeconds")
            .or_else(|| self.data.get("time_taken"))
            .and_then(Value::as_f64)
            .map(|v| v.max(0.0))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_the_four_kinds() {
        assert_eq!(EventKind::parse("answer_correct").unwrap(), EventKind::AnswerCorrect);
        assert_eq!(EventKind::parse("answer_incorrect").unwrap(), EventKind::AnswerIncorrect);
        assert_eq!(EventKind::parse("hint_used").unwrap(), EventKind::HintUsed);
        assert_eq!(EventKind::parse("time_spent").unwrap(), EventKind::TimeSpent);
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let err = EventKind::parse("answer_skipped").unwrap_err();
        assert!(matches!(err, EventError::InvalidEventKind(_)));
    }

    #[test]
    fn time_taken_reads_both_payload_spellings() {
        let event = LearningEvent {
            student_id: "s1".into(),
            concept_id: "c1".into(),
            session_id: "sess".into(),
            kind: EventKind::TimeSpent,
            timestamp: Utc::now(),
            data: serde_json::json!({ "timeTakenSeconds": 90.0 }),
        };
        assert_eq!(event.time_taken_seconds(), 90.0);

        let event = LearningEvent {
            data: serde_json::json!({ "time_taken": 30 }),
            ..event
        };
        assert_eq!(event.time_taken_seconds(), 30.0);
    }

    #[test]
    fn time_taken_clamps_negative_payloads() {
        let event = LearningEvent {
            student_id: "s1".into(),
            concept_id: "c1".into(),
            session_id: "sess".into(),
            kind: EventKind::TimeSpent,
            timestamp: Utc::now(),
            data: serde_json::json!({ "timeTakenSeconds": -5.0 }),
        };
        assert_eq!(event.time_taken_seconds(), 0.0);
    }
}
