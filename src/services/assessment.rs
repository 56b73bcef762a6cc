//! Deterministic skill assessment derived from the performance summary.
//! Scores are reproducible from recorded history, never sampled.

use serde::Serialize;

use crate::services::concept_graph::ConceptNode;
use crate::services::performance::PerformanceSummary;

/// Floor for a student who has at least opened the concept.
const BASELINE_SCORE: f64 = 0.2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentFeedback {
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub student_id: String,
    pub concept_id: String,
    pub concept_name: String,
    pub score: f64,
    pub attempts_count: u32,
    pub feedback: AssessmentFeedback,
}

pub fn assess_skill(concept: &ConceptNode, summary: &PerformanceSummary) -> Assessment {
    let score = score_from_summary(summary);
    Assessment {
        student_id: summary.student_id.clone(),
        concept_id: concept.id.clone(),
        concept_name: concept.name.clone(),
        score: (score * 100.0).round() / 100.0,
        attempts_count: summary.attempts_count,
        feedback: feedback(&concept.name, score),
    }
}

/// Mastery carries most of the weight; accuracy keeps the score honest when
/// mastery lags behind a short history.
fn score_from_summary(summary: &PerformanceSummary) -> f64 {
    if summary.attempts_count == 0 {
        return BASELINE_SCORE;
    }
    let blended = 0.7 * summary.mastery_level + 0.3 * summary.accuracy_rate;
    (BASELINE_SCORE + (1.0 - BASELINE_SCORE) * blended).clamp(0.0, 1.0)
}

fn feedback(concept_name: &str, score: f64) -> AssessmentFeedback {
    if score < 0.5 {
        AssessmentFeedback {
            strengths: vec![format!("Basic familiarity with {concept_name}")],
            areas_for_improvement: vec![
                format!("Strengthen fundamental knowledge of {concept_name}"),
                format!("Practice more exercises on {concept_name}"),
            ],
            recommendations: vec![
                format!("Review {concept_name} worked examples"),
                format!("Retry {concept_name} practice problems at a lower difficulty"),
            ],
        }
    } else {
        AssessmentFeedback {
            strengths: vec![format!("Good understanding of {concept_name} fundamentals")],
            areas_for_improvement: vec![format!(
                "Could work on advanced applications of {concept_name}"
            )],
            recommendations: vec![
                format!("Review {concept_name} practice problems"),
                format!("Attempt harder {concept_name} exercises"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::concept_graph::ConceptGraph;
    use crate::services::events::{EventKind, LearningEvent};
    use crate::services::performance::apply_event;
    use chrono::Utc;
    use serde_json::json;

    fn concept() -> ConceptNode {
        ConceptGraph::fallback().get("algebra_basics").unwrap().clone()
    }

    #[test]
    fn fresh_summary_scores_the_baseline() {
        let assessment = assess_skill(&concept(), &PerformanceSummary::zero("s1", "algebra_basics"));
        assert!((assessment.score - BASELINE_SCORE).abs() < f64::EPSILON);
        assert_eq!(assessment.attempts_count, 0);
    }

    #[test]
    fn scores_are_deterministic_for_identical_histories() {
        let build = || {
            let mut summary = PerformanceSummary::zero("s1", "algebra_basics");
            for kind in [EventKind::AnswerCorrect, EventKind::AnswerCorrect, EventKind::AnswerIncorrect] {
                apply_event(
                    &mut summary,
                    &LearningEvent {
                        student_id: "s1".into(),
                        concept_id: "algebra_basics".into(),
                        session_id: "sess".into(),
                        kind,
                        timestamp: Utc::now(),
                        data: json!({}),
                    },
                );
            }
            summary
        };

        let a = assess_skill(&concept(), &build());
        let b = assess_skill(&concept(), &build());
        assert_eq!(a.score, b.score);
        assert!(a.score > BASELINE_SCORE);
    }

    #[test]
    fn low_scores_get_remedial_feedback() {
        let mut summary = PerformanceSummary::zero("s1", "algebra_basics");
        apply_event(
            &mut summary,
            &LearningEvent {
                student_id: "s1".into(),
                concept_id: "algebra_basics".into(),
                session_id: "sess".into(),
                kind: EventKind::AnswerIncorrect,
                timestamp: Utc::now(),
                data: json!({}),
            },
        );
        let assessment = assess_skill(&concept(), &summary);
        assert!(assessment.score < 0.5);
        assert_eq!(assessment.feedback.areas_for_improvement.len(), 2);
    }
}
