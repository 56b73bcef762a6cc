//! Per-student progress rollup across all practiced concepts.

use std::collections::HashMap;

use serde::Serialize;

use crate::services::concept_graph::ConceptGraph;
use crate::services::performance::PerformanceSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptStatus {
    Mastered,
    GoodProgress,
    Learning,
    Struggling,
    NeedsAttention,
}

impl ConceptStatus {
    pub fn from_mastery(mastery: f64) -> Self {
        if mastery >= 0.8 {
            Self::Mastered
        } else if mastery >= 0.6 {
            Self::GoodProgress
        } else if mastery >= 0.4 {
            Self::Learning
        } else if mastery >= 0.2 {
            Self::Struggling
        } else {
            Self::NeedsAttention
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptProgress {
    pub concept_id: String,
    pub concept_name: String,
    pub mastery_level: f64,
    pub accuracy_rate: f64,
    pub attempts_count: u32,
    pub time_spent_minutes: f64,
    pub status: ConceptStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub student_id: String,
    pub concepts_practiced: usize,
    pub total_attempts: u32,
    pub total_time_minutes: f64,
    pub average_mastery: f64,
    pub average_accuracy: f64,
    pub concept_breakdown: Vec<ConceptProgress>,
    pub recommendations: Vec<String>,
}

pub fn progress_summary(
    student_id: &str,
    summaries: &HashMap<String, PerformanceSummary>,
    graph: &ConceptGraph,
) -> ProgressSummary {
    let count = summaries.len();

    let mut breakdown: Vec<ConceptProgress> = summaries
        .values()
        .map(|summary| ConceptProgress {
            concept_id: summary.concept_id.clone(),
            concept_name: graph
                .get(&summary.concept_id)
                .map(|node| node.name.clone())
                .unwrap_or_else(|| summary.concept_id.clone()),
            mastery_level: summary.mastery_level,
            accuracy_rate: summary.accuracy_rate,
            attempts_count: summary.attempts_count,
            time_spent_minutes: summary.time_spent_minutes,
            status: ConceptStatus::from_mastery(summary.mastery_level),
        })
        .collect();
    breakdown.sort_by(|a, b| a.concept_id.cmp(&b.concept_id));

    let total_attempts = summaries.values().map(|s| s.attempts_count).sum();
    let total_time_minutes = summaries.values().map(|s| s.time_spent_minutes).sum();
    let average = |f: fn(&PerformanceSummary) -> f64| {
        if count == 0 {
            0.0
        } else {
            summaries.values().map(f).sum::<f64>() / count as f64
        }
    };

    ProgressSummary {
        student_id: student_id.to_string(),
        concepts_practiced: count,
        total_attempts,
        total_time_minutes,
        average_mastery: average(|s| s.mastery_level),
        average_accuracy: average(|s| s.accuracy_rate),
        recommendations: progress_recommendations(&breakdown),
        concept_breakdown: breakdown,
    }
}

fn progress_recommendations(breakdown: &[ConceptProgress]) -> Vec<String> {
    let mut recommendations = Vec::new();

    let mastered = breakdown
        .iter()
        .filter(|c| c.status == ConceptStatus::Mastered)
        .count();
    if mastered > 0 {
        recommendations.push(format!("{mastered} concept(s) mastered, keep it up"));
    }

    let struggling = breakdown
        .iter()
        .filter(|c| matches!(c.status, ConceptStatus::Struggling | ConceptStatus::NeedsAttention))
        .count();
    if struggling > 0 {
        recommendations.push(format!(
            "{struggling} concept(s) need more practice before moving on"
        ));
    }

    if breakdown.is_empty() {
        recommendations.push("No practice recorded yet, start with a session".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::events::{EventKind, LearningEvent};
    use crate::services::performance::apply_event;
    use chrono::Utc;
    use serde_json::json;

    fn summary_with(concept: &str, kinds: &[EventKind]) -> PerformanceSummary {
        let mut summary = PerformanceSummary::zero("s1", concept);
        for &kind in kinds {
            apply_event(
                &mut summary,
                &LearningEvent {
                    student_id: "s1".into(),
                    concept_id: concept.into(),
                    session_id: "sess".into(),
                    kind,
                    timestamp: Utc::now(),
                    data: json!({}),
                },
            );
        }
        summary
    }

    #[test]
    fn status_buckets_cover_the_mastery_range() {
        assert_eq!(ConceptStatus::from_mastery(0.9), ConceptStatus::Mastered);
        assert_eq!(ConceptStatus::from_mastery(0.7), ConceptStatus::GoodProgress);
        assert_eq!(ConceptStatus::from_mastery(0.5), ConceptStatus::Learning);
        assert_eq!(ConceptStatus::from_mastery(0.3), ConceptStatus::Struggling);
        assert_eq!(ConceptStatus::from_mastery(0.1), ConceptStatus::NeedsAttention);
    }

    #[test]
    fn rollup_aggregates_across_concepts() {
        let graph = ConceptGraph::fallback();
        let mut summaries = HashMap::new();
        summaries.insert(
            "algebra_basics".to_string(),
            summary_with("algebra_basics", &[EventKind::AnswerCorrect, EventKind::AnswerCorrect]),
        );
        summaries.insert(
            "linear_equations".to_string(),
            summary_with("linear_equations", &[EventKind::AnswerIncorrect]),
        );

        let progress = progress_summary("s1", &summaries, &graph);
        assert_eq!(progress.concepts_practiced, 2);
        assert_eq!(progress.total_attempts, 3);
        assert_eq!(progress.concept_breakdown.len(), 2);
        assert_eq!(progress.concept_breakdown[0].concept_name, "Algebra Basics");
    }

    #[test]
    fn empty_student_gets_a_starter_nudge() {
        let graph = ConceptGraph::fallback();
        let progress = progress_summary("s1", &HashMap::new(), &graph);
        assert_eq!(progress.concepts_practiced, 0);
        assert_eq!(progress.recommendations.len(), 1);
    }
}
