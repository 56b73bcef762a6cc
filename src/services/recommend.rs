//! Deterministic recommendation ladder over a performance summary. First
//! matching rule wins per category; several categories may fire at once.

use serde::Serialize;

use crate::services::performance::{
    round2, PerformanceSummary, DIFFICULTY_STEP, MAX_DIFFICULTY, MIN_DIFFICULTY,
};

const LOW_MASTERY: f64 = 0.3;
const LOW_ACCURACY: f64 = 0.5;
const HIGH_ACCURACY: f64 = 0.8;
const MIN_ATTEMPTS_FOR_ACCURACY_RULES: u32 = 3;
const EXCESSIVE_HINT_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    ReviewPrerequisites,
    ReduceDifficulty,
    AdvanceConcept,
    StartWithExplanation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub category: ActionCategory,
    pub priority: Priority,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub actions: Vec<RecommendedAction>,
    pub suggested_difficulty: f64,
    pub warnings: Vec<String>,
}

impl RecommendationSet {
    /// Short human strings, used as the immediate feedback on event acks.
    pub fn action_lines(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.action.clone()).collect()
    }
}

pub fn recommend(summary: &PerformanceSummary) -> RecommendationSet {
    let mut actions = Vec::new();
    let mut warnings = Vec::new();
    let mut suggested_difficulty = summary.difficulty_preference;

    if summary.attempts_count == 0 {
        actions.push(RecommendedAction {
            category: ActionCategory::StartWithExplanation,
            priority: Priority::Medium,
            action: "Start with a guided explanation of this concept".to_string(),
        });
        return RecommendationSet {
            actions,
            suggested_difficulty,
            warnings,
        };
    }

    if summary.mastery_level < LOW_MASTERY {
        actions.push(RecommendedAction {
            category: ActionCategory::ReviewPrerequisites,
            priority: Priority::High,
            action: "Review the prerequisites before continuing".to_string(),
        });
    }

    if summary.attempts_count >= MIN_ATTEMPTS_FOR_ACCURACY_RULES {
        if summary.accuracy_rate < LOW_ACCURACY {
            suggested_difficulty = round2(
                (summary.difficulty_preference - DIFFICULTY_STEP).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
            );
            actions.push(RecommendedAction {
                category: ActionCategory::ReduceDifficulty,
                priority: Priority::High,
                action: format!(
                    "Accuracy is low, drop difficulty to {suggested_difficulty:.1} to rebuild confidence"
                ),
            });
        } else if summary.accuracy_rate >= HIGH_ACCURACY {
            suggested_difficulty = round2(
                (summary.difficulty_preference + DIFFICULTY_STEP).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
            );
            actions.push(RecommendedAction {
                category: ActionCategory::AdvanceConcept,
                priority: Priority::Medium,
                action: "Strong accuracy, consider advancing to the next concept".to_string(),
            });
        }
    }

    if summary.hint_ratio() > EXCESSIVE_HINT_RATIO {
        warnings.push(format!(
            "hint usage is high ({:.0}% of attempts), understanding may be shallow",
            summary.hint_ratio().min(1.0) * 100.0
        ));
    }

    RecommendationSet {
        actions,
        suggested_difficulty,
        warnings,
    }
}
