//! Per-(student, concept) performance summary and the mastery/difficulty
//! updater. `apply_event` is a pure fold over the summary: no state outside
//! the summary itself is read or written.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::events::{EventKind, LearningEvent};

pub const DEFAULT_DIFFICULTY: f64 = 0.5;
pub const MIN_DIFFICULTY: f64 = 0.2;
pub const MAX_DIFFICULTY: f64 = 1.0;
pub const DIFFICULTY_STEP: f64 = 0.1;

/// Mastery blend weights, must sum to 1.0.
const ACCURACY_WEIGHT: f64 = 0.6;
const CONSISTENCY_WEIGHT: f64 = 0.2;
const EFFICIENCY_WEIGHT: f64 = 0.2;

/// Rolling accuracy window driving difficulty adjustment.
const ROLLING_WINDOW: usize = 5;
/// Answers retained for the consistency term.
const RECENT_ANSWER_CAP: usize = 10;

/// Minutes-per-attempt anchors for the efficiency term.
const FAST_MINUTES_PER_ATTEMPT: f64 = 2.0;
const SLOW_MINUTES_PER_ATTEMPT: f64 = 20.0;

/// Weak negative signal: hints dampen mastery proportionally to usage.
const HINT_DAMPENING: f64 = 0.05;

const HIGH_ACCURACY: f64 = 0.8;
const LOW_ACCURACY: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub student_id: String,
    pub concept_id: String,
    pub attempts_count: u32,
    pub correct_count: u32,
    pub hint_count: u32,
    pub accuracy_rate: f64,
    pub time_spent_minutes: f64,
    pub mastery_level: f64,
    pub difficulty_preference: f64,
    pub last_accessed: DateTime<Utc>,
    #[serde(skip)]
    recent_answers: VecDeque<bool>,
}

impl PerformanceSummary {
    /// Zero-valued baseline, returned for keys with no recorded events.
    pub fn zero(student_id: impl Into<String>, concept_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            concept_id: concept_id.into(),
            attempts_count: 0,
            correct_count: 0,
            hint_count: 0,
            accuracy_rate: 0.0,
            time_spent_minutes: 0.0,
            mastery_level: 0.0,
            difficulty_preference: DEFAULT_DIFFICULTY,
            last_accessed: Utc::now(),
            recent_answers: VecDeque::new(),
        }
    }

    /// Mean of the last `ROLLING_WINDOW` answers, `None` before the first one.
    pub fn rolling_accuracy(&self) -> Option<f64> {
        if self.recent_answers.is_empty() {
            return None;
        }
        let take = self.recent_answers.len().min(ROLLING_WINDOW);
        let window = self.recent_answers.iter().rev().take(take);
        let correct = window.filter(|&&v| v).count();
        Some(correct as f64 / take as f64)
    }

    pub fn hint_ratio(&self) -> f64 {
        if self.attempts_count == 0 && self.hint_count == 0 {
            return 0.0;
        }
        self.hint_count as f64 / (self.attempts_count.max(1)) as f64
    }
}

/// Folds one event into the summary: counters, recomputed accuracy, mastery
/// blend, then difficulty adjustment. Idempotent given identical inputs.
pub fn apply_event(summary: &mut PerformanceSummary, event: &LearningEvent) {
    match event.kind {
        EventKind::AnswerCorrect => {
            summary.attempts_count += 1;
            summary.correct_count += 1;
            push_recent(summary, true);
        }
        EventKind::AnswerIncorrect => {
            summary.attempts_count += 1;
            push_recent(summary, false);
        }
        EventKind::HintUsed => {
            summary.hint_count += 1;
        }
        EventKind::TimeSpent => {
            summary.time_spent_minutes += event.time_taken_seconds() / 60.0;
        }
    }

    // Recomputed from counters each time, never incrementally averaged.
    summary.accuracy_rate = if summary.attempts_count == 0 {
        0.0
    } else {
        summary.correct_count as f64 / summary.attempts_count as f64
    };

    summary.mastery_level = mastery_level(summary);

    // Only answer events move the rolling window, so only they adjust
    // difficulty. Repeated hint/time events would otherwise walk the
    // preference against an unchanged window.
    if event.kind.is_answer() {
        summary.difficulty_preference = adjust_difficulty(summary);
    }

    summary.last_accessed = event.timestamp;
}

/// Weighted blend of accuracy, consistency and efficiency, clamped to [0,1].
pub fn mastery_level(summary: &PerformanceSummary) -> f64 {
    if summary.attempts_count == 0 {
        return 0.0;
    }

    let blend = ACCURACY_WEIGHT * summary.accuracy_rate
        + CONSISTENCY_WEIGHT * consistency_term(&summary.recent_answers)
        + EFFICIENCY_WEIGHT * efficiency_term(summary);

    let dampened = blend - HINT_DAMPENING * summary.hint_ratio().min(1.0);
    dampened.clamp(0.0, 1.0)
}

/// Low variance over the recent answer window reads as consistent work.
/// Bernoulli variance tops out at 0.25, so `1 - 4 * var` spans [0,1].
fn consistency_term(recent: &VecDeque<bool>) -> f64 {
    if recent.len() < 2 {
        return 0.5;
    }
    let n = recent.len() as f64;
    let mean = recent.iter().filter(|&&v| v).count() as f64 / n;
    let variance = recent
        .iter()
        .map(|&v| {
            let x = if v { 1.0 } else { 0.0 };
            (x - mean) * (x - mean)
        })
        .sum::<f64>()
        / n;
    (1.0 - 4.0 * variance).clamp(0.0, 1.0)
}

/// Linear ramp between slow and fast minutes-per-attempt anchors. Neutral
/// when no time has been reported yet.
fn efficiency_term(summary: &PerformanceSummary) -> f64 {
    if summary.attempts_count == 0 || summary.time_spent_minutes <= 0.0 {
        return 0.5;
    }
    let avg = summary.time_spent_minutes / summary.attempts_count as f64;
    ((SLOW_MINUTES_PER_ATTEMPT - avg) / (SLOW_MINUTES_PER_ATTEMPT - FAST_MINUTES_PER_ATTEMPT))
        .clamp(0.0, 1.0)
}

/// Step the preference by the rolling accuracy over the last answers and
/// clamp to the allowed band.
fn adjust_difficulty(summary: &PerformanceSummary) -> f64 {
    let Some(rolling) = summary.rolling_accuracy() else {
        return summary.difficulty_preference;
    };

    let next = if rolling >= HIGH_ACCURACY {
        summary.difficulty_preference + DIFFICULTY_STEP
    } else if rolling <= LOW_ACCURACY {
        summary.difficulty_preference - DIFFICULTY_STEP
    } else {
        summary.difficulty_preference
    };

    // Rounded so repeated 0.1 steps stay on exact grid values instead of
    // accumulating float error.
    round2(next.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn push_recent(summary: &mut PerformanceSummary, correct: bool) {
    if summary.recent_answers.len() == RECENT_ANSWER_CAP {
        summary.recent_answers.pop_front();
    }
    summary.recent_answers.push_back(correct);
}
