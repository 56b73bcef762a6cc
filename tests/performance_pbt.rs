//! Property-based tests for the updater and planner invariants:
//! - attempts always equal the folded answer events
//! - accuracy is recomputable from scratch, bit for bit
//! - mastery stays in [0,1], difficulty stays in [0.2,1.0]
//! - planned paths are topologically valid on arbitrary acyclic graphs

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use serde_json::json;

use tutor_backend_rust::services::concept_graph::{ConceptGraph, ConceptNode};
use tutor_backend_rust::services::events::{EventKind, LearningEvent};
use tutor_backend_rust::services::path_planner::{plan_path, Strategy as PlanStrategy};
use tutor_backend_rust::services::performance::{apply_event, PerformanceSummary};

fn arb_event_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::AnswerCorrect),
        Just(EventKind::AnswerIncorrect),
        Just(EventKind::HintUsed),
        Just(EventKind::TimeSpent),
    ]
}

fn arb_strategy() -> impl Strategy<Value = PlanStrategy> {
    prop_oneof![
        Just(PlanStrategy::Adaptive),
        Just(PlanStrategy::MasteryFocused),
        Just(PlanStrategy::BreadthFirst),
        Just(PlanStrategy::Remediation),
        Just(PlanStrategy::DepthFirst),
    ]
}

fn event(kind: EventKind, seconds: f64) -> LearningEvent {
    LearningEvent {
        student_id: "s1".into(),
        concept_id: "c1".into(),
        session_id: "sess".into(),
        kind,
        timestamp: Utc::now(),
        data: json!({ "timeTakenSeconds": seconds }),
    }
}

proptest! {
    #[test]
    fn counters_and_bounds_hold_for_any_event_sequence(
        kinds in proptest::collection::vec(arb_event_kind(), 0..200),
        seconds in 0.0f64..600.0,
    ) {
        let mut summary = PerformanceSummary::zero("s1", "c1");
        let mut correct = 0u32;
        let mut answers = 0u32;

        for &kind in &kinds {
            apply_event(&mut summary, &event(kind, seconds));

            match kind {
                EventKind::AnswerCorrect => { correct += 1; answers += 1; }
                EventKind::AnswerIncorrect => { answers += 1; }
                _ => {}
            }

            prop_assert_eq!(summary.attempts_count, answers);
            prop_assert_eq!(summary.correct_count, correct);

            // Recomputed from counters, so it must match exactly.
            let expected_accuracy = if answers == 0 { 0.0 } else { correct as f64 / answers as f64 };
            prop_assert_eq!(summary.accuracy_rate.to_bits(), expected_accuracy.to_bits());

            prop_assert!((0.0..=1.0).contains(&summary.mastery_level));
            prop_assert!((0.2..=1.0).contains(&summary.difficulty_preference));
            prop_assert!(summary.time_spent_minutes >= 0.0);
        }
    }

    #[test]
    fn folding_is_deterministic(
        kinds in proptest::collection::vec(arb_event_kind(), 0..100),
    ) {
        let run = || {
            let mut summary = PerformanceSummary::zero("s1", "c1");
            for &kind in &kinds {
                apply_event(&mut summary, &event(kind, 30.0));
            }
            summary
        };
        let a = run();
        let b = run();
        prop_assert_eq!(a.mastery_level.to_bits(), b.mastery_level.to_bits());
        prop_assert_eq!(a.difficulty_preference.to_bits(), b.difficulty_preference.to_bits());
        prop_assert_eq!(a.attempts_count, b.attempts_count);
    }

    #[test]
    fn planned_paths_are_topologically_valid(
        // Layered random DAG: node i may only require nodes with smaller
        // indices, so the graph is acyclic by construction.
        prereq_picks in proptest::collection::vec(
            proptest::collection::vec(0usize..12, 0..3),
            1..12,
        ),
        target_picks in proptest::collection::vec(0usize..12, 1..6),
        strategy in arb_strategy(),
        max_concepts in 1usize..12,
    ) {
        let n = prereq_picks.len();
        let nodes: Vec<ConceptNode> = prereq_picks
            .iter()
            .enumerate()
            .map(|(i, picks)| {
                let mut prereqs: Vec<String> = picks
                    .iter()
                    .filter(|&&p| p < i)
                    .map(|p| format!("n{p}"))
                    .collect();
                prereqs.dedup();
                ConceptNode {
                    id: format!("n{i}"),
                    name: format!("Node {i}"),
                    description: String::new(),
                    prerequisites: prereqs,
                }
            })
            .collect();
        let graph = ConceptGraph::new(nodes).unwrap();

        let targets: Vec<String> = target_picks.iter().map(|&t| format!("n{}", t % n)).collect();

        let path = plan_path(&graph, &HashMap::new(), &targets, strategy, max_concepts).unwrap();

        prop_assert!(path.steps.len() <= max_concepts);

        // Every step's prerequisites that also appear in the path must
        // appear earlier.
        for (i, step) in path.steps.iter().enumerate() {
            let node = graph.get(&step.concept_id).unwrap();
            for prereq in &node.prerequisites {
                if let Some(j) = path.steps.iter().position(|s| &s.concept_id == prereq) {
                    prop_assert!(j < i, "prerequisite {} placed after {}", prereq, step.concept_id);
                }
            }
        }

        // Step numbering is 1-based and dense.
        for (i, step) in path.steps.iter().enumerate() {
            prop_assert_eq!(step.step, i + 1);
        }
    }
}
