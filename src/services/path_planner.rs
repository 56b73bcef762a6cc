//! Prerequisite-respecting path planning over the static concept graph.
//!
//! Planning runs in two passes: a capped depth-first pass collects the
//! prerequisite closure of the targets, then a post-order walk over that
//! closure produces the final order, so every concept lands after all of its
//! included prerequisites; ties are broken by graph insertion order. Cycles
//! reachable from the targets abort the whole plan rather than looping.

use std::collections::HashMap;

use serde::Serialize;

use crate::services::concept_graph::ConceptGraph;
use crate::services::performance::{PerformanceSummary, DEFAULT_DIFFICULTY};

/// Static per-step estimate when no history exists for the concept.
const DEFAULT_STEP_MINUTES: u32 = 30;

/// Prerequisite expansion depth cap for the breadth-first strategy.
const BREADTH_FIRST_MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Adaptive,
    MasteryFocused,
    BreadthFirst,
    DepthFirst,
    Remediation,
}

impl Strategy {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        match raw {
            "adaptive" => Ok(Self::Adaptive),
            "mastery_focused" => Ok(Self::MasteryFocused),
            "breadth_first" => Ok(Self::BreadthFirst),
            "depth_first" => Ok(Self::DepthFirst),
            "remediation" => Ok(Self::Remediation),
            other => Err(PathError::UnknownStrategy(other.to_string())),
        }
    }

    /// Mastery level at which a concept counts as done for this strategy.
    pub fn mastery_threshold(self) -> f64 {
        match self {
            Self::Adaptive => 0.8,
            Self::MasteryFocused => 0.9,
            Self::BreadthFirst => 0.7,
            Self::DepthFirst => 0.8,
            Self::Remediation => 0.6,
        }
    }

    fn max_prereq_depth(self) -> Option<usize> {
        match self {
            Self::BreadthFirst => Some(BREADTH_FIRST_MAX_DEPTH),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("cyclic prerequisites detected at concept '{0}'")]
    CyclicPrerequisites(String),
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("at least one target concept is required")]
    NoTargets,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStep {
    pub step: usize,
    pub concept_id: String,
    pub concept_name: String,
    pub description: String,
    pub estimated_time_minutes: u32,
    pub current_mastery: f64,
    pub mastery_target: f64,
    pub already_mastered: bool,
    pub recommended_difficulty: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedPath {
    pub strategy: Strategy,
    pub steps: Vec<PathStep>,
    pub total_time_minutes: u32,
    pub warnings: Vec<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum VisitState {
    InProgress,
    Done,
}

/// Plans an ordered learning path for one student. `summaries` holds the
/// student's per-concept summaries; concepts without one are treated as
/// zero-state.
pub fn plan_path(
    graph: &ConceptGraph,
    summaries: &HashMap<String, PerformanceSummary>,
    target_concepts: &[String],
    strategy: Strategy,
    max_concepts: usize,
) -> Result<PlannedPath, PathError> {
    if target_concepts.is_empty() {
        return Err(PathError::NoTargets);
    }

    let mut warnings = Vec::new();

    // Pass one: collect the prerequisite closure, honoring the strategy's
    // depth cap. A node capped under one target may be reached shallower
    // under another, so depths are tracked and capped nodes re-expanded.
    let mut best_depth: HashMap<String, usize> = HashMap::new();
    let mut stack: Vec<String> = Vec::new();
    for target in target_concepts {
        if !graph.contains(target) {
            warnings.push(format!("unknown concept '{target}' skipped"));
            continue;
        }
        collect(
            graph,
            target,
            0,
            strategy.max_prereq_depth(),
            &mut stack,
            &mut best_depth,
            &mut warnings,
        )?;
    }

    // Pass two: post-order walk restricted to the collected closure, so
    // every included concept lands after its included prerequisites even
    // when the cap cut expansion short on the first pass.
    let mut order: Vec<String> = Vec::new();
    let mut states: HashMap<String, VisitState> = HashMap::new();
    for target in target_concepts {
        if graph.contains(target) {
            visit(graph, target, &best_depth, &mut states, &mut order)?;
        }
    }

    let threshold = strategy.mastery_threshold();
    let is_target = |id: &str| target_concepts.iter().any(|t| t == id);

    // Annotate the full topological closure, then filter by strategy.
    let annotated: Vec<PathStep> = order
        .iter()
        .map(|id| annotate(graph, summaries, id, threshold))
        .collect();

    let mut keep: Vec<bool> = annotated
        .iter()
        .map(|step| match strategy {
            Strategy::MasteryFocused => !step.already_mastered,
            Strategy::Remediation => {
                let attempted = summaries
                    .get(&step.concept_id)
                    .map(|s| s.attempts_count > 0)
                    .unwrap_or(false);
                attempted && !step.already_mastered
            }
            _ => is_target(&step.concept_id) || !step.already_mastered,
        })
        .collect();

    // A kept step still needs its unmastered prerequisites, even when the
    // strategy filter would have dropped them (remediation drops
    // never-attempted concepts).
    for i in (0..annotated.len()).rev() {
        if !keep[i] {
            continue;
        }
        if let Some(node) = graph.get(&annotated[i].concept_id) {
            for prereq in &node.prerequisites {
                if let Some(j) = annotated.iter().position(|s| &s.concept_id == prereq) {
                    if !annotated[j].already_mastered {
                        keep[j] = true;
                    }
                }
            }
        }
    }

    let mut steps: Vec<PathStep> = annotated
        .into_iter()
        .zip(keep)
        .filter_map(|(step, kept)| kept.then_some(step))
        .take(max_concepts)
        .collect();

    for (i, step) in steps.iter_mut().enumerate() {
        step.step = i + 1;
    }

    let total_time_minutes = steps.iter().map(|s| s.estimated_time_minutes).sum();

    Ok(PlannedPath {
        strategy,
        steps,
        total_time_minutes,
        warnings,
    })
}

fn collect(
    graph: &ConceptGraph,
    concept_id: &str,
    depth: usize,
    max_depth: Option<usize>,
    stack: &mut Vec<String>,
    best_depth: &mut HashMap<String, usize>,
    warnings: &mut Vec<String>,
) -> Result<(), PathError> {
    if stack.iter().any(|id| id == concept_id) {
        return Err(PathError::CyclicPrerequisites(concept_id.to_string()));
    }
    if let Some(&seen) = best_depth.get(concept_id) {
        if seen <= depth {
            return Ok(());
        }
    }
    best_depth.insert(concept_id.to_string(), depth);

    let expand = max_depth.map(|cap| depth < cap).unwrap_or(true);
    if !expand {
        return Ok(());
    }

    let node = graph.get(concept_id).expect("collected concepts exist in graph");
    let mut prereqs: Vec<&String> = node
        .prerequisites
        .iter()
        .filter(|p| {
            if graph.contains(p) {
                true
            } else {
                let warning = format!(
                    "prerequisite '{p}' of '{concept_id}' missing from graph, skipped"
                );
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
                false
            }
        })
        .collect();
    prereqs.sort_by_key(|p| graph.rank(p));

    stack.push(concept_id.to_string());
    for prereq in prereqs {
        collect(graph, prereq, depth + 1, max_depth, stack, best_depth, warnings)?;
    }
    stack.pop();
    Ok(())
}

fn visit(
    graph: &ConceptGraph,
    concept_id: &str,
    included: &HashMap<String, usize>,
    states: &mut HashMap<String, VisitState>,
    order: &mut Vec<String>,
) -> Result<(), PathError> {
    match states.get(concept_id) {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::InProgress) => {
            return Err(PathError::CyclicPrerequisites(concept_id.to_string()))
        }
        None => {}
    }

    states.insert(concept_id.to_string(), VisitState::InProgress);

    let node = graph.get(concept_id).expect("visited concepts exist in graph");

    // Prerequisites ordered by graph insertion rank for determinism; those
    // outside the collected closure stay out.
    let mut prereqs: Vec<&String> = node
        .prerequisites
        .iter()
        .filter(|p| included.contains_key(p.as_str()))
        .collect();
    prereqs.sort_by_key(|p| graph.rank(p));

    for prereq in prereqs {
        visit(graph, prereq, included, states, order)?;
    }

    states.insert(concept_id.to_string(), VisitState::Done);
    order.push(concept_id.to_string());
    Ok(())
}

fn annotate(
    graph: &ConceptGraph,
    summaries: &HashMap<String, PerformanceSummary>,
    concept_id: &str,
    threshold: f64,
) -> PathStep {
    let node = graph.get(concept_id).expect("planned concepts exist in graph");
    let summary = summaries.get(concept_id);

    let mastery = summary.map(|s| s.mastery_level).unwrap_or(0.0);
    let difficulty = summary
        .map(|s| s.difficulty_preference)
        .unwrap_or(DEFAULT_DIFFICULTY);

    PathStep {
        step: 0,
        concept_id: node.id.clone(),
        concept_name: node.name.clone(),
        description: node.description.clone(),
        estimated_time_minutes: estimate_minutes(summary),
        current_mastery: mastery,
        mastery_target: threshold,
        already_mastered: mastery >= threshold,
        recommended_difficulty: difficulty,
    }
}

/// History-derived estimate: the closer a concept is to mastered, the less
/// time a step should need. No history means the static default.
fn estimate_minutes(summary: Option<&PerformanceSummary>) -> u32 {
    let Some(summary) = summary.filter(|s| s.attempts_count > 0) else {
        return DEFAULT_STEP_MINUTES;
    };

    let base = DEFAULT_STEP_MINUTES as f64;
    let scaled = if summary.mastery_level > 0.8 {
        base * 0.5
    } else if summary.mastery_level > 0.5 {
        base * 0.8
    } else {
        base * 1.2
    };
    scaled.round() as u32
}
