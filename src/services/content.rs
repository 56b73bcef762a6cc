//! Personalized content generation. The LLM collaborator is best-effort:
//! whatever goes wrong (not configured, transport error, unparseable reply)
//! the operation still succeeds with a deterministic templated payload.

use serde::Serialize;
use serde_json::{json, Value};

use crate::services::concept_graph::ConceptNode;
use crate::services::llm_provider::LlmProvider;
use crate::services::performance::PerformanceSummary;

const SYSTEM_PROMPT: &str =
    "You are an adaptive tutoring content generator. Reply with a single JSON object and nothing else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Explanation,
    Practice,
    Feedback,
    Summary,
}

impl ContentKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "explanation" => Some(Self::Explanation),
            "practice" => Some(Self::Practice),
            "feedback" => Some(Self::Feedback),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationFactors {
    pub mastery_level: f64,
    pub accuracy_rate: f64,
    pub attempts_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub student_id: String,
    pub concept_id: String,
    pub content_type: ContentKind,
    pub difficulty_level: f64,
    pub learning_style: String,
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub content: Value,
    pub personalization_factors: PersonalizationFactors,
}

pub async fn generate_content(
    llm: &LlmProvider,
    llm_enabled: bool,
    concept: &ConceptNode,
    summary: &PerformanceSummary,
    kind: ContentKind,
    difficulty: f64,
    learning_style: &str,
) -> GeneratedContent {
    let factors = PersonalizationFactors {
        mastery_level: summary.mastery_level,
        accuracy_rate: summary.accuracy_rate,
        attempts_count: summary.attempts_count,
    };

    let (content, ai_powered, fallback_reason) = if !llm_enabled || !llm.is_available() {
        (
            fallback_content(kind, concept, summary, difficulty),
            false,
            Some("content collaborator unavailable".to_string()),
        )
    } else {
        let prompt = build_prompt(kind, concept, summary, difficulty, learning_style);
        match llm.complete_with_system(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => match extract_json(&text) {
                Ok(value) => (value, true, None),
                Err(err) => {
                    tracing::warn!(error = %err, concept_id = %concept.id, "unparseable collaborator reply, using template");
                    (
                        fallback_content(kind, concept, summary, difficulty),
                        false,
                        Some(format!("unparseable collaborator reply: {err}")),
                    )
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, concept_id = %concept.id, "content collaborator failed, using template");
                (
                    fallback_content(kind, concept, summary, difficulty),
                    false,
                    Some(format!("collaborator call failed: {err}")),
                )
            }
        }
    };

    GeneratedContent {
        student_id: summary.student_id.clone(),
        concept_id: concept.id.clone(),
        content_type: kind,
        difficulty_level: difficulty,
        learning_style: learning_style.to_string(),
        ai_powered,
        fallback_reason,
        content,
        personalization_factors: factors,
    }
}

fn build_prompt(
    kind: ContentKind,
    concept: &ConceptNode,
    summary: &PerformanceSummary,
    difficulty: f64,
    learning_style: &str,
) -> String {
    let context = format!(
        "Student profile:\n\
         - mastery level: {:.2}\n\
         - accuracy rate: {:.2}\n\
         - attempts made: {}\n\
         - target difficulty: {difficulty:.2}\n\
         - learning style: {learning_style}\n\
         Concept: {}: {}",
        summary.mastery_level, summary.accuracy_rate, summary.attempts_count, concept.name, concept.description,
    );

    match kind {
        ContentKind::Explanation => format!(
            "{context}\n\nGenerate a personalized explanation of {} matched to the profile above. \
             Return JSON with: \"explanation\", \"key_points\" (3-5 items), \"analogies\" (2-3 items), \"next_steps\".",
            concept.name
        ),
        ContentKind::Practice => format!(
            "{context}\n\nGenerate practice problems for {} at difficulty {difficulty:.2} with scaffolding. \
             Return JSON with: \"problems\" (3-5 items), \"hints\", \"solutions\", \"success_criteria\".",
            concept.name
        ),
        ContentKind::Feedback => format!(
            "{context}\n\nGenerate constructive feedback on the student's progress with {}. \
             Return JSON with: \"encouragement\", \"areas_of_strength\", \"improvement_areas\", \"strategies\".",
            concept.name
        ),
        ContentKind::Summary => format!(
            "{context}\n\nGenerate a concise summary of {} reinforcing key ideas at the student's level. \
             Return JSON with: \"summary\", \"key_takeaways\", \"connections\", \"review_schedule\".",
            concept.name
        ),
    }
}

/// Deterministic template used whenever the collaborator cannot deliver.
pub fn fallback_content(
    kind: ContentKind,
    concept: &ConceptNode,
    summary: &PerformanceSummary,
    difficulty: f64,
) -> Value {
    let name = &concept.name;
    match kind {
        ContentKind::Explanation => json!({
            "explanation": format!(
                "{name}: {}. Work through the idea step by step and verify each part before moving on.",
                concept.description
            ),
            "key_points": [
                format!("Understand the definition of {name}"),
                format!("Connect {name} to its prerequisites"),
                format!("Apply {name} to a worked example"),
            ],
            "analogies": [
                format!("Think of {name} as building blocks stacked on what you already know"),
            ],
            "next_steps": [format!("Try a practice set on {name} at difficulty {difficulty:.1}")],
        }),
        ContentKind::Practice => json!({
            "problems": [
                format!("Warm-up problem on {name}"),
                format!("Standard problem on {name} at difficulty {difficulty:.1}"),
                format!("Stretch problem combining {name} with a prerequisite"),
            ],
            "hints": [format!("Re-read the definition of {name} before each problem")],
            "solutions": [],
            "success_criteria": [format!("Solve two of three {name} problems without hints")],
        }),
        ContentKind::Feedback => json!({
            "encouragement": format!(
                "You have made {} attempt(s) on {name}, keep going.",
                summary.attempts_count
            ),
            "areas_of_strength": if summary.accuracy_rate >= 0.5 {
                vec![format!("Answering {name} questions correctly more often than not")]
            } else {
                vec![format!("Persistence with {name}")]
            },
            "improvement_areas": [format!("Accuracy on {name} is {:.0}%", summary.accuracy_rate * 100.0)],
            "strategies": [format!("Review one worked {name} example before each session")],
        }),
        ContentKind::Summary => json!({
            "summary": format!("{name}: {}", concept.description),
            "key_takeaways": [format!("Core idea of {name}")],
            "connections": concept.prerequisites.clone(),
            "review_schedule": "Review again in two days, then in a week",
        }),
    }
}

/// Pulls a JSON object out of a model reply: strips code fences and trailing
/// commas, then parses strictly.
pub fn extract_json(text: &str) -> Result<Value, serde_json::Error> {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    let without_commas = strip_trailing_commas(cleaned.trim());
    serde_json::from_str(&without_commas)
}

/// Removes `,` immediately preceding `}` or `]`, outside string literals.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '}' | ']' => {
                let trimmed_len = out.trim_end().len();
                if out[..trimmed_len].ends_with(',') {
                    out.truncate(trimmed_len - 1);
                }
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
