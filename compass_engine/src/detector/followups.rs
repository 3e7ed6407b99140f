//! AI-assisted follow-up generation and the comprehensive deep pass
//!
//! All completion output is parsed leniently: non-JSON or malformed JSON
//! degrades to the static question set (follow-ups) or to zero additional
//! gaps (deep pass). A completion failure never fails the owning analysis.

use serde::Deserialize;

use compass_core::assessment::AssessmentId;
use compass_core::completion::{complete_with_retry, CompletionClient, CompletionOptions};
use compass_core::config::RetryConfig;
use compass_core::domain::BusinessDomain;
use compass_core::gap::{AssessmentGap, GapCategory};

/// Static follow-up questions served when the completion service fails or
/// returns unparsable content.
pub const STATIC_FOLLOW_UPS: &[&str] = &[
    "What measurable outcome would success look like here?",
    "What constraints (budget, people, systems) shape this answer?",
    "Can you give a concrete recent example?",
];

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

/// Generate follow-up questions for a shallow answer.
///
/// Falls back to `STATIC_FOLLOW_UPS` on any completion or parse failure.
pub async fn follow_up_questions(
    completion: &dyn CompletionClient,
    retry: &RetryConfig,
    domain: BusinessDomain,
    question_id: &str,
    answer: &str,
) -> Vec<String> {
    let prompt = format!(
        "A company answered the '{question_id}' question in the {domain} section of a \
         business assessment with: \"{answer}\". The answer is too brief to act on. \
         Reply with a JSON array of 2-3 short follow-up questions that would draw out \
         the missing detail.",
    );

    let raw = match complete_with_retry(completion, &prompt, &CompletionOptions::default(), retry)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Follow-up generation failed for {domain}/{question_id}: {e}");
            return STATIC_FOLLOW_UPS.iter().map(|q| q.to_string()).collect();
        }
    };

    match serde_json::from_str::<Vec<String>>(strip_code_fences(&raw)) {
        Ok(questions) if !questions.is_empty() => questions,
        _ => {
            tracing::warn!(
                "Unparsable follow-up response for {domain}/{question_id}, using static set"
            );
            STATIC_FOLLOW_UPS.iter().map(|q| q.to_string()).collect()
        }
    }
}

#[derive(Debug, Deserialize)]
struct AiGap {
    description: String,
    category: String,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    estimated_minutes: Option<u32>,
    #[serde(default)]
    follow_up_questions: Vec<String>,
}

fn parse_category(raw: &str) -> Option<GapCategory> {
    match raw.trim().to_lowercase().as_str() {
        "critical" => Some(GapCategory::Critical),
        "important" => Some(GapCategory::Important),
        "nice-to-have" | "nice to have" => Some(GapCategory::NiceToHave),
        _ => None,
    }
}

/// Comprehensive-depth AI pass over one answer.
///
/// Parses a structured response into zero or more gaps; malformed output or
/// unknown categories degrade to skipped entries, never to an error.
pub async fn deep_analysis_gaps(
    completion: &dyn CompletionClient,
    retry: &RetryConfig,
    assessment_id: AssessmentId,
    domain: BusinessDomain,
    question_id: &str,
    answer: &str,
) -> Vec<AssessmentGap> {
    let prompt = format!(
        "Review this business-assessment answer for information gaps.\n\
         Section: {domain}\nQuestion: {question_id}\nAnswer: \"{answer}\"\n\
         Reply with a JSON array of objects with fields: description (string), \
         category (one of critical, important, nice-to-have), priority (0-10, \
         optional), estimated_minutes (optional), follow_up_questions (array of \
         strings, optional). Reply with [] if the answer is complete.",
    );

    let raw = match complete_with_retry(completion, &prompt, &CompletionOptions::default(), retry)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Deep analysis failed for {domain}/{question_id}: {e}");
            return Vec::new();
        }
    };

    let parsed: Vec<AiGap> = match serde_json::from_str(strip_code_fences(&raw)) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Unparsable deep-analysis response for {domain}/{question_id}: {e}");
            return Vec::new();
        }
    };

    parsed
        .into_iter()
        .filter_map(|entry| {
            let category = parse_category(&entry.category)?;
            let mut gap = AssessmentGap::new(
                assessment_id,
                domain,
                category,
                entry.description,
                entry.priority.unwrap_or(match category {
                    GapCategory::Critical => 8,
                    GapCategory::Important => 5,
                    GapCategory::NiceToHave => 2,
                }),
            )
            .for_question(question_id)
            .with_suggestions(entry.follow_up_questions);
            if let Some(minutes) = entry.estimated_minutes {
                gap = gap.with_estimate(minutes);
            }
            Some(gap)
        })
        .collect()
}
