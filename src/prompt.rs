//! Builds the instruction pair sent to the classifier.

use crate::config::PromptConfig;
use crate::utils::truncate_chars;
use serde::Serialize;

/// System role instruction
pub const SYSTEM_PROMPT: &str = "You are a greenwashing analysis tool. You respond with raw JSON only.";

const CONTENT_PLACEHOLDER: &str = "{content}";

/// User role instruction; `{content}` is replaced by the page text sample
const USER_TEMPLATE: &str = r#"You are an expert in greenwashing detection. Analyze the following website content for greenwashing based on these guidelines:
1. Absolute claims (e.g., "100% eco-friendly", "carbon-neutral", "zero emissions") must be supported by a high level of verifiable substantiation (e.g., certifications, specific data, or timelines).
2. Comparative claims (e.g., "greener", "friendlier") must be justified with a clear basis (e.g., comparison to previous products or competitors) and that basis must be transparent.

For each claim, determine:
- The risk level (1 = Low, 2 = Medium-Low, 3 = Medium, 4 = High, 5 = Severe).
- A reason for the risk level.
- The exact phrase, copied verbatim from the content.

Return a single JSON object with exactly these fields:
- "score": integer from 0 to 100, where higher means higher greenwashing risk.
- "riskLevel": one of "Low Risk", "Medium-Low Risk", "Medium Risk", "High Risk", "Severe Risk".
- "flaggedIssuesList": array of short strings, one per issue found.
- "highlights": array of objects {"phrase": string, "reason": string, "riskLevel": string}.

Respond with raw JSON only. Do not wrap the JSON in Markdown code fences and do not add any text before or after it.

Content to analyze:
"{content}""#;

/// The system + user message pair for one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisPrompt {
    pub system: String,
    pub user: String,
}

/// Embeds a bounded prefix of `text` into the grading template.
///
/// Text beyond `config.max_chars` characters is dropped without error; the
/// classifier only ever sees a prefix sample of the page.
pub fn build_prompt(text: &str, config: &PromptConfig) -> AnalysisPrompt {
    let sample = truncate_chars(text, config.max_chars);
    if sample.len() < text.len() {
        ::log::debug!(
            "Prompt sample truncated to {} of {} chars",
            config.max_chars,
            text.chars().count()
        );
    }

    AnalysisPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: USER_TEMPLATE.replacen(CONTENT_PLACEHOLDER, sample, 1),
    }
}
