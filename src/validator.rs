//! Turns the classifier's free-text completion into a [`ValidatedAnalysis`].
//!
//! The completion is untrusted: it may be wrapped in a Markdown fence, use
//! numbers where strings were asked for, or leave fields out. Nothing from
//! it reaches a report without passing through here.

use crate::error::AnalysisError;
use crate::results::{Highlight, RiskLevel, ValidatedAnalysis};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*").expect("fence pattern should be valid"));

const CLOSING_FENCE: &str = "```";

/// Strips surrounding Markdown code fences and outer whitespace.
///
/// Fences are peeled until none are left, so the result never starts or
/// ends with one and cleaning it again changes nothing.
pub fn clean_completion(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let before = text.len();
        if let Some(fence) = OPENING_FENCE.find(text) {
            text = text[fence.end()..].trim();
        }
        if let Some(stripped) = text.strip_suffix(CLOSING_FENCE) {
            text = stripped.trim();
        }
        if text.len() == before {
            return text;
        }
    }
}

/// Cleans, parses and validates a raw completion.
pub fn parse_completion(raw: &str) -> Result<ValidatedAnalysis, AnalysisError> {
    let format_error = |reason: String| AnalysisError::ResponseFormat {
        raw_text: raw.to_string(),
        reason,
    };

    let cleaned = clean_completion(raw);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| format_error(format!("the response is not valid JSON ({e})")))?;
    let Value::Object(fields) = value else {
        return Err(format_error("the response is not a JSON object".to_string()));
    };

    let score = match fields.get("score") {
        None | Some(Value::Null) => return Err(format_error("missing \"score\"".to_string())),
        Some(value) => parse_score(value)
            .ok_or_else(|| format_error(format!("\"score\" is not a number: {value}")))?,
    };

    let risk_level = match fields.get("riskLevel") {
        None | Some(Value::Null) => {
            return Err(format_error("missing \"riskLevel\"".to_string()));
        }
        Some(value) => parse_risk_level(value).unwrap_or_else(|| {
            let derived = RiskLevel::from_score(score);
            ::log::warn!(
                "Unrecognised riskLevel {} for score {}, using {}",
                value,
                score,
                derived
            );
            derived
        }),
    };

    Ok(ValidatedAnalysis {
        score,
        risk_level,
        flagged_issues: parse_issues(&fields),
        highlights: parse_highlights(&fields),
    })
}

/// Accepts integers, floats (rounded) and numeric strings, clamped to 0..=100
fn parse_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

fn parse_risk_level(value: &Value) -> Option<RiskLevel> {
    match value {
        Value::String(label) => RiskLevel::from_label(label),
        Value::Number(rank) => RiskLevel::from_rank(rank.as_i64()?),
        _ => None,
    }
}

/// Missing or malformed issue lists become empty lists
fn parse_issues(fields: &Map<String, Value>) -> Vec<String> {
    match fields.get("flaggedIssuesList") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => {
            vec![single.trim().to_string()]
        }
        _ => Vec::new(),
    }
}

/// Missing or malformed highlight lists become empty lists; entries without
/// a phrase are dropped
fn parse_highlights(fields: &Map<String, Value>) -> Vec<Highlight> {
    let Some(Value::Array(items)) = fields.get("highlights") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let entry = item.as_object()?;
            let phrase = entry.get("phrase").and_then(scalar_text)?;
            let reason = entry.get("reason").and_then(scalar_text).unwrap_or_default();
            let risk_level = match entry.get("riskLevel") {
                Some(Value::Number(rank)) => rank
                    .as_i64()
                    .and_then(RiskLevel::from_rank)
                    .map(|level| level.label().to_string())
                    .unwrap_or_else(|| rank.to_string()),
                Some(Value::String(label)) => RiskLevel::from_label(label)
                    .map(|level| level.label().to_string())
                    .unwrap_or_else(|| label.trim().to_string()),
                _ => String::new(),
            };
            Some(Highlight {
                phrase,
                reason,
                risk_level,
            })
        })
        .collect()
}

/// Non-empty text of a string, number or bool value
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
