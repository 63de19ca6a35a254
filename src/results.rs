use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fetched page reduced to the text a visitor would read
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    /// URL of the page
    pub url: String,

    /// Body exactly as served
    pub raw_html: String,

    /// Normalized visible text
    pub visible_text: String,
}

/// Ordered greenwashing risk bands, plus the error sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium-Low Risk")]
    MediumLow,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Severe Risk")]
    Severe,
    #[serde(rename = "Error")]
    Error,
}

impl RiskLevel {
    /// The five levels a successful analysis can report, lowest first
    pub const GRADES: [RiskLevel; 5] = [
        RiskLevel::Low,
        RiskLevel::MediumLow,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Severe,
    ];

    /// Wire label, e.g. `"Medium-Low Risk"`
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::MediumLow => "Medium-Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Severe => "Severe Risk",
            RiskLevel::Error => "Error",
        }
    }

    /// Band a 0-100 score falls into
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => RiskLevel::Low,
            20..=39 => RiskLevel::MediumLow,
            40..=59 => RiskLevel::Medium,
            60..=79 => RiskLevel::High,
            _ => RiskLevel::Severe,
        }
    }

    /// Maps the 1 (Low) .. 5 (Severe) scale used for individual claims
    pub fn from_rank(rank: i64) -> Option<Self> {
        let index = usize::try_from(rank.checked_sub(1)?).ok()?;
        Self::GRADES.get(index).copied()
    }

    /// Lenient label matching: case, the " Risk" suffix and the hyphen are optional
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        let normalized = normalized.strip_suffix(" risk").unwrap_or(&normalized);
        match normalized {
            "low" => Some(RiskLevel::Low),
            "medium low" => Some(RiskLevel::MediumLow),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "severe" => Some(RiskLevel::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One flagged phrase of the analyzed text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub phrase: String,
    pub reason: String,
    pub risk_level: String,
}

/// Classifier output that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAnalysis {
    pub score: u8,
    pub risk_level: RiskLevel,
    pub flagged_issues: Vec<String>,
    pub highlights: Vec<Highlight>,
}

/// The report returned to the widget, for successes and failures alike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub score: u8,
    pub risk_level: RiskLevel,
    pub flagged_issues_list: Vec<String>,
    /// `flagged_issues_list` joined for display
    pub flagged_issues: String,
    pub highlights: Vec<Highlight>,
}

impl RiskReport {
    /// Combines validated classifier output with the text it was produced from
    pub fn assemble(analysis: ValidatedAnalysis, analyzed_text: &str) -> Self {
        for highlight in &analysis.highlights {
            if !analyzed_text.contains(&highlight.phrase) {
                ::log::debug!(
                    "Highlighted phrase not found verbatim in analyzed text: {:?}",
                    highlight.phrase
                );
            }
        }

        Self {
            score: analysis.score.min(100),
            risk_level: analysis.risk_level,
            flagged_issues: analysis.flagged_issues.join("; "),
            flagged_issues_list: analysis.flagged_issues,
            highlights: analysis.highlights,
        }
    }

    /// The error sentinel: score 0, level "Error", the message as the only issue
    pub fn from_error(error: &AnalysisError) -> Self {
        let message = format!("Analysis failed: {}", error);
        Self {
            score: 0,
            risk_level: RiskLevel::Error,
            flagged_issues: message.clone(),
            flagged_issues_list: vec![message],
            highlights: Vec::new(),
        }
    }

    /// Whether this is the error sentinel
    pub fn is_error(&self) -> bool {
        self.risk_level == RiskLevel::Error
    }
}

/// Report for one page of a multi-page analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub url: String,
    pub report: RiskReport,
}

/// Reports for a page and its same-origin child pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteReport {
    /// URL the analysis started from
    pub url: String,

    /// Root page first, then child pages in link order
    pub pages: Vec<PageReport>,
}
