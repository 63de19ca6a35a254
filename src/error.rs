use thiserror::Error;

/// Upstream bodies can be whole HTML error pages; only this much ends up in messages.
const BODY_SNIPPET_CHARS: usize = 200;

/// Every failure the analysis pipeline can produce.
///
/// Library code propagates these with `?`; the HTTP layer is the only place
/// that turns them into responses.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Required input is missing or malformed
    #[error("{0}")]
    Input(String),

    /// A required configuration value (the LLM credential) is absent
    #[error("Server configuration error: {0}")]
    Config(String),

    /// The remote host could not be reached at all
    #[error("Failed to reach {url}: {cause}")]
    Transport { url: String, cause: String },

    /// The target page answered with a non-2xx status
    #[error("HTTP {status} - {}", snippet(.body))]
    Fetch { status: u16, body: String },

    /// The fetched content is not something we can read as HTML or text
    #[error("Could not parse page content: {0}")]
    Parse(String),

    /// The LLM answered with a non-success status other than rate limiting
    #[error("OpenAI API error: {status} - {}", snippet(.body))]
    Upstream { status: u16, body: String },

    /// The LLM kept rate limiting us until the retry budget ran out
    #[error(
        "The analysis service is busy (rate limited after {attempts} attempts). Please try again in a minute."
    )]
    RateLimitExceeded { attempts: u32 },

    /// The LLM answered 2xx but the envelope lacks the completion text
    #[error("Unexpected response from the analysis service: {0}")]
    Schema(String),

    /// The completion could not be read as a risk report
    #[error("Could not parse the analysis result: {reason}")]
    ResponseFormat { raw_text: String, reason: String },

    /// A background analysis task died before producing a report
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Whether this error was caused by the caller rather than by the pipeline
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalysisError::Input(_))
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
