pub mod openai;
pub mod retry;

use crate::error::AnalysisError;
use crate::prompt::AnalysisPrompt;
use async_trait::async_trait;

pub use openai::OpenAiClient;

/// Trait implemented by concrete LLM classifiers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends the prompt and returns the raw, untrusted completion text.
    async fn complete(&self, prompt: &AnalysisPrompt) -> Result<String, AnalysisError>;
}
