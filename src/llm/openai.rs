//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::CompletionClient;
use super::retry::{Attempt, retry_rate_limited};
use crate::config::{LlmConfig, RetryConfig};
use crate::error::AnalysisError;
use crate::prompt::AnalysisPrompt;

/// Chat completions client with rate-limit aware retry.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    retry: RetryConfig,
}

impl OpenAiClient {
    /// Builds a client; the credential is injected here and nowhere else.
    pub fn new(api_key: &str, config: &LlmConfig) -> Result<Self, AnalysisError> {
        if api_key.trim().is_empty() {
            return Err(AnalysisError::Config("missing OpenAI API key".to_string()));
        }
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        let auth = HeaderValue::from_str(&auth)
            .map_err(|_| AnalysisError::Config("invalid OpenAI API key".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AnalysisError::Config(format!("failed to build OpenAI HTTP client: {e}")))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry: config.retry.clone(),
        })
    }

    async fn send_once(
        &self,
        request: &ChatRequest<'_>,
        attempt: u32,
    ) -> Result<Attempt<String>, AnalysisError> {
        ::log::debug!("Calling {} (attempt {})", self.endpoint, attempt);
        let transport_error = |e: reqwest::Error| AnalysisError::Transport {
            url: self.endpoint.clone(),
            cause: e.to_string(),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::RateLimited { body });
        }
        if !status.is_success() {
            return Err(AnalysisError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        completion_text(&body).map(Attempt::Done)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &AnalysisPrompt) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let this = self;
        let request = &request;
        retry_rate_limited(&self.retry, move |attempt| async move {
            this.send_once(request, attempt).await
        })
        .await
    }
}

/// Pulls `choices[0].message.content` out of a chat completion body.
fn completion_text(body: &str) -> Result<String, AnalysisError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::Schema(format!("response is not a chat completion: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| AnalysisError::Schema("response has no completion text".to_string()))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
