use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for the LLM classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature, kept low so repeated gradings agree
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion length cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Rate-limit retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry policy for rate-limited LLM calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; the n-th retry waits `2^n * base_delay_ms`
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

/// Configuration for fetching target pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User agent sent with every page request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

/// Configuration for multi-page analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of child links analyzed per site
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Maximum number of pages fetched and analyzed at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Regex patterns for links that never get followed
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Configuration for prompt construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Number of characters of page text embedded in the prompt
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// The single origin allowed to call the API from a browser
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

/// Top level configuration, loadable from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl AnalyzerConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> usize {
    1000
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (GreenwashingAnalyzer/1.0)".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_max_links() -> usize {
    5
}

fn default_max_concurrency() -> usize {
    4
}

/// Non-HTML resources that are never worth analyzing
fn default_exclude_patterns() -> Vec<String> {
    vec![r"(?i)\.(pdf|jpg|png)$".to_string()]
}

fn default_max_chars() -> usize {
    2000
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_allowed_origin() -> String {
    "https://www.hncomms.co.uk".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// Delay before the next attempt, after `failed_attempts` rate-limited tries
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        let factor = 1u64 << failed_attempts.min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_links: default_max_links(),
            max_concurrency: default_max_concurrency(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origin: default_allowed_origin(),
        }
    }
}
