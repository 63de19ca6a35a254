use clap::Parser;
use greenwash_scan::config::AnalyzerConfig;

#[derive(Parser, Debug)]
#[command(name = "greenwash-scan")]
#[command(about = "HTTP service that scores web pages for greenwashing claims")]
#[command(version)]
pub struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "GREENWASH_BIND")]
    pub bind: Option<String>,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "GREENWASH_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL for OpenAI-compatible endpoints
    #[arg(long, env = "GREENWASH_OPENAI_BASE")]
    pub openai_base_url: Option<String>,

    /// Model identifier
    #[arg(long, env = "GREENWASH_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Completion length cap
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Total attempts for rate-limited LLM calls
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

impl Args {
    /// Loads the configuration file (or defaults) and applies the overrides
    pub fn to_config(&self) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)?,
            None => AnalyzerConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(origin) = &self.allowed_origin {
            config.server.allowed_origin = origin.clone();
        }
        if let Some(base_url) = &self.openai_base_url {
            config.llm.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.llm.retry.max_attempts = max_attempts;
        }

        Ok(config)
    }
}
