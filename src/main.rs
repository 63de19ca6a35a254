use clap::Parser;
use greenwash_scan::llm::OpenAiClient;
use greenwash_scan::{Analyzer, server};
use std::sync::Arc;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();
    let config = args.to_config()?;

    ::log::info!(
        "Using model {} at {} (temperature {}, max {} tokens)",
        config.llm.model,
        config.llm.base_url,
        config.llm.temperature,
        config.llm.max_tokens
    );

    let mut builder = Analyzer::builder(config.clone());
    match args.openai_api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let client = OpenAiClient::new(key, &config.llm)?;
            builder = builder.with_completion_client(Arc::new(client));
        }
        _ => {
            // Proxy routes still work; analysis requests answer 500
            ::log::warn!("OPENAI_API_KEY is not set, analysis requests will fail");
        }
    }

    let analyzer = builder.build()?;
    server::start(analyzer).await
}
