use crate::config::FetchConfig;
use crate::crawlers::crawler::{FetchedPage, PageFetcher};
use crate::error::AnalysisError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

/// Validates a caller-supplied page URL
///
/// Only absolute http(s) URLs are accepted; everything else is an input error.
pub fn parse_target_url(raw: &str) -> Result<Url, AnalysisError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AnalysisError::Input("URL is required".to_string()));
    }
    let url = Url::parse(raw)
        .map_err(|e| AnalysisError::Input(format!("Invalid URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AnalysisError::Input(format!(
            "Only http and https URLs can be analyzed: {}",
            raw
        ))),
    }
}

/// Fetches pages over plain HTTP; no JavaScript is executed
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured user agent and timeout
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AnalysisError> {
        let started = std::time::Instant::now();
        ::log::debug!("FETCH: {}", url);

        let transport_error = |e: reqwest::Error| AnalysisError::Transport {
            url: url.to_string(),
            cause: e.to_string(),
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            ::log::error!("Fetching {} failed with HTTP {}", url, status.as_u16());
            return Err(AnalysisError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        ::log::debug!(
            "Fetched {} ({} bytes) in {:.2} seconds",
            url,
            body.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(FetchedPage {
            url: final_url,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(parse_target_url("https://example.com/page").is_ok());
        assert!(parse_target_url("  http://example.com ").is_ok());
    }

    #[test]
    fn test_rejects_missing_and_malformed_urls() {
        for raw in ["", "   ", "example.com", "ftp://example.com/file", "mailto:a@b.c"] {
            let result = parse_target_url(raw);
            assert!(
                matches!(result, Err(AnalysisError::Input(_))),
                "'{}' should be rejected",
                raw
            );
        }
    }
}
