#![allow(dead_code)]

use async_trait::async_trait;
use greenwash_scan::config::AnalyzerConfig;
use greenwash_scan::crawlers::{FetchedPage, PageFetcher};
use greenwash_scan::llm::CompletionClient;
use greenwash_scan::prompt::AnalysisPrompt;
use greenwash_scan::{AnalysisError, Analyzer};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

pub const HIGH_RISK_COMPLETION: &str = r#"```json
{
  "score": 78,
  "riskLevel": "High Risk",
  "flaggedIssuesList": ["Absolute claim without certification", "Carbon-neutral claim without offset details"],
  "highlights": [
    {"phrase": "100% eco-friendly", "reason": "Absolute claim with no substantiation", "riskLevel": "Severe Risk"},
    {"phrase": "carbon-neutral", "reason": "No offsetting scheme named", "riskLevel": "High Risk"}
  ]
}
```"#;

/// Serves canned pages keyed by absolute URL; unknown URLs answer 404
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    redirects: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(normalize(url), html.to_string());
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(url), delay);
        self
    }

    /// Serve `to` whenever `from` is requested, as a followed redirect would
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(normalize(from), normalize(to));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).unwrap().to_string()
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(url.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        let target = self
            .redirects
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| url.to_string());
        match self.pages.get(&target) {
            Some(body) => Ok(FetchedPage {
                url: target,
                content_type: Some("text/html; charset=utf-8".to_string()),
                body: body.clone(),
            }),
            None => Err(AnalysisError::Fetch {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

type Responder = Box<dyn Fn(&AnalysisPrompt) -> Result<String, AnalysisError> + Send + Sync>;

/// Answers every prompt through a closure and counts the calls
pub struct FakeLlm {
    respond: Responder,
    pub calls: AtomicUsize,
}

impl FakeLlm {
    pub fn new(
        respond: impl Fn(&AnalysisPrompt) -> Result<String, AnalysisError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(completion: &'static str) -> Self {
        Self::new(move |_| Ok(completion.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for FakeLlm {
    async fn complete(&self, prompt: &AnalysisPrompt) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(prompt)
    }
}

pub fn analyzer(fetcher: Arc<FakeFetcher>, llm: Option<Arc<FakeLlm>>) -> Analyzer {
    let mut builder = Analyzer::builder(AnalyzerConfig::default()).with_fetcher(fetcher);
    if let Some(llm) = llm {
        builder = builder.with_completion_client(llm);
    }
    builder.build().unwrap()
}
