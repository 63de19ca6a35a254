use crate::error::AnalysisError;
use async_trait::async_trait;
use url::Url;

/// Raw response of a successful page fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the response came from, after any redirects
    pub url: String,
    /// `Content-Type` header, if the server sent one
    pub content_type: Option<String>,
    /// Response body as text
    pub body: String,
}

// Base trait for anything that can retrieve a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page, failing on transport errors and non-2xx statuses
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AnalysisError>;
}
