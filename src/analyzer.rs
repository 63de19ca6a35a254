use crate::config::AnalyzerConfig;
use crate::crawlers::web::parse_target_url;
use crate::crawlers::{HttpFetcher, PageFetcher};
use crate::error::AnalysisError;
use crate::filter::LinkFilter;
use crate::llm::CompletionClient;
use crate::parsers::html::ExtractOptions;
use crate::parsers::Parser;
use crate::prompt::build_prompt;
use crate::results::{PageContent, PageReport, RiskReport, SiteReport};
use crate::utils::{collapse_whitespace, truncate_chars};
use crate::validator::parse_completion;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// The fetch → extract → classify → validate pipeline
///
/// Cloning is cheap; every clone shares the same clients.
#[derive(Clone)]
pub struct Analyzer {
    inner: Arc<Inner>,
}

struct Inner {
    config: AnalyzerConfig,
    fetcher: Arc<dyn PageFetcher>,
    llm: Option<Arc<dyn CompletionClient>>,
    link_filter: LinkFilter,
    extract_options: ExtractOptions,
}

/// A fetched page with its raw link targets
struct ParsedPage {
    page: PageContent,
    links: Vec<String>,
    /// Final URL after redirects, used to resolve the links
    base: Url,
}

/// Builder for [`Analyzer`]
pub struct AnalyzerBuilder {
    config: AnalyzerConfig,
    fetcher: Option<Arc<dyn PageFetcher>>,
    llm: Option<Arc<dyn CompletionClient>>,
    extract_options: ExtractOptions,
}

impl AnalyzerBuilder {
    /// Use a specific page fetcher instead of the default HTTP one
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the LLM client; without one every analysis fails with a config error
    pub fn with_completion_client(mut self, llm: Arc<dyn CompletionClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Override the visible-text extraction options
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Build the analyzer
    pub fn build(self) -> Result<Analyzer, Box<dyn Error>> {
        let fetcher: Arc<dyn PageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&self.config.fetch)?),
        };
        let link_filter = LinkFilter::new(&self.config.crawl)?;

        Ok(Analyzer {
            inner: Arc::new(Inner {
                config: self.config,
                fetcher,
                llm: self.llm,
                link_filter,
                extract_options: self.extract_options,
            }),
        })
    }
}

impl Analyzer {
    /// Start building an analyzer from a configuration
    pub fn builder(config: AnalyzerConfig) -> AnalyzerBuilder {
        AnalyzerBuilder {
            config,
            fetcher: None,
            llm: None,
            extract_options: ExtractOptions::default(),
        }
    }

    /// The configuration this analyzer was built with
    pub fn config(&self) -> &AnalyzerConfig {
        &self.inner.config
    }

    /// Classify text that was already extracted by the caller
    pub async fn analyze_text(&self, text: &str) -> Result<RiskReport, AnalysisError> {
        let text = collapse_whitespace(text);
        if text.is_empty() {
            return Err(AnalysisError::Input("Text is required".to_string()));
        }
        let llm = self.completion_client()?;
        self.classify(llm.as_ref(), &text).await
    }

    /// Fetch a page and reduce it to its visible text
    pub async fn fetch_page(&self, url: &str) -> Result<PageContent, AnalysisError> {
        let url = parse_target_url(url)?;
        Ok(self.fetch_parsed(&url).await?.page)
    }

    /// Visible text of a page
    pub async fn fetch_text(&self, url: &str) -> Result<String, AnalysisError> {
        Ok(self.fetch_page(url).await?.visible_text)
    }

    /// Same-origin child pages of a page, at most `crawl.max_links`
    pub async fn discover_links(&self, url: &str) -> Result<Vec<String>, AnalysisError> {
        let url = parse_target_url(url)?;
        let parsed = self.fetch_parsed(&url).await?;
        let links = self.inner.link_filter.select(&parsed.links, &parsed.base);
        ::log::info!("Found {} candidate links on {}", links.len(), url);
        Ok(links)
    }

    /// Fetch, extract and classify a single page
    pub async fn analyze_url(&self, url: &str) -> Result<RiskReport, AnalysisError> {
        let url = parse_target_url(url)?;
        let llm = self.completion_client()?;
        let parsed = self.fetch_parsed(&url).await?;
        self.analyze_page(llm.as_ref(), &parsed.page).await
    }

    /// Classify a page and each of its same-origin child pages
    ///
    /// A failing root page fails the whole analysis; a failing child page
    /// shows up as an error report in its slot.
    pub async fn analyze_site(&self, url: &str) -> Result<SiteReport, AnalysisError> {
        let root_url = parse_target_url(url)?;
        let llm = self.completion_client()?;
        let ParsedPage {
            page: root_page,
            links: hrefs,
            base,
        } = self.fetch_parsed(&root_url).await?;
        let root_report = self.analyze_page(llm.as_ref(), &root_page).await?;

        let links: Vec<String> = self
            .inner
            .link_filter
            .select(&hrefs, &base)
            .into_iter()
            .filter(|link| *link != root_page.url && link != base.as_str())
            .collect();
        ::log::info!("Analyzing {} child pages of {}", links.len(), root_url);

        let semaphore = Arc::new(Semaphore::new(
            self.inner.config.crawl.max_concurrency.max(1),
        ));
        let mut tasks = JoinSet::new();
        for link in &links {
            let analyzer = self.clone();
            let link = link.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let report = match analyzer.analyze_url(&link).await {
                    Ok(report) => report,
                    Err(e) => {
                        ::log::warn!("Analysis of {} failed: {}", link, e);
                        RiskReport::from_error(&e)
                    }
                };
                (link, report)
            });
        }

        // Tasks finish in any order; slots are matched back by URL
        let mut by_url = HashMap::with_capacity(links.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((link, report)) => {
                    by_url.insert(link, report);
                }
                Err(e) => ::log::error!("Page analysis task failed: {}", e),
            }
        }

        let mut pages = Vec::with_capacity(links.len() + 1);
        pages.push(PageReport {
            url: root_page.url.clone(),
            report: root_report,
        });
        for link in links {
            let report = by_url.remove(&link).unwrap_or_else(|| {
                RiskReport::from_error(&AnalysisError::Internal(format!(
                    "analysis of {} did not complete",
                    link
                )))
            });
            pages.push(PageReport { url: link, report });
        }

        Ok(SiteReport {
            url: root_page.url,
            pages,
        })
    }

    fn completion_client(&self) -> Result<Arc<dyn CompletionClient>, AnalysisError> {
        self.inner.llm.clone().ok_or_else(|| {
            AnalysisError::Config("OPENAI_API_KEY is not set on the server".to_string())
        })
    }

    /// Fetches and parses a page
    async fn fetch_parsed(&self, url: &Url) -> Result<ParsedPage, AnalysisError> {
        let fetched = self.inner.fetcher.fetch(url).await?;
        let parsed = Parser::parse_from_content_type(
            &fetched.body,
            fetched.content_type.as_deref(),
            &self.inner.extract_options,
        )?;
        // Links are relative to where redirects ended up, not to the request
        let base = Url::parse(&fetched.url).unwrap_or_else(|_| url.clone());
        if base != *url {
            ::log::debug!("{} redirected to {}", url, base);
        }

        ::log::debug!(
            "Extracted {} chars of visible text from {}",
            parsed.content.chars().count(),
            url
        );

        let page = PageContent {
            url: url.to_string(),
            raw_html: fetched.body,
            visible_text: parsed.content,
        };
        Ok(ParsedPage {
            page,
            links: parsed.links,
            base,
        })
    }

    async fn analyze_page(
        &self,
        llm: &dyn CompletionClient,
        page: &PageContent,
    ) -> Result<RiskReport, AnalysisError> {
        if page.visible_text.is_empty() {
            return Err(AnalysisError::Parse(format!(
                "no visible text found on {}",
                page.url
            )));
        }
        ::log::info!("Analyzing {}", page.url);
        self.classify(llm, &page.visible_text).await
    }

    async fn classify(
        &self,
        llm: &dyn CompletionClient,
        text: &str,
    ) -> Result<RiskReport, AnalysisError> {
        let prompt_config = &self.inner.config.prompt;
        let prompt = build_prompt(text, prompt_config);
        let completion = llm.complete(&prompt).await?;
        let analysis = parse_completion(&completion)?;
        let analyzed = truncate_chars(text, prompt_config.max_chars);
        Ok(RiskReport::assemble(analysis, analyzed))
    }
}
