use crate::config::CrawlConfig;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Substrings that mark a link as an anchor or a non-web scheme
const REJECTED_MARKERS: [&str; 3] = ["#", "mailto:", "tel:"];

/// Picks the child pages of a site that are worth analyzing
///
/// Only absolute same-origin links and root-relative links survive; the
/// result is deduplicated in first-seen order and capped.
#[derive(Debug)]
pub struct LinkFilter {
    max_links: usize,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(&CrawlConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl LinkFilter {
    /// Create a new link filter from the crawl configuration
    pub fn new(config: &CrawlConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            max_links: config.max_links,
            exclude_regexes,
        })
    }

    /// Turns the raw `href` values of a page into its LinkSet
    pub fn select(&self, hrefs: &[String], page_url: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for href in hrefs {
            if selected.len() == self.max_links {
                break;
            }
            let Some(link) = self.resolve(href, page_url) else {
                ::log::trace!("Link filter rejected: {}", href);
                continue;
            };
            if seen.insert(link.clone()) {
                ::log::debug!("Link filter accepted: {}", link);
                selected.push(link);
            }
        }

        selected
    }

    /// Resolves a single `href` to an absolute same-origin URL, if it qualifies
    fn resolve(&self, href: &str, page_url: &Url) -> Option<String> {
        let href = href.trim();
        if REJECTED_MARKERS.iter().any(|marker| href.contains(marker)) {
            return None;
        }

        let resolved = if is_root_relative(href) {
            page_url.join(href).ok()?
        } else {
            Url::parse(href).ok()?
        };
        // `/\host` and `/<TAB>/host` still join to another host
        if resolved.origin() != page_url.origin() {
            return None;
        }

        // Returned links never contain the rejected markers
        let link = resolved.to_string();
        if REJECTED_MARKERS.iter().any(|marker| link.contains(marker)) {
            return None;
        }
        if self.exclude_regexes.iter().any(|regex| regex.is_match(&link)) {
            return None;
        }

        Some(link)
    }
}

/// `/path` is root-relative, `//host/path` is protocol-relative and is not
fn is_root_relative(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}
