use crate::error::AnalysisError;
use crate::parsers::ParseResult;
use crate::utils::collapse_whitespace;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Elements whose whole subtree never counts as visible page text
pub const SKIPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "iframe", "svg", "nav", "footer", "header",
];

/// Elements that separate words even when the markup has no whitespace around them
const BLOCK_TAGS: [&str; 30] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*(?:display\s*:\s*none|visibility\s*:\s*hidden)\b")
        .expect("hidden style pattern should be valid")
});

/// Options controlling visible-text extraction
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Skip elements hidden through inline `style` or the `hidden` attribute.
    ///
    /// There is no layout engine here, so stylesheet rules are never
    /// evaluated; this only catches hiding declared on the element itself.
    pub honor_inline_visibility: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            honor_inline_visibility: true,
        }
    }
}

/// Parses raw HTML into a document tree
///
/// html5ever recovers from any markup error, so the only input rejected
/// here is binary data that was never text to begin with.
pub fn parse_document(html: &str) -> Result<Html, AnalysisError> {
    if html.contains('\0') {
        return Err(AnalysisError::Parse(
            "content contains binary data and is not HTML".to_string(),
        ));
    }
    Ok(Html::parse_document(html))
}

/// Parses HTML content to extract visible text and links
#[cfg(test)]
pub fn parse(html: &str) -> Result<ParseResult, AnalysisError> {
    parse_with_options(html, &ExtractOptions::default())
}

/// Parses HTML content with specific extraction options
pub fn parse_with_options(
    html: &str,
    options: &ExtractOptions,
) -> Result<ParseResult, AnalysisError> {
    let doc = parse_document(html)?;
    let text = extract_text(&doc, options);
    let links = extract_links(&doc);

    ::log::debug!(
        "HTML parser kept {} chars of text and found {} links",
        text.chars().count(),
        links.len()
    );

    Ok(ParseResult::new(text, links))
}

/// Returns the normalized visible text under `<body>`
pub fn extract_text(doc: &Html, options: &ExtractOptions) -> String {
    let body_selector = Selector::parse("body").unwrap();
    let mut buffer = String::new();
    for body in doc.select(&body_selector) {
        collect_visible_text(body, options, &mut buffer);
    }
    collapse_whitespace(&buffer)
}

/// Returns every `href` found on an anchor, in document order
pub fn extract_links(doc: &Html) -> Vec<String> {
    let link_selector = Selector::parse("a[href]").unwrap();
    doc.select(&link_selector)
        .filter_map(|e| e.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

fn collect_visible_text(element: ElementRef<'_>, options: &ExtractOptions, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                if !is_rendered(child_element, options) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&child_element.value().name());
                if is_block {
                    out.push(' ');
                }
                collect_visible_text(child_element, options, out);
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn is_rendered(element: ElementRef<'_>, options: &ExtractOptions) -> bool {
    let value = element.value();
    if SKIPPED_TAGS.contains(&value.name()) {
        return false;
    }
    if !options.honor_inline_visibility {
        return true;
    }
    if value.attr("hidden").is_some() {
        return false;
    }
    match value.attr("style") {
        Some(style) => !HIDDEN_STYLE.is_match(style),
        None => true,
    }
}
