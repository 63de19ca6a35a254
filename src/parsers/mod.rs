pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use crate::error::AnalysisError;

/// Enum to represent the kinds of content a fetched page can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML parser
    Html,
    /// Plain text parser
    Text,
    /// Anything else (images, PDFs, JSON, ...)
    Unsupported,
}

impl ParserType {
    /// Determines the parser type from a `Content-Type` header value
    ///
    /// A missing header is treated as HTML since most servers that omit it
    /// are serving pages.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            ::log::debug!("No content type, classifying as HTML");
            return ParserType::Html;
        };

        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "" | "text/html" | "application/xhtml+xml" => ParserType::Html,
            "text/plain" => ParserType::Text,
            _ => {
                ::log::debug!("Classifying as Unsupported: {}", mime);
                ParserType::Unsupported
            }
        }
    }
}

/// Result of parsing content
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Normalized visible text
    pub content: String,
    /// Raw link targets (if applicable)
    pub links: Vec<String>,
}

impl ParseResult {
    /// Creates a new parse result with the given content and links
    pub fn new(content: String, links: Vec<String>) -> Self {
        Self { content, links }
    }

    /// Creates a new parse result with content only (no links)
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            links: Vec::new(),
        }
    }
}

/// Main parser that delegates to specific format parsers
pub struct Parser;

impl Parser {
    /// Parse content based on the parser type
    #[cfg(test)]
    pub fn parse(content: &str, parser_type: ParserType) -> Result<ParseResult, AnalysisError> {
        Self::parse_with_options(content, parser_type, &html::ExtractOptions::default())
    }

    /// Parse content with specific HTML extraction options
    pub fn parse_with_options(
        content: &str,
        parser_type: ParserType,
        options: &html::ExtractOptions,
    ) -> Result<ParseResult, AnalysisError> {
        match parser_type {
            ParserType::Html => html::parse_with_options(content, options),
            ParserType::Text => text::parse(content),
            ParserType::Unsupported => Err(AnalysisError::Parse(
                "the page is not an HTML document".to_string(),
            )),
        }
    }

    /// Determine parser type from the content type and then parse content
    pub fn parse_from_content_type(
        content: &str,
        content_type: Option<&str>,
        options: &html::ExtractOptions,
    ) -> Result<ParseResult, AnalysisError> {
        let parser_type = ParserType::from_content_type(content_type);
        Self::parse_with_options(content, parser_type, options)
    }
}
