use crate::error::AnalysisError;
use crate::parsers::html::ExtractOptions;
use crate::parsers::{Parser, ParserType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_parser_type() {
        // Test HTML
        let html_content = "<html><body><p>Hello, world!</p><a href=\"https://example.com\">Link</a></body></html>";
        let result = Parser::parse(html_content, ParserType::Html).unwrap();
        assert_eq!(result.content, "Hello, world! Link");
        assert_eq!(result.links.len(), 1);

        // Test Text
        let text_content = "Line 1\nLine 2\n\n\nLine 3";
        let result = Parser::parse(text_content, ParserType::Text).unwrap();
        assert_eq!(result.content, "Line 1 Line 2 Line 3");
        assert!(result.links.is_empty());
    }

    #[test]
    fn test_unsupported_content_is_a_parse_error() {
        let result = Parser::parse("%PDF-1.7", ParserType::Unsupported);
        assert!(matches!(result, Err(AnalysisError::Parse(_))));
    }

    #[test]
    fn test_parse_from_content_type() {
        let options = ExtractOptions::default();
        let page = "<p>Visible</p><script>hidden()</script>";
        let result =
            Parser::parse_from_content_type(page, Some("text/html; charset=utf-8"), &options)
                .unwrap();
        assert_eq!(result.content, "Visible");

        // Plain text is not run through the HTML parser
        let result = Parser::parse_from_content_type("<p>raw</p>", Some("text/plain"), &options).unwrap();
        assert_eq!(result.content, "<p>raw</p>");

        let result = Parser::parse_from_content_type("{}", Some("application/json"), &options);
        assert!(result.is_err());
    }

    #[test]
    fn test_content_types() {
        let types = [
            (None, ParserType::Html),
            (Some("text/html"), ParserType::Html),
            (Some("TEXT/HTML; charset=ISO-8859-1"), ParserType::Html),
            (Some("application/xhtml+xml"), ParserType::Html),
            (Some("text/plain"), ParserType::Text),
            (Some("application/pdf"), ParserType::Unsupported),
            (Some("image/png"), ParserType::Unsupported),
        ];

        for (content_type, expected_type) in types {
            assert_eq!(
                ParserType::from_content_type(content_type),
                expected_type,
                "content type {:?} should be parsed as {:?}",
                content_type,
                expected_type
            );
        }
    }
}
