use crate::error::AnalysisError;
use crate::parsers::ParseResult;
use crate::utils::collapse_whitespace;

/// Parses plain text content (no links)
///
/// Lines, blank lines and runs of spaces all fold into single spaces so a
/// `text/plain` page reads the same way extracted HTML does.
pub fn parse(text: &str) -> Result<ParseResult, AnalysisError> {
    if text.contains('\0') {
        return Err(AnalysisError::Parse(
            "content contains binary data and is not text".to_string(),
        ));
    }
    Ok(ParseResult::content_only(collapse_whitespace(text)))
}
