//! Greenwashing risk analysis for web pages.
//!
//! A page is fetched, reduced to its visible text, sampled into a grading
//! prompt, classified by an LLM, and the untrusted completion is validated
//! into a [`RiskReport`].

pub mod analyzer;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod llm;
pub mod parsers;
pub mod prompt;
pub mod results;
pub mod server;
pub mod utils;
pub mod validator;

// Re-export commonly used types for convenience
pub use analyzer::{Analyzer, AnalyzerBuilder};
pub use error::AnalysisError;
pub use results::{Highlight, PageContent, RiskLevel, RiskReport, SiteReport};
