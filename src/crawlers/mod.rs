pub mod crawler;
pub mod web;

pub use crawler::{FetchedPage, PageFetcher};
pub use web::HttpFetcher;
