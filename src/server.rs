//! HTTP API used by the website widget.
//!
//! Every pipeline error is turned into a response here: `400 {error}` when
//! the caller left out required input, otherwise `500` with the error report
//! (analysis routes) or `{error}` (proxy routes).

use crate::analyzer::Analyzer;
use crate::error::AnalysisError;
use crate::results::RiskReport;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tower_http::cors::CorsLayer;

#[derive(Debug, Default, Deserialize)]
struct UrlParams {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeRequest {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct TextBody {
    text: String,
}

#[derive(Debug, Serialize)]
struct LinksBody {
    links: Vec<String>,
}

/// Build the axum Router with all endpoints and the CORS policy.
pub fn router(analyzer: Analyzer) -> Result<Router, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(&analyzer.config().server.allowed_origin)?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route(
            "/api/analyze",
            post(analyze_text).get(analyze_url).options(preflight),
        )
        .route("/api/analyze-site", get(analyze_site).options(preflight))
        .route("/api/proxy", get(proxy).options(preflight))
        .route("/api/proxy-multi", get(proxy_multi).options(preflight))
        .layer(cors)
        .with_state(analyzer))
}

/// Serve the API until the process is stopped.
pub async fn start(analyzer: Analyzer) -> Result<(), Box<dyn Error>> {
    let bind = analyzer.config().server.bind.clone();
    let app = router(analyzer)?;
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    ::log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn analyze_text(State(analyzer): State<Analyzer>, body: Bytes) -> Response {
    // Any body that doesn't carry a usable `text` is treated as missing input
    let text = serde_json::from_slice::<AnalyzeRequest>(&body)
        .ok()
        .and_then(|request| request.text)
        .unwrap_or_default();
    ::log::info!("POST /api/analyze ({} bytes of text)", text.len());
    report_response(analyzer.analyze_text(&text).await)
}

async fn analyze_url(
    State(analyzer): State<Analyzer>,
    Query(params): Query<UrlParams>,
) -> Response {
    let Some(url) = required_url(params) else {
        return input_error("URL is required");
    };
    ::log::info!("GET /api/analyze url={}", url);
    report_response(analyzer.analyze_url(&url).await)
}

async fn analyze_site(
    State(analyzer): State<Analyzer>,
    Query(params): Query<UrlParams>,
) -> Response {
    let Some(url) = required_url(params) else {
        return input_error("URL is required");
    };
    ::log::info!("GET /api/analyze-site url={}", url);
    report_response(analyzer.analyze_site(&url).await)
}

async fn proxy(State(analyzer): State<Analyzer>, Query(params): Query<UrlParams>) -> Response {
    let Some(url) = required_url(params) else {
        return input_error("URL is required");
    };
    ::log::info!("GET /api/proxy url={}", url);
    match analyzer.fetch_text(&url).await {
        Ok(text) => (StatusCode::OK, Json(TextBody { text })).into_response(),
        Err(e) => proxy_error("Failed to fetch page", e),
    }
}

async fn proxy_multi(
    State(analyzer): State<Analyzer>,
    Query(params): Query<UrlParams>,
) -> Response {
    let Some(url) = required_url(params) else {
        return input_error("URL is required");
    };
    ::log::info!("GET /api/proxy-multi url={}", url);
    match analyzer.discover_links(&url).await {
        Ok(links) => (StatusCode::OK, Json(LinksBody { links })).into_response(),
        Err(e) => proxy_error("Failed to crawl links", e),
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn required_url(params: UrlParams) -> Option<String> {
    params.url.filter(|url| !url.trim().is_empty())
}

fn input_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Success → 200 with the report; failure → the error report, never a bare error
fn report_response<T: Serialize>(result: Result<T, AnalysisError>) -> Response {
    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) if e.is_client_error() => input_error(&e.to_string()),
        Err(e) => {
            ::log::error!("Analysis failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RiskReport::from_error(&e)),
            )
                .into_response()
        }
    }
}

fn proxy_error(context: &str, error: AnalysisError) -> Response {
    if error.is_client_error() {
        return input_error(&error.to_string());
    }
    ::log::error!("{}: {}", context, error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: format!("{}: {}", context, error),
        }),
    )
        .into_response()
}
