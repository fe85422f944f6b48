//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, function-prefix normalization, and route matching.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger;
use crate::logger::AccessLogEntry;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Body of the health probe response.
pub const HEALTH_MESSAGE: &str = "Food Calorie Prediction API is running";

/// Body of the catch-all response for anything the router does not know.
pub const NOT_FOUND_MESSAGE: &str =
    "This endpoint does not exist. The Streamlit app needs to be run via Docker as described in the documentation.";

/// Per-request data extracted once and shared by the route handlers.
pub struct RequestContext<'a> {
    /// Request path with the function prefix already stripped.
    pub path: &'a str,
    /// HEAD requests get the same headers as GET but an empty body.
    pub is_head: bool,
    /// Raw `If-None-Match` value, if the client sent one.
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling.
///
/// Never fails: every outcome, including unknown methods and unknown
/// paths, maps to a complete response, so the connection layer has
/// nothing to recover from.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let is_head = req.method() == Method::HEAD;
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_str(&req, "referer");
    entry.user_agent = header_str(&req, "user-agent");

    let response = if matches!(req.method(), &Method::GET | &Method::HEAD) {
        let ctx = RequestContext {
            path: strip_function_prefix(req.uri().path(), &state.config.routes.function_prefix),
            is_head,
            if_none_match: header_str(&req, "if-none-match"),
        };
        route_request(&ctx, &state).await
    } else {
        // Other methods match no route, so they fall straight through
        // to the catch-all and still get the full JSON body.
        http::build_not_found_response(NOT_FOUND_MESSAGE, false)
    };

    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    if state.access_log_enabled() {
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch a GET or HEAD request to the matching route handler.
async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let routes = &state.config.routes;

    // 0. Health probe (highest priority, never touches the disk)
    if ctx.path == routes.health_path {
        return http::build_health_response(HEALTH_MESSAGE, ctx.is_head);
    }

    // 1. Deployment instructions page at the root
    if ctx.path == "/" {
        return http::response::build_html_response(static_files::instructions_page(), ctx.is_head);
    }

    // 2. Static assets from the public directory
    if let Some(resp) = static_files::serve_public(ctx, routes).await {
        return resp;
    }

    // 3. Catch-all
    http::build_not_found_response(NOT_FOUND_MESSAGE, ctx.is_head)
}

/// Strips the function route prefix from a request path.
///
/// The platform mounts the handler both at the bare origin and under
/// its function route, so `/health` and `<prefix>/health` must resolve
/// to the same place. A path equal to the prefix itself normalizes to
/// the root.
///
/// ```
/// use calorie_shim::handler::router::strip_function_prefix;
///
/// let prefix = "/.netlify/functions/server";
/// assert_eq!(strip_function_prefix("/.netlify/functions/server/health", prefix), "/health");
/// assert_eq!(strip_function_prefix("/.netlify/functions/server", prefix), "/");
/// assert_eq!(strip_function_prefix("/health", prefix), "/health");
/// ```
pub fn strip_function_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() || prefix == "/" {
        return path;
    }
    if path == prefix {
        return "/";
    }
    match path.strip_prefix(prefix) {
        // Only strip on a segment boundary, so a prefix of `/fn` does
        // not swallow `/fnord`.
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_str<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}
