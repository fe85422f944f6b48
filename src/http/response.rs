//! HTTP response building module
//!
//! Builders for the responses the shim produces, decoupled from routing logic.
//! JSON bodies are serialized compactly: the health and catch-all payloads are
//! part of the published contract and clients match them literally.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// The `{status, message}` payload shared by the health and catch-all routes
#[derive(Debug, Serialize)]
pub struct StatusBody<'a> {
    pub status: &'a str,
    pub message: &'a str,
}

/// Build 200 health response: `{"status":"ok","message":...}`
pub fn build_health_response(message: &str, is_head: bool) -> Response<Full<Bytes>> {
    build_status_response(
        StatusCode::OK,
        StatusBody {
            status: "ok",
            message,
        },
        is_head,
    )
}

/// Build 404 catch-all response: `{"status":"error","message":...}`
pub fn build_not_found_response(message: &str, is_head: bool) -> Response<Full<Bytes>> {
    build_status_response(
        StatusCode::NOT_FOUND,
        StatusBody {
            status: "error",
            message,
        },
        is_head,
    )
}

/// Build a JSON response from a `StatusBody`
fn build_status_response(
    status: StatusCode,
    body: StatusBody<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(&body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response body: {e}"));
            r#"{"status":"error","message":"Internal server error"}"#.to_string()
        }
    };

    let content_length = json.len();
    let bytes = if is_head {
        Bytes::new()
    } else {
        Bytes::from(json)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(bytes))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 HTML response for the fixed instructions page
pub fn build_html_response(content: &'static str, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(content.as_bytes())
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 static file response with `ETag`
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(304)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
