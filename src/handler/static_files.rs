//! Static asset serving and the fixed instructions page
//!
//! Assets resolve against an external, pre-populated public directory whose
//! contents are not under this component's control. A miss is not an error:
//! the caller falls through to the catch-all responder.

use crate::config::RoutesConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve a static asset from the public directory
///
/// Returns `None` when the path does not resolve to a file so the router can
/// fall through to the catch-all.
pub async fn serve_public(
    ctx: &RequestContext<'_>,
    routes: &RoutesConfig,
) -> Option<Response<Full<Bytes>>> {
    let (content, content_type) =
        load_from_public(&routes.public_dir, ctx.path, &routes.index_files).await?;
    Some(build_public_response(
        content,
        content_type,
        ctx.if_none_match.as_deref(),
        ctx.is_head,
    ))
}

/// Resolve a request path to a file under the public directory
///
/// Directory paths try the configured index files. Paths that escape the
/// public directory are rejected. A missing public directory is an ordinary
/// miss: the directory is provisioned by the deployment, not by this server.
pub async fn load_from_public(
    public_dir: &str,
    path: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and prevent directory traversal
    let clean_path = path.trim_start_matches('/').replace("..", "");
    let mut file_path = Path::new(public_dir).join(&clean_path);

    let public_dir_canonical = Path::new(public_dir).canonicalize().ok()?;

    // Directory paths try index files
    if file_path.is_dir() || clean_path.is_empty() || clean_path.ends_with('/') {
        for index_file in index_files {
            let candidate = file_path.join(index_file);
            if candidate.is_file() {
                file_path = candidate;
                break;
            }
        }
    }

    // Misses are common and fall through quietly
    let file_path_canonical = file_path.canonicalize().ok()?;
    if !file_path_canonical.starts_with(&public_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }
    if !file_path_canonical.is_file() {
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read asset '{}': {e}",
                file_path_canonical.display()
            ));
            return None;
        }
    };

    // Determine content type from extension
    let content_type =
        mime::get_content_type(file_path_canonical.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Build asset response with `ETag` validation
fn build_public_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::response::build_file_response(Bytes::from(data), content_type, &etag, is_head)
}

/// The fixed root page
///
/// The real application is a Dockerized Streamlit app this hosting
/// environment cannot run; the page tells visitors how to run it themselves.
/// Plain document, no templating.
pub fn instructions_page() -> &'static str {
    r#"<!DOCTYPE html>
<html>
  <head>
    <title>Food Calorie Prediction App</title>
    <style>
      body { font-family: Arial, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }
      h1 { color: #333; }
      .container { border: 1px solid #ddd; padding: 20px; border-radius: 5px; }
      .info { background-color: #f8f9fa; padding: 15px; border-left: 4px solid #17a2b8; margin-bottom: 20px; }
      code { background-color: #f1f3f5; padding: 2px 5px; border-radius: 3px; }
    </style>
  </head>
  <body>
    <h1>Food Calorie Prediction App</h1>
    <div class="container">
      <div class="info">
        <p>This application is a Streamlit-based ML app for predicting calories in food items from images.</p>
        <p>The app is containerized with Docker and needs to be run in an environment that supports Docker containers.</p>
      </div>
      <p>To run this application:</p>
      <ol>
        <li>Clone the repository from GitHub</li>
        <li>Make sure Docker is installed on your system</li>
        <li>Run <code>docker build -t food-calorie-app .</code> to build the Docker image</li>
        <li>Run <code>docker run -p 8501:8501 food-calorie-app</code> to start the container</li>
        <li>Access the app at <code>http://localhost:8501</code></li>
      </ol>
      <p>For more information, please refer to the README and deployment documentation in the repository.</p>
    </div>
  </body>
</html>
"#
}
