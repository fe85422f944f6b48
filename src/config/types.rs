// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

/// Routes configuration
///
/// The defaults reproduce the published contract: the serverless function
/// prefix is accepted in front of every route, and assets are served from
/// `public/`.
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    /// Serverless function route prefix stripped before matching
    #[serde(default = "default_function_prefix")]
    pub function_prefix: String,
    /// Directory the static asset routes resolve against
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// Health check path (after prefix stripping)
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Index files tried for directory paths
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_function_prefix() -> String {
    "/.netlify/functions/server".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_public_dir() -> String {
    "public".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_path() -> String {
    "/health".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            function_prefix: default_function_prefix(),
            public_dir: default_public_dir(),
            health_path: default_health_path(),
            index_files: default_index_files(),
        }
    }
}

/// Keep-alive pinger configuration
///
/// Pings the deployed prediction services so free-tier hosting does not spin
/// them down. Dormant unless targets are configured (or the legacy
/// `RENDER_API_URL`/`RENDER_STREAMLIT_URL` environment variables are set).
#[derive(Debug, Deserialize, Clone)]
pub struct KeepaliveConfig {
    /// Seconds between ping rounds
    #[serde(default = "default_keepalive_interval")]
    pub interval_secs: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_keepalive_request_timeout")]
    pub request_timeout_secs: u64,
    /// Services to ping
    #[serde(default)]
    pub targets: Vec<KeepaliveTarget>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_keepalive_interval() -> u64 {
    300
}

#[allow(clippy::missing_const_for_fn)]
fn default_keepalive_request_timeout() -> u64 {
    10
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_keepalive_interval(),
            request_timeout_secs: default_keepalive_request_timeout(),
            targets: Vec::new(),
        }
    }
}

/// A single keep-alive target
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct KeepaliveTarget {
    /// Display name used in log lines
    pub name: String,
    /// Full URL of the health endpoint to ping
    pub url: String,
}
