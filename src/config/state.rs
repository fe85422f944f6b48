// Application state module
// Configuration shared across request handlers

use super::types::Config;

/// Application state
///
/// The shim is stateless by contract: every request is handled independently
/// and the configuration never changes for the lifetime of the process, so
/// this is nothing more than the parsed config behind an `Arc` at the call
/// sites.
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Whether access logging is enabled
    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
