//! HTTP protocol layer module
//!
//! Protocol-level building blocks (content types, cache validation, response
//! construction), decoupled from the routing logic in `handler`.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{build_304_response, build_health_response, build_not_found_response};
