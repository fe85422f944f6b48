//! Request handler module
//!
//! Responsible for request routing dispatch and business logic processing:
//! the health probe, the deployment instructions page, static assets and
//! the catch-all.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
