//! Logger module
//!
//! Logging utilities for the shim server:
//! - Server lifecycle logging
//! - Access logging (combined or JSON lines)
//! - Error and warning logging
//! - Keep-alive ping outcomes
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Calorie shim server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    write_info(&format!(
        "Function prefix: {}",
        config.routes.function_prefix
    ));
    write_info(&format!("Public directory: {}", config.routes.public_dir));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown(reason: &str) {
    write_info(&format!("\n[Shutdown] {reason}, stopping accept loop"));
}

pub fn log_draining(active: usize) {
    write_info(&format!(
        "[Shutdown] Waiting for {active} open connection(s) to finish"
    ));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_keepalive_ok(name: &str, url: &str, status: u16) {
    write_info(&format!("[Keepalive] {name}: pinged {url} - {status}"));
}

pub fn log_keepalive_failed(name: &str, url: &str, status: u16, body_snippet: &str) {
    write_error(&format!(
        "[Keepalive] {name}: ping to {url} returned {status}: {body_snippet}"
    ));
}

pub fn log_keepalive_error(name: &str, url: &str, err: &impl std::fmt::Display) {
    write_error(&format!("[Keepalive] {name}: error pinging {url}: {err}"));
}

pub fn log_keepalive_disabled() {
    write_info("[Keepalive] No targets configured, pinger not started");
}
