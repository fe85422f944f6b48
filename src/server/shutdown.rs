// Shutdown signal module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Spawn the signal listener and return the shutdown handle.
///
/// The accept loop and the keepalive pinger both wait on the returned
/// `Notify`. Must be called from within a tokio runtime.
pub fn install() -> Arc<Notify> {
    let shutdown = Arc::new(Notify::new());
    spawn_signal_task(Arc::clone(&shutdown));
    shutdown
}

#[cfg(unix)]
fn spawn_signal_task(shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => logger::log_shutdown("SIGTERM received"),
            _ = sigint.recv() => logger::log_shutdown("SIGINT received"),
        }

        shutdown.notify_waiters();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
fn spawn_signal_task(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::log_shutdown("Ctrl+C received");
        }
        shutdown.notify_waiters();
    });
}
