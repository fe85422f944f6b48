// Connection handling module
// Accepts TCP connections and serves HTTP/1.1 over them

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinSet;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept connections until the shutdown signal fires, then drain.
///
/// Each accepted connection is served on its own task, so a slow
/// client never blocks the accept loop. On shutdown the listener
/// closes first and the connections still open get one connection
/// timeout to finish.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let mut connections = JoinSet::new();

    // `notify_waiters` stores no permit, so the Notified future must
    // outlive the loop or a signal landing mid-accept is lost.
    let notified = shutdown.notified();
    tokio::pin!(notified);
    notified.as_mut().enable();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(&mut connections, stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }
            // Reap finished connection tasks as they complete
            Some(_) = connections.join_next() => {}
            () = &mut notified => break,
        }
    }

    // Stop accepting before waiting out the open connections
    drop(listener);
    drain(&mut connections, &state).await;
    Ok(())
}

/// Wait for the remaining connection tasks after the accept loop exits.
///
/// Each task already caps itself at the connection timeout, so the
/// same duration bounds the drain; anything still open past it is
/// aborted when the set drops.
async fn drain(connections: &mut JoinSet<()>, state: &AppState) {
    if connections.is_empty() {
        return;
    }

    logger::log_draining(connections.len());
    let limit = connection_timeout(state);
    let drained = tokio::time::timeout(limit, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        logger::log_warning(&format!(
            "Drain window of {} seconds elapsed with connections still open",
            limit.as_secs()
        ));
    }
}

/// Serve a single connection on a task tracked by the accept loop.
///
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive from the performance settings
/// 3. Serves the connection with the request handler
/// 4. Applies the connection timeout
fn handle_connection(
    connections: &mut JoinSet<()>,
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) {
    connections.spawn(async move {
        let io = TokioIo::new(stream);

        let keep_alive = state.config.performance.keep_alive_timeout > 0;
        let timeout_duration = connection_timeout(&state);

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}

fn connection_timeout(state: &AppState) -> Duration {
    Duration::from_secs(std::cmp::max(
        state.config.performance.read_timeout,
        state.config.performance.write_timeout,
    ))
}
