use std::sync::Arc;
use std::time::Duration;

use calorie_shim::config::{self, AppState};
use calorie_shim::{keepalive, logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Create the Tokio runtime, sizing the thread pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let shutdown = server::shutdown::install();
    let pinger = keepalive::spawn(&cfg.keepalive, Arc::clone(&shutdown));
    let pinger_grace = Duration::from_secs(cfg.keepalive.request_timeout_secs.max(1));

    let state = Arc::new(AppState::new(cfg));
    server::serve(listener, state, shutdown).await?;

    // A signal caught mid-ping lets the current round finish first, so
    // give the pinger one request timeout to wind down; the runtime
    // teardown reaps anything slower.
    if let Some(handle) = pinger {
        let _ = tokio::time::timeout(pinger_grace, handle).await;
    }

    Ok(())
}
