//! tests/server_e2e.rs
//! Boots the real accept loop on an ephemeral port and talks to it
//! over the wire with an HTTP client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use calorie_shim::config::{AppState, Config, KeepaliveConfig, KeepaliveTarget};
use calorie_shim::{keepalive, server};
use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Notify;

fn app_config(public_dir: &str) -> Config {
    let mut cfg = Config::load_from("no-such-config-file").expect("default config");
    cfg.routes.public_dir = public_dir.to_string();
    cfg.logging.access_log = false;
    cfg
}

/// Bind an ephemeral port, run the accept loop on it, and hand back
/// the base URL plus the shutdown handle.
fn spawn_app(cfg: Config) -> (String, Arc<Notify>) {
    let listener = server::create_listener("127.0.0.1:0".parse().unwrap()).expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let shutdown = Arc::new(Notify::new());
    let state = Arc::new(AppState::new(cfg));

    tokio::spawn(server::serve(listener, state, Arc::clone(&shutdown)));

    (format!("http://{addr}"), shutdown)
}

#[tokio::test]
async fn health_endpoint_over_the_wire() {
    let dir = TempDir::new().unwrap();
    let (base_url, shutdown) = spawn_app(app_config(dir.path().to_str().unwrap()));

    let resp = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json");

    let body = resp.text().await.expect("body");
    let json: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "Food Calorie Prediction API is running");

    shutdown.notify_waiters();
}

#[tokio::test]
async fn instructions_and_static_assets_over_the_wire() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();
    let (base_url, shutdown) = spawn_app(app_config(dir.path().to_str().unwrap()));

    let page = reqwest::get(format!("{base_url}/"))
        .await
        .expect("Failed to execute request.");
    assert_eq!(page.status(), reqwest::StatusCode::OK);
    let html = page.text().await.expect("html body");
    assert!(html.contains("docker run -p 8501:8501 food-calorie-app"));

    let css = reqwest::get(format!("{base_url}/style.css"))
        .await
        .expect("Failed to execute request.");
    assert_eq!(css.status(), reqwest::StatusCode::OK);
    assert_eq!(css.text().await.expect("css body"), "body { margin: 0; }");

    shutdown.notify_waiters();
}

#[tokio::test]
async fn post_hits_catch_all_over_the_wire() {
    let dir = TempDir::new().unwrap();
    let (base_url, shutdown) = spawn_app(app_config(dir.path().to_str().unwrap()));

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/api/predict"))
        .body("{}")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body = resp.text().await.expect("body");
    let json: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(json["status"], "error");

    shutdown.notify_waiters();
}

#[tokio::test]
async fn shutdown_stops_accepting_connections() {
    let dir = TempDir::new().unwrap();
    let (base_url, shutdown) = spawn_app(app_config(dir.path().to_str().unwrap()));

    let first = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("Failed to execute request.");
    assert_eq!(first.status(), reqwest::StatusCode::OK);

    shutdown.notify_waiters();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // A fresh client forces a new TCP connection instead of reusing a
    // pooled one, so this must hit the closed listener.
    let after = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client")
        .get(format!("{base_url}/health"))
        .send()
        .await;
    assert!(after.is_err());
}

#[tokio::test]
async fn keepalive_pings_configured_target() {
    let mock = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
    let addr = mock.local_addr().expect("mock addr");
    let hit = Arc::new(AtomicBool::new(false));
    let hit_flag = Arc::clone(&hit);

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = mock.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                .await;
            hit_flag.store(true, Ordering::SeqCst);
        }
    });

    let config = KeepaliveConfig {
        interval_secs: 1,
        request_timeout_secs: 2,
        targets: vec![KeepaliveTarget {
            name: "mock".to_string(),
            url: format!("http://{addr}/health"),
        }],
    };
    let shutdown = Arc::new(Notify::new());
    let pinger = keepalive::spawn(&config, Arc::clone(&shutdown)).expect("pinger should start");

    // The first ping fires immediately on spawn
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(hit.load(Ordering::SeqCst));

    shutdown.notify_waiters();
    let joined = tokio::time::timeout(Duration::from_secs(3), pinger).await;
    assert!(joined.is_ok(), "pinger exits on shutdown");
}

#[tokio::test]
async fn keepalive_exits_when_shutdown_fires_mid_ping() {
    let mock = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
    let addr = mock.local_addr().expect("mock addr");

    // Answer only after a long stall, so the shutdown signal fires
    // while the ping is still in flight.
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = mock.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            tokio::time::sleep(Duration::from_millis(1500)).await;
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                .await;
        }
    });

    let config = KeepaliveConfig {
        interval_secs: 60,
        request_timeout_secs: 5,
        targets: vec![KeepaliveTarget {
            name: "slow".to_string(),
            url: format!("http://{addr}/health"),
        }],
    };
    let shutdown = Arc::new(Notify::new());
    let pinger = keepalive::spawn(&config, Arc::clone(&shutdown)).expect("pinger should start");

    // Give the first ping time to reach the stalled mock, then signal
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.notify_waiters();

    let joined = tokio::time::timeout(Duration::from_secs(4), pinger).await;
    assert!(
        joined.is_ok(),
        "pinger exits after the in-flight ping completes"
    );
}

#[tokio::test]
async fn shutdown_drains_in_flight_connections() {
    let dir = TempDir::new().unwrap();
    let listener = server::create_listener("127.0.0.1:0".parse().unwrap()).expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let shutdown = Arc::new(Notify::new());
    let state = Arc::new(AppState::new(app_config(dir.path().to_str().unwrap())));
    let server_task = tokio::spawn(server::serve(listener, state, Arc::clone(&shutdown)));

    // Park a connection mid-request, then signal shutdown under it
    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /health HTTP/1.1\r\nhost: shim\r\n")
        .await
        .expect("write request start");
    tokio::time::sleep(Duration::from_millis(200)).await;

    shutdown.notify_waiters();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(
        !server_task.is_finished(),
        "accept loop returned with a connection still open"
    );

    // Finishing the request must still produce a complete response
    stream.write_all(b"\r\n").await.expect("write request end");
    let mut collected = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = tokio::time::timeout(Duration::from_secs(3), stream.read(&mut buf))
            .await
            .expect("response before the drain window closes")
            .expect("read response");
        assert!(n > 0, "connection closed before the response arrived");
        collected.extend_from_slice(&buf[..n]);
        if String::from_utf8_lossy(&collected).contains("Food Calorie Prediction API is running") {
            break;
        }
    }
    assert!(String::from_utf8_lossy(&collected).starts_with("HTTP/1.1 200"));

    // Closing our end lets the drained connection finish and the
    // accept loop return.
    drop(stream);
    let joined = tokio::time::timeout(Duration::from_secs(5), server_task).await;
    assert!(
        joined.is_ok(),
        "accept loop exits once the last connection closes"
    );
}
