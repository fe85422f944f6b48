//! Keep-alive pinger
//!
//! Free-tier hosts spin deployments down after a few minutes without
//! traffic. The pinger sends a GET to each configured target on a fixed
//! interval so the upstream deployments stay warm.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{KeepaliveConfig, KeepaliveTarget};
use crate::logger;

/// Environment variable naming the API deployment to keep warm.
pub const API_URL_ENV: &str = "RENDER_API_URL";
/// Environment variable naming the Streamlit deployment to keep warm.
pub const STREAMLIT_URL_ENV: &str = "RENDER_STREAMLIT_URL";

/// Resolve the set of targets to ping.
///
/// Targets from the config file win; the Render environment variables
/// are the fallback so a bare deploy still keeps itself warm.
pub fn resolve_targets(config: &KeepaliveConfig) -> Vec<KeepaliveTarget> {
    if !config.targets.is_empty() {
        return config.targets.clone();
    }

    let mut targets = Vec::new();
    if let Some(url) = env_url(API_URL_ENV) {
        targets.push(KeepaliveTarget {
            name: "api".to_string(),
            url,
        });
    }
    if let Some(url) = env_url(STREAMLIT_URL_ENV) {
        targets.push(KeepaliveTarget {
            name: "streamlit".to_string(),
            url,
        });
    }
    targets
}

fn env_url(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Start the pinger task, or return `None` when nothing is configured.
///
/// The task pings every target once right away, then again on each
/// interval tick until the shutdown signal fires.
pub fn spawn(config: &KeepaliveConfig, shutdown: Arc<Notify>) -> Option<JoinHandle<()>> {
    let targets = resolve_targets(config);
    if targets.is_empty() {
        logger::log_keepalive_disabled();
        return None;
    }

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            logger::log_error(&format!("Failed to build keepalive HTTP client: {e}"));
            return None;
        }
    };

    // A zero period would make `tokio::time::interval` panic
    let period = Duration::from_secs(config.interval_secs.max(1));

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Register for shutdown once; a signal that fires while a ping
        // round is in flight is held until the next poll.
        let notified = shutdown.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    for target in &targets {
                        ping(&client, target).await;
                    }
                }
                () = &mut notified => break,
            }
        }
    }))
}

/// Ping one target and log the outcome.
async fn ping(client: &reqwest::Client, target: &KeepaliveTarget) {
    match client.get(&target.url).send().await {
        Ok(response) => {
            let status = response.status();
            if status == reqwest::StatusCode::OK {
                logger::log_keepalive_ok(&target.name, &target.url, status.as_u16());
            } else {
                let body = response.text().await.unwrap_or_default();
                let snippet: String = body.chars().take(200).collect();
                logger::log_keepalive_failed(&target.name, &target.url, status.as_u16(), &snippet);
            }
        }
        Err(e) => logger::log_keepalive_error(&target.name, &target.url, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env manipulation for the shared Render variables stays inside a
    // single test so parallel execution cannot interleave it.
    #[test]
    fn test_resolve_targets() {
        std::env::remove_var(API_URL_ENV);
        std::env::remove_var(STREAMLIT_URL_ENV);

        let mut config = KeepaliveConfig::default();
        assert!(resolve_targets(&config).is_empty());

        std::env::set_var(API_URL_ENV, "https://api.example.com/health");
        std::env::set_var(STREAMLIT_URL_ENV, "https://app.example.com");
        let from_env = resolve_targets(&config);
        assert_eq!(from_env.len(), 2);
        assert_eq!(from_env[0].name, "api");
        assert_eq!(from_env[0].url, "https://api.example.com/health");
        assert_eq!(from_env[1].name, "streamlit");

        // Explicit targets take precedence over the environment
        config.targets.push(KeepaliveTarget {
            name: "custom".to_string(),
            url: "https://custom.example.com/ping".to_string(),
        });
        let from_config = resolve_targets(&config);
        assert_eq!(from_config.len(), 1);
        assert_eq!(from_config[0].name, "custom");

        std::env::remove_var(API_URL_ENV);
        std::env::remove_var(STREAMLIT_URL_ENV);
    }

    #[test]
    fn test_env_url_ignores_empty_values() {
        std::env::set_var("KEEPALIVE_TEST_EMPTY", "");
        assert!(env_url("KEEPALIVE_TEST_EMPTY").is_none());
        assert!(env_url("KEEPALIVE_TEST_NEVER_SET").is_none());

        std::env::set_var("KEEPALIVE_TEST_SET", "https://example.com");
        assert_eq!(
            env_url("KEEPALIVE_TEST_SET").as_deref(),
            Some("https://example.com")
        );

        std::env::remove_var("KEEPALIVE_TEST_EMPTY");
        std::env::remove_var("KEEPALIVE_TEST_SET");
    }
}
