//! petreld - Petrel warning-feed observer daemon.
//!
//! Connects to the cluster warning feed and notifies a chat webhook about
//! novel warning events. Configured entirely through environment variables.

use petrel_alerts::{DedupCache, WebhookChannel, WebhookConfig};
use petreld::config::DaemonConfig;
use petreld::listener;
use petreld::watch::Watcher;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match DaemonConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        feed = %config.feed_url,
        listen = %config.listen_addr,
        "starting petreld"
    );

    let webhook =
        WebhookConfig::new(config.webhook_url.clone(), config.console_base_url.clone())?;
    let channel = WebhookChannel::new(webhook)?;

    let cache = DedupCache::new(config.dedup_ttl);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Translate Ctrl-C into a shutdown signal
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = signal_tx.send(true);
            }
            Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
        }
    });

    let mut watcher = Watcher::new(
        config.feed_url.clone(),
        channel,
        cache,
        config.reconnect_delay,
    );
    if let Some(token) = &config.feed_token {
        watcher = watcher.with_feed_token(token.clone());
    }

    let watcher_handle = tokio::spawn(watcher.run(shutdown_rx.clone()));

    let listener_shutdown = {
        let mut rx = shutdown_rx;
        async move {
            let _ = rx.changed().await;
        }
    };

    if let Err(e) = listener::serve_with_shutdown(config.listen_addr, listener_shutdown).await {
        error!(error = %e, "health listener failed");
        std::process::exit(1);
    }

    let _ = watcher_handle.await;
    info!("petreld stopped");

    Ok(())
}
