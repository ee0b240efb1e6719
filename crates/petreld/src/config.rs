//! Daemon configuration loaded from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::error::{DaemonError, DaemonResult};

/// Environment variable naming the warning-feed WebSocket URL.
pub const ENV_FEED_URL: &str = "FEED_URL";
/// Environment variable naming the chat webhook URL.
pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
/// Environment variable naming the console base URL used in notification links.
pub const ENV_CONSOLE_BASE_URL: &str = "CONSOLE_BASE_URL";
/// Environment variable naming the optional feed subscription token.
pub const ENV_FEED_TOKEN: &str = "FEED_TOKEN";
/// Environment variable overriding the health listener address.
pub const ENV_LISTEN_ADDR: &str = "LISTEN_ADDR";
/// Environment variable overriding the dedup TTL, in seconds.
pub const ENV_DEDUP_TTL_SECS: &str = "DEDUP_TTL_SECS";
/// Environment variable overriding the base reconnect delay, in seconds.
pub const ENV_RECONNECT_DELAY_SECS: &str = "RECONNECT_DELAY_SECS";

/// Default health listener address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
/// Default dedup TTL in seconds.
pub const DEFAULT_DEDUP_TTL_SECS: u64 = 120;
/// Default base reconnect delay in seconds.
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// WebSocket URL of the cluster warning feed.
    pub feed_url: String,
    /// Optional token sent when subscribing to the feed.
    pub feed_token: Option<String>,
    /// Chat webhook POST target.
    pub webhook_url: String,
    /// Console base URL for links in notifications, without a trailing slash.
    pub console_base_url: String,
    /// Address the health listener binds to.
    pub listen_addr: SocketAddr,
    /// Time-to-live for the dedup cache slot.
    pub dedup_ttl: Duration,
    /// Base delay between feed reconnect attempts.
    pub reconnect_delay: Duration,
}

impl DaemonConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> DaemonResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// fails to parse.
    pub fn from_lookup<F>(lookup: F) -> DaemonResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feed_url = require(&lookup, ENV_FEED_URL)?;
        validate_url(ENV_FEED_URL, &feed_url, &["ws", "wss"])?;

        let webhook_url = require(&lookup, ENV_WEBHOOK_URL)?;
        validate_url(ENV_WEBHOOK_URL, &webhook_url, &["http", "https"])?;

        let console_base_url = require(&lookup, ENV_CONSOLE_BASE_URL)?
            .trim_end_matches('/')
            .to_string();
        validate_url(ENV_CONSOLE_BASE_URL, &console_base_url, &["http", "https"])?;

        let feed_token = lookup(ENV_FEED_TOKEN).filter(|token| !token.is_empty());

        let listen_addr = parse_addr(&lookup)?;
        let dedup_ttl = parse_secs(&lookup, ENV_DEDUP_TTL_SECS, DEFAULT_DEDUP_TTL_SECS)?;
        let reconnect_delay = parse_secs(
            &lookup,
            ENV_RECONNECT_DELAY_SECS,
            DEFAULT_RECONNECT_DELAY_SECS,
        )?;

        Ok(Self {
            feed_url,
            feed_token,
            webhook_url,
            console_base_url,
            listen_addr,
            dedup_ttl,
            reconnect_delay,
        })
    }
}

/// Read a required variable, failing on absent or empty values.
fn require<F>(lookup: &F, name: &str) -> DaemonResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DaemonError::Config(format!("environment variable '{name}' not set")))
}

/// Check that a value parses as a URL with one of the allowed schemes.
fn validate_url(name: &str, value: &str, schemes: &[&str]) -> DaemonResult<()> {
    let url = Url::parse(value)
        .map_err(|e| DaemonError::Config(format!("invalid URL in '{name}': {e}")))?;

    if !schemes.contains(&url.scheme()) {
        return Err(DaemonError::Config(format!(
            "invalid URL in '{name}': scheme must be one of {schemes:?}"
        )));
    }

    Ok(())
}

/// Parse the listener address, falling back to the default.
fn parse_addr<F>(lookup: &F) -> DaemonResult<SocketAddr>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
    value.parse().map_err(|e| {
        DaemonError::Config(format!("invalid address in '{ENV_LISTEN_ADDR}': {e}"))
    })
}

/// Parse a whole-seconds duration, falling back to the default.
fn parse_secs<F>(lookup: &F, name: &str, default: u64) -> DaemonResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup(name) {
        Some(value) => value
            .parse::<u64>()
            .map_err(|e| DaemonError::Config(format!("invalid number in '{name}': {e}")))?,
        None => default,
    };

    if secs == 0 {
        return Err(DaemonError::Config(format!(
            "invalid number in '{name}': must be greater than zero"
        )));
    }

    Ok(Duration::from_secs(secs))
}
