//! Notification channels for delivering warning events.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use petrel_proto::WarningEvent;
use tracing::debug;

use crate::error::{AlertError, Result};
use crate::payload::WebhookMessage;

/// Default timeout for a single delivery request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Result of a notification delivery attempt.
#[derive(Debug, Clone)]
pub struct NotificationResult {
    /// Whether the notification was delivered.
    pub success: bool,
    /// The channel that handled the notification.
    pub channel: String,
    /// Optional status or error message.
    pub message: Option<String>,
    /// HTTP status code, when the channel spoke HTTP.
    pub status_code: Option<u16>,
}

impl NotificationResult {
    /// Create a successful result.
    #[must_use]
    pub fn success(channel: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            message: None,
            status_code: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn failure(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            channel: channel.into(),
            message: Some(message.into()),
            status_code: None,
        }
    }

    /// Attach an HTTP status code.
    #[must_use]
    pub const fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Attach a status message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A destination that warning events can be delivered to.
///
/// Delivery is best-effort: a failed attempt is reported in the
/// [`NotificationResult`], never as an error, and is not retried.
pub trait NotificationChannel: Send + Sync + fmt::Debug {
    /// Returns the name of this channel.
    fn name(&self) -> &str;

    /// Deliver a notification for the event.
    fn notify(&self, event: &WarningEvent) -> impl Future<Output = NotificationResult> + Send;
}

/// Configuration for a webhook channel.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// POST target for notification documents.
    pub url: String,
    /// Console base URL used to build attachment links.
    pub console_base_url: String,
    /// Timeout for each delivery request, in seconds.
    pub timeout_secs: u64,
}

impl WebhookConfig {
    /// Create a new webhook configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook URL or console base URL is empty.
    pub fn new(url: impl Into<String>, console_base_url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(AlertError::InvalidConfig {
                reason: "webhook URL cannot be empty".to_string(),
            });
        }

        let console_base_url = console_base_url.into();
        if console_base_url.is_empty() {
            return Err(AlertError::InvalidConfig {
                reason: "console base URL cannot be empty".to_string(),
            });
        }

        Ok(Self {
            url,
            console_base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set the delivery timeout in seconds.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Webhook notification channel.
///
/// Sends one JSON POST per notification and reports the outcome without
/// retrying.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create a webhook channel from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AlertError::HttpClient(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// The webhook URL this channel posts to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Render the notification document for an event as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format_payload(&self, event: &WarningEvent) -> Result<String> {
        let message = WebhookMessage::from_event(event, &self.config.console_base_url);
        serde_json::to_string(&message).map_err(AlertError::from)
    }
}

impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    fn notify(&self, event: &WarningEvent) -> impl Future<Output = NotificationResult> + Send {
        let message = WebhookMessage::from_event(event, &self.config.console_base_url);

        async move {
            debug!(url = %self.config.url, "posting webhook notification");

            match self.client.post(&self.config.url).json(&message).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        NotificationResult::success(self.name()).with_status_code(status.as_u16())
                    } else {
                        NotificationResult::failure(
                            self.name(),
                            format!("webhook returned status {status}"),
                        )
                        .with_status_code(status.as_u16())
                    }
                }
                Err(e) => NotificationResult::failure(self.name(), e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petrel_proto::EventSubject;

    fn test_event() -> WarningEvent {
        WarningEvent::new(
            EventSubject::new("ns1", "Pod", "app-abc123"),
            "BackOff",
            "CrashLoopBackOff",
        )
    }

    mod notification_result_tests {
        use super::*;

        #[test]
        fn success_result() {
            let result = NotificationResult::success("webhook");

            assert!(result.success);
            assert_eq!(result.channel, "webhook");
            assert!(result.message.is_none());
            assert!(result.status_code.is_none());
        }

        #[test]
        fn failure_result() {
            let result = NotificationResult::failure("webhook", "connection refused");

            assert!(!result.success);
            assert_eq!(result.channel, "webhook");
            assert_eq!(result.message.as_deref(), Some("connection refused"));
        }

        #[test]
        fn with_status_code() {
            let result = NotificationResult::success("webhook").with_status_code(200);

            assert_eq!(result.status_code, Some(200));
        }

        #[test]
        fn with_message() {
            let result = NotificationResult::success("webhook").with_message("delivered");

            assert_eq!(result.message.as_deref(), Some("delivered"));
        }
    }

    mod webhook_config_tests {
        use super::*;

        #[test]
        fn valid_config() {
            let config = WebhookConfig::new(
                "https://chat.example.com/hook",
                "https://console.example.com",
            )
            .unwrap();

            assert_eq!(config.url, "https://chat.example.com/hook");
            assert_eq!(config.console_base_url, "https://console.example.com");
            assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        }

        #[test]
        fn empty_url_fails() {
            let result = WebhookConfig::new("", "https://console.example.com");

            assert!(result.is_err());
        }

        #[test]
        fn empty_console_base_url_fails() {
            let result = WebhookConfig::new("https://chat.example.com/hook", "");

            assert!(result.is_err());
        }

        #[test]
        fn with_timeout_secs_overrides_default() {
            let config = WebhookConfig::new(
                "https://chat.example.com/hook",
                "https://console.example.com",
            )
            .unwrap()
            .with_timeout_secs(3);

            assert_eq!(config.timeout_secs, 3);
        }
    }

    mod webhook_channel_tests {
        use super::*;

        fn test_channel() -> WebhookChannel {
            let config = WebhookConfig::new(
                "https://chat.example.com/hook",
                "https://console.example.com",
            )
            .unwrap();
            WebhookChannel::new(config).unwrap()
        }

        #[test]
        fn channel_name() {
            assert_eq!(test_channel().name(), "webhook");
        }

        #[test]
        fn channel_url() {
            assert_eq!(test_channel().url(), "https://chat.example.com/hook");
        }

        #[test]
        fn format_payload_renders_attachment() {
            let payload = test_channel().format_payload(&test_event()).unwrap();

            assert!(payload.contains("\"color\":\"warning\""));
            assert!(payload.contains("\"author_name\":\"ns1\""));
            assert!(payload.contains("\"text\":\"CrashLoopBackOff\""));
            assert!(payload.contains("/project/ns1/monitoring"));
        }

        #[tokio::test]
        async fn notify_unreachable_webhook_reports_failure() {
            let config =
                WebhookConfig::new("http://127.0.0.1:9/hook", "https://console.example.com")
                    .unwrap()
                    .with_timeout_secs(1);
            let channel = WebhookChannel::new(config).unwrap();

            let result = channel.notify(&test_event()).await;

            assert!(!result.success);
            assert_eq!(result.channel, "webhook");
            assert!(result.message.is_some());
        }
    }
}
