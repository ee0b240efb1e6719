//! Watch loop over the warning feed.
//!
//! Subscribes to the feed, gates each event through the dedup cache, and
//! notifies the channel about novel warnings. Every close or failure of the
//! stream is followed by a fresh subscription after a backoff delay; the
//! loop never gives up on its own.

use std::time::Duration;

use chrono::{DateTime, Utc};
use petrel_alerts::{DedupCache, Fingerprint, NotificationChannel, reduce};
use petrel_proto::{EventSeverity, FeedFrame, WarningEvent};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::DaemonResult;
use crate::feed::{self, FeedSubscription};

/// Ceiling for the reconnect backoff.
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Decision for a single feed event.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Disposition {
    /// Happened at or before the session start; replayed history.
    Stale,
    /// Below warning severity.
    NotWarning,
    /// Same fingerprint as the last notification.
    Duplicate(Fingerprint),
    /// Novel; notify and remember.
    Notify(Fingerprint),
}

/// How a streaming session ended.
enum StreamEnd {
    /// The feed closed the stream.
    Closed,
    /// Shutdown was signalled.
    Shutdown,
}

/// Decide what to do with an event received during a session that started
/// at `started_at`.
fn evaluate(event: &WarningEvent, started_at: DateTime<Utc>, cache: &DedupCache) -> Disposition {
    if event.occurred_at <= started_at {
        return Disposition::Stale;
    }

    if event.severity != EventSeverity::Warning {
        return Disposition::NotWarning;
    }

    let fingerprint = reduce(event);
    if cache.get() == Some(&fingerprint) {
        Disposition::Duplicate(fingerprint)
    } else {
        Disposition::Notify(fingerprint)
    }
}

/// Reconnect delay schedule: doubles per cycle up to a cap, and starts
/// over at the base once a subscription is established.
#[derive(Debug)]
struct Backoff {
    base: Duration,
    cap: Duration,
    delay: Duration,
}

impl Backoff {
    fn new(base: Duration) -> Self {
        Self {
            base,
            cap: base.max(MAX_RECONNECT_DELAY),
            delay: base,
        }
    }

    /// Delay before the next subscribe attempt.
    const fn delay(&self) -> Duration {
        self.delay
    }

    /// A subscription was established; escalation starts over.
    fn reset(&mut self) {
        self.delay = self.base;
    }

    /// The cycle ended; the next wait doubles, up to the cap.
    fn advance(&mut self) {
        self.delay = self.delay.saturating_mul(2).min(self.cap);
    }
}

/// Watches the warning feed and notifies a channel about novel events.
#[derive(Debug)]
pub struct Watcher<C: NotificationChannel> {
    feed_url: String,
    feed_token: Option<String>,
    reconnect_delay: Duration,
    cache: DedupCache,
    channel: C,
}

impl<C: NotificationChannel> Watcher<C> {
    /// Create a watcher over the given feed and channel.
    #[must_use]
    pub fn new(
        feed_url: impl Into<String>,
        channel: C,
        cache: DedupCache,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            feed_url: feed_url.into(),
            feed_token: None,
            reconnect_delay,
            cache,
            channel,
        }
    }

    /// Set the token sent when subscribing to the feed.
    #[must_use]
    pub fn with_feed_token(mut self, token: impl Into<String>) -> Self {
        self.feed_token = Some(token.into());
        self
    }

    /// Run until shutdown is signalled.
    ///
    /// Each subscription records a fresh session start time; events at or
    /// before it are discarded as replayed history. The dedup cache persists
    /// across sessions, so a warning notified before a reconnect stays
    /// suppressed after it.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = Backoff::new(self.reconnect_delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            let started_at = Utc::now();

            let subscription = tokio::select! {
                result = feed::subscribe(&self.feed_url, self.feed_token.as_deref()) => result,
                _ = shutdown.changed() => break,
            };

            match subscription {
                Ok(sub) => {
                    backoff.reset();
                    info!(feed = %self.feed_url, "subscribed to warning feed");

                    match self.stream_events(sub, started_at, &mut shutdown).await {
                        Ok(StreamEnd::Shutdown) => break,
                        Ok(StreamEnd::Closed) => info!("feed stream closed"),
                        Err(e) => error!(error = %e, "feed stream failed"),
                    }
                }
                Err(e) => {
                    error!(error = %e, "feed subscribe failed");
                }
            }

            if *shutdown.borrow() {
                break;
            }

            let delay = backoff.delay();
            info!(
                delay = delay.as_secs(),
                "reconnecting in {} seconds",
                delay.as_secs()
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
            backoff.advance();
        }

        info!("watcher stopped");
    }

    /// Stream frames from one subscription until it ends.
    async fn stream_events(
        &mut self,
        mut subscription: FeedSubscription,
        started_at: DateTime<Utc>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> DaemonResult<StreamEnd> {
        loop {
            let frame = tokio::select! {
                frame = subscription.next_frame() => frame?,
                _ = shutdown.changed() => return Ok(StreamEnd::Shutdown),
            };

            match frame {
                Some(FeedFrame::Event { event }) => {
                    self.handle_event(&event, started_at).await;
                }
                Some(FeedFrame::Subscribed { min_severity }) => {
                    debug!(min_severity = %min_severity, "feed acknowledged subscription");
                }
                Some(FeedFrame::Heartbeat) => {}
                Some(FeedFrame::Subscribe { .. }) => {
                    debug!("ignoring subscribe frame from feed");
                }
                None => return Ok(StreamEnd::Closed),
            }
        }
    }

    /// Gate one event through the dedup cache and notify if it is novel.
    ///
    /// The fingerprint is stored even when delivery fails: delivery is
    /// best-effort, at most once per novel warning.
    async fn handle_event(&mut self, event: &WarningEvent, started_at: DateTime<Utc>) {
        match evaluate(event, started_at, &self.cache) {
            Disposition::Stale => {
                debug!(
                    namespace = %event.subject.namespace,
                    name = %event.subject.name,
                    "discarding event from before this session"
                );
            }
            Disposition::NotWarning => {
                debug!(
                    namespace = %event.subject.namespace,
                    name = %event.subject.name,
                    "ignoring non-warning event"
                );
            }
            Disposition::Duplicate(fingerprint) => {
                debug!(fingerprint = %fingerprint, "suppressing duplicate warning");
            }
            Disposition::Notify(fingerprint) => {
                info!(
                    fingerprint = %fingerprint,
                    namespace = %event.subject.namespace,
                    reason = %event.reason,
                    "notifying about novel warning"
                );

                let result = self.channel.notify(event).await;
                if !result.success {
                    warn!(
                        channel = %result.channel,
                        message = result.message.as_deref().unwrap_or("unknown"),
                        "notification delivery failed"
                    );
                }

                self.cache.set(fingerprint);
            }
        }
    }
}
