//! Warning-feed WebSocket client.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use petrel_proto::{EventSeverity, FeedFrame};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{DaemonError, DaemonResult};

/// Timeout for establishing the feed connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An open subscription to the warning feed.
pub struct FeedSubscription {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// Connect to the feed and subscribe to warning events.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the connection cannot be
/// established within the timeout, or the subscribe frame cannot be sent.
pub async fn subscribe(feed_url: &str, token: Option<&str>) -> DaemonResult<FeedSubscription> {
    let url = Url::parse(feed_url).map_err(|e| DaemonError::Feed(e.to_string()))?;
    info!("connecting to warning feed: {}", url);

    let (mut ws, _) = timeout(CONNECT_TIMEOUT, connect_async(url.as_str()))
        .await
        .map_err(|_| DaemonError::Feed("connection timeout".to_string()))?
        .map_err(|e| DaemonError::Feed(e.to_string()))?;

    let subscribe = FeedFrame::Subscribe {
        min_severity: EventSeverity::Warning,
        token: token.map(ToString::to_string),
    };

    debug!("sending subscribe frame");
    ws.send(Message::Text(subscribe.to_json()?.into()))
        .await
        .map_err(|e| DaemonError::Feed(e.to_string()))?;

    Ok(FeedSubscription { ws })
}

impl FeedSubscription {
    /// Read the next frame from the feed.
    ///
    /// Malformed frames are logged and skipped. Returns `Ok(None)` when the
    /// feed closes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub async fn next_frame(&mut self) -> DaemonResult<Option<FeedFrame>> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => match FeedFrame::from_json(&text) {
                    Ok(frame) => return Ok(Some(frame)),
                    Err(e) => {
                        warn!(error = %e, "skipping malformed feed frame");
                    }
                },
                Some(Ok(Message::Ping(data))) => {
                    let _ = self.ws.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) => {
                    info!("feed closed the stream");
                    return Ok(None);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(DaemonError::Feed(e.to_string())),
                None => {
                    info!("feed stream ended");
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_invalid_url_fails() {
        let result = subscribe("not a url", None).await;

        assert!(matches!(result, Err(DaemonError::Feed(_))));
    }

    #[tokio::test]
    async fn test_subscribe_unreachable_feed_fails() {
        let result = subscribe("ws://127.0.0.1:9/warnings", None).await;

        assert!(matches!(result, Err(DaemonError::Feed(_))));
    }
}
