//! Webhook delivery tests against a local HTTP sink.
//!
//! These tests run the webhook channel against a real HTTP endpoint and
//! verify the posted payload, the failure paths, and the complete
//! feed-to-webhook pipeline.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{Router, post};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use petrel_alerts::{DedupCache, NotificationChannel, WebhookChannel, WebhookConfig};
use petrel_proto::{EventSeverity, EventSubject, FeedFrame, WarningEvent};
use petreld::watch::Watcher;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

// ============================================================================
// Webhook Sink
// ============================================================================

/// Records every JSON document posted to the sink.
#[derive(Debug, Clone, Default)]
struct Sink {
    received: Arc<Mutex<Vec<Value>>>,
}

impl Sink {
    fn received(&self) -> Vec<Value> {
        self.received.lock().expect("lock poisoned").clone()
    }
}

async fn receive(State(sink): State<Sink>, Json(body): Json<Value>) -> StatusCode {
    sink.received.lock().expect("lock poisoned").push(body);
    StatusCode::OK
}

/// Start a sink server on an ephemeral port and return its address.
async fn start_sink(sink: Sink) -> SocketAddr {
    let app = Router::new().route("/hook", post(receive)).with_state(sink);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve failed");
    });

    addr
}

/// Start a server whose hook endpoint always fails.
async fn start_failing_sink() -> SocketAddr {
    let app = Router::new().route(
        "/hook",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve failed");
    });

    addr
}

fn test_event() -> WarningEvent {
    WarningEvent::new(
        EventSubject::new("ns1", "Pod", "app-abc123"),
        "BackOff",
        "CrashLoopBackOff",
    )
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn test_delivery_posts_attachment_payload() {
    let sink = Sink::default();
    let addr = start_sink(sink.clone()).await;

    let config = WebhookConfig::new(format!("http://{addr}/hook"), "http://console.test")
        .expect("config");
    let channel = WebhookChannel::new(config).expect("channel");

    let result = channel.notify(&test_event()).await;

    assert!(result.success, "delivery failed: {:?}", result.message);
    assert_eq!(result.status_code, Some(200));

    let received = sink.received();
    assert_eq!(received.len(), 1);

    let attachment = &received[0]["attachments"][0];
    assert_eq!(attachment["color"], "warning");
    assert_eq!(attachment["author_name"], "ns1");
    assert_eq!(
        attachment["author_link"],
        "http://console.test/project/ns1/monitoring"
    );
    assert_eq!(attachment["title"], "app-abc123");
    assert_eq!(
        attachment["title_link"],
        "http://console.test/project/ns1/browse/pods/app-abc123"
    );
    assert_eq!(attachment["text"], "CrashLoopBackOff");
    assert_eq!(attachment["fields"][0]["title"], "Reason");
    assert_eq!(attachment["fields"][0]["value"], "BackOff");
    assert_eq!(attachment["fields"][0]["short"], true);
    assert_eq!(attachment["fields"][1]["title"], "Kind");
    assert_eq!(attachment["fields"][1]["value"], "Pod");
    assert_eq!(attachment["fields"][1]["short"], true);
}

#[tokio::test]
async fn test_non_success_status_reported_as_failure() {
    let addr = start_failing_sink().await;

    let config = WebhookConfig::new(format!("http://{addr}/hook"), "http://console.test")
        .expect("config");
    let channel = WebhookChannel::new(config).expect("channel");

    let result = channel.notify(&test_event()).await;

    assert!(!result.success);
    assert_eq!(result.status_code, Some(500));
    assert!(result.message.is_some());
}

#[tokio::test]
async fn test_unreachable_webhook_reported_as_failure() {
    let config = WebhookConfig::new("http://127.0.0.1:9/hook", "http://console.test")
        .expect("config")
        .with_timeout_secs(2);
    let channel = WebhookChannel::new(config).expect("channel");

    let result = channel.notify(&test_event()).await;

    assert!(!result.success);
    assert_eq!(result.status_code, None);
    assert!(result.message.is_some());
}

// ============================================================================
// Feed-to-Webhook Pipeline
// ============================================================================

async fn accept_subscriber(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.expect("accept failed");
    let mut ws = accept_async(stream).await.expect("handshake failed");

    // Consume the subscribe frame and acknowledge it.
    let msg = ws
        .next()
        .await
        .expect("no subscribe frame")
        .expect("read failed");
    assert!(matches!(msg, Message::Text(_)));

    let ack = FeedFrame::Subscribed {
        min_severity: EventSeverity::Warning,
    };
    ws.send(Message::Text(ack.to_json().expect("json").into()))
        .await
        .expect("ack failed");

    ws
}

/// The full path: feed event in, webhook POST out, repeat suppressed.
#[tokio::test]
async fn test_feed_event_reaches_webhook_exactly_once() {
    let sink = Sink::default();
    let sink_addr = start_sink(sink.clone()).await;

    let feed_listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let feed_url = format!("ws://{}", feed_listener.local_addr().expect("no addr"));

    let config = WebhookConfig::new(format!("http://{sink_addr}/hook"), "http://console.test")
        .expect("config");
    let channel = WebhookChannel::new(config).expect("channel");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let watcher = Watcher::new(
        feed_url,
        channel,
        DedupCache::default(),
        Duration::from_millis(100),
    );
    let watcher_handle = tokio::spawn(watcher.run(shutdown_rx));

    let mut ws = accept_subscriber(&feed_listener).await;

    let crash = WarningEvent::at(
        EventSubject::new("ns1", "Pod", "app-abc123"),
        "BackOff",
        "CrashLoopBackOff",
        Utc::now() + chrono::Duration::seconds(2),
    );
    let repeat = WarningEvent::at(
        EventSubject::new("ns1", "Pod", "app-xk9f2"),
        "BackOff",
        "CrashLoopBackOff",
        Utc::now() + chrono::Duration::seconds(3),
    );
    let oom = WarningEvent::at(
        EventSubject::new("ns1", "Pod", "app-abc123"),
        "OOMKilling",
        "OOMKilled",
        Utc::now() + chrono::Duration::seconds(4),
    );

    for event in [crash, repeat, oom] {
        let frame = FeedFrame::event(event);
        ws.send(Message::Text(frame.to_json().expect("json").into()))
            .await
            .expect("send failed");
    }

    // Wait for the two expected deliveries.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while sink.received().len() < 2 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for deliveries, got {}",
            sink.received().len()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let received = sink.received();
    assert_eq!(received.len(), 2, "repeat warning must not be delivered");
    assert_eq!(received[0]["attachments"][0]["text"], "CrashLoopBackOff");
    assert_eq!(received[1]["attachments"][0]["text"], "OOMKilled");

    shutdown_tx.send(true).expect("shutdown failed");
    timeout(Duration::from_secs(5), watcher_handle)
        .await
        .expect("watcher did not stop")
        .expect("watcher task failed");
}
