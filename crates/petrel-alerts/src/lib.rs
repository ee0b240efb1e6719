//! Warning-event notification pipeline for Petrel.
//!
//! `petrel-alerts` turns cluster warning events into chat notifications:
//! each event is reduced to a fingerprint, compared against the most
//! recently notified fingerprint, and delivered through a webhook channel
//! when it is novel.
//!
//! # Features
//!
//! - **Fingerprinting**: Reduce an event to a stable identity string that
//!   survives pod-name churn and probe-target noise
//! - **Deduplication**: Single-slot cache suppressing repeats of the last
//!   notified event, with a TTL safety net
//! - **Notification Channels**: Deliver events via chat webhooks in the
//!   attachment format
//!
//! # Example
//!
//! ```rust
//! use petrel_alerts::{DedupCache, reduce};
//! use petrel_proto::{EventSubject, WarningEvent};
//!
//! let mut cache = DedupCache::default();
//!
//! let event = WarningEvent::new(
//!     EventSubject::new("ns1", "Pod", "app-abc123"),
//!     "BackOff",
//!     "CrashLoopBackOff",
//! );
//!
//! // Reduce the event to its fingerprint.
//! let fingerprint = reduce(&event);
//! assert_eq!(fingerprint.as_str(), "ns1_app_CrashLoopBackOff");
//!
//! // First sighting: nothing is cached, so the event is novel.
//! assert!(cache.get().is_none());
//! cache.set(fingerprint.clone());
//!
//! // Repeats now compare equal to the cached slot and are suppressed.
//! assert_eq!(cache.get(), Some(&fingerprint));
//! ```

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/petrel-alerts/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod channels;
pub mod error;
pub mod fingerprint;
pub mod payload;

// Re-export main types at crate root
pub use cache::{DEFAULT_TTL, DedupCache};
pub use channels::{
    DEFAULT_TIMEOUT_SECS, NotificationChannel, NotificationResult, WebhookChannel, WebhookConfig,
};
pub use error::{AlertError, Result};
pub use fingerprint::{Fingerprint, reduce};
pub use payload::{WebhookAttachment, WebhookField, WebhookMessage};
