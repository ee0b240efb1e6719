//! Cluster warning events delivered by the feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity class of a cluster event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    /// Routine lifecycle event.
    Normal,
    /// Something is wrong with the subject.
    Warning,
}

impl std::fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
        };
        write!(f, "{s}")
    }
}

/// The workload or resource an event is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventSubject {
    /// Namespace the subject lives in.
    pub namespace: String,
    /// Resource kind, e.g. `Pod` or `Deployment`.
    pub kind: String,
    /// Resource name, usually instance-generated (`myapp-7d8f9c-xk2pq`).
    pub name: String,
}

impl EventSubject {
    /// Create a new subject.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// A single event record delivered by the feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarningEvent {
    /// The subject this event is about.
    pub subject: EventSubject,
    /// Severity class reported by the feed.
    pub severity: EventSeverity,
    /// Machine-readable reason, e.g. `BackOff` or `Unhealthy`.
    pub reason: String,
    /// Human-readable message.
    pub message: String,
    /// When the condition was observed.
    pub occurred_at: DateTime<Utc>,
}

impl WarningEvent {
    /// Create a warning-severity event timestamped now.
    #[must_use]
    pub fn new(subject: EventSubject, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject,
            severity: EventSeverity::Warning,
            reason: reason.into(),
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }

    /// Create a warning-severity event with a specific timestamp.
    #[must_use]
    pub fn at(
        subject: EventSubject,
        reason: impl Into<String>,
        message: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            severity: EventSeverity::Warning,
            reason: reason.into(),
            message: message.into(),
            occurred_at,
        }
    }

    /// Set the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Serialize the event to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, crate::ProtoError> {
        serde_json::to_string(self).map_err(|e| crate::ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize an event from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self, crate::ProtoError> {
        serde_json::from_str(json).map_err(|e| crate::ProtoError::Decoding(e.to_string()))
    }
}
