//! Wire frames exchanged on the feed subscription socket.
//!
//! Every frame is a JSON object tagged by a `type` field. Unknown or
//! malformed frames fail decoding explicitly; nothing is cast blindly.

use serde::{Deserialize, Serialize};

use crate::events::{EventSeverity, WarningEvent};
use crate::ProtoError;

/// A frame on the feed subscription socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedFrame {
    /// Client request to start streaming events.
    Subscribe {
        /// Lowest severity class the client wants delivered.
        min_severity: EventSeverity,
        /// Bearer token for feeds that require authentication.
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// Feed acknowledgement of a subscription.
    Subscribed {
        /// The severity filter the feed will apply.
        min_severity: EventSeverity,
    },
    /// One delivered event record.
    Event {
        /// The event payload.
        event: WarningEvent,
    },
    /// Keepalive; carries no data.
    Heartbeat,
}

impl FeedFrame {
    /// Create an event frame.
    #[must_use]
    pub fn event(event: WarningEvent) -> Self {
        Self::Event { event }
    }

    /// Serialize the frame to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize a frame from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a recognized frame.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}
