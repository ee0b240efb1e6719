//! Chat-webhook payload in the attachment format.

use petrel_proto::{EventSubject, WarningEvent};
use serde::{Deserialize, Serialize};

/// Attachment color used for all warning notifications.
const WARNING_COLOR: &str = "warning";

/// A short labeled value rendered inside an attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookField {
    /// Field label.
    pub title: String,
    /// Field content.
    pub value: String,
    /// Whether the field renders side by side with its neighbor.
    pub short: bool,
}

/// One attachment describing a warning event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAttachment {
    /// Severity color bar.
    pub color: String,
    /// The subject's namespace.
    pub author_name: String,
    /// Console monitoring page for the namespace.
    pub author_link: String,
    /// The subject's name.
    pub title: String,
    /// Console page for the subject resource.
    pub title_link: String,
    /// The event message.
    pub text: String,
    /// Reason and kind, both short.
    pub fields: Vec<WebhookField>,
}

/// Top-level webhook document: a single attachment per notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookMessage {
    /// The attachments to render.
    pub attachments: Vec<WebhookAttachment>,
}

impl WebhookMessage {
    /// Build the notification document for an event.
    ///
    /// Links are rooted at `console_base_url`; a trailing slash on the
    /// base is tolerated.
    #[must_use]
    pub fn from_event(event: &WarningEvent, console_base_url: &str) -> Self {
        let subject = &event.subject;
        let base = console_base_url.trim_end_matches('/');

        let attachment = WebhookAttachment {
            color: WARNING_COLOR.to_string(),
            author_name: subject.namespace.clone(),
            author_link: monitoring_url(base, &subject.namespace),
            title: subject.name.clone(),
            title_link: resource_url(base, subject),
            text: event.message.clone(),
            fields: vec![
                WebhookField {
                    title: "Reason".to_string(),
                    value: event.reason.clone(),
                    short: true,
                },
                WebhookField {
                    title: "Kind".to_string(),
                    value: subject.kind.clone(),
                    short: true,
                },
            ],
        };

        Self {
            attachments: vec![attachment],
        }
    }
}

/// Console browse page for the subject resource.
fn resource_url(base: &str, subject: &EventSubject) -> String {
    format!(
        "{base}/project/{}/browse/{}s/{}",
        subject.namespace,
        subject.kind.to_lowercase(),
        subject.name
    )
}

/// Console monitoring page for a namespace.
fn monitoring_url(base: &str, namespace: &str) -> String {
    format!("{base}/project/{namespace}/monitoring")
}
