//! Presentation port and the presentation models handed to it

use serde::{Deserialize, Serialize};

/// Presentation priority of the ongoing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Minimum,
    Default,
}

/// The single, continuously updated status presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OngoingNotification {
    pub title: String,
    pub text: String,
    /// Epoch ms of the displayed location, if one is displayed
    pub when_ms: Option<i64>,
    /// Outgoing queue length badge, shown together with the location
    pub badge: Option<usize>,
    pub priority: NotificationPriority,
}

/// One transition event awaiting presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransition {
    /// Per-event id for presenters that show events individually
    pub id: u32,
    pub title: String,
    pub body: String,
    pub timestamp_ms: i64,
    /// Formatted event time, rendered emphasized
    pub header: String,
}

impl PendingTransition {
    /// `"<header> <title> <body>"`
    pub fn line(&self) -> String {
        format!("{} {} {}", self.header, self.title, self.body)
    }

    /// Byte length of the emphasized prefix of `line()` (header plus the following space)
    pub fn emphasis_len(&self) -> usize {
        self.header.len() + 1
    }
}

/// Merged presentation of all pending transition events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub title: String,
    pub text: String,
    /// Number of pending events, never capped
    pub group_count: usize,
    /// Newest first, capped to the configured line count
    pub entries: Vec<PendingTransition>,
    /// Event that triggered this summary
    pub latest: PendingTransition,
}

/// One-time notice about a platform background location restriction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub title: String,
    pub text: String,
    /// Advisories never make a sound
    pub silent: bool,
    /// Dismissed when the user interacts with it
    pub auto_cancel: bool,
}

impl Advisory {
    pub fn background_restriction() -> Self {
        Self {
            title: "Background location restricted".to_string(),
            text: "Location updates may be limited until the app is opened. Tap to open it."
                .to_string(),
            silent: true,
            auto_cancel: true,
        }
    }
}

/// Presentation layer consumed by the coordinator.
///
/// Calls are fire-and-forget. Implementations that cannot group events are
/// expected to degrade an `EventSummary` to its `latest` entry.
pub trait Presenter: Send + Sync {
    fn show_ongoing(&self, notification: &OngoingNotification);

    fn show_event_summary(&self, summary: &EventSummary);

    fn show_advisory(&self, advisory: &Advisory);

    fn cancel_advisory(&self) {}

    fn clear_event_group(&self) {}
}
