//! Ongoing status: last location label, queue length and endpoint state

use waypost_core::{EndpointState, Fix, Preferences};

use crate::presenter::{NotificationPriority, OngoingNotification};

/// Last admitted fix as shown in the status
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedLocation {
    pub timestamp_ms: i64,
    /// Geocoded label, `None` until resolved
    pub label: Option<String>,
}

/// Inputs the ongoing presentation is derived from. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct OngoingStatus {
    location: Option<TrackedLocation>,
    queue_length: usize,
    endpoint: Option<EndpointState>,
}

impl OngoingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> Option<&TrackedLocation> {
        self.location.as_ref()
    }

    pub fn queue_length(&self) -> usize {
        self.queue_length
    }

    pub fn endpoint(&self) -> Option<&EndpointState> {
        self.endpoint.as_ref()
    }

    /// Start tracking `fix` if it is newer than the tracked one.
    /// Returns true when the caller should resolve a label for it.
    pub fn track_fix(&mut self, fix: &Fix) -> bool {
        let newer = self
            .location
            .as_ref()
            .is_none_or(|current| current.timestamp_ms < fix.timestamp_ms);
        if newer {
            self.location = Some(TrackedLocation {
                timestamp_ms: fix.timestamp_ms,
                label: None,
            });
        }
        newer
    }

    /// Attach a geocoded label. Ignored unless it belongs to the tracked fix.
    pub fn resolve_label(&mut self, timestamp_ms: i64, label: String) -> bool {
        match self.location.as_mut() {
            Some(current) if current.timestamp_ms == timestamp_ms => {
                current.label = Some(label);
                true
            }
            _ => false,
        }
    }

    pub fn set_queue_length(&mut self, length: usize) {
        self.queue_length = length;
    }

    pub fn set_endpoint_state(&mut self, state: EndpointState) {
        self.endpoint = Some(state);
    }

    pub fn render(&self, preferences: &Preferences, app_name: &str) -> OngoingNotification {
        let shown = self
            .location
            .as_ref()
            .filter(|_| preferences.notification_location)
            .and_then(|loc| loc.label.as_ref().map(|label| (label, loc.timestamp_ms)));

        let (title, when_ms, badge) = match shown {
            Some((label, timestamp_ms)) => {
                (label.clone(), Some(timestamp_ms), Some(self.queue_length))
            }
            None => (app_name.to_string(), None, None),
        };

        let text = match &self.endpoint {
            None | Some(EndpointState::Connected) | Some(EndpointState::Idle) => {
                preferences.monitoring.label().to_string()
            }
            Some(state @ EndpointState::Error(Some(message))) => {
                format!("{}: {}", state.label(), message)
            }
            Some(state) => state.label().to_string(),
        };

        let priority = if preferences.notification_higher_priority {
            NotificationPriority::Default
        } else {
            NotificationPriority::Minimum
        };

        OngoingNotification {
            title,
            text,
            when_ms,
            badge,
            priority,
        }
    }
}
