//! Wording for transition events

use waypost_core::TransitionMessage;

const UNKNOWN_PLACE: &str = "a location";

/// Title and body describing one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionText {
    pub title: String,
    pub body: String,
    pub timestamp_ms: i64,
}

impl TransitionText {
    /// Title preference: contact display name, then tracker id, then contact key
    pub fn from_message(message: &TransitionMessage, display_name: Option<&str>) -> Self {
        let title = display_name
            .map(str::to_string)
            .or_else(|| message.tracker_id.clone())
            .unwrap_or_else(|| message.contact_key.clone());

        let place = message.description.as_deref().unwrap_or(UNKNOWN_PLACE);
        let body = format!("{} {}", message.transition.verb(), place);

        Self {
            title,
            body,
            timestamp_ms: message.timestamp.saturating_mul(1000),
        }
    }
}
