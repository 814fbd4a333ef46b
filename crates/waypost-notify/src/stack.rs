//! Pending transition events merged into one summarized presentation

use std::collections::VecDeque;

use crate::presenter::{EventSummary, PendingTransition};
use crate::transition::TransitionText;

const SUMMARY_TITLE: &str = "Events";

/// Ids 1 and 2 belong to the ongoing and the group presentation
const FIRST_EVENT_ID: u32 = 3;

/// Ordered list of pending transition events, newest first.
///
/// Entries leave the stack only through `clear()`.
#[derive(Debug, Clone)]
pub struct EventStack {
    entries: VecDeque<PendingTransition>,
    next_id: u32,
    max_lines: usize,
}

impl EventStack {
    /// `max_lines` caps the rendered entries, not the stored ones
    pub fn new(max_lines: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: FIRST_EVENT_ID,
            max_lines,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PendingTransition> {
        self.entries.iter()
    }

    /// Add an event and return the re-rendered summary
    pub fn push(&mut self, text: TransitionText, header: String) -> EventSummary {
        let event = PendingTransition {
            id: self.next_id,
            title: text.title,
            body: text.body,
            timestamp_ms: text.timestamp_ms,
            header,
        };
        self.next_id = self.next_id.wrapping_add(1).max(FIRST_EVENT_ID);
        self.entries.push_front(event.clone());
        tracing::trace!(pending = self.entries.len(), "event stack grew");

        self.render(event)
    }

    /// Current summary, `None` when nothing is pending
    pub fn summary(&self) -> Option<EventSummary> {
        self.entries.front().cloned().map(|latest| self.render(latest))
    }

    /// Drop all pending events. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    fn render(&self, latest: PendingTransition) -> EventSummary {
        let count = self.entries.len();
        EventSummary {
            title: SUMMARY_TITLE.to_string(),
            text: summary_text(count),
            group_count: count,
            entries: self.entries.iter().take(self.max_lines).cloned().collect(),
            latest,
        }
    }
}

impl Default for EventStack {
    fn default() -> Self {
        Self::new(7)
    }
}

fn summary_text(count: usize) -> String {
    if count == 1 {
        "1 event".to_string()
    } else {
        format!("{} events", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(title: &str, ts: i64) -> TransitionText {
        TransitionText {
            title: title.to_string(),
            body: "entering Home".to_string(),
            timestamp_ms: ts,
        }
    }

    #[test]
    fn test_push_renders_count() {
        let mut stack = EventStack::new(7);
        let summary = stack.push(text("Alice", 1), "10:00".to_string());
        assert_eq!(summary.group_count, 1);
        assert_eq!(summary.text, "1 event");

        let summary = stack.push(text("Bob", 2), "10:01".to_string());
        assert_eq!(summary.group_count, 2);
        assert_eq!(summary.text, "2 events");
        assert_eq!(summary.title, "Events");
    }

    #[test]
    fn test_newest_first() {
        let mut stack = EventStack::new(7);
        stack.push(text("Alice", 1), "10:00".to_string());
        let summary = stack.push(text("Bob", 2), "10:01".to_string());
        let titles: Vec<_> = summary.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Bob", "Alice"]);
        assert_eq!(summary.latest.title, "Bob");
    }

    #[test]
    fn test_entries_capped_count_not() {
        let mut stack = EventStack::new(2);
        for i in 0..5 {
            stack.push(text(&format!("c{}", i), i), "10:00".to_string());
        }
        let summary = stack.summary().unwrap();
        assert_eq!(summary.group_count, 5);
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(stack.len(), 5);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut stack = EventStack::new(7);
        let first = stack.push(text("a", 1), "x".to_string()).latest.id;
        let second = stack.push(text("b", 2), "x".to_string()).latest.id;
        assert_eq!(first, 3);
        assert_eq!(second, 4);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut stack = EventStack::new(7);
        stack.push(text("a", 1), "x".to_string());
        stack.push(text("b", 2), "x".to_string());
        assert_eq!(stack.clear(), 2);
        assert_eq!(stack.clear(), 0);
        assert!(stack.is_empty());
        assert!(stack.summary().is_none());
    }

    #[test]
    fn test_three_then_clear_then_one() {
        let mut stack = EventStack::default();
        for i in 0..3 {
            stack.push(text("a", i), "x".to_string());
        }
        stack.clear();
        assert_eq!(stack.len(), 0);
        let summary = stack.push(text("d", 4), "x".to_string());
        assert_eq!(summary.group_count, 1);
        assert_eq!(stack.len(), 1);
    }
}
