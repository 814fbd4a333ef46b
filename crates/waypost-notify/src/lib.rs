//! Notification aggregation: ongoing status and transition event stack

pub mod dateformat;
pub mod ongoing;
pub mod presenter;
pub mod stack;
pub mod transition;

pub use ongoing::{OngoingStatus, TrackedLocation};
pub use presenter::{
    Advisory, EventSummary, NotificationPriority, OngoingNotification, PendingTransition,
    Presenter,
};
pub use stack::EventStack;
pub use transition::TransitionText;
