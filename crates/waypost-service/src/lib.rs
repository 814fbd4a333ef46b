//! Location request coordination and event dispatch

mod collaborators;
mod coordinator;
mod messages;
mod runtime;

pub use collaborators::{
    Collaborators, ContactLookup, Geocoder, LocationProvider, Permissions, Publisher, Scheduler,
};
pub use coordinator::{Coordinator, ReconfigureReason, StandingRequest};
pub use messages::{Command, Directive, Intent, Message};
pub use runtime::{
    mailbox, spawn, CoordinatorHandle, Mailbox, RuntimeError, WeakCoordinatorHandle,
};
