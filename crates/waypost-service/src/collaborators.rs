//! External collaborators the coordinator drives

use std::sync::Arc;

use waypost_core::{Fix, LocationRequest, PreferenceStore, ReportType, RequestChannel};
use waypost_notify::Presenter;

/// Platform location provider.
///
/// Results are delivered later as `Message::FixReceived` tagged with the
/// channel the request was issued on.
pub trait LocationProvider: Send + Sync {
    /// Issue a request on `channel`, replacing any earlier request on the same channel
    fn request_updates(&self, request: &LocationRequest, channel: RequestChannel);

    fn remove_updates(&self, channel: RequestChannel);

    /// Deliver any fixes the provider is still batching
    fn flush_locations(&self);

    fn last_location(&self) -> Option<Fix>;
}

/// Location permission capability
pub trait Permissions: Send + Sync {
    fn location_granted(&self) -> bool;
}

/// Reverse geocoding. The label arrives later as `Message::GeocodeResolved`.
pub trait Geocoder: Send + Sync {
    fn resolve(&self, fix: &Fix);
}

pub trait ContactLookup: Send + Sync {
    fn display_name(&self, contact_key: &str) -> Option<String>;
}

/// Downstream consumer of admitted fixes (publishing, persistence)
pub trait Publisher: Send + Sync {
    fn on_location(&self, fix: &Fix, report_type: ReportType);

    /// Stop sending queued messages. Called once on teardown.
    fn stop(&self) {}
}

/// Background task scheduling owned by the host
pub trait Scheduler: Send + Sync {
    /// Arm the periodic location ping
    fn schedule_location_ping(&self);

    fn cancel_all(&self);
}

/// Everything the coordinator talks to
#[derive(Clone)]
pub struct Collaborators {
    /// `None` when the platform has no location provider
    pub provider: Option<Arc<dyn LocationProvider>>,
    pub permissions: Arc<dyn Permissions>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub presenter: Arc<dyn Presenter>,
    pub geocoder: Arc<dyn Geocoder>,
    pub contacts: Arc<dyn ContactLookup>,
    pub publisher: Arc<dyn Publisher>,
    pub scheduler: Arc<dyn Scheduler>,
}
