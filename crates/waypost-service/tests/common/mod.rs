#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use waypost_core::{
    Fix, LocationRequest, MemoryPreferenceStore, Preferences, ReportType, RequestChannel,
    ServiceConfig,
};
use waypost_notify::{Advisory, EventSummary, OngoingNotification, Presenter};
use waypost_service::{
    Collaborators, ContactLookup, Coordinator, Geocoder, LocationProvider, Permissions, Publisher,
    Scheduler,
};

#[derive(Default)]
pub struct RecordingProvider {
    pub requests: Mutex<Vec<(LocationRequest, RequestChannel)>>,
    pub removed: Mutex<Vec<RequestChannel>>,
    pub flushes: Mutex<usize>,
    pub last: Mutex<Option<Fix>>,
}

impl RecordingProvider {
    pub fn requests(&self) -> Vec<(LocationRequest, RequestChannel)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn standing_requests(&self) -> Vec<LocationRequest> {
        self.requests()
            .into_iter()
            .filter(|(_, channel)| *channel == RequestChannel::Standing)
            .map(|(request, _)| request)
            .collect()
    }

    pub fn set_last(&self, fix: Fix) {
        *self.last.lock().unwrap() = Some(fix);
    }
}

impl LocationProvider for RecordingProvider {
    fn request_updates(&self, request: &LocationRequest, channel: RequestChannel) {
        self.requests.lock().unwrap().push((request.clone(), channel));
    }

    fn remove_updates(&self, channel: RequestChannel) {
        self.removed.lock().unwrap().push(channel);
    }

    fn flush_locations(&self) {
        *self.flushes.lock().unwrap() += 1;
    }

    fn last_location(&self) -> Option<Fix> {
        self.last.lock().unwrap().clone()
    }
}

pub struct SwitchPermissions(pub AtomicBool);

impl SwitchPermissions {
    pub fn set(&self, granted: bool) {
        self.0.store(granted, Ordering::SeqCst);
    }
}

impl Permissions for SwitchPermissions {
    fn location_granted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub ongoing: Mutex<Vec<OngoingNotification>>,
    pub summaries: Mutex<Vec<EventSummary>>,
    pub advisories: Mutex<Vec<Advisory>>,
    pub advisory_cancels: Mutex<usize>,
    pub group_clears: Mutex<usize>,
}

impl RecordingPresenter {
    pub fn last_summary(&self) -> Option<EventSummary> {
        self.summaries.lock().unwrap().last().cloned()
    }

    pub fn last_ongoing(&self) -> Option<OngoingNotification> {
        self.ongoing.lock().unwrap().last().cloned()
    }

    pub fn advisory_count(&self) -> usize {
        self.advisories.lock().unwrap().len()
    }
}

impl Presenter for RecordingPresenter {
    fn show_ongoing(&self, notification: &OngoingNotification) {
        self.ongoing.lock().unwrap().push(notification.clone());
    }

    fn show_event_summary(&self, summary: &EventSummary) {
        self.summaries.lock().unwrap().push(summary.clone());
    }

    fn show_advisory(&self, advisory: &Advisory) {
        self.advisories.lock().unwrap().push(advisory.clone());
    }

    fn cancel_advisory(&self) {
        *self.advisory_cancels.lock().unwrap() += 1;
    }

    fn clear_event_group(&self) {
        *self.group_clears.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub struct RecordingGeocoder {
    pub resolved: Mutex<Vec<i64>>,
}

impl Geocoder for RecordingGeocoder {
    fn resolve(&self, fix: &Fix) {
        self.resolved.lock().unwrap().push(fix.timestamp_ms);
    }
}

#[derive(Default)]
pub struct ContactBook(pub HashMap<String, String>);

impl ContactLookup for ContactBook {
    fn display_name(&self, contact_key: &str) -> Option<String> {
        self.0.get(contact_key).cloned()
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<(i64, ReportType)>>,
    pub stops: AtomicUsize,
}

impl RecordingPublisher {
    pub fn timestamps(&self) -> Vec<i64> {
        self.published.lock().unwrap().iter().map(|(ts, _)| *ts).collect()
    }
}

impl Publisher for RecordingPublisher {
    fn on_location(&self, fix: &Fix, report_type: ReportType) {
        self.published
            .lock()
            .unwrap()
            .push((fix.timestamp_ms, report_type));
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingScheduler {
    pub pings: AtomicUsize,
    pub cancels: AtomicUsize,
}

impl Scheduler for RecordingScheduler {
    fn schedule_location_ping(&self) {
        self.pings.fetch_add(1, Ordering::SeqCst);
    }

    fn cancel_all(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// All mocks, kept around for assertions after they are handed to a coordinator
pub struct Harness {
    pub provider: Arc<RecordingProvider>,
    pub permissions: Arc<SwitchPermissions>,
    pub preferences: Arc<MemoryPreferenceStore>,
    pub presenter: Arc<RecordingPresenter>,
    pub geocoder: Arc<RecordingGeocoder>,
    pub publisher: Arc<RecordingPublisher>,
    pub scheduler: Arc<RecordingScheduler>,
    pub contacts: HashMap<String, String>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_preferences(Preferences::default())
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            provider: Arc::new(RecordingProvider::default()),
            permissions: Arc::new(SwitchPermissions(AtomicBool::new(true))),
            preferences: Arc::new(MemoryPreferenceStore::new(preferences)),
            presenter: Arc::new(RecordingPresenter::default()),
            geocoder: Arc::new(RecordingGeocoder::default()),
            publisher: Arc::new(RecordingPublisher::default()),
            scheduler: Arc::new(RecordingScheduler::default()),
            contacts: HashMap::new(),
        }
    }

    pub fn contact(mut self, key: &str, name: &str) -> Self {
        self.contacts.insert(key.to_string(), name.to_string());
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            provider: Some(self.provider.clone() as Arc<dyn LocationProvider>),
            permissions: self.permissions.clone(),
            preferences: self.preferences.clone(),
            presenter: self.presenter.clone(),
            geocoder: self.geocoder.clone(),
            contacts: Arc::new(ContactBook(self.contacts.clone())),
            publisher: self.publisher.clone(),
            scheduler: self.scheduler.clone(),
        }
    }

    pub fn coordinator(&self) -> Coordinator {
        self.coordinator_with(ServiceConfig::default())
    }

    pub fn coordinator_with(&self, config: ServiceConfig) -> Coordinator {
        Coordinator::new(config, self.collaborators())
    }
}

pub fn fix(timestamp_ms: i64) -> Fix {
    Fix {
        timestamp_ms,
        latitude: 52.1,
        longitude: 0.5,
        accuracy: 20.0,
        bearing: None,
    }
}
