//! Console collaborators used by `waypost run`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use waypost_core::{Fix, LocationRequest, ReportType, RequestChannel};
use waypost_notify::{Advisory, EventSummary, OngoingNotification, PendingTransition, Presenter};
use waypost_service::{
    ContactLookup, Geocoder, LocationProvider, Message, Permissions, Publisher, Scheduler,
    WeakCoordinatorHandle,
};
use waypost_store::{append_jsonl, ReportRecord};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn emit(kind: &str, payload: serde_json::Value) {
    println!("{}", serde_json::json!({ "kind": kind, "payload": payload }));
}

/// Provider whose fixes come from the script. Records the requests it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    last: Mutex<Option<Fix>>,
    requests: AtomicUsize,
}

impl ScriptedProvider {
    pub fn set_last(&self, fix: Fix) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(fix);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl LocationProvider for ScriptedProvider {
    fn request_updates(&self, request: &LocationRequest, channel: RequestChannel) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        emit(
            "request",
            serde_json::json!({ "channel": format!("{channel:?}"), "request": request.to_string() }),
        );
    }

    fn remove_updates(&self, channel: RequestChannel) {
        emit("remove", serde_json::json!({ "channel": format!("{channel:?}") }));
    }

    fn flush_locations(&self) {
        tracing::debug!("flush requested");
    }

    fn last_location(&self) -> Option<Fix> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

pub struct ScriptedPermissions(AtomicBool);

impl ScriptedPermissions {
    pub fn new(granted: bool) -> Self {
        Self(AtomicBool::new(granted))
    }

    pub fn set(&self, granted: bool) {
        self.0.store(granted, Ordering::SeqCst);
    }
}

impl Permissions for ScriptedPermissions {
    fn location_granted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Labels a fix with its rounded coordinates and posts the result back
pub struct CoordinateGeocoder {
    handle: WeakCoordinatorHandle,
}

impl CoordinateGeocoder {
    pub fn new(handle: WeakCoordinatorHandle) -> Self {
        Self { handle }
    }
}

pub fn coordinate_label(fix: &Fix) -> String {
    format!("{:.4}, {:.4}", fix.latitude, fix.longitude)
}

impl Geocoder for CoordinateGeocoder {
    fn resolve(&self, fix: &Fix) {
        let message = Message::GeocodeResolved {
            timestamp_ms: fix.timestamp_ms,
            label: coordinate_label(fix),
        };
        if self.handle.send(message).is_err() {
            tracing::debug!("coordinator gone, geocode result dropped");
        }
    }
}

#[derive(Default)]
pub struct ContactBook {
    names: Mutex<HashMap<String, String>>,
}

impl ContactBook {
    pub fn insert(&self, key: String, name: String) {
        self.names
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, name);
    }
}

impl ContactLookup for ContactBook {
    fn display_name(&self, contact_key: &str) -> Option<String> {
        self.names
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(contact_key)
            .cloned()
    }
}

/// Prints admitted fixes and optionally appends them to the report log
pub struct ReportLog {
    path: Option<PathBuf>,
    published: AtomicUsize,
}

impl ReportLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            published: AtomicUsize::new(0),
        }
    }

    pub fn published(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

impl Publisher for ReportLog {
    fn on_location(&self, fix: &Fix, report_type: ReportType) {
        self.published.fetch_add(1, Ordering::SeqCst);
        let record = ReportRecord::new(fix.clone(), report_type);
        if let Some(path) = &self.path {
            if let Err(e) = append_jsonl(path, &record) {
                tracing::warn!(path = %path.display(), error = %e, "could not append report");
            }
        }
        emit("publish", serde_json::json!(record));
    }

    fn stop(&self) {
        emit(
            "publisher-stopped",
            serde_json::json!({ "published": self.published() }),
        );
    }
}

/// Announces the background ping lifecycle on stdout
#[derive(Default)]
pub struct ConsoleScheduler {
    armed: AtomicBool,
}

impl ConsoleScheduler {
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

impl Scheduler for ConsoleScheduler {
    fn schedule_location_ping(&self) {
        self.armed.store(true, Ordering::SeqCst);
        emit("schedule-ping", serde_json::Value::Null);
    }

    fn cancel_all(&self) {
        self.armed.store(false, Ordering::SeqCst);
        emit("cancel-tasks", serde_json::Value::Null);
    }
}

/// Writes every presentation request to stdout as a JSON line
pub struct ConsolePresenter {
    grouping: bool,
    emphasize: bool,
}

impl ConsolePresenter {
    pub fn new(grouping: bool, emphasize: bool) -> Self {
        Self {
            grouping,
            emphasize,
        }
    }

    fn render_line(&self, entry: &PendingTransition) -> String {
        let line = entry.line();
        if !self.emphasize {
            return line;
        }
        let (head, rest) = line.split_at(entry.emphasis_len().min(line.len()));
        format!("{BOLD}{head}{RESET}{rest}")
    }
}

impl Presenter for ConsolePresenter {
    fn show_ongoing(&self, notification: &OngoingNotification) {
        emit("ongoing", serde_json::json!(notification));
    }

    fn show_event_summary(&self, summary: &EventSummary) {
        if !self.grouping {
            // Without grouping support only the newest event is shown
            emit(
                "event",
                serde_json::json!({
                    "id": summary.latest.id,
                    "title": summary.latest.title,
                    "text": summary.latest.body,
                    "when": summary.latest.timestamp_ms,
                }),
            );
            return;
        }

        let lines: Vec<String> = summary.entries.iter().map(|e| self.render_line(e)).collect();
        emit(
            "events",
            serde_json::json!({
                "title": summary.title,
                "text": summary.text,
                "count": summary.group_count,
                "lines": lines,
            }),
        );
    }

    fn show_advisory(&self, advisory: &Advisory) {
        emit("advisory", serde_json::json!(advisory));
    }

    fn cancel_advisory(&self) {
        emit("advisory-cancel", serde_json::Value::Null);
    }

    fn clear_event_group(&self) {
        emit("events-cleared", serde_json::Value::Null);
    }
}
