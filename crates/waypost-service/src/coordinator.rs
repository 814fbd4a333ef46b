//! Coordination state machine
//!
//! Owns the admission watermark, the standing location request, the pending
//! transition events and the explicit-start flag. Every mutation goes through
//! `handle()`, so running it inside a single task serializes all of them.

use tracing::{debug, error, info, trace, warn};
use waypost_core::{
    compute_request, on_demand_request, Admission, AdmissionFilter, CoordinatorError, Fix,
    LocationRequest, MonitoringMode, PreferenceKey, PreferenceStore, ReportType,
    RequestChannel, ServiceConfig, TransitionMessage,
};
use waypost_notify::dateformat::format_local;
use waypost_notify::{Advisory, EventStack, OngoingStatus, TransitionText};

use crate::collaborators::Collaborators;
use crate::messages::{Command, Directive, Intent, Message};

/// Why a reconfiguration was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconfigureReason {
    Startup,
    MonitoringChanged,
    ModeChanged,
    PreferenceEdited(PreferenceKey),
    Rerequested,
    Reinitialize,
}

/// The single active standing request
#[derive(Debug, Clone, PartialEq)]
pub struct StandingRequest {
    /// Increments every time a request is issued
    pub id: u64,
    pub request: LocationRequest,
}

pub struct Coordinator {
    config: ServiceConfig,
    collaborators: Collaborators,
    filter: AdmissionFilter,
    standing: Option<StandingRequest>,
    issued: u64,
    events: EventStack,
    ongoing: OngoingStatus,
    started_explicitly: bool,
    advisory_shown: bool,
    stopped: bool,
}

impl Coordinator {
    pub fn new(config: ServiceConfig, collaborators: Collaborators) -> Self {
        let events = EventStack::new(config.max_summary_lines);
        Self {
            config,
            collaborators,
            filter: AdmissionFilter::new(),
            standing: None,
            issued: 0,
            events,
            ongoing: OngoingStatus::new(),
            started_explicitly: false,
            advisory_shown: false,
            stopped: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn watermark(&self) -> Option<i64> {
        self.filter.watermark()
    }

    pub fn standing(&self) -> Option<&StandingRequest> {
        self.standing.as_ref()
    }

    pub fn events(&self) -> &EventStack {
        &self.events
    }

    pub fn ongoing(&self) -> &OngoingStatus {
        &self.ongoing
    }

    pub fn started_explicitly(&self) -> bool {
        self.started_explicitly
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn preferences(&self) -> &dyn PreferenceStore {
        self.collaborators.preferences.as_ref()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Show the ongoing status, arm the location ping and issue the initial
    /// standing request
    pub fn start(&mut self) {
        info!("coordinator starting");
        self.update_ongoing();
        self.collaborators.scheduler.schedule_location_ping();
        self.reconfigure(ReconfigureReason::Startup);
    }

    /// Cancel scheduled tasks, stop the standing subscription and the
    /// publisher. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        self.collaborators.scheduler.cancel_all();
        if self.standing.take().is_some() {
            if let Some(provider) = &self.collaborators.provider {
                provider.remove_updates(RequestChannel::Standing);
            }
        }
        self.collaborators.publisher.stop();
        info!(
            admitted = self.filter.admitted_count(),
            rejected = self.filter.rejected_count(),
            "coordinator stopped"
        );
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    pub fn handle(&mut self, message: Message) -> Directive {
        if self.stopped {
            debug!(?message, "coordinator stopped, dropping message");
            return Directive::Exit;
        }

        match message {
            Message::Intent(intent) => return self.on_intent(intent),
            Message::Command(command) => return self.on_command(command),
            Message::FixReceived { fix, channel } => {
                self.on_fix(fix, channel);
            }
            Message::AvailabilityChanged { available } => {
                debug!(available, "location availability changed");
            }
            Message::PreferenceChanged(key) => self.on_preference_changed(key),
            Message::ModeChanged => {
                self.reconfigure(ReconfigureReason::ModeChanged);
                self.update_ongoing();
            }
            Message::TransitionReceived(transition) => self.on_transition(&transition),
            Message::QueueLengthChanged(length) => {
                self.ongoing.set_queue_length(length);
                self.update_ongoing();
            }
            Message::EndpointStateChanged(state) => {
                self.ongoing.set_endpoint_state(state);
                self.update_ongoing();
            }
            Message::GeocodeResolved {
                timestamp_ms,
                label,
            } => {
                if self.ongoing.resolve_label(timestamp_ms, label) {
                    self.update_ongoing();
                } else {
                    trace!(timestamp_ms, "geocode result for a superseded fix");
                }
            }
            Message::ReinitializeLocationRequests => return Directive::ScheduleReinitialize,
            Message::ReinitializeDue => self.reinitialize(),
        }
        Directive::Continue
    }

    fn on_intent(&mut self, intent: Intent) -> Directive {
        let Some(action) = intent.action.as_deref() else {
            debug!("explicit start");
            self.started_explicitly = true;
            return Directive::Continue;
        };

        match Command::from_action(action) {
            Ok(Command::ChangeMonitoring(_)) => {
                let target = match intent.monitoring {
                    Some(value) => match MonitoringMode::from_value(value) {
                        Some(mode) => Some(mode),
                        None => {
                            warn!(value, "invalid monitoring value, keeping current mode");
                            Some(self.collaborators.preferences.monitoring())
                        }
                    },
                    None => None,
                };
                self.on_command(Command::ChangeMonitoring(target))
            }
            Ok(command) => self.on_command(command),
            Err(e) => {
                warn!(error = %e, "ignoring intent");
                Directive::Continue
            }
        }
    }

    fn on_command(&mut self, command: Command) -> Directive {
        debug!(?command, "command received");
        match command {
            Command::PublishNow => {
                self.request_on_demand(ReportType::User);
            }
            Command::ReportLocation => {
                self.request_on_demand(ReportType::Response);
            }
            Command::ClearEventNotifications => self.clear_events(),
            Command::RerequestLocationUpdates => {
                self.reconfigure(ReconfigureReason::Rerequested);
            }
            Command::ChangeMonitoring(target) => self.change_monitoring(target),
            Command::BootOrPackageRefreshed => self.on_boot(),
            Command::Exit => {
                info!("exit requested");
                self.shutdown();
                return Directive::Exit;
            }
        }
        Directive::Continue
    }

    // ── Location requests ────────────────────────────────────────────

    /// Recompute and issue the standing request. Returns whether a request was issued.
    pub fn reconfigure(&mut self, reason: ReconfigureReason) -> bool {
        if self.stopped {
            return false;
        }
        match self.try_reconfigure(reason) {
            Ok(issued) => issued,
            Err(e) => {
                error!(?reason, error = %e, "location request not issued");
                false
            }
        }
    }

    fn try_reconfigure(&mut self, reason: ReconfigureReason) -> Result<bool, CoordinatorError> {
        if !self.collaborators.permissions.location_granted() {
            return Err(CoordinatorError::PermissionDenied);
        }
        let provider = self
            .collaborators
            .provider
            .clone()
            .ok_or(CoordinatorError::ProviderUnavailable)?;

        let preferences = self.collaborators.preferences.preferences();
        let request = compute_request(preferences.monitoring, &preferences.tunables());

        // Preference edits that do not change the descriptor are debounced
        if matches!(reason, ReconfigureReason::PreferenceEdited(_))
            && self.standing.as_ref().is_some_and(|s| s.request == request)
        {
            debug!(?reason, "location request unchanged");
            return Ok(false);
        }

        provider.flush_locations();
        provider.request_updates(&request, RequestChannel::Standing);

        self.issued += 1;
        info!(?reason, id = self.issued, mode = ?preferences.monitoring, %request, "location request issued");
        self.standing = Some(StandingRequest {
            id: self.issued,
            request,
        });
        Ok(true)
    }

    /// Issue a single-shot request next to the standing one
    pub fn request_on_demand(&mut self, report_type: ReportType) -> bool {
        if !self.collaborators.permissions.location_granted() {
            error!(error = %CoordinatorError::PermissionDenied, "on-demand request not issued");
            return false;
        }
        let Some(provider) = &self.collaborators.provider else {
            error!(error = %CoordinatorError::ProviderUnavailable, "on-demand request not issued");
            return false;
        };

        debug!(?report_type, "on-demand location request");
        provider.request_updates(&on_demand_request(), RequestChannel::OnDemand(report_type));
        true
    }

    fn reinitialize(&mut self) {
        if !self.reconfigure(ReconfigureReason::Reinitialize) {
            return;
        }
        let last = self
            .collaborators
            .provider
            .as_ref()
            .and_then(|provider| provider.last_location());
        match last {
            Some(fix) => {
                debug!(timestamp_ms = fix.timestamp_ms, "replaying last known location");
                self.on_fix(fix, RequestChannel::Standing);
            }
            None => debug!("no last known location"),
        }
    }

    fn on_preference_changed(&mut self, key: PreferenceKey) {
        match key {
            PreferenceKey::Monitoring => {
                self.reconfigure(ReconfigureReason::MonitoringChanged);
                self.update_ongoing();
            }
            key if key.is_locator() => {
                debug!(key = %key, "locator preference changed");
                self.reconfigure(ReconfigureReason::PreferenceEdited(key));
            }
            PreferenceKey::NotificationLocation | PreferenceKey::NotificationHigherPriority => {
                self.update_ongoing();
            }
            _ => {}
        }
    }

    fn change_monitoring(&mut self, target: Option<MonitoringMode>) {
        let preferences = &self.collaborators.preferences;
        let result = match target {
            Some(mode) => preferences.set_monitoring(mode).map(|_| mode),
            None => preferences.set_monitoring_next(),
        };
        match result {
            Ok(mode) => info!(mode = %mode, "monitoring mode set"),
            Err(e) => error!(error = %e, "could not store monitoring mode"),
        }

        self.started_explicitly = true;
        self.collaborators.presenter.cancel_advisory();
    }

    // ── Fixes ────────────────────────────────────────────────────────

    /// Run `fix` through admission and forward it when admitted
    pub fn on_fix(&mut self, fix: Fix, channel: RequestChannel) -> Admission {
        trace!(
            timestamp_ms = fix.timestamp_ms,
            accuracy = fix.accuracy,
            latitude = fix.latitude,
            longitude = fix.longitude,
            ?channel,
            "location received"
        );

        let admission = self.filter.admit(&fix);
        match admission {
            Admission::Admitted => {
                self.collaborators
                    .publisher
                    .on_location(&fix, channel.report_type());
                if self.ongoing.track_fix(&fix) {
                    self.collaborators.geocoder.resolve(&fix);
                }
            }
            Admission::StaleOrDuplicate { watermark } => {
                let reason = CoordinatorError::StaleOrDuplicateFix {
                    timestamp: fix.timestamp_ms,
                    watermark,
                };
                trace!(%reason, "dropping location");
            }
        }
        admission
    }

    // ── Notifications ────────────────────────────────────────────────

    fn update_ongoing(&self) {
        let preferences = self.collaborators.preferences.preferences();
        let notification = self.ongoing.render(&preferences, &self.config.app_name);
        self.collaborators.presenter.show_ongoing(&notification);
    }

    fn on_transition(&mut self, transition: &TransitionMessage) {
        debug!(
            incoming = transition.incoming,
            topic = transition.topic.as_deref().unwrap_or(""),
            "transition received"
        );
        if !transition.incoming {
            return;
        }
        if !self.collaborators.preferences.preferences().notification_events {
            error!(error = %CoordinatorError::MissingPresentationBuilder("events"), "transition not presented");
            return;
        }

        let name = self
            .collaborators
            .contacts
            .display_name(&transition.contact_key);
        let text = TransitionText::from_message(transition, name.as_deref());
        let header = format_local(text.timestamp_ms);
        let summary = self.events.push(text, header);
        debug!(pending = summary.group_count, "event summary updated");
        self.collaborators.presenter.show_event_summary(&summary);
    }

    /// Empty the pending transition list
    pub fn clear_events(&mut self) {
        let removed = self.events.clear();
        debug!(removed, "event notifications cleared");
        self.collaborators.presenter.clear_event_group();
    }

    fn on_boot(&mut self) {
        if self.started_explicitly || !self.config.background_location_restricted {
            return;
        }
        if self.advisory_shown {
            debug!("background restriction advisory already shown");
            return;
        }
        info!("started in background, showing restriction advisory");
        self.collaborators
            .presenter
            .show_advisory(&Advisory::background_restriction());
        self.advisory_shown = true;
    }
}
