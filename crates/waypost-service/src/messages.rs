//! Inbound messages, commands and loop directives

use waypost_core::{
    CoordinatorError, EndpointState, Fix, MonitoringMode, PreferenceKey, RequestChannel,
    TransitionMessage,
};

/// Discrete commands from the command surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// User asked to publish the current location
    PublishNow,
    /// Remote request to report the current location
    ReportLocation,
    ClearEventNotifications,
    RerequestLocationUpdates,
    /// Set the given mode, or step to the next one
    ChangeMonitoring(Option<MonitoringMode>),
    Exit,
    BootOrPackageRefreshed,
}

impl Command {
    /// Parse an action identifier
    pub fn from_action(action: &str) -> Result<Self, CoordinatorError> {
        match action {
            "publish-now" => Ok(Command::PublishNow),
            "report-location" => Ok(Command::ReportLocation),
            "clear-events" => Ok(Command::ClearEventNotifications),
            "rerequest-location-updates" => Ok(Command::RerequestLocationUpdates),
            "change-monitoring" => Ok(Command::ChangeMonitoring(None)),
            "exit" => Ok(Command::Exit),
            "boot-completed" | "package-replaced" => Ok(Command::BootOrPackageRefreshed),
            other => Err(CoordinatorError::UnknownCommand(other.to_string())),
        }
    }
}

/// Raw request from the command surface.
///
/// An intent without action means the process was started explicitly from the foreground.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub action: Option<String>,
    /// Monitoring mode value for `change-monitoring`
    pub monitoring: Option<i32>,
}

impl Intent {
    pub fn action(action: &str) -> Self {
        Self {
            action: Some(action.to_string()),
            monitoring: None,
        }
    }

    pub fn explicit_start() -> Self {
        Self::default()
    }
}

/// Everything the coordination actor reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Intent(Intent),
    Command(Command),
    FixReceived { fix: Fix, channel: RequestChannel },
    /// Informational only
    AvailabilityChanged { available: bool },
    PreferenceChanged(PreferenceKey),
    /// Endpoint/connection mode switched
    ModeChanged,
    TransitionReceived(TransitionMessage),
    QueueLengthChanged(usize),
    EndpointStateChanged(EndpointState),
    GeocodeResolved { timestamp_ms: i64, label: String },
    /// Schedule a deferred reconfiguration followed by a last-known-fix update
    ReinitializeLocationRequests,
    /// The deferred reconfiguration is due. The runtime raises this from its
    /// own timer; a copy sent through a handle reinitializes at once and
    /// leaves any pending timer alone.
    ReinitializeDue,
}

/// What the run loop should do after a message was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    ScheduleReinitialize,
    Exit,
}
