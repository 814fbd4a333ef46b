use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use waypost_core::{
    EndpointState, Fix, MemoryPreferenceStore, PreferenceKey, PreferenceStore, ReportType,
    RequestChannel, ServiceConfig, TransitionMessage,
};
use waypost_service::{
    mailbox, spawn, Collaborators, Command, Coordinator, Intent, LocationProvider, Message,
};
use waypost_store::{FilePreferenceStore, Paths};

use super::sim::{
    ConsolePresenter, ConsoleScheduler, ContactBook, CoordinateGeocoder, ReportLog,
    ScriptedPermissions, ScriptedProvider,
};

/// Which request a scripted fix answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptChannel {
    #[default]
    Standing,
    User,
    Response,
}

impl From<ScriptChannel> for RequestChannel {
    fn from(channel: ScriptChannel) -> Self {
        match channel {
            ScriptChannel::Standing => RequestChannel::Standing,
            ScriptChannel::User => RequestChannel::OnDemand(ReportType::User),
            ScriptChannel::Response => RequestChannel::OnDemand(ReportType::Response),
        }
    }
}

/// One line of a run script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ScriptEvent {
    Fix {
        timestamp_ms: i64,
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        accuracy: f32,
        #[serde(default)]
        channel: ScriptChannel,
    },
    /// Provider's last known fix, replayed on reinitialize
    LastKnown {
        timestamp_ms: i64,
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        accuracy: f32,
    },
    Transition(TransitionMessage),
    Intent {
        #[serde(default)]
        action: Option<String>,
        #[serde(default)]
        monitoring: Option<i32>,
    },
    Queue {
        length: usize,
    },
    Endpoint(EndpointState),
    Preference {
        key: String,
        value: String,
    },
    Contact {
        key: String,
        name: String,
    },
    Permission {
        granted: bool,
    },
    Availability {
        available: bool,
    },
    ModeChanged,
    Reinitialize,
    Sleep {
        ms: u64,
    },
}

/// Parse a JSON-lines script. Blank lines and `#` comments are skipped.
pub fn parse_script(contents: &str) -> anyhow::Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(event) => events.push(event),
            Err(e) => anyhow::bail!("script line {}: {}", index + 1, e),
        }
    }
    Ok(events)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub events: usize,
    pub watermark: Option<i64>,
    pub standing_request_id: Option<u64>,
    pub provider_requests: usize,
    pub published: usize,
    pub pending_events: usize,
    pub started_explicitly: bool,
    pub ping_armed: bool,
}

pub fn run(script: &Path, report_log: bool) -> anyhow::Result<()> {
    let events = parse_script(&std::fs::read_to_string(script)?)?;

    let paths = Paths::new()?;
    // Scripted runs never write back to stored preferences
    let stored = FilePreferenceStore::open(paths.preferences_file())?;
    let preferences = Arc::new(MemoryPreferenceStore::new(stored.preferences()));
    let report_path = report_log.then(|| paths.reports_file());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let summary = runtime.block_on(drive(
        events,
        ServiceConfig::default(),
        preferences,
        report_path,
    ))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Feed `events` to a freshly spawned coordinator, then shut it down
pub async fn drive(
    events: Vec<ScriptEvent>,
    config: ServiceConfig,
    preferences: Arc<MemoryPreferenceStore>,
    report_path: Option<PathBuf>,
) -> anyhow::Result<RunSummary> {
    let (handle, inbox) = mailbox();

    let provider = Arc::new(ScriptedProvider::default());
    let permissions = Arc::new(ScriptedPermissions::new(true));
    let contacts = Arc::new(ContactBook::default());
    let publisher = Arc::new(ReportLog::new(report_path));
    let scheduler = Arc::new(ConsoleScheduler::default());
    let presenter = Arc::new(ConsolePresenter::new(
        config.notification_grouping,
        std::io::stdout().is_terminal(),
    ));

    let collaborators = Collaborators {
        provider: Some(provider.clone() as Arc<dyn LocationProvider>),
        permissions: permissions.clone(),
        preferences: preferences.clone(),
        presenter,
        geocoder: Arc::new(CoordinateGeocoder::new(handle.downgrade())),
        contacts: contacts.clone(),
        publisher: publisher.clone(),
        scheduler: scheduler.clone(),
    };
    let task = spawn(Coordinator::new(config, collaborators), inbox);

    let total = events.len();
    for event in events {
        tracing::debug!(?event, "script event");
        match event {
            ScriptEvent::Fix {
                timestamp_ms,
                latitude,
                longitude,
                accuracy,
                channel,
            } => handle.send(Message::FixReceived {
                fix: fix(timestamp_ms, latitude, longitude, accuracy),
                channel: channel.into(),
            })?,
            ScriptEvent::LastKnown {
                timestamp_ms,
                latitude,
                longitude,
                accuracy,
            } => provider.set_last(fix(timestamp_ms, latitude, longitude, accuracy)),
            ScriptEvent::Transition(message) => {
                handle.send(Message::TransitionReceived(message))?
            }
            ScriptEvent::Intent { action, monitoring } => {
                handle.intent(Intent { action, monitoring })?
            }
            ScriptEvent::Queue { length } => handle.send(Message::QueueLengthChanged(length))?,
            ScriptEvent::Endpoint(state) => handle.send(Message::EndpointStateChanged(state))?,
            ScriptEvent::Preference { key, value } => {
                let key: PreferenceKey = key.parse()?;
                preferences.set(key, &value)?;
            }
            ScriptEvent::Contact { key, name } => contacts.insert(key, name),
            ScriptEvent::Permission { granted } => {
                permissions.set(granted);
                if granted {
                    handle.command(Command::RerequestLocationUpdates)?;
                }
            }
            ScriptEvent::Availability { available } => {
                handle.send(Message::AvailabilityChanged { available })?
            }
            ScriptEvent::ModeChanged => handle.send(Message::ModeChanged)?,
            ScriptEvent::Reinitialize => handle.send(Message::ReinitializeLocationRequests)?,
            ScriptEvent::Sleep { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
        tokio::task::yield_now().await;
    }

    // An exit from the script already closed the mailbox
    let _ = handle.command(Command::Exit);
    drop(handle);
    let coordinator = task.await?;

    Ok(RunSummary {
        events: total,
        watermark: coordinator.watermark(),
        standing_request_id: coordinator.standing().map(|s| s.id),
        provider_requests: provider.request_count(),
        published: publisher.published(),
        pending_events: coordinator.events().len(),
        started_explicitly: coordinator.started_explicitly(),
        ping_armed: scheduler.is_armed(),
    })
}

fn fix(timestamp_ms: i64, latitude: f64, longitude: f64, accuracy: f32) -> Fix {
    Fix {
        timestamp_ms,
        latitude,
        longitude,
        accuracy,
        bearing: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_core::Preferences;

    #[test]
    fn test_parse_script_lines() {
        let script = r#"
# warm up
{"type":"intent"}
{"type":"fix","timestampMs":100,"latitude":52.1,"longitude":0.5,"channel":"user"}
{"type":"transition","contactKey":"owntracks/alice/phone","description":"Home","transition":"enter","timestamp":1136214245}
{"type":"endpoint","state":"error","message":"refused"}
{"type":"mode_changed"}
{"type":"sleep","ms":5}
"#;
        let events = parse_script(script).unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            ScriptEvent::Intent {
                action: None,
                monitoring: None
            }
        );
        assert!(matches!(
            events[1],
            ScriptEvent::Fix {
                timestamp_ms: 100,
                channel: ScriptChannel::User,
                ..
            }
        ));
        assert!(matches!(events[2], ScriptEvent::Transition(ref t) if t.incoming));
        assert_eq!(
            events[3],
            ScriptEvent::Endpoint(EndpointState::Error(Some("refused".to_string())))
        );
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("{\"type\":\"intent\"}\n{\"type\":\"warp\"}").unwrap_err();
        assert!(err.to_string().starts_with("script line 2"));
    }

    #[tokio::test]
    async fn test_drive_scripted_session() {
        let events = parse_script(
            r#"
{"type":"intent"}
{"type":"fix","timestampMs":100,"latitude":52.1,"longitude":0.5}
{"type":"fix","timestampMs":100,"latitude":52.1,"longitude":0.5}
{"type":"fix","timestampMs":250,"latitude":52.2,"longitude":0.5,"channel":"response"}
{"type":"contact","key":"owntracks/alice/phone","name":"Alice"}
{"type":"transition","contactKey":"owntracks/alice/phone","description":"Home","transition":"enter","timestamp":1136214245}
{"type":"transition","contactKey":"owntracks/bob/phone","transition":"exit","timestamp":1136214300}
{"type":"preference","key":"monitoring","value":"move"}
"#,
        )
        .unwrap();

        let preferences = Arc::new(MemoryPreferenceStore::new(Preferences::default()));
        let summary = drive(events, ServiceConfig::default(), preferences.clone(), None)
            .await
            .unwrap();

        assert_eq!(summary.events, 8);
        assert_eq!(summary.watermark, Some(250));
        assert_eq!(summary.published, 2);
        assert_eq!(summary.pending_events, 2);
        assert!(summary.started_explicitly);
        assert_eq!(summary.standing_request_id, None);
        assert_eq!(summary.provider_requests, 2);
        assert!(!summary.ping_armed, "exit cancels the ping");
        assert_eq!(preferences.monitoring(), waypost_core::MonitoringMode::Move);
    }

    #[tokio::test]
    async fn test_drive_reinitialize_replays_last_known() {
        let events = parse_script(
            r#"
{"type":"last_known","timestampMs":900,"latitude":1.0,"longitude":2.0}
{"type":"reinitialize"}
{"type":"sleep","ms":20}
"#,
        )
        .unwrap();

        let preferences = Arc::new(MemoryPreferenceStore::default());
        let summary = drive(events, ServiceConfig::default(), preferences, None)
            .await
            .unwrap();

        assert_eq!(summary.watermark, Some(900));
        assert_eq!(summary.published, 1);
    }
}
