//! Core types for location monitoring

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::PreferenceError;

/// User-selected power/accuracy preset for the standing location request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringMode {
    /// Only report on explicit request, lowest power
    Quiet,
    /// Like quiet, but region transitions are still reported
    Manual,
    /// Report significant location changes
    Significant,
    /// Continuous high accuracy tracking
    Move,
}

impl MonitoringMode {
    /// Stepping order used by `next()`
    pub const ALL: [MonitoringMode; 4] = [
        MonitoringMode::Quiet,
        MonitoringMode::Manual,
        MonitoringMode::Significant,
        MonitoringMode::Move,
    ];

    /// Map a persisted/intent integer value to a mode
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            -1 => Some(MonitoringMode::Quiet),
            0 => Some(MonitoringMode::Manual),
            1 => Some(MonitoringMode::Significant),
            2 => Some(MonitoringMode::Move),
            _ => None,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            MonitoringMode::Quiet => -1,
            MonitoringMode::Manual => 0,
            MonitoringMode::Significant => 1,
            MonitoringMode::Move => 2,
        }
    }

    /// Next mode in the cycle Quiet -> Manual -> Significant -> Move -> Quiet
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Human readable label shown in the ongoing status
    pub fn label(self) -> &'static str {
        match self {
            MonitoringMode::Quiet => "Quiet",
            MonitoringMode::Manual => "Manual",
            MonitoringMode::Significant => "Significant changes",
            MonitoringMode::Move => "Move",
        }
    }
}

impl fmt::Display for MonitoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MonitoringMode {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i32>() {
            return Self::from_value(value).ok_or_else(|| PreferenceError::InvalidValue {
                key: "monitoring".to_string(),
                message: format!("unknown monitoring value {}", value),
            });
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "quiet" => Ok(MonitoringMode::Quiet),
            "manual" => Ok(MonitoringMode::Manual),
            "significant" => Ok(MonitoringMode::Significant),
            "move" => Ok(MonitoringMode::Move),
            other => Err(PreferenceError::InvalidValue {
                key: "monitoring".to_string(),
                message: format!("unknown monitoring mode '{}'", other),
            }),
        }
    }
}

/// Power/accuracy tier requested from the location provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerTier {
    NoPower,
    LowPower,
    Balanced,
    HighAccuracy,
}

impl PowerTier {
    /// Resolve the user-selected priority ordinal. Unknown ordinals fall back to `Balanced`.
    pub fn from_priority(ordinal: i32) -> Self {
        match ordinal {
            0 => PowerTier::NoPower,
            1 => PowerTier::LowPower,
            3 => PowerTier::HighAccuracy,
            _ => PowerTier::Balanced,
        }
    }
}

/// Location request descriptor handed to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    /// Desired update interval in milliseconds (0 = provider decides)
    pub interval_ms: u64,
    /// Smallest displacement in meters, `None` lets the provider decide
    pub min_displacement_m: Option<f32>,
    pub power: PowerTier,
    pub num_updates: Option<u32>,
    pub expiry: Option<Duration>,
}

impl fmt::Display for LocationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interval={}ms power={:?}", self.interval_ms, self.power)?;
        if let Some(displacement) = self.min_displacement_m {
            write!(f, " displacement={}m", displacement)?;
        }
        if let Some(n) = self.num_updates {
            write!(f, " updates={}", n)?;
        }
        if let Some(expiry) = self.expiry {
            write!(f, " expiry={}s", expiry.as_secs())?;
        }
        Ok(())
    }
}

/// One location sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    /// Epoch milliseconds
    pub timestamp_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy: f32,
    #[serde(default)]
    pub bearing: Option<f32>,
}

/// Report type attached to an admitted fix when forwarded for publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Produced by the standing subscription
    Default,
    /// Answer to a remote "report your location" command
    Response,
    /// User asked to publish now
    User,
}

/// Which subscription delivered a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestChannel {
    Standing,
    OnDemand(ReportType),
}

impl RequestChannel {
    pub fn report_type(self) -> ReportType {
        match self {
            RequestChannel::Standing => ReportType::Default,
            RequestChannel::OnDemand(report_type) => report_type,
        }
    }
}

/// Geofence transition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Enter,
    Exit,
}

impl Transition {
    pub fn verb(self) -> &'static str {
        match self {
            Transition::Enter => "entering",
            Transition::Exit => "leaving",
        }
    }
}

/// A geofence transition message received from (or sent by) a tracked contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionMessage {
    pub contact_key: String,
    #[serde(default)]
    pub tracker_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub transition: Transition,
    /// Epoch seconds
    pub timestamp: i64,
    /// False for transitions this device published itself
    #[serde(default = "default_incoming")]
    pub incoming: bool,
    #[serde(default)]
    pub topic: Option<String>,
}

fn default_incoming() -> bool {
    true
}

/// Connectivity state of the publishing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "message")]
pub enum EndpointState {
    Initial,
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Error(Option<String>),
}

impl EndpointState {
    pub fn label(&self) -> &'static str {
        match self {
            EndpointState::Initial => "Initial",
            EndpointState::Idle => "Idle",
            EndpointState::Connecting => "Connecting",
            EndpointState::Connected => "Connected",
            EndpointState::Disconnected => "Disconnected",
            EndpointState::Error(_) => "Error",
        }
    }
}
