//! Preferences and service configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::PreferenceError;
use crate::types::MonitoringMode;

/// Identity of a single user setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    Monitoring,
    LocatorInterval,
    LocatorDisplacement,
    LocatorPriority,
    MoveModeLocatorInterval,
    NotificationLocation,
    NotificationEvents,
    NotificationHigherPriority,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 8] = [
        PreferenceKey::Monitoring,
        PreferenceKey::LocatorInterval,
        PreferenceKey::LocatorDisplacement,
        PreferenceKey::LocatorPriority,
        PreferenceKey::MoveModeLocatorInterval,
        PreferenceKey::NotificationLocation,
        PreferenceKey::NotificationEvents,
        PreferenceKey::NotificationHigherPriority,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PreferenceKey::Monitoring => "monitoring",
            PreferenceKey::LocatorInterval => "locatorInterval",
            PreferenceKey::LocatorDisplacement => "locatorDisplacement",
            PreferenceKey::LocatorPriority => "locatorPriority",
            PreferenceKey::MoveModeLocatorInterval => "moveModeLocatorInterval",
            PreferenceKey::NotificationLocation => "notificationLocation",
            PreferenceKey::NotificationEvents => "notificationEvents",
            PreferenceKey::NotificationHigherPriority => "notificationHigherPriority",
        }
    }

    /// Settings that shape the standing location request
    pub fn is_locator(self) -> bool {
        matches!(
            self,
            PreferenceKey::LocatorInterval
                | PreferenceKey::LocatorDisplacement
                | PreferenceKey::LocatorPriority
                | PreferenceKey::MoveModeLocatorInterval
        )
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreferenceKey {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PreferenceError::UnknownKey(s.to_string()))
    }
}

/// Locator tunables consumed by the monitoring policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorTunables {
    /// Seconds between updates in quiet/manual/significant modes
    pub interval_secs: u64,
    /// Meters
    pub displacement_m: f32,
    /// Priority ordinal 0..=3, see `PowerTier::from_priority`
    pub priority: i32,
    /// Seconds between updates in move mode
    pub move_interval_secs: u64,
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub monitoring: MonitoringMode,
    pub locator_interval: u64,
    pub locator_displacement: f32,
    pub locator_priority: i32,
    pub move_mode_locator_interval: u64,
    pub notification_location: bool,
    pub notification_events: bool,
    pub notification_higher_priority: bool,
}

impl Preferences {
    pub fn new() -> Self {
        Self {
            monitoring: MonitoringMode::Significant,
            locator_interval: 60,
            locator_displacement: 500.0,
            locator_priority: 2,
            move_mode_locator_interval: 10,
            notification_location: true,
            notification_events: true,
            notification_higher_priority: false,
        }
    }

    pub fn tunables(&self) -> LocatorTunables {
        LocatorTunables {
            interval_secs: self.locator_interval,
            displacement_m: self.locator_displacement,
            priority: self.locator_priority,
            move_interval_secs: self.move_mode_locator_interval,
        }
    }

    /// Parse `raw` and store it under `key`
    pub fn apply(&mut self, key: PreferenceKey, raw: &str) -> Result<(), PreferenceError> {
        let raw = raw.trim();
        match key {
            PreferenceKey::Monitoring => self.monitoring = raw.parse()?,
            PreferenceKey::LocatorInterval => self.locator_interval = parse_value(key, raw)?,
            PreferenceKey::LocatorDisplacement => {
                let meters: f32 = parse_value(key, raw)?;
                if !meters.is_finite() || meters < 0.0 {
                    return Err(invalid(key, "must be a non-negative number of meters"));
                }
                self.locator_displacement = meters;
            }
            PreferenceKey::LocatorPriority => self.locator_priority = parse_value(key, raw)?,
            PreferenceKey::MoveModeLocatorInterval => {
                self.move_mode_locator_interval = parse_value(key, raw)?
            }
            PreferenceKey::NotificationLocation => {
                self.notification_location = parse_value(key, raw)?
            }
            PreferenceKey::NotificationEvents => self.notification_events = parse_value(key, raw)?,
            PreferenceKey::NotificationHigherPriority => {
                self.notification_higher_priority = parse_value(key, raw)?
            }
        }
        Ok(())
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_value<T>(key: PreferenceKey, raw: &str) -> Result<T, PreferenceError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|e| invalid(key, &e.to_string()))
}

fn invalid(key: PreferenceKey, message: &str) -> PreferenceError {
    PreferenceError::InvalidValue {
        key: key.name().to_string(),
        message: message.to_string(),
    }
}

/// Coordinator configuration that is not user editable
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Delay before a scheduled reinitialize runs. Requests arriving meanwhile coalesce.
    pub reinitialize_delay: Duration,

    /// Max entries rendered in the event summary (the count is never capped)
    pub max_summary_lines: usize,

    /// Platform restricts background location for services not started from the foreground
    pub background_location_restricted: bool,

    /// Presentation layer can group event notifications
    pub notification_grouping: bool,

    /// Title used when no location is shown
    pub app_name: String,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self {
            reinitialize_delay: Duration::ZERO,
            max_summary_lines: 7,
            background_location_restricted: true,
            notification_grouping: true,
            app_name: "Waypost".to_string(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_defaults() {
        let prefs = Preferences::new();
        assert_eq!(prefs.monitoring, MonitoringMode::Significant);
        assert_eq!(prefs.locator_interval, 60);
        assert_eq!(prefs.locator_displacement, 500.0);
        assert_eq!(prefs.locator_priority, 2);
        assert_eq!(prefs.move_mode_locator_interval, 10);
        assert!(prefs.notification_location);
        assert!(prefs.notification_events);
        assert!(!prefs.notification_higher_priority);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"monitoring":"move"}"#).unwrap();
        assert_eq!(prefs.monitoring, MonitoringMode::Move);
        assert_eq!(prefs.locator_interval, 60);
    }

    #[test]
    fn test_apply_values() {
        let mut prefs = Preferences::new();
        prefs.apply(PreferenceKey::LocatorInterval, "30").unwrap();
        prefs.apply(PreferenceKey::LocatorDisplacement, "12.5").unwrap();
        prefs.apply(PreferenceKey::Monitoring, "quiet").unwrap();
        prefs.apply(PreferenceKey::NotificationEvents, "false").unwrap();

        assert_eq!(prefs.locator_interval, 30);
        assert_eq!(prefs.locator_displacement, 12.5);
        assert_eq!(prefs.monitoring, MonitoringMode::Quiet);
        assert!(!prefs.notification_events);
    }

    #[test]
    fn test_apply_rejects_garbage() {
        let mut prefs = Preferences::new();
        assert!(prefs.apply(PreferenceKey::LocatorInterval, "soon").is_err());
        assert!(prefs.apply(PreferenceKey::LocatorDisplacement, "-3").is_err());
        assert_eq!(prefs, Preferences::new());
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!(
            "locatorInterval".parse::<PreferenceKey>().unwrap(),
            PreferenceKey::LocatorInterval
        );
        assert_eq!(
            "MOVEMODELOCATORINTERVAL".parse::<PreferenceKey>().unwrap(),
            PreferenceKey::MoveModeLocatorInterval
        );
        assert!("colour".parse::<PreferenceKey>().is_err());
    }

    #[test]
    fn test_locator_keys() {
        let locator: Vec<_> = PreferenceKey::ALL
            .iter()
            .filter(|k| k.is_locator())
            .collect();
        assert_eq!(locator.len(), 4);
        assert!(!PreferenceKey::Monitoring.is_locator());
    }

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::new();
        assert_eq!(config.reinitialize_delay, Duration::ZERO);
        assert_eq!(config.max_summary_lines, 7);
        assert!(config.background_location_restricted);
    }
}
