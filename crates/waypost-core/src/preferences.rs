//! Preference store port and an in-memory implementation

use std::sync::Mutex;

use crate::config::{PreferenceKey, Preferences};
use crate::error::PreferenceError;
use crate::types::MonitoringMode;

/// Callback invoked with the key of every setting whose value changed
pub type ChangeListener = Box<dyn Fn(PreferenceKey) + Send + Sync>;

/// Access to persisted user preferences
pub trait PreferenceStore: Send + Sync {
    /// Snapshot of all current values
    fn preferences(&self) -> Preferences;

    /// Parse and persist one value. Listeners fire only when the value changed.
    fn set(&self, key: PreferenceKey, raw: &str) -> Result<(), PreferenceError>;

    /// Register a change listener
    fn subscribe(&self, listener: ChangeListener);

    fn monitoring(&self) -> MonitoringMode {
        self.preferences().monitoring
    }

    fn set_monitoring(&self, mode: MonitoringMode) -> Result<(), PreferenceError> {
        self.set(PreferenceKey::Monitoring, &mode.value().to_string())
    }

    /// Step to the next monitoring mode and return it
    fn set_monitoring_next(&self) -> Result<MonitoringMode, PreferenceError> {
        let next = self.monitoring().next();
        self.set_monitoring(next)?;
        Ok(next)
    }
}

/// Preferences kept in memory only
#[derive(Default)]
pub struct MemoryPreferenceStore {
    preferences: Mutex<Preferences>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl MemoryPreferenceStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences: Mutex::new(preferences),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn notify(&self, key: PreferenceKey) {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            listener(key);
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn preferences(&self) -> Preferences {
        self.preferences
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, key: PreferenceKey, raw: &str) -> Result<(), PreferenceError> {
        let changed = {
            let mut current = self.preferences.lock().unwrap_or_else(|e| e.into_inner());
            let mut updated = current.clone();
            updated.apply(key, raw)?;
            let changed = updated != *current;
            *current = updated;
            changed
        };

        if changed {
            tracing::debug!(key = %key, "preference changed");
            self.notify(key);
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }
}
