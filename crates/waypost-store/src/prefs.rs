//! JSON file preference store

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use waypost_core::{ChangeListener, PreferenceError, PreferenceKey, PreferenceStore, Preferences};

use crate::io::atomic_write;

/// Preferences persisted as pretty JSON, cached in memory
pub struct FilePreferenceStore {
    path: PathBuf,
    cache: Mutex<Preferences>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl FilePreferenceStore {
    /// Load from `path`. A missing file yields defaults and is written on first change.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let preferences = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            tracing::debug!(path = %path.display(), "no preference file, using defaults");
            Preferences::default()
        };

        Ok(Self {
            path,
            cache: Mutex::new(preferences),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(preferences)?;
        atomic_write(&self.path, json.as_bytes())?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn preferences(&self) -> Preferences {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, key: PreferenceKey, raw: &str) -> Result<(), PreferenceError> {
        let changed = {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            let mut updated = cache.clone();
            updated.apply(key, raw)?;
            if updated == *cache {
                false
            } else {
                self.persist(&updated)?;
                *cache = updated;
                true
            }
        };

        if changed {
            tracing::debug!(key = %key, path = %self.path.display(), "preference stored");
            let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            for listener in listeners.iter() {
                listener(key);
            }
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
