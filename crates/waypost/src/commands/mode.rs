use std::path::Path;

use waypost_core::{MonitoringMode, PreferenceStore};
use waypost_store::{FilePreferenceStore, Paths};

pub fn run(mode: Option<&str>) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let current = apply(&paths.preferences_file(), mode)?;
    println!(
        "{}",
        serde_json::json!({
            "mode": current,
            "value": current.value(),
            "label": current.label(),
        })
    );
    Ok(())
}

/// Read the stored mode, or set it first when `mode` is given
fn apply(path: &Path, mode: Option<&str>) -> anyhow::Result<MonitoringMode> {
    let store = FilePreferenceStore::open(path)?;
    match mode {
        None => Ok(store.monitoring()),
        Some("next") => Ok(store.set_monitoring_next()?),
        Some(raw) => {
            let mode: MonitoringMode = raw.parse()?;
            store.set_monitoring(mode)?;
            Ok(mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("preferences.json");
        assert_eq!(apply(&path, None).unwrap(), MonitoringMode::Significant);
    }

    #[test]
    fn test_next_cycles() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("preferences.json");
        assert_eq!(apply(&path, Some("next")).unwrap(), MonitoringMode::Move);
        assert_eq!(apply(&path, Some("next")).unwrap(), MonitoringMode::Quiet);
        assert_eq!(apply(&path, None).unwrap(), MonitoringMode::Quiet);
    }

    #[test]
    fn test_set_by_value() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("preferences.json");
        assert_eq!(apply(&path, Some("0")).unwrap(), MonitoringMode::Manual);
        assert!(apply(&path, Some("5")).is_err());
    }
}
