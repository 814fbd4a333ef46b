use std::path::Path;

use waypost_core::{PreferenceKey, PreferenceStore};
use waypost_store::{FilePreferenceStore, Paths};

pub fn run_show() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let store = FilePreferenceStore::open(paths.preferences_file())?;
    println!("{}", serde_json::to_string_pretty(&store.preferences())?);
    Ok(())
}

pub fn run_set(key: &str, value: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let output = set_in(&paths.preferences_file(), key, value)?;
    println!("{output}");
    Ok(())
}

fn set_in(path: &Path, key: &str, value: &str) -> anyhow::Result<serde_json::Value> {
    let key: PreferenceKey = key.parse()?;
    let store = FilePreferenceStore::open(path)?;
    store.set(key, value)?;

    let stored = serde_json::to_value(store.preferences())?;
    Ok(serde_json::json!({
        "key": key.name(),
        "value": stored[key.name()],
        "locator": key.is_locator(),
    }))
}
