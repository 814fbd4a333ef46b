use waypost_core::{compute_request, on_demand_request, MonitoringMode, PreferenceStore};
use waypost_store::{FilePreferenceStore, Paths};

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let store = FilePreferenceStore::open(paths.preferences_file())?;
    let preferences = store.preferences();
    let tunables = preferences.tunables();

    let modes: Vec<serde_json::Value> = MonitoringMode::ALL
        .iter()
        .map(|&mode| {
            serde_json::json!({
                "mode": mode,
                "active": mode == preferences.monitoring,
                "request": compute_request(mode, &tunables).to_string(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "modes": modes,
        "onDemand": on_demand_request().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
