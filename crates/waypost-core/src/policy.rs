//! Monitoring policy: maps a mode and locator tunables to a location request

use std::time::Duration;

use crate::config::LocatorTunables;
use crate::types::{LocationRequest, MonitoringMode, PowerTier};

/// How long a single-shot request stays alive
pub const ON_DEMAND_EXPIRY: Duration = Duration::from_secs(60);

/// Build the standing request descriptor for `mode`.
///
/// Pure: the same inputs always produce the same descriptor.
pub fn compute_request(mode: MonitoringMode, tunables: &LocatorTunables) -> LocationRequest {
    match mode {
        MonitoringMode::Quiet | MonitoringMode::Manual => LocationRequest {
            interval_ms: secs_to_ms(tunables.interval_secs),
            min_displacement_m: Some(tunables.displacement_m),
            power: PowerTier::LowPower,
            num_updates: None,
            expiry: None,
        },
        MonitoringMode::Significant => LocationRequest {
            interval_ms: secs_to_ms(tunables.interval_secs),
            min_displacement_m: Some(tunables.displacement_m),
            power: PowerTier::from_priority(tunables.priority),
            num_updates: None,
            expiry: None,
        },
        // Displacement is left to the provider in move mode
        MonitoringMode::Move => LocationRequest {
            interval_ms: secs_to_ms(tunables.move_interval_secs),
            min_displacement_m: None,
            power: PowerTier::HighAccuracy,
            num_updates: None,
            expiry: None,
        },
    }
}

/// Single-shot high accuracy request, independent of the current mode
pub fn on_demand_request() -> LocationRequest {
    LocationRequest {
        interval_ms: 0,
        min_displacement_m: None,
        power: PowerTier::HighAccuracy,
        num_updates: Some(1),
        expiry: Some(ON_DEMAND_EXPIRY),
    }
}

pub fn next_mode(mode: MonitoringMode) -> MonitoringMode {
    mode.next()
}

fn secs_to_ms(secs: u64) -> u64 {
    secs.saturating_mul(1000)
}
