//! Core location monitoring policy, fix admission and preference model

mod admission;
mod config;
mod error;
mod policy;
mod preferences;
mod types;

pub use admission::{Admission, AdmissionFilter};
pub use config::{LocatorTunables, PreferenceKey, Preferences, ServiceConfig};
pub use error::{CoordinatorError, PreferenceError};
pub use policy::{compute_request, next_mode, on_demand_request, ON_DEMAND_EXPIRY};
pub use preferences::{ChangeListener, MemoryPreferenceStore, PreferenceStore};
pub use types::{
    EndpointState, Fix, LocationRequest, MonitoringMode, PowerTier, ReportType, RequestChannel,
    Transition, TransitionMessage,
};
