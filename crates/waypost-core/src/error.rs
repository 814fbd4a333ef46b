//! Error types for coordination and preference handling

use thiserror::Error;

/// Failures inside the coordination core.
///
/// None of these terminate the process. They are logged where they occur and
/// the triggering operation is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    /// Location permission capability is absent
    #[error("missing location permission")]
    PermissionDenied,

    /// No location provider collaborator is available
    #[error("location provider not available")]
    ProviderUnavailable,

    /// Fix is not newer than the last accepted one
    #[error("fix at {timestamp} is not newer than watermark {watermark}")]
    StaleOrDuplicateFix { timestamp: i64, watermark: i64 },

    /// A presentation could not be built, e.g. because its category is disabled
    #[error("no presentation builder for {0}")]
    MissingPresentationBuilder(&'static str),

    /// Command action nobody handles
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// Preference storage and parsing errors
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown preference key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
