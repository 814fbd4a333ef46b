//! File-backed preference storage and report logging

mod io;
mod paths;
mod prefs;
mod types;

pub use io::{append_jsonl, atomic_write, read_jsonl};
pub use paths::Paths;
pub use prefs::FilePreferenceStore;
pub use types::ReportRecord;
