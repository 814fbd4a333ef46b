//! Data directory resolution

use std::path::{Path, PathBuf};

/// Overrides the data directory when set
pub const HOME_ENV: &str = "WAYPOST_HOME";

/// Resolves where preferences and logs live
#[derive(Debug, Clone)]
pub struct Paths {
    pub home: PathBuf,
}

impl Paths {
    /// `$WAYPOST_HOME`, falling back to `~/.waypost`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(dir)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;
        Ok(Self::at(home.join(".waypost")))
    }

    pub fn at(home: impl AsRef<Path>) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
        }
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.home.join("preferences.json")
    }

    /// Log of published location reports
    pub fn reports_file(&self) -> PathBuf {
        self.home.join("reports.jsonl")
    }
}
