use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "waypost")]
#[command(version)]
#[command(about = "Background location tracking coordinator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive the coordinator with a scripted event file (JSON lines)
    Run {
        /// Path to the script
        #[arg(short, long)]
        script: PathBuf,

        /// Append admitted fixes to the report log
        #[arg(long)]
        report_log: bool,
    },

    /// Show or edit stored preferences
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },

    /// Show the monitoring mode, or set it (name, value, or "next")
    Mode { mode: Option<String> },

    /// Print the location request each monitoring mode would issue
    Policy,

    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print all preferences as JSON
    Show,
    /// Set one preference
    Set { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["waypost", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::try_parse_from(["waypost", "run", "--script", "events.jsonl", "--report-log"]);
        assert!(cli.is_ok());
        if let Commands::Run { script, report_log } = cli.unwrap().command {
            assert_eq!(script, PathBuf::from("events.jsonl"));
            assert!(report_log);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_run_requires_script() {
        assert!(Cli::try_parse_from(["waypost", "run"]).is_err());
    }

    #[test]
    fn test_cli_parse_prefs_set() {
        let cli = Cli::try_parse_from(["waypost", "prefs", "set", "locatorInterval", "30"]);
        assert!(cli.is_ok());
        match cli.unwrap().command {
            Commands::Prefs {
                action: Some(PrefsAction::Set { key, value }),
            } => {
                assert_eq!(key, "locatorInterval");
                assert_eq!(value, "30");
            }
            _ => panic!("Expected Prefs Set command"),
        }
    }

    #[test]
    fn test_cli_parse_mode() {
        let cli = Cli::try_parse_from(["waypost", "mode", "next"]).unwrap();
        assert!(matches!(cli.command, Commands::Mode { mode: Some(ref m) } if m == "next"));

        let cli = Cli::try_parse_from(["waypost", "mode"]).unwrap();
        assert!(matches!(cli.command, Commands::Mode { mode: None }));
    }
}
