mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, PrefsAction};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { script, report_log } => commands::run::run(&script, report_log),
        Commands::Prefs { action } => match action {
            Some(PrefsAction::Show) | None => commands::prefs::run_show(),
            Some(PrefsAction::Set { key, value }) => commands::prefs::run_set(&key, &value),
        },
        Commands::Mode { mode } => commands::mode::run(mode.as_deref()),
        Commands::Policy => commands::policy::run(),
        Commands::Version => commands::version::run(),
    }
}
