//! esde-sync CLI
//!
//! Filters ES-DE gamelists and media from a master collection onto a device
//! volume, and audits a volume against the master.

mod cli_types;
mod commands;
mod error;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cli_types::{Cli, Commands};
pub(crate) use logging::log_blank;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Sync {
            selection,
            dry_run,
            backup_gamelist,
            report,
        } => commands::sync::run_sync(&selection, dry_run, backup_gamelist, report, cli.quiet),
        Commands::Audit {
            selection,
            suggest,
            csv,
            fail_on_issues,
        } => commands::audit::run_audit(&selection, suggest, csv.as_deref(), fail_on_issues, cli.quiet),
        Commands::Profiles { profiles_json } => commands::profiles::run_profiles(profiles_json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            ExitCode::FAILURE
        }
    }
}
