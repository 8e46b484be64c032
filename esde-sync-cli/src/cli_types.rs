//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "esde-sync")]
#[command(about = "Sync and audit ES-DE gamelists and media against a master collection", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Roots, media selection and system scope shared by sync and audit.
#[derive(Args, Clone)]
pub(crate) struct SelectionArgs {
    /// Master collection root (holds gamelists/ and downloaded_media/).
    /// Defaults to `master_root` from settings.toml
    #[arg(long)]
    pub master: Option<PathBuf>,

    /// Target volume root (holds ROMs/ and ES-DE/)
    #[arg(long)]
    pub target: PathBuf,

    /// Named media profile from the profiles file
    #[arg(long)]
    pub profile: Option<String>,

    /// Explicit media categories (e.g., covers,screenshots,marquees); wins over --profile
    #[arg(long)]
    pub media: Option<String>,

    /// Profiles file (default: profiles.json in the working directory)
    #[arg(long)]
    pub profiles_json: Option<PathBuf>,

    /// Expect every selected category, even when the master has no media for it
    #[arg(long)]
    pub strict_categories: bool,

    /// Only process these systems, in this order (e.g., snes,gba,psx)
    #[arg(long, value_delimiter = ',')]
    pub systems: Option<Vec<String>>,

    /// Also match by normalized name and by name prefix. Fuzzily matched
    /// titles keep the master record as is: `<path>` and copied media names
    /// use the master stem, not the ROM's file name
    #[arg(long)]
    pub fuzzy: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Write filtered gamelists and copy matching media to the target
    Sync {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Show planned copies and writes without touching the target
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Keep a timestamped copy of each target gamelist before overwriting it
        #[arg(long)]
        backup_gamelist: bool,

        /// Print matched and missed categories for every kept title
        #[arg(long)]
        report: bool,
    },

    /// Report ROMs missing metadata or media in the master (read-only)
    Audit {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Name the closest available asset for each missing category
        #[arg(long)]
        suggest: bool,

        /// Write problem rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Exit with status 1 when any problem is found
        #[arg(long)]
        fail_on_issues: bool,
    },

    /// List known media categories and the profiles in the profiles file
    Profiles {
        /// Profiles file (default: profiles.json in the working directory)
        #[arg(long)]
        profiles_json: Option<PathBuf>,
    },
}
