pub(crate) mod audit;
pub(crate) mod profiles;
pub(crate) mod sync;

use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use esde_sync_core::util::join_or_none;
use esde_sync_lib::{
    MediaSelection, Profiles, RunConfig, SelectionSource, Settings, resolve_media_selection,
};

use crate::cli_types::SelectionArgs;
use crate::error::CliError;

/// Resolve flags, settings.toml and the profiles file into one run
/// configuration. Fails before anything is scanned.
pub(crate) fn resolve_run_config(
    args: &SelectionArgs,
) -> Result<(RunConfig, MediaSelection), CliError> {
    let settings = Settings::load()?;

    let master = settings.resolve_master_root(args.master.clone()).ok_or_else(|| {
        CliError::config("no master root: pass --master or set defaults.master_root in settings.toml")
    })?;

    let profiles_path = settings.resolve_profiles_path(args.profiles_json.clone());
    let profiles = Profiles::load(&profiles_path)?;

    // A settings-file profile only applies when no explicit list is given
    let profile = if args.media.is_some() {
        args.profile.clone()
    } else {
        settings.resolve_profile(args.profile.clone())
    };
    let selection = resolve_media_selection(args.media.as_deref(), profile.as_deref(), &profiles)?;

    let mut config = RunConfig::new(master, &args.target, selection.categories.clone());
    config.systems = args.systems.clone();
    config.fuzzy = args.fuzzy;
    config.prune_empty_categories = !args.strict_categories;
    Ok((config, selection))
}

/// Print roots and media selection before a run.
pub(crate) fn log_run_header(config: &RunConfig, selection: &MediaSelection) {
    log::info!(
        "Master: {}",
        config.master.root.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "Target: {}",
        config.target.root.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    let source = match &selection.source {
        SelectionSource::Explicit => "--media".to_string(),
        SelectionSource::Profile(name) => format!("profile '{}'", name),
        SelectionSource::BuiltinDefault => "built-in default".to_string(),
    };
    log::info!(
        "Media:  {} {}",
        join_or_none(&selection.categories),
        format!("({})", source).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if config.fuzzy {
        log::info!(
            "{}",
            "Fuzzy matching: normalized and prefix tiers enabled"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if !config.prune_empty_categories {
        log::info!(
            "{}",
            "Strict categories: empty master folders still count as expected"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}

pub(crate) fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Single-line spinner, hidden in quiet mode.
pub(crate) fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb
}
