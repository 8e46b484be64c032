use std::path::PathBuf;
use std::process::ExitCode;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use esde_sync_core::media::{KNOWN_CATEGORIES, parse_category_list};
use esde_sync_lib::profiles::DEFAULT_PROFILE;
use esde_sync_lib::{Profiles, Settings};

use crate::error::CliError;

pub(crate) fn run_profiles(profiles_json: Option<PathBuf>) -> Result<ExitCode, CliError> {
    let settings = Settings::load()?;
    let path = settings.resolve_profiles_path(profiles_json);
    let profiles = Profiles::load(&path)?;

    log::info!("Known media categories:");
    log::info!("  {}", KNOWN_CATEGORIES.join(", "));
    crate::log_blank();

    if profiles.is_empty() {
        log::info!(
            "No profiles in {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
        log::info!(
            "{}",
            "Without --media or --profile, every category except videos is used"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(ExitCode::SUCCESS);
    }

    log::info!(
        "Profiles in {}:",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    for name in profiles.names() {
        let categories = profiles.get(name).unwrap_or_default();
        let marker = if name == DEFAULT_PROFILE {
            format!(" {}", "(default)".if_supports_color(Stdout, |t| t.green()))
        } else {
            String::new()
        };
        log::info!(
            "  {}{}: {}",
            name.if_supports_color(Stdout, |t| t.bold()),
            marker,
            categories.join(", "),
        );
        if let Err(e) = parse_category_list(categories) {
            log::warn!(
                "    {} {}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                e,
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
