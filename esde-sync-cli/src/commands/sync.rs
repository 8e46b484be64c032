use std::process::ExitCode;

use log::Level;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use esde_sync_core::CopyAction;
use esde_sync_core::util::{format_bytes_approx, join_or_none};
use esde_sync_frontend::EsDeFrontend;
use esde_sync_lib::{
    DryRunEffects, Effects, FsEffects, GamelistOutcome, RunSummary, SyncOptions, SyncProgress,
    SyncReport, SystemPlan, SystemResult, SystemSummary,
};

use crate::cli_types::SelectionArgs;
use crate::error::CliError;

pub(crate) fn run_sync(
    args: &SelectionArgs,
    dry_run: bool,
    backup_gamelist: bool,
    report: bool,
    quiet: bool,
) -> Result<ExitCode, CliError> {
    let (config, selection) = super::resolve_run_config(args)?;
    super::log_run_header(&config, &selection);
    if dry_run {
        log::info!(
            "{}",
            "Dry run: nothing will be copied or written".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let effects: &dyn Effects = if dry_run { &DryRunEffects } else { &FsEffects };
    let options = SyncOptions { backup_gamelist };
    let frontend = EsDeFrontend::new();

    let pb = super::spinner(quiet);
    let on_progress = |progress: SyncProgress| match progress {
        SyncProgress::Planning {
            ref system,
            index,
            total,
        } => {
            pb.set_message(format!("[{}/{}] Planning {}", index + 1, total, system));
            pb.tick();
        }
        SyncProgress::Copying {
            ref file_name,
            done,
            total,
        } => {
            pb.set_message(format!("[{}/{}] Copying {}", done + 1, total, file_name));
            pb.tick();
        }
        SyncProgress::WritingGamelist { ref system } => {
            pb.set_message(format!("Writing gamelist for {}", system));
            pb.tick();
        }
        SyncProgress::Done => pb.finish_and_clear(),
    };

    let result = esde_sync_lib::run_sync(&config, &options, &frontend, effects, &on_progress);
    pb.finish_and_clear();
    let sync_report = result?;

    for system in &sync_report.systems {
        match system {
            SystemResult::Synced { plan, summary } => {
                print_system(plan, summary, report);
                crate::log_blank();
            }
            SystemResult::NoRoms { system, rom_dir } => {
                log::debug!("{}: no ROMs in {}", system, rom_dir.display());
            }
            SystemResult::NoCatalog { system, path } => {
                log::warn!(
                    "{} Skipping \"{}\": no master gamelist at {}",
                    "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                    system,
                    path.display(),
                );
                crate::log_blank();
            }
            SystemResult::Skipped { system, reason } => {
                log::warn!(
                    "{} Skipping \"{}\": {}",
                    "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                    system,
                    reason,
                );
                crate::log_blank();
            }
        }
    }

    print_summary(&sync_report.summary, dry_run);

    Ok(super::exit_code(sync_failed(&sync_report)))
}

/// Any write failure or unreadable master data fails the run. Systems
/// without a master gamelist only warn.
fn sync_failed(report: &SyncReport) -> bool {
    !report.summary.errors.is_empty() || report.unreadable_systems() > 0
}

fn print_system(plan: &SystemPlan, summary: &SystemSummary, report: bool) {
    let has_issues = !plan.unmatched.is_empty()
        || !plan.duplicate_stems.is_empty()
        || !summary.errors.is_empty();
    let header_level = if has_issues { Level::Warn } else { Level::Info };
    log::log!(
        header_level,
        "{} {}",
        plan.system.if_supports_color(Stdout, |t| t.bold()),
        format!("(kept {} of {} games)", plan.kept.len(), plan.master_records)
            .if_supports_color(Stdout, |t| t.dimmed()),
    );

    for stem in &plan.duplicate_stems {
        log::warn!(
            "  {} Duplicate master entry \"{}\" ignored",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            stem,
        );
    }
    if !plan.unmatched.is_empty() {
        log::warn!(
            "  {} {} ROMs not in master gamelist",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            plan.unmatched.len(),
        );
        for rom in &plan.unmatched {
            log::debug!("      {}", rom.file_name());
        }
    }
    if !plan.ignored.is_empty() {
        log::info!(
            "  {}",
            format!("No master media, ignored: {}", join_or_none(&plan.ignored))
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    if report {
        for lines in &plan.title_reports {
            for line in lines {
                log::info!("  {}", line);
            }
        }
    }

    if summary.copied > 0 {
        log::info!(
            "  {} {} media copied ({})",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.copied,
            format_bytes_approx(summary.bytes_copied),
        );
    }
    if summary.skipped_identical > 0 {
        log::info!(
            "  {} {} media already present",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.skipped_identical,
        );
    }
    if summary.missing > 0 {
        log::info!(
            "  {} {} categories missing in master",
            "-".if_supports_color(Stdout, |t| t.dimmed()),
            summary.missing,
        );
    }
    for decision in plan.decisions.iter().filter(|d| d.action != CopyAction::SkipMissingSource) {
        log::debug!(
            "      {} {} [{}] {}",
            decision.action.label(),
            decision.rom.file_name(),
            decision.category,
            decision.reason,
        );
    }

    match summary.gamelist {
        GamelistOutcome::Written => {
            if let Some(ref backup) = summary.backup {
                log::info!(
                    "  {} Backup: {}",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    backup.display(),
                );
            }
            log::info!(
                "  {} Gamelist written: {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                plan.gamelist_path.display(),
            );
        }
        GamelistOutcome::Skipped => {
            log::info!(
                "  {}",
                "No titles kept; gamelist left unchanged".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        GamelistOutcome::Previewed | GamelistOutcome::Failed => {}
    }

    for error in &summary.errors {
        log::error!(
            "  {} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            error,
        );
    }
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let title = if dry_run { "Summary (dry run):" } else { "Summary:" };
    log::info!("{}", title.if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Systems found:        {}", summary.systems_found);
    log::info!("  Systems processed:    {}", summary.systems_processed);
    if summary.systems_skipped > 0 {
        log::warn!("  Systems skipped:      {}", summary.systems_skipped);
    }
    log::info!("  Master games seen:    {}", summary.master_records);
    log::info!("  Games kept:           {}", summary.games_kept);
    log::info!("  Gamelists written:    {}", summary.gamelists_written);
    log::info!(
        "  Media copied:         {} ({})",
        summary.media_copied,
        format_bytes_approx(summary.bytes_copied),
    );
    log::info!("  Media skipped:        {}", summary.media_skipped);
    log::info!("  Categories attempted: {}", summary.categories_attempted);
    log::info!("  Categories missing:   {}", summary.categories_missing);
    log::info!("  Categories ignored:   {}", summary.categories_ignored);

    if !summary.errors.is_empty() {
        log::error!(
            "  {} {} write failures",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            summary.errors.len(),
        );
    }
}
