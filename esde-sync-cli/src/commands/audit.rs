use std::path::Path;
use std::process::ExitCode;

use log::Level;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use esde_sync_core::report::finding_lines;
use esde_sync_core::util::join_or_none;
use esde_sync_frontend::EsDeFrontend;
use esde_sync_lib::audit::audit_options;
use esde_sync_lib::report::write_audit_csv;
use esde_sync_lib::{AuditProgress, AuditRun, SystemAudit};

use crate::cli_types::SelectionArgs;
use crate::error::CliError;

pub(crate) fn run_audit(
    args: &SelectionArgs,
    suggest: bool,
    csv: Option<&Path>,
    fail_on_issues: bool,
    quiet: bool,
) -> Result<ExitCode, CliError> {
    let (config, selection) = super::resolve_run_config(args)?;
    super::log_run_header(&config, &selection);
    log::info!(
        "{}",
        "Audit: read-only, nothing will be copied or written".if_supports_color(Stdout, |t| t.dimmed()),
    );
    crate::log_blank();

    let options = audit_options(&config, suggest);
    let frontend = EsDeFrontend::new();

    let pb = super::spinner(quiet);
    let on_progress = |progress: AuditProgress| match progress {
        AuditProgress::Scanning {
            ref system,
            index,
            total,
        } => {
            pb.set_message(format!("[{}/{}] Auditing {}", index + 1, total, system));
            pb.tick();
        }
        AuditProgress::Done => pb.finish_and_clear(),
    };

    let result = esde_sync_lib::run_audit(&config, &options, &frontend, &on_progress);
    pb.finish_and_clear();
    let run = result?;

    for (system, reason) in &run.skipped {
        log::warn!(
            "{} Skipping \"{}\": {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            system,
            reason,
        );
        crate::log_blank();
    }

    for system in &run.systems {
        print_system(system);
        crate::log_blank();
    }

    let tally = run.tally();
    if let Some(path) = csv {
        let rows = run.csv_rows();
        write_audit_csv(path, &rows)?;
        log::info!(
            "{} CSV written: {} ({} rows)",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            rows.len(),
        );
    }

    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Systems audited:      {}", run.systems.len());
    if !run.skipped.is_empty() {
        log::warn!("  Systems skipped:      {}", run.skipped.len());
    }
    log::info!("  ROMs checked:         {}", tally.roms);
    log::info!("  In master gamelist:   {}", tally.in_master);
    log::info!("  Missing in master:    {}", tally.missing_in_master);
    log::info!("  Missing media:        {}", tally.missing_media);
    if tally.problems() > 0 {
        log::warn!(
            "  {} {} ROMs with issues",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            tally.problems(),
        );
    } else {
        log::info!(
            "  {} No issues found",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
    }

    Ok(super::exit_code(audit_failed(&run, fail_on_issues)))
}

/// Unreadable systems always fail the run; findings only with `--fail-on-issues`.
fn audit_failed(run: &AuditRun, fail_on_issues: bool) -> bool {
    !run.skipped.is_empty() || (fail_on_issues && run.tally().problems() > 0)
}

fn print_system(system: &SystemAudit) {
    let tally = system.tally();
    let header_level = if tally.problems() > 0 {
        Level::Warn
    } else {
        Level::Info
    };
    log::log!(
        header_level,
        "{} {}",
        system.system.if_supports_color(Stdout, |t| t.bold()),
        format!("({} ROMs)", system.rom_count).if_supports_color(Stdout, |t| t.dimmed()),
    );

    if system.catalog_missing {
        log::warn!(
            "  {} No master gamelist.xml for this system",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    if !system.ignored.is_empty() {
        log::info!(
            "  {}",
            format!("No master media, ignored: {}", join_or_none(&system.ignored))
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    for finding in &system.findings {
        for line in finding_lines(finding) {
            log::warn!("  {}", line);
        }
    }

    log::info!(
        "  in master: {}, missing in master: {}, missing media: {}",
        tally.in_master,
        tally.missing_in_master,
        tally.missing_media,
    );
}

#[cfg(test)]
mod tests {
    use esde_sync_core::audit::NOTE_NOT_IN_CATALOG;
    use esde_sync_core::matcher::MatchConfidence;
    use esde_sync_core::media::ExpectationSource;
    use esde_sync_core::{AuditFinding, RomFile};

    use super::*;

    fn system(findings: Vec<AuditFinding>) -> SystemAudit {
        SystemAudit {
            system: "gba".to_string(),
            rom_count: findings.len(),
            catalog_missing: false,
            effective: Vec::new(),
            ignored: Vec::new(),
            findings,
        }
    }

    fn finding(file_name: &str, in_master_catalog: bool) -> AuditFinding {
        AuditFinding {
            system: "gba".to_string(),
            rom: RomFile::new("gba", file_name, 1),
            in_master_catalog,
            matched_stem: None,
            confidence: MatchConfidence::None,
            expected_categories: Vec::new(),
            expectation: ExpectationSource::Selection,
            missing_categories: Vec::new(),
            suggestions: Vec::new(),
            note: if in_master_catalog { String::new() } else { NOTE_NOT_IN_CATALOG.to_string() },
        }
    }

    #[test]
    fn test_clean_audit_passes() {
        let run = AuditRun {
            systems: vec![system(vec![finding("Golden Sun.gba", true)])],
            skipped: Vec::new(),
        };
        assert!(!audit_failed(&run, false));
        assert!(!audit_failed(&run, true));
    }

    #[test]
    fn test_issues_fail_only_when_requested() {
        let run = AuditRun {
            systems: vec![system(vec![finding("Homebrew.gba", false)])],
            skipped: Vec::new(),
        };
        assert!(!audit_failed(&run, false));
        assert!(audit_failed(&run, true));
    }

    #[test]
    fn test_unreadable_system_always_fails() {
        let run = AuditRun {
            systems: Vec::new(),
            skipped: vec![("psx".to_string(), "bad gamelist".to_string())],
        };
        assert!(audit_failed(&run, false));
    }
}
