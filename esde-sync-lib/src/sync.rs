//! Per-system sync: plan everything first, then apply the plan.
//!
//! [`plan_system`] only reads (target ROM folder, master catalog, master
//! media folders, destination file sizes). [`execute_system_plan`] hands
//! each `Copy` decision and the catalog write to an [`Effects`]
//! implementation, after every decision for the system is final.

use std::collections::HashSet;
use std::path::PathBuf;

use esde_sync_core::media::{effective_categories, expected_categories};
use esde_sync_core::report::title_report_lines;
use esde_sync_core::{
    CatalogEntry, CopyAction, CopyDecision, CopyPlanner, MediaCategory, RomFile, filter_catalog,
};
use esde_sync_frontend::Frontend;

use crate::config::RunConfig;
use crate::effects::Effects;
use crate::error::SyncError;
use crate::scanner::{self, FsProbe};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Copy an existing target catalog aside before overwriting it
    pub backup_gamelist: bool,
}

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum SyncProgress {
    /// Reading and planning a system
    Planning {
        system: String,
        index: usize,
        total: usize,
    },
    /// Copying one media file
    Copying {
        file_name: String,
        done: usize,
        total: usize,
    },
    /// Writing a system's filtered catalog
    WritingGamelist { system: String },
    /// Finished all systems
    Done,
}

/// Everything decided for one system before anything is written.
#[derive(Debug, Clone)]
pub struct SystemPlan {
    pub system: String,
    /// Target catalog file
    pub gamelist_path: PathBuf,
    /// Master `<provider>` element, carried into the output
    pub provider: Option<String>,
    /// `<game>` records in the master catalog
    pub master_records: usize,
    pub roms: Vec<RomFile>,
    /// Retained entries, in master order
    pub kept: Vec<CatalogEntry>,
    /// ROMs with no catalog entry
    pub unmatched: Vec<RomFile>,
    /// Stems of master entries ignored as duplicates
    pub duplicate_stems: Vec<String>,
    /// Selected categories with master media
    pub effective: Vec<MediaCategory>,
    /// Selected categories with an empty or missing master folder
    pub ignored: Vec<MediaCategory>,
    pub decisions: Vec<CopyDecision>,
    /// Per-title matched/missed lines, one block per kept title
    pub title_reports: Vec<Vec<String>>,
}

impl SystemPlan {
    pub fn count(&self, action: CopyAction) -> usize {
        self.decisions.iter().filter(|d| d.action == action).count()
    }
}

#[derive(Debug, Clone)]
pub enum SystemOutcome {
    Planned(SystemPlan),
    /// The target has no ROMs for this system
    NoRoms { rom_dir: PathBuf },
    /// The master has no catalog for this system
    NoCatalog { path: PathBuf },
}

/// Plan one system. Performs no writes.
///
/// An unreadable master catalog is `SourceUnavailable`; a missing one is
/// [`SystemOutcome::NoCatalog`].
pub fn plan_system(
    config: &RunConfig,
    frontend: &dyn Frontend,
    system: &str,
) -> Result<SystemOutcome, SyncError> {
    let rom_dir = config.target.rom_dir(system);
    let roms = scanner::scan_roms(system, &rom_dir)?;
    if roms.is_empty() {
        return Ok(SystemOutcome::NoRoms { rom_dir });
    }

    let master_gamelist = config.master.gamelist_path(system);
    if !master_gamelist.is_file() {
        return Ok(SystemOutcome::NoCatalog {
            path: master_gamelist,
        });
    }
    let gamelist = frontend
        .read_catalog(&master_gamelist, system)
        .map_err(|e| SyncError::source_unavailable(format!("{}: {}", master_gamelist.display(), e)))?;

    let pools = scanner::scan_media_pools(&config.master, system, &config.categories).map_err(|e| {
        SyncError::source_unavailable(format!("cannot read master media for '{}': {}", system, e))
    })?;
    let (effective, ignored) = effective_categories(&pools, config.prune_empty_categories);

    let filtered = filter_catalog(&gamelist.entries, &roms, config.fuzzy);

    let probe = FsProbe;
    let planner = CopyPlanner::new(&pools, config.target.media_root(system), config.fuzzy, &probe);

    let mut seen_entries = HashSet::new();
    let mut seen_dests = HashSet::new();
    let mut decisions = Vec::new();
    let mut title_reports = Vec::new();

    // One pass per kept title, driven by the first ROM that matched it
    for m in &filtered.matches {
        let (Some(index), Some(entry)) = (m.entry_index, m.entry) else {
            continue;
        };
        if !seen_entries.insert(index) {
            continue;
        }

        let (expected, expectation) = expected_categories(entry, system, &effective);
        let planned = planner.plan(m.rom, &entry.stem, &expected);
        title_reports.push(title_report_lines(
            system,
            &m.rom.file_name(),
            expectation,
            &planned,
        ));

        // Two titles can resolve to the same asset under fuzzy matching
        decisions.extend(planned.into_iter().filter(|d| match d.dest {
            Some(ref dest) => seen_dests.insert(dest.clone()),
            None => true,
        }));
    }

    let plan = SystemPlan {
        system: system.to_string(),
        gamelist_path: config.target.gamelist_path(system),
        provider: gamelist.provider.clone(),
        master_records: gamelist.total_records(),
        kept: filtered.to_entries(),
        unmatched: filtered.unmatched().cloned().collect(),
        duplicate_stems: filtered.duplicates.iter().map(|e| e.stem.clone()).collect(),
        roms: roms.clone(),
        effective,
        ignored,
        decisions,
        title_reports,
    };
    Ok(SystemOutcome::Planned(plan))
}

/// What happened to a system's target catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamelistOutcome {
    /// Nothing kept, so nothing written
    #[default]
    Skipped,
    Written,
    /// Preview mode: the write was only announced
    Previewed,
    Failed,
}

/// Result of applying one system's plan.
#[derive(Debug, Clone, Default)]
pub struct SystemSummary {
    pub copied: usize,
    pub bytes_copied: u64,
    pub skipped_identical: usize,
    pub missing: usize,
    pub gamelist: GamelistOutcome,
    /// Backup made (or announced) before the catalog write
    pub backup: Option<PathBuf>,
    pub errors: Vec<String>,
}

/// Apply a plan. Failures are collected per file; nothing aborts the rest
/// of the plan except a failed backup, which skips the catalog write.
pub fn execute_system_plan(
    plan: &SystemPlan,
    frontend: &dyn Frontend,
    effects: &dyn Effects,
    options: &SyncOptions,
    on_progress: &dyn Fn(SyncProgress),
) -> SystemSummary {
    let mut summary = SystemSummary {
        skipped_identical: plan.count(CopyAction::SkipIdentical),
        missing: plan.count(CopyAction::SkipMissingSource),
        ..Default::default()
    };

    let copies: Vec<&CopyDecision> = plan
        .decisions
        .iter()
        .filter(|d| d.action == CopyAction::Copy)
        .collect();
    let total = copies.len();

    for (i, decision) in copies.iter().enumerate() {
        let (Some(src), Some(dest)) = (&decision.source, &decision.dest) else {
            continue;
        };
        on_progress(SyncProgress::Copying {
            file_name: dest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            done: i,
            total,
        });
        match effects.copy_file(src, dest) {
            Ok(()) => {
                summary.copied += 1;
                summary.bytes_copied += decision.size_bytes;
            }
            Err(e) => summary.errors.push(e.to_string()),
        }
    }

    if plan.kept.is_empty() {
        return summary;
    }

    on_progress(SyncProgress::WritingGamelist {
        system: plan.system.clone(),
    });

    if options.backup_gamelist {
        match effects.backup_file(&plan.gamelist_path) {
            Ok(backup) => summary.backup = backup,
            Err(e) => {
                summary.errors.push(e.to_string());
                summary.gamelist = GamelistOutcome::Failed;
                return summary;
            }
        }
    }

    let entries: Vec<&CatalogEntry> = plan.kept.iter().collect();
    let xml = frontend.render_catalog(plan.provider.as_deref(), &entries);
    summary.gamelist = match effects.write_file(&plan.gamelist_path, &xml) {
        Ok(()) if effects.is_dry_run() => GamelistOutcome::Previewed,
        Ok(()) => GamelistOutcome::Written,
        Err(e) => {
            summary.errors.push(e.to_string());
            GamelistOutcome::Failed
        }
    };

    summary
}

/// Counters for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub systems_found: usize,
    pub systems_processed: usize,
    pub systems_skipped: usize,
    pub master_records: usize,
    pub games_kept: usize,
    pub gamelists_written: usize,
    pub media_copied: usize,
    pub bytes_copied: u64,
    pub media_skipped: usize,
    pub categories_attempted: usize,
    pub categories_missing: usize,
    pub categories_ignored: usize,
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn absorb(&mut self, plan: &SystemPlan, summary: &SystemSummary) {
        self.master_records += plan.master_records;
        self.games_kept += plan.kept.len();
        self.categories_attempted += plan.decisions.len();
        self.categories_missing += summary.missing;
        self.categories_ignored += plan.ignored.len();
        self.media_copied += summary.copied;
        self.bytes_copied += summary.bytes_copied;
        self.media_skipped += summary.skipped_identical;
        if !plan.kept.is_empty() {
            self.systems_processed += 1;
        }
        if summary.gamelist == GamelistOutcome::Written {
            self.gamelists_written += 1;
        }
        self.errors.extend(summary.errors.iter().cloned());
    }
}

#[derive(Debug, Clone)]
pub enum SystemResult {
    Synced {
        plan: SystemPlan,
        summary: SystemSummary,
    },
    NoRoms {
        system: String,
        rom_dir: PathBuf,
    },
    NoCatalog {
        system: String,
        path: PathBuf,
    },
    /// Master data present but unreadable
    Skipped {
        system: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub systems: Vec<SystemResult>,
    pub summary: RunSummary,
}

impl SyncReport {
    /// Systems skipped because their master data could not be read.
    pub fn unreadable_systems(&self) -> usize {
        self.systems
            .iter()
            .filter(|s| matches!(s, SystemResult::Skipped { .. }))
            .count()
    }
}

/// Sync every configured system in order.
///
/// Bad roots abort before anything is touched; a system without master data,
/// or whose master data cannot be read, is skipped and reported.
pub fn run_sync(
    config: &RunConfig,
    options: &SyncOptions,
    frontend: &dyn Frontend,
    effects: &dyn Effects,
    on_progress: &dyn Fn(SyncProgress),
) -> Result<SyncReport, SyncError> {
    config.validate_roots()?;
    let systems = config.resolve_systems()?;

    let mut report = SyncReport::default();
    report.summary.systems_found = systems.len();

    for (index, system) in systems.iter().enumerate() {
        on_progress(SyncProgress::Planning {
            system: system.clone(),
            index,
            total: systems.len(),
        });

        match plan_system(config, frontend, system) {
            Ok(SystemOutcome::Planned(plan)) => {
                let summary = execute_system_plan(&plan, frontend, effects, options, on_progress);
                report.summary.absorb(&plan, &summary);
                report.systems.push(SystemResult::Synced { plan, summary });
            }
            Ok(SystemOutcome::NoRoms { rom_dir }) => {
                report.systems.push(SystemResult::NoRoms {
                    system: system.clone(),
                    rom_dir,
                });
            }
            Ok(SystemOutcome::NoCatalog { path }) => {
                report.summary.systems_skipped += 1;
                report.systems.push(SystemResult::NoCatalog {
                    system: system.clone(),
                    path,
                });
            }
            Err(e) if e.is_system_local() => {
                report.summary.systems_skipped += 1;
                report.systems.push(SystemResult::Skipped {
                    system: system.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    on_progress(SyncProgress::Done);
    Ok(report)
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
