//! Read-only audit of a target against the master.
//!
//! This module only gathers [`SystemSnapshot`]s from disk; the reconciliation
//! itself lives in `esde_sync_core::audit`. Nothing here writes to either
//! root.

use esde_sync_core::audit::NOTE_MISSING_CATALOG;
use esde_sync_core::media::effective_categories;
use esde_sync_core::report::{AuditTally, CsvRow, csv_rows};
use esde_sync_core::{AuditFinding, AuditOptions, CatalogState, MediaCategory, SystemSnapshot};
use esde_sync_frontend::Frontend;

use crate::config::RunConfig;
use crate::error::SyncError;
use crate::scanner;

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum AuditProgress {
    Scanning {
        system: String,
        index: usize,
        total: usize,
    },
    Done,
}

/// Audit results for one system.
#[derive(Debug, Clone)]
pub struct SystemAudit {
    pub system: String,
    pub rom_count: usize,
    /// No usable master catalog for this system
    pub catalog_missing: bool,
    /// Selected categories with master media
    pub effective: Vec<MediaCategory>,
    /// Selected categories with an empty or missing master folder
    pub ignored: Vec<MediaCategory>,
    pub findings: Vec<AuditFinding>,
}

impl SystemAudit {
    pub fn tally(&self) -> AuditTally {
        AuditTally::from_findings(&self.findings)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditRun {
    pub systems: Vec<SystemAudit>,
    /// Systems that could not be read, with the reason
    pub skipped: Vec<(String, String)>,
}

impl AuditRun {
    pub fn findings(&self) -> impl Iterator<Item = &AuditFinding> {
        self.systems.iter().flat_map(|s| s.findings.iter())
    }

    pub fn tally(&self) -> AuditTally {
        AuditTally::from_findings(self.findings())
    }

    /// CSV rows for every problem finding, in report order.
    pub fn csv_rows(&self) -> Vec<CsvRow> {
        self.systems
            .iter()
            .flat_map(|s| csv_rows(&s.findings))
            .collect()
    }
}

/// Core audit options for this run.
pub fn audit_options(config: &RunConfig, suggest: bool) -> AuditOptions {
    AuditOptions {
        fuzzy: config.fuzzy,
        suggest,
        prune_empty_categories: config.prune_empty_categories,
    }
}

/// Read one system from disk. Returns `None` when the target has no ROMs.
///
/// A missing catalog is not an error here: the snapshot carries
/// `CatalogState::Missing` and every ROM is reported against it. An
/// unreadable one is `SourceUnavailable`.
pub fn snapshot_system(
    config: &RunConfig,
    frontend: &dyn Frontend,
    system: &str,
) -> Result<Option<SystemSnapshot>, SyncError> {
    let roms = scanner::scan_roms(system, &config.target.rom_dir(system))?;
    if roms.is_empty() {
        return Ok(None);
    }

    let gamelist_path = config.master.gamelist_path(system);
    let catalog = if !gamelist_path.is_file() {
        CatalogState::Missing(NOTE_MISSING_CATALOG.to_string())
    } else {
        let gamelist = frontend
            .read_catalog(&gamelist_path, system)
            .map_err(|e| SyncError::source_unavailable(format!("{}: {}", gamelist_path.display(), e)))?;
        CatalogState::Available(gamelist.entries)
    };

    let pools = scanner::scan_media_pools(&config.master, system, &config.categories).map_err(|e| {
        SyncError::source_unavailable(format!("cannot read master media for '{}': {}", system, e))
    })?;

    Ok(Some(SystemSnapshot {
        system: system.to_string(),
        roms,
        catalog,
        pools,
    }))
}

/// Audit every configured system in order.
pub fn run_audit(
    config: &RunConfig,
    options: &AuditOptions,
    frontend: &dyn Frontend,
    on_progress: &dyn Fn(AuditProgress),
) -> Result<AuditRun, SyncError> {
    config.validate_roots()?;
    let systems = config.resolve_systems()?;

    let mut run = AuditRun::default();
    for (index, system) in systems.iter().enumerate() {
        on_progress(AuditProgress::Scanning {
            system: system.clone(),
            index,
            total: systems.len(),
        });

        let snapshot = match snapshot_system(config, frontend, system) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => continue,
            Err(e) if e.is_system_local() => {
                run.skipped.push((system.clone(), e.to_string()));
                continue;
            }
            Err(e) => return Err(e),
        };

        let (effective, ignored) =
            effective_categories(&snapshot.pools, options.prune_empty_categories);
        run.systems.push(SystemAudit {
            system: system.clone(),
            rom_count: snapshot.roms.len(),
            catalog_missing: matches!(snapshot.catalog, CatalogState::Missing(_)),
            effective,
            ignored,
            findings: esde_sync_core::audit::audit_system(&snapshot, options),
        });
    }

    on_progress(AuditProgress::Done);
    Ok(run)
}
