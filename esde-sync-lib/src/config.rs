//! Resolved run configuration threaded into every sync and audit entry
//! point.

use std::path::PathBuf;

use esde_sync_core::MediaCategory;
use esde_sync_frontend::{MasterLayout, TargetLayout};

use crate::error::SyncError;
use crate::scanner;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub master: MasterLayout,
    pub target: TargetLayout,
    /// Selected categories, in selection order
    pub categories: Vec<MediaCategory>,
    /// Explicit system list; `None` means every system on the target
    pub systems: Option<Vec<String>>,
    /// Enable the normalized and prefix matching tiers
    pub fuzzy: bool,
    /// Ignore selected categories with no master media
    pub prune_empty_categories: bool,
}

impl RunConfig {
    pub fn new(
        master_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        categories: Vec<MediaCategory>,
    ) -> Self {
        Self {
            master: MasterLayout::new(master_root),
            target: TargetLayout::new(target_root),
            categories,
            systems: None,
            fuzzy: false,
            prune_empty_categories: true,
        }
    }

    /// Check both roots before anything is read or written.
    pub fn validate_roots(&self) -> Result<(), SyncError> {
        let target = &self.target.root;
        if !target.is_dir() {
            return Err(SyncError::target_unavailable(format!(
                "target root is not a directory: {}",
                target.display()
            )));
        }
        let missing = self.target.missing_dirs();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(SyncError::target_unavailable(format!(
                "target root is missing {}",
                names.join(" and ")
            )));
        }
        if !self.master.root.is_dir() {
            return Err(SyncError::source_unavailable(format!(
                "master root is not a directory: {}",
                self.master.root.display()
            )));
        }
        Ok(())
    }

    /// Systems to process: the explicit list in the order given (blanks
    /// and repeats dropped), or every system folder on the target, sorted.
    pub fn resolve_systems(&self) -> Result<Vec<String>, SyncError> {
        match &self.systems {
            Some(list) => {
                let mut systems: Vec<String> = Vec::new();
                for name in list.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
                    if !systems.iter().any(|s| s == name) {
                        systems.push(name.to_string());
                    }
                }
                Ok(systems)
            }
            None => scanner::list_systems(&self.target).map_err(|e| {
                SyncError::target_unavailable(format!(
                    "cannot list {}: {}",
                    self.target.roms_root().display(),
                    e
                ))
            }),
        }
    }
}
