//! Copy planning: which media files a sync should transfer.
//!
//! The planner never touches storage. It asks a [`DestinationProbe`] about
//! files already on the target and returns one [`CopyDecision`] per
//! (ROM, category) pair; executing `Copy` decisions is left to the caller.

use std::path::{Path, PathBuf};

use crate::matcher::MatchConfidence;
use crate::media::{MediaCategory, MediaPool, category_dir, resolve_for_rom};
use crate::RomFile;

/// What to do with one (ROM, category) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyAction {
    /// Transfer the source asset to the destination
    Copy,
    /// Destination already holds a file of the same size
    SkipIdentical,
    /// No asset in the master for this category
    SkipMissingSource,
}

impl CopyAction {
    pub fn label(&self) -> &'static str {
        match self {
            CopyAction::Copy => "copy",
            CopyAction::SkipIdentical => "identical",
            CopyAction::SkipMissingSource => "missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyDecision {
    pub rom: RomFile,
    pub category: MediaCategory,
    /// Master asset path, absent for `SkipMissingSource`
    pub source: Option<PathBuf>,
    /// Target path, absent for `SkipMissingSource`
    pub dest: Option<PathBuf>,
    /// Size of the source asset in bytes
    pub size_bytes: u64,
    pub action: CopyAction,
    /// Tier that resolved the asset
    pub confidence: MatchConfidence,
    pub reason: String,
}

/// Read-only view of the destination tree.
pub trait DestinationProbe {
    /// Size of the file at `path`, or `None` if there is no such file.
    fn file_size(&self, path: &Path) -> Option<u64>;
}

/// Plans media copies for one system.
pub struct CopyPlanner<'a> {
    pools: &'a [MediaPool],
    dest_media_root: PathBuf,
    fuzzy: bool,
    probe: &'a dyn DestinationProbe,
}

impl<'a> CopyPlanner<'a> {
    /// `dest_media_root` is the per-system media folder on the target
    /// (e.g. `<target>/ES-DE/downloaded_media/<system>`).
    pub fn new(
        pools: &'a [MediaPool],
        dest_media_root: impl Into<PathBuf>,
        fuzzy: bool,
        probe: &'a dyn DestinationProbe,
    ) -> Self {
        Self {
            pools,
            dest_media_root: dest_media_root.into(),
            fuzzy,
            probe,
        }
    }

    fn pool(&self, category: &MediaCategory) -> Option<&'a MediaPool> {
        self.pools.iter().find(|p| &p.category == category)
    }

    /// One decision per category, in the order given.
    ///
    /// Assets are looked up by `matched_stem` (the catalog identity) first
    /// and by the ROM's own stem when that differs.
    pub fn plan(
        &self,
        rom: &RomFile,
        matched_stem: &str,
        categories: &[MediaCategory],
    ) -> Vec<CopyDecision> {
        categories
            .iter()
            .map(|category| self.plan_category(rom, matched_stem, category))
            .collect()
    }

    fn plan_category(&self, rom: &RomFile, matched_stem: &str, category: &MediaCategory) -> CopyDecision {
        let found = self.pool(category).and_then(|pool| {
            resolve_for_rom(pool, matched_stem, &rom.stem, self.fuzzy)
                .map(|(asset, confidence)| (pool, asset, confidence))
        });

        let Some((pool, asset, confidence)) = found else {
            return CopyDecision {
                rom: rom.clone(),
                category: category.clone(),
                source: None,
                dest: None,
                size_bytes: 0,
                action: CopyAction::SkipMissingSource,
                confidence: MatchConfidence::None,
                reason: format!("no {} asset for '{}'", category, matched_stem),
            };
        };

        let source = pool.source_path(asset);
        let dest = category_dir(&self.dest_media_root, category).join(&asset.file_name);

        let (action, reason) = match self.probe.file_size(&dest) {
            Some(existing) if existing == asset.size_bytes => {
                (CopyAction::SkipIdentical, "destination has identical size".to_string())
            }
            Some(existing) => (
                CopyAction::Copy,
                format!("size differs ({} -> {} bytes)", existing, asset.size_bytes),
            ),
            None => (CopyAction::Copy, "not on target".to_string()),
        };

        CopyDecision {
            rom: rom.clone(),
            category: category.clone(),
            source: Some(source),
            dest: Some(dest),
            size_bytes: asset.size_bytes,
            action,
            confidence,
            reason,
        }
    }
}

#[cfg(test)]
#[path = "tests/plan_tests.rs"]
mod tests;
