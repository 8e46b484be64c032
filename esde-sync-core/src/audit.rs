//! Read-only reconciliation of a target against the master.
//!
//! Each ROM goes through the same steps the sync uses (metadata match, then
//! one media lookup per expected category) but nothing is copied or written;
//! the outcome is one [`AuditFinding`] per ROM.

use crate::matcher::{CatalogIndex, MatchConfidence};
use crate::media::{
    ExpectationSource, MediaCategory, MediaPool, effective_categories, expected_categories,
    resolve_for_rom,
};
use crate::stem::normalize_stem;
use crate::{CatalogEntry, RomFile};

pub const NOTE_MISSING_CATALOG: &str = "missing master gamelist.xml";
pub const NOTE_NOT_IN_CATALOG: &str = "ROM not found in master gamelist.xml";
pub const NOTE_MISSING_MEDIA: &str = "missing media categories in master cache";

/// Minimum normalized similarity for a suggestion to be offered.
pub const SUGGESTION_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditOptions {
    /// Enable the normalized and prefix tiers
    pub fuzzy: bool,
    /// Attach the closest available stem to each missing category
    pub suggest: bool,
    /// Treat selected categories with no master media as not expected
    pub prune_empty_categories: bool,
}

/// The master catalog of one system as seen by the audit.
#[derive(Debug, Clone)]
pub enum CatalogState {
    Available(Vec<CatalogEntry>),
    /// No usable catalog; every ROM is reported with this note
    Missing(String),
}

/// Everything the audit needs to know about one system.
#[derive(Debug, Clone)]
pub struct SystemSnapshot {
    pub system: String,
    /// ROMs found on the target, any order
    pub roms: Vec<RomFile>,
    pub catalog: CatalogState,
    /// One pool per selected category, in selection order
    pub pools: Vec<MediaPool>,
}

/// Advisory closest stem for a missing category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub category: MediaCategory,
    pub stem: String,
}

/// Terminal state of one ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub system: String,
    pub rom: RomFile,
    pub in_master_catalog: bool,
    /// Catalog stem the ROM resolved to
    pub matched_stem: Option<String>,
    pub confidence: MatchConfidence,
    /// Categories expected for the title, in selection order
    pub expected_categories: Vec<MediaCategory>,
    pub expectation: ExpectationSource,
    /// Expected categories with no master asset, in selection order
    pub missing_categories: Vec<MediaCategory>,
    pub suggestions: Vec<Suggestion>,
    pub note: String,
}

impl AuditFinding {
    /// Whether the finding belongs in the problem report.
    pub fn is_problem(&self) -> bool {
        !self.in_master_catalog || !self.missing_categories.is_empty()
    }

    /// Closest stem of the first missing category that has one.
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(|s| s.stem.as_str())
    }
}

enum CategoryState {
    Present,
    Missing(Option<String>),
}

/// Audit every system in order. Performs no I/O.
pub fn audit(systems: &[SystemSnapshot], options: &AuditOptions) -> Vec<AuditFinding> {
    systems
        .iter()
        .flat_map(|snapshot| audit_system(snapshot, options))
        .collect()
}

/// Audit a single system; findings are ordered by ROM stem, then extension.
pub fn audit_system(snapshot: &SystemSnapshot, options: &AuditOptions) -> Vec<AuditFinding> {
    let mut roms: Vec<&RomFile> = snapshot.roms.iter().collect();
    roms.sort_by(|a, b| a.stem.cmp(&b.stem).then_with(|| a.extension.cmp(&b.extension)));

    let entries = match &snapshot.catalog {
        CatalogState::Available(entries) => entries,
        CatalogState::Missing(note) => {
            return roms
                .into_iter()
                .map(|rom| unmatched_finding(&snapshot.system, rom, note))
                .collect();
        }
    };

    let (selected, _) = effective_categories(&snapshot.pools, options.prune_empty_categories);
    let index = CatalogIndex::new(entries);

    roms.into_iter()
        .map(|rom| {
            let result = index.match_rom(rom, options.fuzzy);
            match result.entry {
                Some(entry) => {
                    matched_finding(snapshot, rom, entry, result.confidence, &selected, options)
                }
                None => unmatched_finding(&snapshot.system, rom, NOTE_NOT_IN_CATALOG),
            }
        })
        .collect()
}

fn unmatched_finding(system: &str, rom: &RomFile, note: &str) -> AuditFinding {
    AuditFinding {
        system: system.to_string(),
        rom: rom.clone(),
        in_master_catalog: false,
        matched_stem: None,
        confidence: MatchConfidence::None,
        expected_categories: Vec::new(),
        expectation: ExpectationSource::Selection,
        missing_categories: Vec::new(),
        suggestions: Vec::new(),
        note: note.to_string(),
    }
}

fn matched_finding(
    snapshot: &SystemSnapshot,
    rom: &RomFile,
    entry: &CatalogEntry,
    confidence: MatchConfidence,
    selected: &[MediaCategory],
    options: &AuditOptions,
) -> AuditFinding {
    let matched_stem = entry.stem.as_str();
    let (expected, expectation) = expected_categories(entry, &snapshot.system, selected);

    let mut missing = Vec::new();
    let mut suggestions = Vec::new();
    for category in &expected {
        let pool = snapshot.pools.iter().find(|p| &p.category == category);
        match category_state(pool, matched_stem, &rom.stem, options) {
            CategoryState::Present => {}
            CategoryState::Missing(closest) => {
                missing.push(category.clone());
                if let Some(stem) = closest {
                    suggestions.push(Suggestion {
                        category: category.clone(),
                        stem,
                    });
                }
            }
        }
    }

    let note = if missing.is_empty() {
        String::new()
    } else {
        NOTE_MISSING_MEDIA.to_string()
    };

    AuditFinding {
        system: snapshot.system.clone(),
        rom: rom.clone(),
        in_master_catalog: true,
        matched_stem: Some(matched_stem.to_string()),
        confidence,
        expected_categories: expected,
        expectation,
        missing_categories: missing,
        suggestions,
        note,
    }
}

fn category_state(
    pool: Option<&MediaPool>,
    matched_stem: &str,
    rom_stem: &str,
    options: &AuditOptions,
) -> CategoryState {
    let Some(pool) = pool else {
        return CategoryState::Missing(None);
    };
    if resolve_for_rom(pool, matched_stem, rom_stem, options.fuzzy).is_some() {
        return CategoryState::Present;
    }
    let closest = if options.suggest {
        closest_stem(matched_stem, pool.stems())
    } else {
        None
    };
    CategoryState::Missing(closest)
}

/// The candidate closest to `target` by Levenshtein distance between
/// normalized stems, ties going to the lexicographically smaller candidate.
///
/// Returns `None` when the pool is empty or the best candidate's normalized
/// similarity (`1 - distance / longer length`) is below [`SUGGESTION_CUTOFF`].
pub fn closest_stem<'s>(target: &str, candidates: impl Iterator<Item = &'s str>) -> Option<String> {
    let key = normalize_stem(target);
    let (best, best_key, distance) = candidates
        .map(|c| {
            let ck = normalize_stem(c);
            let d = strsim::levenshtein(&key, &ck);
            (c, ck, d)
        })
        .min_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(b.0)))?;

    let longest = key.chars().count().max(best_key.chars().count());
    if longest == 0 {
        return None;
    }
    let similarity = 1.0 - distance as f64 / longest as f64;
    (similarity >= SUGGESTION_CUTOFF).then(|| best.to_string())
}

#[cfg(test)]
#[path = "tests/audit_tests.rs"]
mod tests;
