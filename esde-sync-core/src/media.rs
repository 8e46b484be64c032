//! Media categories and the per-category asset pools of the master.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CoreError;
use crate::matcher::{MatchConfidence, StemIndex};
use crate::stem::split_file_name;
use crate::CatalogEntry;

/// Every media folder name ES-DE knows about under `downloaded_media/<system>/`.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "3dboxes",
    "backcovers",
    "covers",
    "custom",
    "fanart",
    "manuals",
    "marquees",
    "miximages",
    "physicalmedia",
    "screenshots",
    "titlescreens",
    "videos",
];

/// A named media bucket, e.g. `covers` or `videos`.
///
/// Only names from [`KNOWN_CATEGORIES`] can be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaCategory(String);

impl MediaCategory {
    /// Parse a category name (trimmed, case-insensitive).
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        let lower = name.trim().to_ascii_lowercase();
        if KNOWN_CATEGORIES.contains(&lower.as_str()) {
            Ok(Self(lower))
        } else {
            Err(CoreError::unknown_category(name.trim()))
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// All known categories in vocabulary order.
    pub fn all() -> Vec<Self> {
        KNOWN_CATEGORIES.iter().map(|c| Self(c.to_string())).collect()
    }
}

impl FromStr for MediaCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MediaCategory {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a list of category names, dropping blanks and repeats.
///
/// Fails on the first unknown name, or when nothing is left.
pub fn parse_category_list<I, S>(names: I) -> Result<Vec<MediaCategory>, CoreError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let category = MediaCategory::parse(name)?;
        if seen.insert(category.clone()) {
            out.push(category);
        }
    }
    if out.is_empty() {
        return Err(CoreError::empty_selection("no media categories selected"));
    }
    Ok(out)
}

/// One asset file inside a master category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub stem: String,
    pub file_name: String,
    pub size_bytes: u64,
}

impl MediaAsset {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        let file_name = file_name.into();
        let stem = split_file_name(&file_name).0.to_string();
        Self {
            stem,
            file_name,
            size_bytes,
        }
    }
}

/// All assets of one category for one system, indexed by stem.
#[derive(Debug, Clone)]
pub struct MediaPool {
    pub category: MediaCategory,
    /// Master folder holding the assets
    pub source_dir: PathBuf,
    assets: Vec<MediaAsset>,
    index: StemIndex,
}

impl MediaPool {
    /// Build a pool. Assets are ordered by file name so that two files
    /// sharing a stem (`x.png`, `x.jpg`) always resolve the same way.
    pub fn new(category: MediaCategory, source_dir: impl Into<PathBuf>, mut assets: Vec<MediaAsset>) -> Self {
        assets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        let index = StemIndex::new(assets.iter().map(|a| a.stem.as_str()));
        Self {
            category,
            source_dir: source_dir.into(),
            assets,
            index,
        }
    }

    /// A pool with no assets, for a category folder that does not exist.
    pub fn empty(category: MediaCategory, source_dir: impl Into<PathBuf>) -> Self {
        Self::new(category, source_dir, Vec::new())
    }

    /// Look an asset up by stem using the matcher tiers.
    pub fn resolve(&self, stem: &str, fuzzy: bool) -> Option<(&MediaAsset, MatchConfidence)> {
        self.index
            .resolve(stem, fuzzy)
            .map(|hit| (&self.assets[hit.index], hit.confidence))
    }

    pub fn source_path(&self, asset: &MediaAsset) -> PathBuf {
        self.source_dir.join(&asset.file_name)
    }

    pub fn assets(&self) -> &[MediaAsset] {
        &self.assets
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Distinct asset stems, used as the suggestion pool.
    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.index.unique_stems()
    }
}

/// Look up the asset for a title: by its catalog stem first, then by the
/// ROM's own stem when that differs.
pub fn resolve_for_rom<'p>(
    pool: &'p MediaPool,
    matched_stem: &str,
    rom_stem: &str,
    fuzzy: bool,
) -> Option<(&'p MediaAsset, MatchConfidence)> {
    pool.resolve(matched_stem, fuzzy).or_else(|| {
        if rom_stem != matched_stem {
            pool.resolve(rom_stem, fuzzy)
        } else {
            None
        }
    })
}

/// Split the selected categories into those with master media (effective)
/// and those whose master folder is empty or missing (ignored).
///
/// With `prune_empty` off every selected category is effective.
pub fn effective_categories(
    pools: &[MediaPool],
    prune_empty: bool,
) -> (Vec<MediaCategory>, Vec<MediaCategory>) {
    let mut effective = Vec::new();
    let mut ignored = Vec::new();
    for pool in pools {
        if prune_empty && pool.is_empty() {
            ignored.push(pool.category.clone());
        } else {
            effective.push(pool.category.clone());
        }
    }
    (effective, ignored)
}

/// Where the expected categories of a title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectationSource {
    /// Inferred from media references inside the catalog record
    Metadata,
    /// The record references nothing usable; every selected category applies
    Selection,
}

impl ExpectationSource {
    pub fn label(&self) -> &'static str {
        match self {
            ExpectationSource::Metadata => "xml",
            ExpectationSource::Selection => "heuristic",
        }
    }
}

/// Categories a title is expected to have media for.
///
/// A record that references media (`./downloaded_media/<system>/covers/x.png`)
/// only expects the referenced categories that are also in `selected`;
/// otherwise it expects all of `selected`. Order follows `selected`.
pub fn expected_categories(
    entry: &CatalogEntry,
    system: &str,
    selected: &[MediaCategory],
) -> (Vec<MediaCategory>, ExpectationSource) {
    let referenced: HashSet<&str> = entry
        .fields
        .iter()
        .filter_map(|f| category_from_media_ref(&f.value, system))
        .collect();

    let expected: Vec<MediaCategory> = selected
        .iter()
        .filter(|c| referenced.contains(c.name()))
        .cloned()
        .collect();

    if expected.is_empty() {
        (selected.to_vec(), ExpectationSource::Selection)
    } else {
        (expected, ExpectationSource::Metadata)
    }
}

/// Infer the category a media reference points into.
///
/// Checked in order: the segment after `downloaded_media/<system>/`, the
/// segment after a bare `<system>/`, then any segment that is itself a
/// category name.
pub fn category_from_media_ref(text: &str, system: &str) -> Option<&'static str> {
    let text = text.trim();
    if !(text.contains('/') || text.contains('\\')) {
        return None;
    }

    let normalized = text.replace('\\', "/");
    let parts: Vec<String> = normalized
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .map(|p| p.to_ascii_lowercase())
        .collect();
    let system = system.to_ascii_lowercase();

    if let Some(i) = parts.iter().position(|p| p == "downloaded_media") {
        if i + 2 < parts.len() && parts[i + 1] == system {
            return known_category(&parts[i + 2]);
        }
    }

    if let Some(i) = parts.iter().position(|p| *p == system) {
        return parts.get(i + 1).and_then(|p| known_category(p));
    }

    parts.iter().find_map(|p| known_category(p))
}

fn known_category(name: &str) -> Option<&'static str> {
    KNOWN_CATEGORIES.iter().copied().find(|c| *c == name)
}

/// Destination folder of one category under a target media root.
pub fn category_dir(media_root: &Path, category: &MediaCategory) -> PathBuf {
    media_root.join(category.name())
}
