//! Tiered stem matching.
//!
//! A stem is resolved against a key space (catalog stems, or the asset stems
//! of one media category) by an ordered list of strategies. The first tier
//! that produces a hit wins:
//!
//! 1. exact: byte-for-byte stem equality
//! 2. normalized: equality of [`normalize_stem`] keys (fuzzy only)
//! 3. prefix fallback: one stem is an ASCII case-insensitive prefix of the other
//!    (fuzzy only)

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::stem::{common_prefix_len, normalize_stem, starts_with_ignore_case};
use crate::{CatalogEntry, RomFile};

/// Minimum number of shared leading characters for a prefix-fallback match.
pub const MIN_PREFIX_CHARS: usize = 4;

/// How a stem was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchConfidence {
    Exact,
    Normalized,
    PrefixFallback,
    None,
}

impl MatchConfidence {
    pub fn label(&self) -> &'static str {
        match self {
            MatchConfidence::Exact => "exact",
            MatchConfidence::Normalized => "normalized",
            MatchConfidence::PrefixFallback => "prefix",
            MatchConfidence::None => "none",
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, MatchConfidence::None)
    }
}

/// Position of the winning key inside a [`StemIndex`], and the tier that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StemHit {
    pub index: usize,
    pub confidence: MatchConfidence,
}

/// A matching strategy: returns the position of the key it resolved to.
pub type Tier = fn(&StemIndex, &str) -> Option<usize>;

const TIERS: [(MatchConfidence, Tier); 3] = [
    (MatchConfidence::Exact, exact_tier),
    (MatchConfidence::Normalized, normalized_tier),
    (MatchConfidence::PrefixFallback, prefix_tier),
];

/// An indexed key space for tiered lookups.
///
/// Keys keep their insertion order. When the same stem is inserted twice the
/// first occurrence wins and later ones are recorded in
/// [`duplicates`](Self::duplicates); they are never returned by a lookup.
#[derive(Debug, Clone, Default)]
pub struct StemIndex {
    stems: Vec<String>,
    /// Positions of first occurrences, in insertion order
    unique: Vec<usize>,
    by_exact: HashMap<String, usize>,
    by_normalized: HashMap<String, usize>,
    duplicates: Vec<usize>,
}

impl StemIndex {
    pub fn new<I, S>(stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for stem in stems {
            index.push(stem.into());
        }
        index
    }

    fn push(&mut self, stem: String) {
        let pos = self.stems.len();
        match self.by_exact.entry(stem.clone()) {
            Entry::Occupied(_) => self.duplicates.push(pos),
            Entry::Vacant(slot) => {
                slot.insert(pos);
                self.unique.push(pos);
                let key = normalize_stem(&stem);
                if !key.is_empty() {
                    self.by_normalized.entry(key).or_insert(pos);
                }
            }
        }
        self.stems.push(stem);
    }

    /// Resolve a stem, trying each tier in priority order.
    ///
    /// Without `fuzzy` only the exact tier runs.
    pub fn resolve(&self, stem: &str, fuzzy: bool) -> Option<StemHit> {
        let tiers = if fuzzy { &TIERS[..] } else { &TIERS[..1] };
        tiers.iter().find_map(|(confidence, tier)| {
            tier(self, stem).map(|index| StemHit {
                index,
                confidence: *confidence,
            })
        })
    }

    pub fn stem(&self, index: usize) -> &str {
        &self.stems[index]
    }

    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    /// Positions of keys that repeated an earlier stem.
    pub fn duplicates(&self) -> &[usize] {
        &self.duplicates
    }

    /// Distinct stems, first occurrences only, in insertion order.
    pub fn unique_stems(&self) -> impl Iterator<Item = &str> {
        self.unique.iter().map(|&i| self.stems[i].as_str())
    }
}

/// Tier 1: byte-for-byte equality.
pub fn exact_tier(index: &StemIndex, stem: &str) -> Option<usize> {
    index.by_exact.get(stem).copied()
}

/// Tier 2: equality after normalization.
pub fn normalized_tier(index: &StemIndex, stem: &str) -> Option<usize> {
    let key = normalize_stem(stem);
    if key.is_empty() {
        return None;
    }
    index.by_normalized.get(&key).copied()
}

/// Tier 3: prefix fallback.
///
/// Candidates are keys where one of the two stems is an ASCII case-insensitive
/// prefix of the other and the shared part is at least [`MIN_PREFIX_CHARS`]
/// long. The shortest key wins; ties go to the longest common prefix, then
/// to the lexicographically smallest key.
pub fn prefix_tier(index: &StemIndex, stem: &str) -> Option<usize> {
    let stem_chars = stem.chars().count();

    index
        .unique
        .iter()
        .filter_map(|&pos| {
            let key = index.stems[pos].as_str();
            let key_chars = key.chars().count();
            if stem_chars.min(key_chars) < MIN_PREFIX_CHARS {
                return None;
            }
            if !(starts_with_ignore_case(stem, key) || starts_with_ignore_case(key, stem)) {
                return None;
            }
            Some((key_chars, common_prefix_len(stem, key), key, pos))
        })
        .min_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.2.cmp(b.2))
        })
        .map(|(_, _, _, pos)| pos)
}

/// Result of resolving one ROM against a system catalog.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub rom: &'a RomFile,
    pub entry: Option<&'a CatalogEntry>,
    /// Position of `entry` in the catalog slice
    pub entry_index: Option<usize>,
    pub confidence: MatchConfidence,
}

impl<'a> MatchResult<'a> {
    /// The catalog stem the ROM resolved to.
    pub fn matched_stem(&self) -> Option<&'a str> {
        self.entry.map(|e| e.stem.as_str())
    }

    pub fn is_match(&self) -> bool {
        self.entry.is_some()
    }
}

/// A system catalog indexed by stem for repeated lookups.
pub struct CatalogIndex<'a> {
    entries: &'a [CatalogEntry],
    stems: StemIndex,
}

impl<'a> CatalogIndex<'a> {
    pub fn new(entries: &'a [CatalogEntry]) -> Self {
        Self {
            entries,
            stems: StemIndex::new(entries.iter().map(|e| e.stem.as_str())),
        }
    }

    pub fn match_rom(&self, rom: &'a RomFile, fuzzy: bool) -> MatchResult<'a> {
        match self.stems.resolve(&rom.stem, fuzzy) {
            Some(hit) => MatchResult {
                rom,
                entry: Some(&self.entries[hit.index]),
                entry_index: Some(hit.index),
                confidence: hit.confidence,
            },
            None => MatchResult {
                rom,
                entry: None,
                entry_index: None,
                confidence: MatchConfidence::None,
            },
        }
    }

    /// Entries whose stem repeats an earlier entry. They are never matched.
    pub fn duplicates(&self) -> impl Iterator<Item = &'a CatalogEntry> + '_ {
        let entries = self.entries;
        self.stems.duplicates().iter().map(move |&i| &entries[i])
    }

    pub fn entries(&self) -> &'a [CatalogEntry] {
        self.entries
    }
}

/// Resolve a single ROM against a catalog slice.
///
/// Builds a throwaway index; use [`CatalogIndex`] when matching many ROMs.
pub fn match_rom<'a>(rom: &'a RomFile, catalog: &'a [CatalogEntry], fuzzy: bool) -> MatchResult<'a> {
    CatalogIndex::new(catalog).match_rom(rom, fuzzy)
}

#[cfg(test)]
#[path = "tests/matcher_tests.rs"]
mod tests;
