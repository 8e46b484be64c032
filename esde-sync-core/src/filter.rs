//! Projection of a master system catalog onto the ROMs present on a target.

use crate::matcher::{CatalogIndex, MatchResult};
use crate::{CatalogEntry, RomFile};

/// The retained record set for one system plus the match results that
/// produced it.
#[derive(Debug)]
pub struct FilteredCatalog<'a> {
    /// Retained entries in master order
    pub entries: Vec<&'a CatalogEntry>,
    /// One result per input ROM, in input order
    pub matches: Vec<MatchResult<'a>>,
    /// Catalog entries ignored because an earlier entry had the same stem
    pub duplicates: Vec<&'a CatalogEntry>,
}

impl<'a> FilteredCatalog<'a> {
    /// ROMs that matched no catalog entry.
    pub fn unmatched(&self) -> impl Iterator<Item = &'a RomFile> + '_ {
        self.matches.iter().filter(|m| !m.is_match()).map(|m| m.rom)
    }

    /// Owned copy of the retained entries.
    pub fn to_entries(&self) -> Vec<CatalogEntry> {
        self.entries.iter().map(|e| (*e).clone()).collect()
    }
}

/// Keep every catalog entry matched by at least one ROM.
///
/// Master order is preserved and an entry is emitted once no matter how many
/// ROMs resolved to it.
pub fn filter_catalog<'a>(
    system_catalog: &'a [CatalogEntry],
    roms: &'a [RomFile],
    fuzzy: bool,
) -> FilteredCatalog<'a> {
    let index = CatalogIndex::new(system_catalog);
    let matches: Vec<MatchResult<'a>> = roms.iter().map(|rom| index.match_rom(rom, fuzzy)).collect();

    let mut keep = vec![false; system_catalog.len()];
    for m in &matches {
        if let Some(i) = m.entry_index {
            keep[i] = true;
        }
    }

    let entries = system_catalog
        .iter()
        .zip(keep)
        .filter_map(|(entry, kept)| kept.then_some(entry))
        .collect();

    FilteredCatalog {
        entries,
        matches,
        duplicates: index.duplicates().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stem::normalize_stem;

    fn entries(stems: &[&str]) -> Vec<CatalogEntry> {
        stems.iter().map(|s| CatalogEntry::new("snes", *s)).collect()
    }

    fn roms(names: &[&str]) -> Vec<RomFile> {
        names.iter().map(|n| RomFile::new("snes", n, 512)).collect()
    }

    fn stems<'a>(filtered: &FilteredCatalog<'a>) -> Vec<&'a str> {
        filtered.entries.iter().map(|e| e.stem.as_str()).collect()
    }

    #[test]
    fn test_keeps_master_order() {
        let catalog = entries(&["Zelda", "Mario", "Metroid", "F-Zero"]);
        let present = roms(&["F-Zero.sfc", "Zelda.sfc", "Metroid.sfc"]);
        let filtered = filter_catalog(&catalog, &present, false);
        assert_eq!(stems(&filtered), vec!["Zelda", "Metroid", "F-Zero"]);
    }

    #[test]
    fn test_entry_emitted_once_for_many_roms() {
        let catalog = entries(&["Game"]);
        let present = roms(&["Game.cue", "Game.bin", "game.iso"]);
        let filtered = filter_catalog(&catalog, &present, true);
        assert_eq!(stems(&filtered), vec!["Game"]);
        assert_eq!(filtered.matches.len(), 3);
    }

    #[test]
    fn test_unmatched_roms_reported() {
        let catalog = entries(&["Mario"]);
        let present = roms(&["Mario.sfc", "Unknown.sfc"]);
        let filtered = filter_catalog(&catalog, &present, false);
        let unmatched: Vec<_> = filtered.unmatched().map(|r| r.stem.as_str()).collect();
        assert_eq!(unmatched, vec!["Unknown"]);
    }

    #[test]
    fn test_duplicates_never_emitted_twice() {
        let catalog = vec![
            CatalogEntry::new("snes", "Mario").with_display_name("first"),
            CatalogEntry::new("snes", "Mario").with_display_name("second"),
        ];
        let present = roms(&["Mario.sfc"]);
        let filtered = filter_catalog(&catalog, &present, false);
        assert_eq!(filtered.entries.len(), 1);
        assert_eq!(filtered.entries[0].display_name, "first");
        assert_eq!(filtered.duplicates.len(), 1);
    }

    #[test]
    fn test_no_unmatched_entry_survives() {
        let catalog = entries(&["Celeste", "Hades", "Hollow Knight", "Ori", "Tunic"]);
        let present = roms(&["celeste (usa).xci", "HOLLOW-KNIGHT.nsp", "Other.xci", "Tunic.xci"]);

        for fuzzy in [false, true] {
            let filtered = filter_catalog(&catalog, &present, fuzzy);
            let matched: Vec<&str> = filtered.matches.iter().filter_map(|m| m.matched_stem()).collect();
            for entry in &filtered.entries {
                assert!(matched.contains(&entry.stem.as_str()));
            }
        }

        let strict = filter_catalog(&catalog, &present, false);
        assert_eq!(stems(&strict), vec!["Tunic"]);
        let fuzzy = filter_catalog(&catalog, &present, true);
        assert_eq!(stems(&fuzzy), vec!["Celeste", "Hollow Knight", "Tunic"]);
        assert_eq!(normalize_stem("HOLLOW-KNIGHT"), normalize_stem("Hollow Knight"));
    }
}
