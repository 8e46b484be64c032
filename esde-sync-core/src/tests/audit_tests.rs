use super::*;
use crate::media::MediaAsset;

fn cat(name: &str) -> MediaCategory {
    MediaCategory::parse(name).unwrap()
}

fn pool(category: &str, files: &[&str]) -> MediaPool {
    MediaPool::new(
        cat(category),
        format!("/master/downloaded_media/switch/{category}"),
        files.iter().map(|f| MediaAsset::new(*f, 100)).collect(),
    )
}

fn snapshot(roms: &[&str], catalog: &[&str], pools: Vec<MediaPool>) -> SystemSnapshot {
    SystemSnapshot {
        system: "switch".to_string(),
        roms: roms.iter().map(|r| RomFile::new("switch", r, 1)).collect(),
        catalog: CatalogState::Available(
            catalog.iter().map(|s| CatalogEntry::new("switch", *s)).collect(),
        ),
        pools,
    }
}

fn pruned() -> AuditOptions {
    AuditOptions {
        prune_empty_categories: true,
        ..AuditOptions::default()
    }
}

#[test]
fn test_fully_covered_title_has_no_problems() {
    let snap = snapshot(
        &["Celeste.xci"],
        &["Celeste"],
        vec![pool("covers", &["Celeste.png"]), pool("screenshots", &["Celeste.png"])],
    );
    let findings = audit(&[snap], &pruned());
    assert_eq!(findings.len(), 1);
    assert!(findings[0].in_master_catalog);
    assert!(findings[0].missing_categories.is_empty());
    assert!(!findings[0].is_problem());
    assert_eq!(findings[0].note, "");
}

#[test]
fn test_parenthesized_region_needs_fuzzy() {
    let make = || snapshot(&["Celeste (USA).xci"], &["Celeste"], vec![pool("covers", &["Celeste.png"])]);

    let findings = audit(&[make()], &pruned());
    assert!(!findings[0].in_master_catalog);
    assert_eq!(findings[0].note, NOTE_NOT_IN_CATALOG);
    assert!(findings[0].is_problem());

    let fuzzy = AuditOptions { fuzzy: true, ..pruned() };
    let findings = audit(&[make()], &fuzzy);
    assert!(findings[0].in_master_catalog);
    assert_eq!(findings[0].matched_stem.as_deref(), Some("Celeste"));
    assert_eq!(findings[0].confidence, MatchConfidence::PrefixFallback);
    assert!(!findings[0].is_problem());
}

#[test]
fn test_missing_marquee_is_one_category_finding() {
    let snap = snapshot(
        &["Celeste.xci"],
        &["Celeste"],
        vec![pool("covers", &["Celeste.png"]), pool("marquees", &["Hades.png"])],
    );
    let findings = audit(&[snap], &pruned());
    assert_eq!(findings.len(), 1);
    assert!(findings[0].in_master_catalog);
    assert_eq!(findings[0].missing_categories, vec![cat("marquees")]);
    assert_eq!(findings[0].note, NOTE_MISSING_MEDIA);
}

#[test]
fn test_empty_category_is_pruned_on_request() {
    let make = || {
        snapshot(
            &["Celeste.xci"],
            &["Celeste"],
            vec![pool("covers", &["Celeste.png"]), pool("videos", &[])],
        )
    };
    let pruned = audit(&[make()], &pruned());
    assert!(pruned[0].missing_categories.is_empty());

    let unpruned = audit(&[make()], &AuditOptions::default());
    assert_eq!(unpruned[0].missing_categories, vec![cat("videos")]);
}

#[test]
fn test_expected_categories_follow_media_refs() {
    let mut snap = snapshot(
        &["Celeste.xci"],
        &[],
        vec![pool("covers", &["Celeste.png"]), pool("marquees", &["Hades.png"])],
    );
    snap.catalog = CatalogState::Available(vec![
        CatalogEntry::new("switch", "Celeste")
            .with_field("image", "./downloaded_media/switch/covers/Celeste.png"),
    ]);
    let findings = audit(&[snap], &pruned());
    assert_eq!(findings[0].expectation, ExpectationSource::Metadata);
    assert_eq!(findings[0].expected_categories, vec![cat("covers")]);
    assert!(findings[0].missing_categories.is_empty());
}

#[test]
fn test_missing_catalog_reports_every_rom() {
    let snap = SystemSnapshot {
        system: "gba".to_string(),
        roms: vec![RomFile::new("gba", "b.gba", 1), RomFile::new("gba", "a.gba", 1)],
        catalog: CatalogState::Missing(NOTE_MISSING_CATALOG.to_string()),
        pools: vec![],
    };
    let findings = audit(&[snap], &pruned());
    let names: Vec<String> = findings.iter().map(|f| f.rom.file_name()).collect();
    assert_eq!(names, vec!["a.gba", "b.gba"]);
    assert!(findings.iter().all(|f| !f.in_master_catalog && f.note == NOTE_MISSING_CATALOG));
}

#[test]
fn test_findings_sorted_by_stem() {
    let snap = snapshot(
        &["Tunic.xci", "Celeste.xci", "Hades.nsp", "Celeste.nsp"],
        &["Celeste", "Hades", "Tunic"],
        vec![],
    );
    let findings = audit(&[snap], &pruned());
    let names: Vec<String> = findings.iter().map(|f| f.rom.file_name()).collect();
    assert_eq!(names, vec!["Celeste.nsp", "Celeste.xci", "Hades.nsp", "Tunic.xci"]);
}

#[test]
fn test_suggestions_are_advisory() {
    let make = || {
        snapshot(
            &["Hollow Knight.nsp"],
            &["Hollow Knight"],
            vec![pool("covers", &["Hollow Knight (EU).png", "Hades.png"])],
        )
    };
    let plain = audit(&[make()], &pruned());
    assert_eq!(plain[0].missing_categories, vec![cat("covers")]);
    assert!(plain[0].suggestions.is_empty());

    let suggest = AuditOptions { suggest: true, ..pruned() };
    let findings = audit(&[make()], &suggest);
    assert_eq!(findings[0].missing_categories, vec![cat("covers")]);
    assert_eq!(findings[0].suggestion(), Some("Hollow Knight (EU)"));
    assert_eq!(findings[0].suggestions[0].category, cat("covers"));
}

#[test]
fn test_closest_stem_cutoff_and_ties() {
    assert_eq!(closest_stem("Celeste", ["Hades", "Tunic"].into_iter()), None);
    assert_eq!(closest_stem("Celeste", std::iter::empty()), None);
    assert_eq!(
        closest_stem("Celeste", ["celeste!", "Hades"].into_iter()).as_deref(),
        Some("celeste!")
    );
    // Equal distance: lexicographically smaller candidate wins
    assert_eq!(
        closest_stem("Sonic 1", ["Sonic 3", "Sonic 2"].into_iter()).as_deref(),
        Some("Sonic 2")
    );
}

#[test]
fn test_audit_is_deterministic() {
    let make = || {
        snapshot(
            &["b.xci", "a.xci", "c (USA).xci"],
            &["a", "b", "c"],
            vec![pool("covers", &["a.png"]), pool("marquees", &["b.png"])],
        )
    };
    let options = AuditOptions {
        fuzzy: true,
        suggest: true,
        prune_empty_categories: true,
    };
    assert_eq!(audit(&[make()], &options), audit(&[make()], &options));
}

#[test]
fn test_findings_carry_match_tier_and_disk_name() {
    let snap = snapshot(
        &["Hades.nsp", "hollow_knight.xci", "Celeste (USA).xci", "Homebrew."],
        &["Celeste", "Hades", "Hollow Knight"],
        vec![pool("covers", &["Celeste.png", "Hades.png", "Hollow Knight.png"])],
    );
    let fuzzy = AuditOptions { fuzzy: true, ..pruned() };
    let findings = audit(&[snap], &fuzzy);

    let tiers: Vec<(String, Option<&str>, MatchConfidence)> = findings
        .iter()
        .map(|f| (f.rom.file_name(), f.matched_stem.as_deref(), f.confidence))
        .collect();
    assert_eq!(
        tiers,
        vec![
            ("Celeste (USA).xci".to_string(), Some("Celeste"), MatchConfidence::PrefixFallback),
            ("Hades.nsp".to_string(), Some("Hades"), MatchConfidence::Exact),
            ("Homebrew.".to_string(), None, MatchConfidence::None),
            ("hollow_knight.xci".to_string(), Some("Hollow Knight"), MatchConfidence::Normalized),
        ]
    );
    assert!(findings.iter().all(|f| f.missing_categories.is_empty()));
}
