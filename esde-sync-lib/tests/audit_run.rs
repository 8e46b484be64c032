use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use esde_sync_core::MediaCategory;
use esde_sync_core::audit::{NOTE_MISSING_CATALOG, NOTE_MISSING_MEDIA, NOTE_NOT_IN_CATALOG};
use esde_sync_frontend::EsDeFrontend;
use esde_sync_lib::audit::audit_options;
use esde_sync_lib::report::render_audit_csv;
use esde_sync_lib::*;

const GBA_GAMELIST: &str = r#"<?xml version="1.0"?>
<gameList>
	<game>
		<path>./Advance Wars.gba</path>
		<name>Advance Wars</name>
	</game>
	<game>
		<path>./Minish Cap.gba</path>
		<name>The Minish Cap</name>
	</game>
</gameList>
"#;

fn touch(path: &Path, bytes: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![1u8; bytes]).unwrap();
}

/// gba: one complete title, one missing its marquee, one unknown hack.
/// psx: ROMs but no master gamelist.
fn fixture() -> (tempfile::TempDir, RunConfig) {
    let dir = tempfile::tempdir().unwrap();
    let master = dir.path().join("master");
    let target = dir.path().join("target");

    fs::create_dir_all(master.join("gamelists/gba")).unwrap();
    fs::write(master.join("gamelists/gba/gamelist.xml"), GBA_GAMELIST).unwrap();
    let media = master.join("downloaded_media/gba");
    touch(&media.join("covers/Advance Wars.png"), 3);
    touch(&media.join("marquees/Advance Wars.png"), 3);
    touch(&media.join("covers/Minish Cap.png"), 3);
    touch(&media.join("marquees/Minish Cap (E).png"), 3);

    touch(&target.join("ROMs/gba/Advance Wars.gba"), 16);
    touch(&target.join("ROMs/gba/Minish Cap.gba"), 16);
    touch(&target.join("ROMs/gba/Pokemon Hack.gba"), 16);
    touch(&target.join("ROMs/psx/Vagrant Story.chd"), 16);
    fs::create_dir_all(target.join("ES-DE")).unwrap();

    let categories = vec![
        MediaCategory::parse("covers").unwrap(),
        MediaCategory::parse("marquees").unwrap(),
    ];
    (dir, RunConfig::new(master, target, categories))
}

fn audit(config: &RunConfig, suggest: bool) -> AuditRun {
    let options = audit_options(config, suggest);
    run_audit(config, &options, &EsDeFrontend::new(), &|_| {}).unwrap()
}

fn tree_state(root: &Path) -> Vec<(PathBuf, u64, SystemTime)> {
    fn walk(dir: &Path, out: &mut Vec<(PathBuf, u64, SystemTime)>) {
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            let meta = entry.metadata().unwrap();
            if meta.is_dir() {
                walk(&path, out);
            }
            out.push((path, meta.len(), meta.modified().unwrap()));
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out.sort();
    out
}

#[test]
fn audit_classifies_every_rom() {
    let (_dir, config) = fixture();
    let run = audit(&config, false);

    assert_eq!(run.systems.len(), 2);
    let gba = &run.systems[0];
    assert_eq!(gba.system, "gba");
    assert_eq!(gba.rom_count, 3);

    let notes: Vec<(&str, &str)> = gba
        .findings
        .iter()
        .map(|f| (f.rom.stem.as_str(), f.note.as_str()))
        .collect();
    assert_eq!(
        notes,
        vec![
            ("Advance Wars", ""),
            ("Minish Cap", NOTE_MISSING_MEDIA),
            ("Pokemon Hack", NOTE_NOT_IN_CATALOG),
        ]
    );
    assert_eq!(gba.findings[1].missing_categories[0].name(), "marquees");

    let psx = &run.systems[1];
    assert!(psx.catalog_missing);
    assert_eq!(psx.findings[0].note, NOTE_MISSING_CATALOG);
    assert!(!psx.findings[0].in_master_catalog);

    let tally = run.tally();
    assert_eq!(tally.roms, 4);
    assert_eq!(tally.missing_in_master, 2);
    assert_eq!(tally.missing_media, 1);
    assert_eq!(tally.problems(), 3);
}

#[test]
fn fuzzy_audit_finds_regional_marquee() {
    let (_dir, mut config) = fixture();
    config.fuzzy = true;
    let run = audit(&config, false);
    let minish = &run.systems[0].findings[1];
    assert!(minish.missing_categories.is_empty());
}

#[test]
fn suggestions_name_the_closest_asset() {
    let (_dir, config) = fixture();
    let run = audit(&config, true);
    let minish = &run.systems[0].findings[1];
    assert_eq!(minish.suggestion(), Some("Minish Cap (E)"));
}

#[test]
fn audit_never_touches_either_root() {
    let (dir, config) = fixture();
    let before = tree_state(dir.path());
    audit(&config, true);
    assert_eq!(tree_state(dir.path()), before);
}

#[test]
fn audit_output_is_deterministic() {
    let (_dir, config) = fixture();
    let render = || {
        let run = audit(&config, true);
        let mut csv = Vec::new();
        render_audit_csv(&mut csv, &run.csv_rows()).unwrap();
        String::from_utf8(csv).unwrap()
    };
    let first = render();
    assert_eq!(first, render());
    assert_eq!(first.lines().count(), 4);
    assert!(first.contains("gba,Minish Cap.gba,yes,marquees,missing media categories in master cache"));
}

#[test]
fn explicit_systems_limit_the_audit() {
    let (_dir, mut config) = fixture();
    config.systems = Some(vec!["psx".to_string(), "snes".to_string()]);
    let run = audit(&config, false);
    // snes has no ROMs and is left out
    assert_eq!(run.systems.len(), 1);
    assert_eq!(run.systems[0].system, "psx");
}

#[test]
fn unparseable_gamelist_skips_system() {
    let (_dir, config) = fixture();
    fs::write(config.master.gamelist_path("gba"), "<gameList><game>").unwrap();
    let run = audit(&config, false);
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].0, "gba");
    assert_eq!(run.systems.len(), 1);
    assert_eq!(run.systems[0].system, "psx");
}
