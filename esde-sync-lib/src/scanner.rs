//! Directory scanning for the target's ROM folders and the master's media
//! folders.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use esde_sync_core::{DestinationProbe, MediaAsset, MediaCategory, MediaPool, RomFile};
use esde_sync_frontend::{MasterLayout, TargetLayout};

/// Placeholder ES-DE drops into every empty system folder.
const SYSTEMINFO_FILE: &str = "systeminfo.txt";

/// System folders under `<target>/ROMs`, sorted by name.
pub fn list_systems(target: &TargetLayout) -> io::Result<Vec<String>> {
    let mut systems: Vec<String> = fs::read_dir(target.roms_root())?
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();
    systems.sort();
    Ok(systems)
}

/// ROM files of one system, searched recursively.
///
/// Hidden files and ES-DE's `systeminfo.txt` are ignored. A missing folder
/// yields no ROMs. The result is sorted by stem, then extension.
pub fn scan_roms(system: &str, rom_dir: &Path) -> io::Result<Vec<RomFile>> {
    let mut roms = Vec::new();
    if !rom_dir.is_dir() {
        return Ok(roms);
    }

    let mut files = Vec::new();
    collect_files(rom_dir, &mut files)?;
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non-UTF-8 file name: {}", path.display());
            continue;
        };
        if name.starts_with('.') || name.eq_ignore_ascii_case(SYSTEMINFO_FILE) {
            continue;
        }
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        roms.push(RomFile::new(system, name, size));
    }

    roms.sort_by(|a, b| a.stem.cmp(&b.stem).then_with(|| a.extension.cmp(&b.extension)));
    Ok(roms)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?.flatten().map(|e| e.path()).collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if !hidden {
                collect_files(&path, out)?;
            }
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// One pool per category from `<master>/downloaded_media/<system>/<category>`.
///
/// Only files directly inside the category folder count. A missing folder
/// gives an empty pool.
pub fn scan_media_pools(
    master: &MasterLayout,
    system: &str,
    categories: &[MediaCategory],
) -> io::Result<Vec<MediaPool>> {
    categories
        .iter()
        .map(|category| {
            let dir = master.category_dir(system, category.name());
            if !dir.is_dir() {
                return Ok(MediaPool::empty(category.clone(), dir));
            }
            let mut assets = Vec::new();
            for entry in fs::read_dir(&dir)?.flatten() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if name.starts_with('.') {
                    continue;
                }
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                assets.push(MediaAsset::new(name, size));
            }
            Ok(MediaPool::new(category.clone(), dir, assets))
        })
        .collect()
}

/// Destination probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl DestinationProbe for FsProbe {
    fn file_size(&self, path: &Path) -> Option<u64> {
        fs::metadata(path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len())
    }
}
