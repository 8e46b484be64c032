//! Directory layout of an ES-DE master collection and of a target volume.

use std::path::PathBuf;

const GAMELISTS_DIR: &str = "gamelists";
const MEDIA_DIR: &str = "downloaded_media";
const GAMELIST_FILE: &str = "gamelist.xml";

/// The authoritative collection: `<root>/gamelists` and
/// `<root>/downloaded_media`.
#[derive(Debug, Clone)]
pub struct MasterLayout {
    pub root: PathBuf,
}

impl MasterLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn gamelist_path(&self, system: &str) -> PathBuf {
        self.root.join(GAMELISTS_DIR).join(system).join(GAMELIST_FILE)
    }

    /// Per-system media folder holding one sub-folder per category.
    pub fn media_root(&self, system: &str) -> PathBuf {
        self.root.join(MEDIA_DIR).join(system)
    }

    pub fn category_dir(&self, system: &str, category: &str) -> PathBuf {
        self.media_root(system).join(category)
    }
}

/// A device volume: ROMs under `<root>/ROMs`, frontend data under
/// `<root>/ES-DE`.
#[derive(Debug, Clone)]
pub struct TargetLayout {
    pub root: PathBuf,
}

impl TargetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn roms_root(&self) -> PathBuf {
        self.root.join("ROMs")
    }

    pub fn rom_dir(&self, system: &str) -> PathBuf {
        self.roms_root().join(system)
    }

    pub fn esde_root(&self) -> PathBuf {
        self.root.join("ES-DE")
    }

    pub fn gamelist_path(&self, system: &str) -> PathBuf {
        self.esde_root().join(GAMELISTS_DIR).join(system).join(GAMELIST_FILE)
    }

    pub fn media_root(&self, system: &str) -> PathBuf {
        self.esde_root().join(MEDIA_DIR).join(system)
    }

    /// Required top-level folders that do not exist.
    pub fn missing_dirs(&self) -> Vec<PathBuf> {
        [self.roms_root(), self.esde_root()]
            .into_iter()
            .filter(|p| !p.is_dir())
            .collect()
    }
}
