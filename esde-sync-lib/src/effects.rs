//! The mutating side of a sync: copying media, writing and backing up
//! catalogs.
//!
//! Planning never calls into this module. The sync executor hands each
//! decision to an [`Effects`] implementation; in preview mode that is
//! [`DryRunEffects`], which only announces what would happen.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::SyncError;

pub trait Effects {
    /// Whether this implementation leaves storage untouched.
    fn is_dry_run(&self) -> bool;

    /// Copy `src` to `dest`, creating parent folders.
    fn copy_file(&self, src: &Path, dest: &Path) -> Result<(), SyncError>;

    /// Replace the file at `path` with `contents`.
    fn write_file(&self, path: &Path, contents: &str) -> Result<(), SyncError>;

    /// Copy an existing file aside before it is overwritten. Returns the
    /// backup path, or `None` when there was nothing to back up.
    fn backup_file(&self, path: &Path) -> Result<Option<PathBuf>, SyncError>;
}

/// Backup name for `path`: `<name>.bak-YYYYmmdd-HHMMSS` next to it.
pub fn backup_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.bak-{}", name, now.format("%Y%m%d-%H%M%S")))
}

/// Effects applied to the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsEffects;

impl Effects for FsEffects {
    fn is_dry_run(&self) -> bool {
        false
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> Result<(), SyncError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::write_failure(parent, e))?;
        }
        fs::copy(src, dest).map_err(|e| SyncError::write_failure(dest, e))?;
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), SyncError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::write_failure(parent, e))?;
        }
        // Write atomically
        let tmp = path.with_extension("xml.tmp");
        fs::write(&tmp, contents).map_err(|e| SyncError::write_failure(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| SyncError::write_failure(path, e))?;
        Ok(())
    }

    fn backup_file(&self, path: &Path) -> Result<Option<PathBuf>, SyncError> {
        if !path.is_file() {
            return Ok(None);
        }
        let bak_path = backup_path(path, Local::now());
        fs::copy(path, &bak_path).map_err(|e| SyncError::write_failure(&bak_path, e))?;
        Ok(Some(bak_path))
    }
}

/// Preview mode: logs each effect and performs none.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunEffects;

impl Effects for DryRunEffects {
    fn is_dry_run(&self) -> bool {
        true
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> Result<(), SyncError> {
        log::info!("[DRY] copy: {} -> {}", src.display(), dest.display());
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), SyncError> {
        log::info!("[DRY] write: {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    fn backup_file(&self, path: &Path) -> Result<Option<PathBuf>, SyncError> {
        if !path.is_file() {
            return Ok(None);
        }
        let bak_path = backup_path(path, Local::now());
        log::info!("[DRY] backup: {} -> {}", path.display(), bak_path.display());
        Ok(Some(bak_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_backup_path_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            backup_path(Path::new("/sd/ES-DE/gamelists/snes/gamelist.xml"), now),
            PathBuf::from("/sd/ES-DE/gamelists/snes/gamelist.xml.bak-20240309-070501")
        );
    }

    #[test]
    fn test_fs_effects_copy_write_backup() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.png");
        fs::write(&src, b"png").unwrap();

        let dest = dir.path().join("deep/nested/dest.png");
        FsEffects.copy_file(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"png");

        let gamelist = dir.path().join("out/gamelist.xml");
        assert_eq!(FsEffects.backup_file(&gamelist).unwrap(), None);
        FsEffects.write_file(&gamelist, "<gameList/>").unwrap();
        let bak = FsEffects.backup_file(&gamelist).unwrap().unwrap();
        assert_eq!(fs::read_to_string(&bak).unwrap(), "<gameList/>");
        FsEffects.write_file(&gamelist, "<gameList></gameList>").unwrap();
        assert_eq!(fs::read_to_string(&gamelist).unwrap(), "<gameList></gameList>");
        assert!(!dir.path().join("out/gamelist.xml.tmp").exists());
    }

    #[test]
    fn test_copy_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsEffects
            .copy_file(&dir.path().join("missing.png"), &dir.path().join("dest.png"))
            .unwrap_err();
        match err {
            SyncError::WriteFailure { path, .. } => assert_eq!(path, dir.path().join("dest.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.png");
        fs::write(&src, b"png").unwrap();
        let gamelist = dir.path().join("gamelist.xml");
        fs::write(&gamelist, "old").unwrap();

        assert!(DryRunEffects.is_dry_run());
        DryRunEffects.copy_file(&src, &dir.path().join("a/b.png")).unwrap();
        DryRunEffects.write_file(&gamelist, "new").unwrap();
        assert!(DryRunEffects.backup_file(&gamelist).unwrap().is_some());

        assert!(!dir.path().join("a").exists());
        assert_eq!(fs::read_to_string(&gamelist).unwrap(), "old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
