//! Shared application settings.
//!
//! The settings file is `~/.config/esde-sync/settings.toml`. Its optional
//! `[defaults]` table supplies values the command line leaves out:
//!
//! ```toml
//! [defaults]
//! master_root = "/mnt/nas/esde-master"
//! profile = "no_videos"
//! profiles_json = "/mnt/nas/esde-master/profiles.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::profiles::DEFAULT_PROFILES_FILE;

/// Canonical path to the settings file: `~/.config/esde-sync/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("esde-sync").join("settings.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    pub master_root: Option<PathBuf>,
    pub profile: Option<String>,
    pub profiles_json: Option<PathBuf>,
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self, SyncError> {
        toml::from_str(text).map_err(|e| SyncError::configuration(format!("invalid settings: {e}")))
    }

    /// Load settings from `path`. A missing file yields empty settings.
    pub fn load_from(path: &Path) -> Result<Self, SyncError> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).map_err(|e| {
                SyncError::configuration(format!("invalid settings file {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the user's settings file.
    pub fn load() -> Result<Self, SyncError> {
        Self::load_from(&settings_path())
    }

    /// Master root: CLI value, then `defaults.master_root`.
    pub fn resolve_master_root(&self, cli: Option<PathBuf>) -> Option<PathBuf> {
        cli.or_else(|| non_empty_path(self.defaults.master_root.as_ref()))
    }

    /// Profile name: CLI value, then `defaults.profile`.
    pub fn resolve_profile(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| {
            self.defaults
                .profile
                .as_ref()
                .filter(|p| !p.trim().is_empty())
                .cloned()
        })
    }

    /// Preset file: CLI value, then `defaults.profiles_json`, then
    /// `profiles.json` in the working directory.
    pub fn resolve_profiles_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| non_empty_path(self.defaults.profiles_json.as_ref()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILES_FILE))
    }
}

fn non_empty_path(path: Option<&PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty()).cloned()
}
