//! Named media-category presets (`profiles.json`) and media selection.

use std::collections::BTreeMap;
use std::path::Path;

use esde_sync_core::media::{KNOWN_CATEGORIES, parse_category_list};
use esde_sync_core::MediaCategory;

use crate::error::SyncError;

pub const DEFAULT_PROFILES_FILE: &str = "profiles.json";

/// Profile used when neither `--profile` nor `--media` is given.
pub const DEFAULT_PROFILE: &str = "no_videos";

/// Preset file contents: profile name to category names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profiles {
    profiles: BTreeMap<String, Vec<String>>,
}

impl Profiles {
    pub fn from_json(text: &str) -> Result<Self, SyncError> {
        let profiles: BTreeMap<String, Vec<String>> = serde_json::from_str(text)?;
        Ok(Self { profiles })
    }

    /// Load a preset file. A missing file yields no profiles; a malformed
    /// one is a configuration error.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(SyncError::configuration(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        Self::from_json(&text).map_err(|e| {
            SyncError::configuration(format!("malformed profiles file {}: {}", path.display(), e))
        })
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.profiles.get(name).map(|v| v.as_slice())
    }

    /// Profile names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Where the selected categories came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSource {
    /// `--media a,b,c`
    Explicit,
    /// A named profile from the preset file
    Profile(String),
    /// No profile file entry: every known category except videos
    BuiltinDefault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSelection {
    pub categories: Vec<MediaCategory>,
    pub source: SelectionSource,
}

/// Resolve the categories a run works with.
///
/// An explicit list wins over a profile (with a warning when both are
/// given). Without either, the `no_videos` profile is used if the presets
/// define it, otherwise every known category except `videos`.
pub fn resolve_media_selection(
    media: Option<&str>,
    profile: Option<&str>,
    profiles: &Profiles,
) -> Result<MediaSelection, SyncError> {
    let media = media.map(str::trim).filter(|m| !m.is_empty());
    let profile = profile.map(str::trim).filter(|p| !p.is_empty());

    if let Some(media) = media {
        if let Some(profile) = profile {
            log::warn!("Both --media and --profile given; using --media and ignoring profile '{}'", profile);
        }
        let categories = parse_category_list(media.split(','))?;
        return Ok(MediaSelection {
            categories,
            source: SelectionSource::Explicit,
        });
    }

    if let Some(name) = profile {
        let names = profiles.get(name).ok_or_else(|| {
            let available: Vec<&str> = profiles.names().collect();
            SyncError::configuration(format!(
                "unknown profile '{}' (available: {})",
                name,
                if available.is_empty() {
                    "none".to_string()
                } else {
                    available.join(", ")
                }
            ))
        })?;
        return profile_selection(name, names);
    }

    if let Some(names) = profiles.get(DEFAULT_PROFILE) {
        return profile_selection(DEFAULT_PROFILE, names);
    }

    let categories = KNOWN_CATEGORIES
        .iter()
        .filter(|c| **c != "videos")
        .map(|c| MediaCategory::parse(c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MediaSelection {
        categories,
        source: SelectionSource::BuiltinDefault,
    })
}

fn profile_selection(name: &str, names: &[String]) -> Result<MediaSelection, SyncError> {
    let categories = parse_category_list(names)
        .map_err(|e| SyncError::configuration(format!("profile '{}': {}", name, e)))?;
    Ok(MediaSelection {
        categories,
        source: SelectionSource::Profile(name.to_string()),
    })
}
