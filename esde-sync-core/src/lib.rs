//! Matching and reconciliation engine for filtered ES-DE catalogs.
//!
//! Everything in this crate is pure: callers hand in the ROMs found on a
//! target volume, the master catalog records and the master media pools, and
//! get back match results, filtered record sets, copy decisions and audit
//! findings. Touching storage is the caller's job.

pub mod audit;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod media;
pub mod plan;
pub mod report;
pub mod stem;
pub mod util;

pub use audit::{AuditFinding, AuditOptions, CatalogState, Suggestion, SystemSnapshot, audit};
pub use error::CoreError;
pub use filter::{FilteredCatalog, filter_catalog};
pub use matcher::{MatchConfidence, MatchResult, StemIndex, match_rom};
pub use media::{MediaAsset, MediaCategory, MediaPool};
pub use plan::{CopyAction, CopyDecision, CopyPlanner, DestinationProbe};
pub use stem::normalize_stem;

/// A ROM file discovered on the target volume.
///
/// `stem` is the file name without its extension, case preserved exactly as
/// found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomFile {
    /// System folder the ROM was found under (e.g. "switch", "snes")
    pub system: String,
    /// File name without extension
    pub stem: String,
    /// Extension without the leading dot (may be empty)
    pub extension: String,
    /// File name exactly as found on disk
    pub name: String,
    /// Size on disk in bytes
    pub size_bytes: u64,
}

impl RomFile {
    pub fn new(system: impl Into<String>, file_name: &str, size_bytes: u64) -> Self {
        let (stem, extension) = stem::split_file_name(file_name);
        Self {
            system: system.into(),
            stem: stem.to_string(),
            extension: extension.to_string(),
            name: file_name.to_string(),
            size_bytes,
        }
    }

    /// File name as found on disk.
    pub fn file_name(&self) -> String {
        self.name.clone()
    }
}

/// A single metadata field of a catalog record, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

/// One title known to the master catalog for a system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub system: String,
    /// Join key against [`RomFile::stem`]
    pub stem: String,
    /// Human-readable title (falls back to the stem when the record has none)
    pub display_name: String,
    /// Remaining fields of the record, in document order
    pub fields: Vec<MetadataField>,
    /// The record exactly as stored in the master, passed through verbatim
    /// when the filtered catalog is written back out.
    pub raw_record: Option<String>,
}

impl CatalogEntry {
    pub fn new(system: impl Into<String>, stem: impl Into<String>) -> Self {
        let stem = stem.into();
        Self {
            system: system.into(),
            display_name: stem.clone(),
            stem,
            fields: Vec::new(),
            raw_record: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MetadataField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Value of the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
