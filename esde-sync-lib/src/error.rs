use std::path::PathBuf;

use esde_sync_core::CoreError;
use esde_sync_frontend::FrontendError;
use thiserror::Error;

/// Errors raised while scanning, syncing or auditing.
///
/// `Configuration` and `TargetUnavailable` abort a run before anything is
/// touched. `SourceUnavailable` and read errors only skip the affected
/// system; `WriteFailure` only the affected file.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Unknown profile, bad category list, malformed preset or settings data
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Master root or a system's master data cannot be read
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Target root is missing or lacks its required folders
    #[error("Target unavailable: {0}")]
    TargetUnavailable(String),

    /// A copy or catalog write failed
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Frontend(#[from] FrontendError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn target_unavailable(msg: impl Into<String>) -> Self {
        Self::TargetUnavailable(msg.into())
    }

    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Whether the error only affects one system and the run can go on.
    pub fn is_system_local(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::Frontend(_) | Self::Io(_)
        )
    }
}
