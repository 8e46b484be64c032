use esde_sync_lib::SyncError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Sync, audit or configuration failure from the library
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// Missing or conflicting command-line configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Logger could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}
