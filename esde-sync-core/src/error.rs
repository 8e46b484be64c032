use thiserror::Error;

/// Errors raised while validating inputs to the engine.
///
/// Matching itself never fails: an unresolved ROM or a missing asset is a
/// normal outcome carried in the result types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A media category name outside the known ES-DE vocabulary
    #[error("Unknown media category '{name}' (valid: {valid})")]
    UnknownCategory { name: String, valid: String },

    /// A media selection that resolved to no categories at all
    #[error("Empty media selection: {0}")]
    EmptySelection(String),
}

impl CoreError {
    pub fn unknown_category(name: impl Into<String>) -> Self {
        Self::UnknownCategory {
            name: name.into(),
            valid: crate::media::KNOWN_CATEGORIES.join(", "),
        }
    }

    pub fn empty_selection(msg: impl Into<String>) -> Self {
        Self::EmptySelection(msg.into())
    }
}
