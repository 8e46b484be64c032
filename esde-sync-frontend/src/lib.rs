pub mod error;
pub mod esde;
pub mod layout;

pub use error::FrontendError;
pub use esde::{EsDeFrontend, Gamelist};
pub use layout::{MasterLayout, TargetLayout};

use std::path::Path;

use esde_sync_core::CatalogEntry;

/// Trait for the catalog format of a gaming frontend.
///
/// Reading yields records in document order with the original record text
/// attached; rendering writes a filtered subset back in the same shape.
pub trait Frontend {
    /// Parse the catalog of one system.
    fn read_catalog(&self, path: &Path, system: &str) -> Result<Gamelist, FrontendError>;

    /// Render a catalog holding `entries` in the order given.
    fn render_catalog(&self, provider: Option<&str>, entries: &[&CatalogEntry]) -> String;
}
