//! Filesystem side of esde-sync: scanning a target and a master, planning
//! and applying syncs, and gathering audits.

pub mod audit;
pub mod config;
pub mod effects;
pub mod error;
pub mod profiles;
pub mod report;
pub mod scanner;
pub mod settings;
pub mod sync;

pub use audit::{AuditProgress, AuditRun, SystemAudit, run_audit};
pub use config::RunConfig;
pub use effects::{DryRunEffects, Effects, FsEffects};
pub use error::SyncError;
pub use profiles::{MediaSelection, Profiles, SelectionSource, resolve_media_selection};
pub use settings::Settings;
pub use sync::{
    GamelistOutcome, RunSummary, SyncOptions, SyncProgress, SyncReport, SystemPlan, SystemResult,
    SystemSummary, run_sync,
};
