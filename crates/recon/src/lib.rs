//! `docreg-recon` - Document register vs. storage reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded register records and storage file
//! descriptors, returns the three-way diff. No CLI or file-format dependencies.

pub mod classify;
pub mod config;
pub mod context;
pub mod discipline;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod grammar;
pub mod model;
pub mod revision;
pub mod summary;

pub use classify::{group_by_discipline, DisciplineBucket, DisciplineGroups, UNMAPPED};
pub use config::{ReconConfig, RegisterFilter, StorageSource};
pub use context::ProjectContext;
pub use discipline::DisciplineCatalog;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use grammar::{parse, GrammarVariant, ParsedName};
pub use model::{
    ComparisonKey, DocumentRecord, ReconStats, ReconciliationResult, RevisionMismatch, StorageFile,
};
pub use revision::{canonicalize, sort_key, RevisionKey, SortOrdinal};
pub use summary::RegisterSummary;
