// Report model shared by the JSON and XLSX writers

use serde::Serialize;

use docreg_recon::engine::storage_key;
use docreg_recon::{DisciplineGroups, ReconStats, ReconciliationResult, StorageFile};

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub project: String,
    pub engine_version: String,
    pub run_at: String,
}

impl ReportMeta {
    pub fn now(project: &str) -> Self {
        Self {
            project: project.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Grouped reconciliation output as written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReportMeta,
    pub stats: ReconStats,
    pub disciplines: DisciplineGroups,
}

impl ReconReport {
    pub fn new(meta: ReportMeta, result: &ReconciliationResult, groups: DisciplineGroups) -> Self {
        Self {
            meta,
            stats: result.stats.clone(),
            disciplines: groups,
        }
    }

    pub fn has_divergences(&self) -> bool {
        self.disciplines.values().any(|bucket| !bucket.is_empty())
    }
}

/// Revision shown for a storage-only file: its join-key revision, or `N/A`.
pub fn storage_revision_label(file: &StorageFile) -> String {
    match storage_key(file) {
        Some(key) if !key.revision.is_empty() => key.revision.to_string(),
        _ => "N/A".to_string(),
    }
}
