use std::collections::BTreeMap;

use serde::Serialize;

use crate::discipline::DisciplineCatalog;
use crate::model::{DocumentRecord, ReconciliationResult, RevisionMismatch, StorageFile};

/// Bucket for items no discipline could be resolved for.
pub const UNMAPPED: &str = "UNMAPPED";

/// Divergences of one discipline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisciplineBucket {
    pub register_only: Vec<DocumentRecord>,
    pub storage_only: Vec<StorageFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub revision_mismatch: Vec<RevisionMismatch>,
}

impl DisciplineBucket {
    pub fn len(&self) -> usize {
        self.register_only.len() + self.storage_only.len() + self.revision_mismatch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Discipline code → bucket, ordered by code.
pub type DisciplineGroups = BTreeMap<String, DisciplineBucket>;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Register items carry an explicit discipline; parsed name and filename
/// tokens are used only when that cell is blank or a placeholder.
pub fn register_discipline(record: &DocumentRecord, catalog: &DisciplineCatalog) -> String {
    if let Some(code) = catalog.normalize_discipline(&record.discipline_code) {
        return code;
    }

    let parsed = crate::grammar::parse_with(catalog, &record.filename, "", "");
    if parsed.valid {
        return parsed.discipline_code;
    }

    catalog
        .discipline_in_filename(&record.filename)
        .unwrap_or_else(|| UNMAPPED.to_string())
}

/// Parsed discipline if valid, then the nearest mapped ancestor folder, then
/// a filename token scan.
pub fn storage_discipline(file: &StorageFile, catalog: &DisciplineCatalog) -> String {
    if file.parsed.valid {
        return file.parsed.discipline_code.clone();
    }

    if let Some(code) = file
        .path_context
        .iter()
        .rev()
        .find_map(|folder| catalog.discipline_for_folder(folder))
    {
        return code.to_string();
    }

    catalog
        .discipline_in_filename(&file.filename)
        .unwrap_or_else(|| UNMAPPED.to_string())
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Regroup every divergence under exactly one discipline. Item order within a
/// bucket follows the input order.
pub fn group_by_discipline(result: &ReconciliationResult, catalog: &DisciplineCatalog) -> DisciplineGroups {
    let mut groups = DisciplineGroups::new();

    for record in &result.register_only {
        groups
            .entry(register_discipline(record, catalog))
            .or_default()
            .register_only
            .push(record.clone());
    }

    for file in &result.storage_only {
        groups
            .entry(storage_discipline(file, catalog))
            .or_default()
            .storage_only
            .push(file.clone());
    }

    for mismatch in &result.revision_mismatch {
        groups
            .entry(register_discipline(&mismatch.register, catalog))
            .or_default()
            .revision_mismatch
            .push(mismatch.clone());
    }

    groups
}
