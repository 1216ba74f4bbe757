use serde::{Deserialize, Serialize};

use crate::context::ProjectContext;
use crate::discipline::DisciplineCatalog;
use crate::grammar::{self, ParsedName};
use crate::revision::RevisionKey;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One register row. Field names on the wire follow the register reader's
/// column keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRecord {
    #[serde(rename = "full_name")]
    pub filename: String,
    #[serde(rename = "disciplina_ld")]
    pub discipline_code: String,
    #[serde(rename = "subdisciplina_ld")]
    pub subdiscipline_code: String,
    #[serde(rename = "revisao_atual_col_g")]
    pub revision_raw: String,
    #[serde(rename = "situacao_ld")]
    pub situation_code: String,
    #[serde(rename = "status_col_o")]
    pub status_code: String,
}

impl DocumentRecord {
    pub fn new(filename: &str, revision_raw: &str) -> Self {
        Self {
            filename: filename.to_string(),
            revision_raw: revision_raw.to_string(),
            ..Self::default()
        }
    }

    pub fn with_discipline(mut self, code: &str) -> Self {
        self.discipline_code = code.to_string();
        self
    }
}

/// One physical file in the storage snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageFile {
    #[serde(rename = "name")]
    pub filename: String,
    pub id: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(skip)]
    pub parsed: ParsedName,
    /// Folder names from the project root down to the file's parent.
    #[serde(rename = "path")]
    pub path_context: Vec<String>,
}

impl StorageFile {
    /// Build a descriptor, parsing the filename against the project context.
    pub fn new(
        filename: &str,
        id: &str,
        mime_type: &str,
        path_context: Vec<String>,
        context: &ProjectContext,
    ) -> Self {
        Self::with_catalog(DisciplineCatalog::standard(), filename, id, mime_type, path_context, context)
    }

    pub fn with_catalog(
        catalog: &DisciplineCatalog,
        filename: &str,
        id: &str,
        mime_type: &str,
        path_context: Vec<String>,
        context: &ProjectContext,
    ) -> Self {
        let parsed = grammar::parse_with(catalog, filename, &context.year, &context.project_code);
        Self {
            filename: filename.to_string(),
            id: id.to_string(),
            mime_type: mime_type.to_string(),
            parsed,
            path_context,
        }
    }

    /// Folder path joined with `/`.
    pub fn folder_path(&self) -> String {
        self.path_context.join("/")
    }
}

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// Sole join key between register and storage: same key means same document
/// at the same revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComparisonKey {
    pub base_name_key: String,
    pub revision: RevisionKey,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A register item paired with a storage file of the same base at another
/// revision. Never produced under exact-match policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionMismatch {
    pub register: DocumentRecord,
    pub storage: StorageFile,
    pub register_revision: RevisionKey,
    pub storage_revision: RevisionKey,
}

/// Run counters. They describe the run and never alter the result collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconStats {
    pub register_items: usize,
    pub register_skipped: usize,
    pub storage_files: usize,
    pub storage_duplicates: usize,
    pub storage_skipped: usize,
    pub matched_register: usize,
    pub matched_storage: usize,
    pub register_only: usize,
    pub storage_only: usize,
    pub superseded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub register_only: Vec<DocumentRecord>,
    pub storage_only: Vec<StorageFile>,
    pub revision_mismatch: Vec<RevisionMismatch>,
    pub stats: ReconStats,
}

impl ReconciliationResult {
    pub fn has_divergences(&self) -> bool {
        !self.register_only.is_empty()
            || !self.storage_only.is_empty()
            || !self.revision_mismatch.is_empty()
    }
}
