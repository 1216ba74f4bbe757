use std::collections::BTreeMap;

use serde::Serialize;

use crate::classify::UNMAPPED;
use crate::config::RegisterFilter;
use crate::discipline::DisciplineCatalog;
use crate::model::DocumentRecord;

/// Register composition: item counts by discipline, situation and status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegisterSummary {
    pub project: String,
    pub total: usize,
    pub filters: RegisterFilter,
    pub by_discipline: BTreeMap<String, usize>,
    pub by_situation: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

/// Placeholder key for blank situation/status cells.
const BLANK: &str = "(blank)";

impl RegisterSummary {
    pub fn build(
        project: &str,
        records: &[DocumentRecord],
        filters: &RegisterFilter,
        catalog: &DisciplineCatalog,
    ) -> Self {
        let mut summary = Self {
            project: project.to_string(),
            total: records.len(),
            filters: filters.clone(),
            ..Self::default()
        };

        for record in records {
            let discipline = catalog
                .normalize_discipline(&record.discipline_code)
                .unwrap_or_else(|| UNMAPPED.to_string());
            *summary.by_discipline.entry(discipline).or_default() += 1;
            *summary.by_situation.entry(bucket_label(&record.situation_code)).or_default() += 1;
            *summary.by_status.entry(bucket_label(&record.status_code)).or_default() += 1;
        }

        summary
    }
}

fn bucket_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        BLANK.to_string()
    } else {
        trimmed.to_uppercase()
    }
}
