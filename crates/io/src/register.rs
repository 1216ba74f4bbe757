// Register reader: header detection and column aliasing over CSV/XLSX rows

use std::path::Path;

use docreg_recon::{DocumentRecord, ReconError};

/// Rows scanned for a header when none is configured.
pub const HEADER_SCAN_ROWS: usize = 30;

/// Positional fallback for the status column (column O).
const STATUS_FALLBACK_INDEX: usize = 14;

const FILENAME_ALIASES: &[&str] = &[
    "NOME DO ARQUIVO",
    "FULL_NAME",
    "FILENAME",
    "DOCUMENTO",
    "CÓDIGO CLIENTE",
    "NOME DO DOCUMENTO",
];
const DISCIPLINE_ALIASES: &[&str] = &["DISCIPLINA", "DISCIPLINA_LD", "DISC", "DISC."];
const REVISION_ALIASES: &[&str] = &[
    "REVISÃO ATUAL",
    "REVISAO_ATUAL_COL_G",
    "REV G",
    "REVISÃO",
    "REV.",
    "REV ATUAL",
    "REV. ATUAL",
];
const SITUATION_ALIASES: &[&str] = &["SITUAÇÃO", "SITUACAO_LD", "SITUACAO H", "STATUS H"];
const SUBDISCIPLINE_ALIASES: &[&str] = &[
    "SUBDISCIPLINA",
    "SUBDISCIPLINA_LD",
    "EDIFICAÇÃO",
    "SUB J",
    "SUBDISCIPLINAS",
    "SUB-DISCIPLINA",
];
const STATUS_ALIASES: &[&str] = &["STATUS", "STATUS_COL_O"];

#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// 1-based header row; auto-detected when `None`.
    pub header_row: Option<usize>,
    /// CSV delimiter; sniffed when `None`.
    pub delimiter: Option<u8>,
    /// Spreadsheet sheet; first sheet when `None`.
    pub sheet: Option<String>,
}

/// Column positions of the recognised register fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub filename: usize,
    pub revision: usize,
    pub discipline: Option<usize>,
    pub subdiscipline: Option<usize>,
    pub situation: Option<usize>,
    pub status: Option<usize>,
}

/// Read a register file (`.csv`, or any spreadsheet calamine opens).
pub fn read_register(path: &Path, options: &RegisterOptions) -> Result<Vec<DocumentRecord>, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "csv" | "txt" => crate::csv::read_rows(path, options.delimiter)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => crate::xlsx::read_rows(path, options.sheet.as_deref())?,
        other => return Err(format!("{}: unsupported register format '{other}'", path.display())),
    };

    let records = records_from_rows(&rows, options.header_row)?;
    log::info!("{}: {} register rows", path.display(), records.len());
    Ok(records)
}

/// Turn raw rows into register records. Values are trimmed and upper-cased;
/// rows without a filename are dropped.
pub fn records_from_rows(rows: &[Vec<String>], header_row: Option<usize>) -> Result<Vec<DocumentRecord>, String> {
    let header_idx = match header_row {
        Some(0) => return Err("header row is 1-based".to_string()),
        Some(n) => n - 1,
        None => detect_header_row(rows).ok_or_else(|| {
            ReconError::MissingColumn {
                column: format!("full_name/revisao_atual_col_g header within the first {HEADER_SCAN_ROWS} rows"),
            }
            .to_string()
        })?,
    };

    let header = rows
        .get(header_idx)
        .ok_or_else(|| format!("header row {} is past the end of the register ({} rows)", header_idx + 1, rows.len()))?;
    let columns = map_columns(header)?;
    log::debug!("register header at row {}: {columns:?}", header_idx + 1);

    let cell = |row: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i))
            .map(|v| v.trim().to_uppercase())
            .unwrap_or_default()
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in &rows[header_idx + 1..] {
        let filename = cell(row, Some(columns.filename));
        if filename.is_empty() {
            dropped += 1;
            continue;
        }
        records.push(DocumentRecord {
            filename,
            discipline_code: cell(row, columns.discipline),
            subdiscipline_code: cell(row, columns.subdiscipline),
            revision_raw: cell(row, Some(columns.revision)),
            situation_code: cell(row, columns.situation),
            status_code: cell(row, columns.status),
        });
    }
    if dropped > 0 {
        log::debug!("dropped {dropped} register rows without a filename");
    }

    Ok(records)
}

/// First row (within [`HEADER_SCAN_ROWS`]) holding both a filename and a revision alias.
pub fn detect_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().take(HEADER_SCAN_ROWS).position(|row| {
        find_column(row, FILENAME_ALIASES).is_some() && find_column(row, REVISION_ALIASES).is_some()
    })
}

pub fn map_columns(header: &[String]) -> Result<ColumnMap, String> {
    let filename = find_column(header, FILENAME_ALIASES).ok_or_else(|| {
        ReconError::MissingColumn { column: "full_name".into() }.to_string()
    })?;
    let revision = find_column(header, REVISION_ALIASES).ok_or_else(|| {
        ReconError::MissingColumn { column: "revisao_atual_col_g".into() }.to_string()
    })?;

    let status = find_column(header, STATUS_ALIASES).or_else(|| {
        // Column O carries the status in the standard register layout
        (header.len() > STATUS_FALLBACK_INDEX).then_some(STATUS_FALLBACK_INDEX)
    });

    Ok(ColumnMap {
        filename,
        revision,
        discipline: find_column(header, DISCIPLINE_ALIASES),
        subdiscipline: find_column(header, SUBDISCIPLINE_ALIASES),
        situation: find_column(header, SITUATION_ALIASES),
        status,
    })
}

fn find_column(header: &[String], aliases: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|h| aliases.contains(&h.trim().to_uppercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn detects_header_below_title_block() {
        let table = rows(&[
            &["LISTA DE DOCUMENTOS"],
            &["Projeto", "Galpão"],
            &[],
            &["Nome do Arquivo", "Disciplina", "Revisão Atual", "Situação"],
            &["25.2016.00.PC.ARQ.004.PLA", "arq", "02", "emitido"],
        ]);
        assert_eq!(detect_header_row(&table), Some(3));

        let records = records_from_rows(&table, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "25.2016.00.PC.ARQ.004.PLA");
        assert_eq!(records[0].discipline_code, "ARQ");
        assert_eq!(records[0].revision_raw, "02");
        assert_eq!(records[0].situation_code, "EMITIDO");
        assert_eq!(records[0].status_code, "");
    }

    #[test]
    fn configured_header_row_wins() {
        let table = rows(&[
            &["full_name", "revisao_atual_col_g"],
            &["ignored", "00"],
            &["Documento", "Rev."],
            &["a", "1"],
        ]);
        let records = records_from_rows(&table, Some(3)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "A");
    }

    #[test]
    fn status_falls_back_to_column_o() {
        let mut header: Vec<&str> = vec!["FULL_NAME", "REV G"];
        header.resize(15, "");
        let mut data: Vec<&str> = vec!["doc", "01"];
        data.resize(14, "");
        data.push("aprovado");
        let table = rows(&[&header, &data]);

        let records = records_from_rows(&table, None).unwrap();
        assert_eq!(records[0].status_code, "APROVADO");
    }

    #[test]
    fn rows_without_filename_are_dropped() {
        let table = rows(&[&["FILENAME", "REVISÃO"], &["", "01"], &["  ", "02"], &["x", ""]]);
        let records = records_from_rows(&table, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].revision_raw, "");
    }

    #[test]
    fn missing_revision_column() {
        let header = rows(&[&["FILENAME", "DISCIPLINA"]]);
        let err = map_columns(&header[0]).unwrap_err();
        assert!(err.contains("revisao_atual_col_g"));

        let err = records_from_rows(&header, None).unwrap_err();
        assert!(err.contains("missing column"));
    }

    #[test]
    fn header_row_past_end() {
        let table = rows(&[&["FILENAME", "REV."]]);
        assert!(records_from_rows(&table, Some(5)).is_err());
        assert!(records_from_rows(&table, Some(0)).is_err());
    }
}
