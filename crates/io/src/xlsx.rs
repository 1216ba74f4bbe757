// Excel import (register tables) and export (reconciliation reports)

use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

use docreg_recon::{DisciplineBucket, DocumentRecord, RegisterSummary};

use crate::report::{storage_revision_label, ReconReport, ReportMeta};

/// Excel's sheet name limit.
const MAX_SHEET_NAME: usize = 31;

const SUMMARY_SHEET: &str = "Summary";

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read one sheet (the named one, or the first) as rows of trimmed strings.
pub fn read_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file {}: {}", path.display(), e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| format!("{}: no sheet named '{wanted}' (have: {})", path.display(), sheet_names.join(", ")))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Format nicely: integers without decimals
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => format!("{}", n),
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string().trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Sheet-safe name: Excel's forbidden characters become `_`, max 31 chars.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '[' | ']' | '*' | '?' | ':' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// One distinct sheet name per discipline code, in order. Excel compares
/// sheet names case-insensitively; `reserved` names (e.g. `Summary`) are
/// already taken. A colliding name gets a `~N` suffix within the length limit.
pub fn unique_sheet_names<'a>(codes: impl IntoIterator<Item = &'a str>, reserved: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = reserved.iter().map(|r| r.to_lowercase()).collect();
    let mut names = Vec::new();
    for code in codes {
        let base = sanitize_sheet_name(code);
        let mut name = base.clone();
        let mut n = 2usize;
        while taken.contains(&name.to_lowercase()) {
            let suffix = format!("~{n}");
            let keep = MAX_SHEET_NAME - suffix.chars().count();
            name = base.chars().take(keep).collect::<String>() + &suffix;
            n += 1;
        }
        taken.insert(name.to_lowercase());
        names.push(name);
    }
    names
}

fn header_format() -> Format {
    Format::new().set_bold()
}

fn write_header(ws: &mut Worksheet, row: u32, headers: &[&str], bold: &Format) -> Result<(), String> {
    for (col, title) in headers.iter().enumerate() {
        ws.write_string_with_format(row, col as u16, *title, bold)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }
    Ok(())
}

fn write_row(ws: &mut Worksheet, row: u32, values: &[&str]) -> Result<(), String> {
    for (col, value) in values.iter().enumerate() {
        ws.write_string(row, col as u16, *value)
            .map_err(|e| format!("Failed to write cell: {}", e))?;
    }
    Ok(())
}

fn write_pair(ws: &mut Worksheet, row: u32, label: &str, value: &str, bold: &Format) -> Result<(), String> {
    ws.write_string_with_format(row, 0, label, bold)
        .map_err(|e| format!("Failed to write cell: {}", e))?;
    ws.write_string(row, 1, value)
        .map_err(|e| format!("Failed to write cell: {}", e))?;
    Ok(())
}

const REGISTER_HEADERS: &[&str] = &["Filename", "Discipline", "Subdiscipline", "Revision", "Situation", "Status"];
const STORAGE_HEADERS: &[&str] = &["Filename", "Revision", "Folder", "Id"];

fn register_values(r: &DocumentRecord) -> [&str; 6] {
    [
        r.filename.as_str(),
        r.discipline_code.as_str(),
        r.subdiscipline_code.as_str(),
        r.revision_raw.as_str(),
        r.situation_code.as_str(),
        r.status_code.as_str(),
    ]
}

/// Write the reconciliation report: a `Summary` sheet plus one sheet per
/// discipline with its register-only table and storage-only list.
pub fn export_report(report: &ReconReport, path: &Path) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let bold = header_format();
    let sheet_names = unique_sheet_names(report.disciplines.keys().map(String::as_str), &[SUMMARY_SHEET]);

    {
        let ws = workbook
            .add_worksheet()
            .set_name(SUMMARY_SHEET)
            .map_err(|e| format!("Failed to create sheet 'Summary': {}", e))?;
        write_meta(ws, &report.meta, &bold)?;

        let s = &report.stats;
        let counters: [(&str, usize); 10] = [
            ("Register items", s.register_items),
            ("Register items skipped", s.register_skipped),
            ("Storage files", s.storage_files),
            ("Duplicate storage names", s.storage_duplicates),
            ("Storage files skipped", s.storage_skipped),
            ("Matched register items", s.matched_register),
            ("Matched storage files", s.matched_storage),
            ("Register only", s.register_only),
            ("Storage only", s.storage_only),
            ("Superseded revisions", s.superseded),
        ];
        let mut row = 4u32;
        for (label, value) in counters {
            ws.write_string_with_format(row, 0, label, &bold)
                .map_err(|e| format!("Failed to write cell: {}", e))?;
            ws.write_number(row, 1, value as f64)
                .map_err(|e| format!("Failed to write cell: {}", e))?;
            row += 1;
        }

        row += 1;
        write_header(ws, row, &["Discipline", "Register only", "Storage only", "Sheet"], &bold)?;
        for ((code, bucket), sheet) in report.disciplines.iter().zip(&sheet_names) {
            row += 1;
            ws.write_string(row, 0, code)
                .map_err(|e| format!("Failed to write cell: {}", e))?;
            ws.write_number(row, 1, bucket.register_only.len() as f64)
                .map_err(|e| format!("Failed to write cell: {}", e))?;
            ws.write_number(row, 2, bucket.storage_only.len() as f64)
                .map_err(|e| format!("Failed to write cell: {}", e))?;
            ws.write_string(row, 3, sheet)
                .map_err(|e| format!("Failed to write cell: {}", e))?;
        }
        ws.set_column_width(0, 28)
            .map_err(|e| format!("Failed to set column width: {}", e))?;
    }

    for (bucket, name) in report.disciplines.values().zip(&sheet_names) {
        let ws = workbook
            .add_worksheet()
            .set_name(name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;
        write_bucket(ws, bucket, &bold)?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

fn write_meta(ws: &mut Worksheet, meta: &ReportMeta, bold: &Format) -> Result<(), String> {
    write_pair(ws, 0, "Project", &meta.project, bold)?;
    write_pair(ws, 1, "Generated at", &meta.run_at, bold)?;
    write_pair(ws, 2, "Engine version", &meta.engine_version, bold)?;
    Ok(())
}

/// Register-only table on top (header frozen and filtered), storage-only list below it.
fn write_bucket(ws: &mut Worksheet, bucket: &DisciplineBucket, bold: &Format) -> Result<(), String> {
    write_header(ws, 0, REGISTER_HEADERS, bold)?;
    let mut row = 0u32;
    for record in &bucket.register_only {
        row += 1;
        write_row(ws, row, &register_values(record))?;
    }
    ws.set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to freeze panes: {}", e))?;
    ws.autofilter(0, 0, row, (REGISTER_HEADERS.len() - 1) as u16)
        .map_err(|e| format!("Failed to set autofilter: {}", e))?;

    row += 2;
    ws.write_string_with_format(row, 0, "Storage only", bold)
        .map_err(|e| format!("Failed to write cell: {}", e))?;
    row += 1;
    write_header(ws, row, STORAGE_HEADERS, bold)?;
    for file in &bucket.storage_only {
        row += 1;
        let revision = storage_revision_label(file);
        let folder = file.folder_path();
        write_row(ws, row, &[file.filename.as_str(), revision.as_str(), folder.as_str(), file.id.as_str()])?;
    }

    ws.set_column_width(0, 45)
        .map_err(|e| format!("Failed to set column width: {}", e))?;
    ws.set_column_width(2, 30)
        .map_err(|e| format!("Failed to set column width: {}", e))?;
    Ok(())
}

/// Write a register summary: `Metadata` (project, filters, counts) and the
/// filtered `Register` rows.
pub fn export_register_summary(
    summary: &RegisterSummary,
    records: &[DocumentRecord],
    meta: &ReportMeta,
    path: &Path,
) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let bold = header_format();

    {
        let ws = workbook
            .add_worksheet()
            .set_name("Metadata")
            .map_err(|e| format!("Failed to create sheet 'Metadata': {}", e))?;
        write_meta(ws, meta, &bold)?;
        write_pair(ws, 3, "Total documents", &summary.total.to_string(), &bold)?;

        let filters = &summary.filters;
        let shown = |f: &Option<String>| f.clone().unwrap_or_else(|| "(all)".to_string());
        write_pair(ws, 4, "Discipline filter", &shown(&filters.discipline), &bold)?;
        write_pair(ws, 5, "Subdiscipline filter", &shown(&filters.subdiscipline), &bold)?;
        write_pair(ws, 6, "Situation filter", &shown(&filters.situation), &bold)?;

        let mut row = 8u32;
        for (title, counts) in [
            ("Discipline", &summary.by_discipline),
            ("Situation", &summary.by_situation),
            ("Status", &summary.by_status),
        ] {
            write_header(ws, row, &[title, "Documents"], &bold)?;
            for (key, count) in counts {
                row += 1;
                ws.write_string(row, 0, key)
                    .map_err(|e| format!("Failed to write cell: {}", e))?;
                ws.write_number(row, 1, *count as f64)
                    .map_err(|e| format!("Failed to write cell: {}", e))?;
            }
            row += 2;
        }
        ws.set_column_width(0, 28)
            .map_err(|e| format!("Failed to set column width: {}", e))?;
    }

    {
        let ws = workbook
            .add_worksheet()
            .set_name("Register")
            .map_err(|e| format!("Failed to create sheet 'Register': {}", e))?;
        write_header(ws, 0, REGISTER_HEADERS, &bold)?;
        let mut row = 0u32;
        for record in records {
            row += 1;
            write_row(ws, row, &register_values(record))?;
        }
        ws.set_freeze_panes(1, 0)
            .map_err(|e| format!("Failed to freeze panes: {}", e))?;
        ws.autofilter(0, 0, row, (REGISTER_HEADERS.len() - 1) as u16)
            .map_err(|e| format!("Failed to set autofilter: {}", e))?;
        ws.set_column_width(0, 45)
            .map_err(|e| format!("Failed to set column width: {}", e))?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use docreg_recon::{
        group_by_discipline, run, DisciplineCatalog, ProjectContext, RegisterFilter, StorageFile,
    };

    fn sheet_names(path: &Path) -> Vec<String> {
        let workbook: Sheets<_> = open_workbook_auto(path).unwrap();
        workbook.sheet_names().to_vec()
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("ARQ"), "ARQ");
        assert_eq!(sanitize_sheet_name("A/B:C*?"), "A_B_C__");
        assert_eq!(sanitize_sheet_name(&"X".repeat(40)).len(), 31);
        assert_eq!(sanitize_sheet_name(""), "_");
    }

    #[test]
    fn test_unique_sheet_names() {
        let long_a = format!("{}A", "INSTALACOES ESPECIAIS DE AR COMPRIMIDO");
        let long_b = format!("{}B", "INSTALACOES ESPECIAIS DE AR COMPRIMIDO");
        let codes = ["ARQ/ELE", "ARQ_ELE", "arq_ele", "SUMMARY", long_a.as_str(), long_b.as_str()];
        let names = unique_sheet_names(codes, &["Summary"]);

        assert_eq!(names[0], "ARQ_ELE");
        assert_eq!(names[1], "ARQ_ELE~2");
        assert_eq!(names[2], "arq_ele~3");
        assert_eq!(names[3], "SUMMARY~2");
        assert_eq!(names[4], "INSTALACOES ESPECIAIS DE AR COM");
        assert_eq!(names[5], "INSTALACOES ESPECIAIS DE AR C~2");
        assert!(names.iter().all(|n| n.chars().count() <= 31));

        let lowered: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        assert_eq!(lowered.len(), names.len());
    }

    #[test]
    fn test_report_with_colliding_discipline_codes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("collide.xlsx");

        let register = [
            DocumentRecord::new("Planta A", "01").with_discipline("ARQ/ELE"),
            DocumentRecord::new("Planta B", "01").with_discipline("ARQ_ELE"),
            DocumentRecord::new("Planta C", "01").with_discipline("SUMMARY"),
        ];
        let storage = [StorageFile::new(
            "foto.pdf",
            "foto.pdf",
            "application/pdf",
            Vec::new(),
            &ProjectContext::default(),
        )];
        let result = run(&register, &storage).unwrap();
        let groups = group_by_discipline(&result, DisciplineCatalog::standard());
        let report = ReconReport::new(ReportMeta::now("W"), &result, groups);

        export_report(&report, &path).unwrap();
        assert_eq!(
            sheet_names(&path),
            vec!["Summary", "ARQ_ELE", "ARQ_ELE~2", "SUMMARY~2", "UNMAPPED"]
        );

        let second = read_rows(&path, Some("ARQ_ELE~2")).unwrap();
        assert_eq!(second[1][0], "Planta B");
        assert_eq!(second[1][1], "ARQ_ELE");

        let summary = read_rows(&path, Some("Summary")).unwrap();
        let listed = summary.iter().find(|r| r[0] == "ARQ/ELE").unwrap();
        assert_eq!(listed[3], "ARQ_ELE");
    }

    #[test]
    fn test_report_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("divergences.xlsx");

        let register = [
            DocumentRecord::new("25.2016.00.PC.ARQ.004.PLA", "02").with_discipline("ARQ"),
            DocumentRecord::new("25.2016.00.PC.ELE.001.ILU", "00").with_discipline("ELE"),
        ];
        let storage = [StorageFile::new(
            "foto.pdf",
            "Recebidos/foto.pdf",
            "application/pdf",
            vec!["Recebidos".into()],
            &ProjectContext::default(),
        )];
        let result = run(&register, &storage).unwrap();
        let groups = group_by_discipline(&result, DisciplineCatalog::standard());
        let report = ReconReport::new(ReportMeta::now("L25_2016 - Warehouse"), &result, groups);

        export_report(&report, &path).unwrap();
        assert_eq!(sheet_names(&path), vec!["Summary", "ARQ", "ELE", "UNMAPPED"]);

        let rows = read_rows(&path, Some("arq")).unwrap();
        assert_eq!(rows[0][0], "Filename");
        assert_eq!(rows[1][0], "25.2016.00.PC.ARQ.004.PLA");
        assert_eq!(rows[1][3], "02");

        let summary = read_rows(&path, None).unwrap();
        assert_eq!(summary[0][1], "L25_2016 - Warehouse");
        let storage_only = summary.iter().find(|r| r[0] == "Storage only").unwrap();
        assert_eq!(storage_only[1], "1");

        let unmapped = read_rows(&path, Some("UNMAPPED")).unwrap();
        let listed = unmapped.iter().find(|r| r[0] == "foto.pdf").unwrap();
        assert_eq!(listed[1], "N/A");
        assert_eq!(listed[2], "Recebidos");
    }

    #[test]
    fn test_register_summary_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.xlsx");

        let records = vec![
            DocumentRecord::new("A", "01").with_discipline("ARQ"),
            DocumentRecord::new("B", "02").with_discipline("ELE"),
        ];
        let summary = RegisterSummary::build(
            "Warehouse",
            &records,
            &RegisterFilter::default(),
            DisciplineCatalog::standard(),
        );
        export_register_summary(&summary, &records, &ReportMeta::now("Warehouse"), &path).unwrap();

        assert_eq!(sheet_names(&path), vec!["Metadata", "Register"]);
        let rows = read_rows(&path, Some("Register")).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][1], "ELE");
    }

    #[test]
    fn test_missing_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.xlsx");
        let records = vec![DocumentRecord::new("A", "01")];
        let summary =
            RegisterSummary::build("W", &records, &RegisterFilter::default(), DisciplineCatalog::standard());
        export_register_summary(&summary, &records, &ReportMeta::now("W"), &path).unwrap();

        let err = read_rows(&path, Some("LD")).unwrap_err();
        assert!(err.contains("no sheet named 'LD'"));
    }
}
