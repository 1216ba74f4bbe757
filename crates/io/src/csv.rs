// CSV register tables

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Read every row of a CSV file as trimmed strings. The delimiter is sniffed
/// when not given.
pub fn read_rows(path: &Path, delimiter: Option<u8>) -> Result<Vec<Vec<String>>, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    rows_from_string(&content, delimiter)
}

/// Detect the field delimiter among tab, semicolon, comma and pipe.
///
/// Registers exported from spreadsheets often start with a title block of
/// short rows, so the sample is scored by the most common field count rather
/// than the first line: the delimiter whose modal field count (>1), times the
/// number of lines sharing it, is highest wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(40).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let mut frequency: HashMap<usize, u64> = HashMap::new();
        for line in &sample_lines {
            let fields = ::csv::ReaderBuilder::new()
                .delimiter(delim)
                .has_headers(false)
                .flexible(true)
                .from_reader(line.as_bytes())
                .records()
                .next()
                .and_then(|r| r.ok())
                .map(|r| r.len())
                .unwrap_or(1);
            if fields > 1 {
                *frequency.entry(fields).or_default() += 1;
            }
        }

        // Higher field count breaks ties
        let score = frequency
            .iter()
            .map(|(&fields, &lines)| lines * fields as u64)
            .max()
            .unwrap_or(0);

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed. A UTF-8 BOM is dropped; invalid
/// UTF-8 is decoded as Windows-1252 (common for Excel-exported CSVs).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file =
        std::fs::File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {e}", path.display()))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn rows_from_string(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>, String> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(|f| f.trim().to_string()).collect());
    }
    Ok(rows)
}
