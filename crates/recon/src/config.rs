use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::ProjectContext;
use crate::discipline::DisciplineCatalog;
use crate::error::ReconError;
use crate::model::DocumentRecord;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    /// Project folder name, e.g. `L25_2016 - Warehouse`.
    pub name: String,
    #[serde(default)]
    pub context: ContextConfig,
    pub register: RegisterConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub filters: RegisterFilter,
    #[serde(default)]
    pub disciplines: DisciplinesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Overrides for the year and project code derived from `name`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    pub year: Option<String>,
    pub project_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Register + Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterConfig {
    /// `.csv` or `.xlsx`, relative to the config file.
    pub file: String,
    /// 1-based header row; auto-detected when absent.
    #[serde(default)]
    pub header_row: Option<usize>,
    /// CSV only; sniffed when absent.
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Spreadsheet only; first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Local mirror of the storage tree.
    #[serde(default)]
    pub root: Option<String>,
    /// JSON listing exported from the storage API.
    #[serde(default)]
    pub manifest: Option<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    ["pdf", "dwg", "ifc", "nwd"].iter().map(|s| s.to_string()).collect()
}

/// Where the storage snapshot comes from, resolved against the config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSource {
    Folder(PathBuf),
    Manifest(PathBuf),
}

impl StorageConfig {
    /// Lower-cased extension allow-list without leading dots.
    pub fn allowed_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Case-insensitive equality filters on register rows. Absent fields accept all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdiscipline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
}

impl RegisterFilter {
    pub fn is_empty(&self) -> bool {
        self.discipline.is_none() && self.subdiscipline.is_none() && self.situation.is_none()
    }

    pub fn matches(&self, record: &DocumentRecord) -> bool {
        fn accepts(filter: &Option<String>, value: &str) -> bool {
            match filter {
                Some(wanted) => wanted.trim().to_uppercase() == value.trim().to_uppercase(),
                None => true,
            }
        }
        accepts(&self.discipline, &record.discipline_code)
            && accepts(&self.subdiscipline, &record.subdiscipline_code)
            && accepts(&self.situation, &record.situation_code)
    }

    pub fn apply(&self, records: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
        if self.is_empty() {
            return records;
        }
        let before = records.len();
        let kept: Vec<DocumentRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        log::info!("register filter kept {} of {before} rows", kept.len());
        kept
    }
}

// ---------------------------------------------------------------------------
// Disciplines + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisciplinesConfig {
    /// Extra folder name → discipline code entries.
    #[serde(default)]
    pub folders: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub xlsx: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        // Register file must be a CSV or XLSX
        let file = self.register.file.trim();
        let lower = file.to_lowercase();
        if file.is_empty() {
            return Err(ReconError::ConfigValidation("register.file must not be empty".into()));
        }
        if !lower.ends_with(".csv") && !lower.ends_with(".xlsx") {
            return Err(ReconError::ConfigValidation(format!(
                "register.file '{file}' must be a .csv or .xlsx file"
            )));
        }
        if self.register.header_row == Some(0) {
            return Err(ReconError::ConfigValidation(
                "register.header_row is 1-based and must be at least 1".into(),
            ));
        }
        if let Some(ref delimiter) = self.register.delimiter {
            if delimiter.chars().count() != 1 {
                return Err(ReconError::ConfigValidation(format!(
                    "register.delimiter must be a single character, got '{delimiter}'"
                )));
            }
        }

        // Exactly one storage source
        match (&self.storage.root, &self.storage.manifest) {
            (Some(_), Some(_)) => {
                return Err(ReconError::ConfigValidation(
                    "storage.root and storage.manifest are mutually exclusive".into(),
                ))
            }
            (None, None) => {
                return Err(ReconError::ConfigValidation(
                    "one of storage.root or storage.manifest is required".into(),
                ))
            }
            _ => {}
        }
        if self.storage.allowed_extensions().iter().all(|e| e.is_empty()) {
            return Err(ReconError::ConfigValidation(
                "storage.extensions must list at least one extension".into(),
            ));
        }

        for (folder, code) in &self.disciplines.folders {
            let valid = (3..=5).contains(&code.len())
                && code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
            if !valid {
                return Err(ReconError::ConfigValidation(format!(
                    "disciplines.folders: '{folder}' maps to '{code}', expected 3-5 upper-case letters or digits"
                )));
            }
        }

        Ok(())
    }

    /// Year and project code from `name`, with `[context]` overrides applied.
    pub fn project_context(&self) -> ProjectContext {
        ProjectContext::from_project_name(&self.name)
            .with_overrides(self.context.year.as_deref(), self.context.project_code.as_deref())
    }

    /// Built-in catalog plus the configured folder mappings.
    pub fn catalog(&self) -> DisciplineCatalog {
        self.disciplines
            .folders
            .iter()
            .fold(DisciplineCatalog::standard().clone(), |catalog, (folder, code)| {
                catalog.with_folder(folder, code)
            })
    }

    pub fn register_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(self.register.file.trim())
    }

    pub fn storage_source(&self, base_dir: &Path) -> Result<StorageSource, ReconError> {
        match (&self.storage.root, &self.storage.manifest) {
            (Some(root), None) => Ok(StorageSource::Folder(base_dir.join(root))),
            (None, Some(manifest)) => Ok(StorageSource::Manifest(base_dir.join(manifest))),
            _ => Err(ReconError::ConfigValidation(
                "exactly one of storage.root or storage.manifest is required".into(),
            )),
        }
    }

    /// Delimiter as a byte, if configured.
    pub fn delimiter(&self) -> Option<u8> {
        self.register
            .delimiter
            .as_deref()
            .and_then(|d| d.bytes().next())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "L25_2016 - Warehouse"

[register]
file = "register.csv"

[storage]
root = "drive"
"#;

    #[test]
    fn parse_minimal() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "L25_2016 - Warehouse");
        assert_eq!(config.register.header_row, None);
        assert_eq!(config.storage.extensions, vec!["pdf", "dwg", "ifc", "nwd"]);
        assert!(config.filters.is_empty());
        assert!(config.output.json.is_none());
        assert_eq!(config.project_context(), ProjectContext::new("2025", "2016"));
        assert_eq!(
            config.storage_source(Path::new("/p")).unwrap(),
            StorageSource::Folder(PathBuf::from("/p/drive"))
        );
    }

    #[test]
    fn parse_full() {
        let input = r#"
name = "Warehouse"

[context]
year = "2024"
project_code = "0311"

[register]
file = "LD.xlsx"
header_row = 14
sheet = "LD"

[storage]
manifest = "listing.json"
extensions = [".PDF", "dwg"]

[filters]
discipline = "arq"
situation = "EMITIDO"

[disciplines.folders]
"15 Paisagismo" = "PAI"

[output]
json = "out.json"
xlsx = "out.xlsx"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.project_context(), ProjectContext::new("2024", "0311"));
        assert_eq!(config.register.header_row, Some(14));
        assert_eq!(config.register.sheet.as_deref(), Some("LD"));
        assert_eq!(config.storage.allowed_extensions(), vec!["pdf", "dwg"]);
        assert_eq!(config.filters.discipline.as_deref(), Some("arq"));
        assert_eq!(config.output.xlsx.as_deref(), Some("out.xlsx"));
        assert_eq!(config.catalog().discipline_for_folder("15 paisagismo"), Some("PAI"));
        assert!(matches!(config.storage_source(Path::new(".")).unwrap(), StorageSource::Manifest(_)));
    }

    #[test]
    fn reject_both_storage_sources() {
        let input = VALID.replace("root = \"drive\"", "root = \"drive\"\nmanifest = \"x.json\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn reject_missing_storage_source() {
        let input = VALID.replace("root = \"drive\"", "");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("storage.root or storage.manifest"));
    }

    #[test]
    fn reject_bad_register_file() {
        let input = VALID.replace("register.csv", "register.txt");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains(".csv or .xlsx"));
    }

    #[test]
    fn reject_zero_header_row() {
        let input = VALID.replace("file = \"register.csv\"", "file = \"register.csv\"\nheader_row = 0");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("header_row"));
    }

    #[test]
    fn reject_bad_folder_code() {
        let input = format!("{VALID}\n[disciplines.folders]\n\"15 Paisagismo\" = \"pai\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("15 Paisagismo"));
    }

    #[test]
    fn reject_unknown_key() {
        let input = format!("{VALID}\n[output]\ncsv = \"x.csv\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_empty_name() {
        let input = VALID.replace("L25_2016 - Warehouse", " ");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn filter_is_case_insensitive() {
        let filter = RegisterFilter {
            discipline: Some("arq".into()),
            situation: Some("Emitido".into()),
            ..RegisterFilter::default()
        };
        let mut record = DocumentRecord::new("a", "01").with_discipline("ARQ");
        record.situation_code = "EMITIDO".into();
        assert!(filter.matches(&record));

        record.situation_code = "CANCELADO".into();
        assert!(!filter.matches(&record));

        let kept = filter.apply(vec![record.clone(), DocumentRecord::new("b", "01")]);
        assert!(kept.is_empty());
        assert_eq!(RegisterFilter::default().apply(vec![record]).len(), 1);
    }
}
