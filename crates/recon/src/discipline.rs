//! Discipline codes, their storage folders, and spelled-out names.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Discipline code → canonical storage folder name. Several codes share a folder.
const FOLDERS: &[(&str, &str)] = &[
    ("ARQ", "1 Arq"),
    ("CIV", "10 Civil"),
    ("EMT", "06 Estrutura Metalica"),
    ("ELE", "9 Elétr"),
    ("HID", "04 Hidráulica"),
    ("MEC", "7 Mec"),
    ("TUB", "12 Tub"),
    ("INC", "4 A Inc"),
    ("HVA", "8 HVA"),
    ("AUT", "05 Automação"),
    ("FUN", "10 Civil"),
    ("PIS", "10 Civil"),
    ("PAV", "10 Civil"),
    ("TER", "10 Civil"),
    ("IFRA", "2 Ifra"),
    ("TEL", "3 Tel"),
    ("INSTR", "5 Instr"),
    ("PROC", "11 Processos"),
    ("NVP", "13 Nuvens"),
    ("BIM", "14 BIM"),
    ("ECC", "10 Civil"),
    ("UTL", "11 Processos"),
    ("PRO", "11 Processos"),
    ("INS", "5 Instr"),
];

/// Spelled-out discipline names found in register discipline columns.
const FULL_NAMES: &[(&str, &str)] = &[
    ("ARQUITETURA", "ARQ"),
    ("AUTOMAÇÃO", "AUT"),
    ("AUTOMACAO", "AUT"),
    ("ELÉTRICA", "ELE"),
    ("ELETRICA", "ELE"),
    ("HIDRÁULICA", "HID"),
    ("HIDRAULICA", "HID"),
    ("HVAC", "HVA"),
    ("UTILIDADES", "UTL"),
    ("TERRAPLANAGEM", "TER"),
    ("TUBULAÇÃO", "TUB"),
    ("TUBULACAO", "TUB"),
    ("MECÂNICA", "MEC"),
    ("MECANICA", "MEC"),
    ("GERAL CIVIL", "CIV"),
    ("ESTRUTURA METÁLICA", "EMT"),
    ("ESTRUTURA METALICA", "EMT"),
    ("ESTRUTURA DE CONCRETO", "ECC"),
    ("FUNDAÇÕES E CONTENÇÕES", "FUN"),
    ("FUNDACOES E CONTENCOES", "FUN"),
    ("PISO INDUSTRIAL", "PIS"),
    ("PAVIMENTAÇÃO", "PAV"),
    ("PAVIMENTACAO", "PAV"),
    ("ALVENARIA ESTRUTURAL", "ALV"),
    ("PAREDES DE CONCRETO", "PCC"),
    ("SISTEMA DE INCÊNDIO", "INC"),
    ("SISTEMA DE INCENDIO", "INC"),
    ("IRRIGAÇÃO", "IRR"),
    ("IRRIGACAO", "IRR"),
    ("NUVEM DE PONTOS", "NVP"),
    ("MODELO FEDERADO", "BIM"),
    ("IMPERMEABILIZAÇÃO", "IMP"),
    ("IMPERMEABILIZACAO", "IMP"),
];

/// Known disciplines and their subdisciplines. Membership here is what makes a
/// parsed discipline code valid.
const SUBDISCIPLINES: &[(&str, &[&str])] = &[
    ("ELE", &["DIA", "TOM", "ILU", "PDA", "SDA", "RCA", "DET", "MDD", "MDC", "LCA", "LAY", "LDM", "BIM", "TEL"]),
    ("HID", &["AFP", "APL", "DRE", "AQP", "ESG", "BIM"]),
    ("HVA", &["DES", "COR", "DET", "MDC", "MDE", "LDE", "BIM"]),
    ("UTL", &["FLU", "ISO", "DES", "PLM", "SUP", "ESP"]),
    ("TER", &["PLC", "SEC", "DET", "LDM", "MDE", "MDC", "BIM"]),
    ("TUB", &["ISO", "DES", "PLM", "SUP", "ESP"]),
    ("MEC", &["PLC", "FLU", "PLM", "DES", "SUP", "MEM", "BIM"]),
    ("ARQ", &["VIS", "PRE", "COB", "IMP", "PLP", "PLF", "PLA", "DET", "COR", "ELE", "PAI", "MDD", "PQT", "LDE", "BIM", "NVP"]),
    ("EMT", &["PLC", "PLS", "DET", "COR", "ELE", "GER", "LDM", "MDE", "MDC", "BIM"]),
    ("ECC", &["PLC", "PFO", "COR", "DTV", "DTL", "DTP", "DTF", "DPR", "DET", "GER", "LDM", "MDE", "MDC", "BIM"]),
    ("FUN", &["PLC", "DET", "GER", "LDM", "MDE", "MDC", "BIM"]),
    ("PIS", &["PIS", "DET", "LDM", "MDE", "MDC", "BIM"]),
    ("PAV", &["PLA", "DET", "LDM", "MDE", "MDC", "BIM"]),
    ("ALV", &["PLA", "PAR", "DET", "GER", "LDM", "MDE", "MDC", "BIM"]),
    ("PCC", &["PLA", "PAR", "DET", "GER", "LDM", "MDE", "MDC", "BIM"]),
    ("CIV", &["BIM"]),
    ("INC", &["EQU", "SPK", "MDC", "MDE", "LDE", "BIM"]),
    ("IRR", &["DES", "PQT", "ESP"]),
    ("NVP", &["MOD"]),
    ("BIM", &["FDR"]),
    ("IMP", &["DES", "MDD", "PQT"]),
    ("AUT", &["ARA", "TOP", "RRE", "RCR", "SEG", "RCS", "FLU", "DES", "DET", "MDD", "LDE", "LDM", "BIM"]),
    ("TEL", &[]),
    ("INSTR", &[]),
    ("PROC", &[]),
    ("INS", &[]),
];

/// Register discipline values that mean "not filled in".
const UNDEFINED_MARKERS: &[&str] = &["INDEFINIDA", "UNDEFINED", "N/A", "-"];

/// Lookup tables for discipline resolution.
#[derive(Debug, Clone)]
pub struct DisciplineCatalog {
    folder_by_code: BTreeMap<String, String>,
    /// Upper-cased folder name → code.
    code_by_folder: HashMap<String, String>,
    code_by_full_name: HashMap<String, String>,
    subdisciplines: BTreeMap<String, Vec<String>>,
}

impl Default for DisciplineCatalog {
    fn default() -> Self {
        let mut catalog = Self {
            folder_by_code: BTreeMap::new(),
            code_by_folder: HashMap::new(),
            code_by_full_name: HashMap::new(),
            subdisciplines: BTreeMap::new(),
        };

        for (code, folder) in FOLDERS {
            catalog.folder_by_code.insert(code.to_string(), folder.to_string());
            // First code listed for a shared folder owns it.
            catalog
                .code_by_folder
                .entry(folder.to_uppercase())
                .or_insert_with(|| code.to_string());
        }
        for (name, code) in FULL_NAMES {
            catalog.code_by_full_name.insert(name.to_string(), code.to_string());
        }
        for (code, subs) in SUBDISCIPLINES {
            catalog
                .subdisciplines
                .insert(code.to_string(), subs.iter().map(|s| s.to_string()).collect());
        }

        catalog
    }
}

impl DisciplineCatalog {
    /// Shared built-in catalog.
    pub fn standard() -> &'static DisciplineCatalog {
        static STANDARD: OnceLock<DisciplineCatalog> = OnceLock::new();
        STANDARD.get_or_init(DisciplineCatalog::default)
    }

    /// Add (or override) a folder → discipline mapping.
    pub fn with_folder(mut self, folder: &str, code: &str) -> Self {
        self.code_by_folder.insert(folder.trim().to_uppercase(), code.trim().to_uppercase());
        self
    }

    /// Whether `code` is a known discipline for filename validation.
    pub fn is_known(&self, code: &str) -> bool {
        self.subdisciplines.contains_key(code)
    }

    pub fn subdisciplines(&self, code: &str) -> &[String] {
        self.subdisciplines.get(code).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn folder_for(&self, code: &str) -> Option<&str> {
        self.folder_by_code.get(code).map(|s| s.as_str())
    }

    /// Discipline owning a storage folder, compared case-insensitively.
    pub fn discipline_for_folder(&self, folder: &str) -> Option<&str> {
        self.code_by_folder.get(&folder.trim().to_uppercase()).map(|s| s.as_str())
    }

    /// Normalize a register discipline cell: full names map to codes, blank or
    /// placeholder values yield `None`, anything else is returned upper-cased.
    pub fn normalize_discipline(&self, raw: &str) -> Option<String> {
        let upper = raw.trim().to_uppercase();
        if upper.is_empty() || UNDEFINED_MARKERS.contains(&upper.as_str()) {
            return None;
        }
        if let Some(code) = self.code_by_full_name.get(&upper) {
            return Some(code.clone());
        }
        Some(upper)
    }

    /// Heuristic: find a known three-letter discipline code among the filename's tokens.
    ///
    /// The fifth dotted segment (the discipline slot of the naming convention) is
    /// checked first; then every `.`/`_`/`-`/space separated token in order.
    pub fn discipline_in_filename(&self, filename: &str) -> Option<String> {
        let upper = filename.to_uppercase();

        let dotted: Vec<&str> = upper.split('.').collect();
        if dotted.len() >= 6 {
            let candidate = dotted[4];
            if candidate.len() == 3 && self.is_known(candidate) {
                return Some(candidate.to_string());
            }
        }

        upper
            .split(['.', '_', '-', ' '])
            .find(|token| token.len() == 3 && self.is_known(token))
            .map(|token| token.to_string())
    }
}
