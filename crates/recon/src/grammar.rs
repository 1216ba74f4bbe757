//! Document filename grammar.
//!
//! Project documents are named `YY.CCCC.BB.PP.DDD.SSS.SSS[.VVV][.Rnn]`:
//! year, project code, building, phase, discipline, sequence, subdiscipline,
//! an optional sheet/variant segment and an optional revision. The accepted
//! shapes are listed in [`GRAMMARS`] in precedence order; the first one that
//! matches the upper-cased stem wins.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::discipline::DisciplineCatalog;

/// Extensions stripped before matching. Anything else is part of the stem, so
/// register names without an extension (`...ARQ.004.PLA`) keep their last segment.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "pdf", "dwg", "dxf", "ifc", "nwd", "nwc", "rvt", "xlsx", "xls", "docx", "doc", "csv", "zip",
    "jpg", "jpeg", "png", "txt",
];

const NOT_RECOGNIZED: &str = "pattern not recognized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarVariant {
    /// `...SSS.Rnn`
    Standard,
    /// `...SSS.VVV.Rnn` (isometrics and other multi-sheet drawings)
    SheetVariant,
    /// `...SSS` with no revision token
    NoRevision,
}

impl GrammarVariant {
    pub fn number(self) -> u8 {
        match self {
            Self::Standard => 1,
            Self::SheetVariant => 2,
            Self::NoRevision => 3,
        }
    }
}

/// One accepted filename shape.
pub struct GrammarDescriptor {
    pub variant: GrammarVariant,
    pub pattern: &'static str,
}

/// Accepted shapes, in precedence order.
pub const GRAMMARS: &[GrammarDescriptor] = &[
    GrammarDescriptor {
        variant: GrammarVariant::Standard,
        pattern: r"^(?P<year>\d{2})\.(?P<project>\d{4})\.(?P<building>\d{2})\.(?P<phase>[A-Z]{2,3})\.(?P<discipline>[A-Z]{3})\.(?P<sequence>\d{3})\.(?P<subdiscipline>[A-Z]{3})\.R(?P<revision>\d{2})$",
    },
    GrammarDescriptor {
        variant: GrammarVariant::SheetVariant,
        pattern: r"^(?P<year>\d{2})\.(?P<project>\d{4})\.(?P<building>\d{2})\.(?P<phase>[A-Z]{2,3})\.(?P<discipline>[A-Z]{3})\.(?P<sequence>\d{3})\.(?P<subdiscipline>[A-Z]{3})\.(?P<sheet>[A-Z0-9]{3})\.R(?P<revision>\d{2})$",
    },
    GrammarDescriptor {
        variant: GrammarVariant::NoRevision,
        pattern: r"^(?P<year>\d{2})\.(?P<project>\d{4})\.(?P<building>\d{2})\.(?P<phase>[A-Z]{2,3})\.(?P<discipline>[A-Z]{3})\.(?P<sequence>\d{3})\.(?P<subdiscipline>[A-Z]{3})$",
    },
];

fn compiled() -> &'static [(GrammarVariant, Regex)] {
    static COMPILED: OnceLock<Vec<(GrammarVariant, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        GRAMMARS
            .iter()
            .map(|g| (g.variant, Regex::new(g.pattern).expect("grammar pattern is valid")))
            .collect()
    })
}

/// Structured view of a filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedName {
    pub valid: bool,
    pub variant: Option<GrammarVariant>,
    pub year: String,
    pub project_code: String,
    pub building_code: String,
    pub phase_code: String,
    pub discipline_code: String,
    pub sequence_number: String,
    pub subdiscipline_code: String,
    pub sheet_or_variant: Option<String>,
    /// Two-digit revision; empty under [`GrammarVariant::NoRevision`].
    pub revision_raw: String,
    /// Lower-cased name up to (not including) the revision token. Empty when no grammar matched.
    pub base_name_key: String,
    /// Lower-cased extension without the dot, empty when none was stripped.
    pub extension: String,
    /// Accumulated validation failures, `; `-separated. Diagnostic only.
    pub reject_reason: String,
}

impl ParsedName {
    pub fn matched(&self) -> bool {
        self.variant.is_some()
    }

    fn reject(&mut self, reason: String) {
        self.valid = false;
        if !self.reject_reason.is_empty() {
            self.reject_reason.push_str("; ");
        }
        self.reject_reason.push_str(&reason);
    }
}

/// Split a filename into stem and extension, stripping only [`KNOWN_EXTENSIONS`].
pub fn split_extension(filename: &str) -> (&str, &str) {
    if let Some((stem, ext)) = filename.rsplit_once('.') {
        if !stem.is_empty() && KNOWN_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)) {
            return (stem, ext);
        }
    }
    (filename, "")
}

/// Parse with the built-in discipline catalog. Empty context values skip the
/// corresponding folder check.
pub fn parse(filename: &str, expected_year: &str, expected_project_code: &str) -> ParsedName {
    parse_with(DisciplineCatalog::standard(), filename, expected_year, expected_project_code)
}

pub fn parse_with(
    catalog: &DisciplineCatalog,
    filename: &str,
    expected_year: &str,
    expected_project_code: &str,
) -> ParsedName {
    let (stem, ext) = split_extension(filename.trim());
    let upper = stem.to_uppercase();

    let mut parsed = ParsedName {
        extension: ext.to_lowercase(),
        ..ParsedName::default()
    };

    let Some((variant, caps)) = compiled()
        .iter()
        .find_map(|(variant, re)| re.captures(&upper).map(|caps| (*variant, caps)))
    else {
        parsed.reject_reason = NOT_RECOGNIZED.to_string();
        return parsed;
    };

    let field = |name: &str| caps.name(name).map(|m| m.as_str().to_string()).unwrap_or_default();

    parsed.valid = true;
    parsed.variant = Some(variant);
    parsed.year = field("year");
    parsed.project_code = field("project");
    parsed.building_code = field("building");
    parsed.phase_code = field("phase");
    parsed.discipline_code = field("discipline");
    parsed.sequence_number = field("sequence");
    parsed.subdiscipline_code = field("subdiscipline");
    parsed.sheet_or_variant = caps.name("sheet").map(|m| m.as_str().to_string());
    parsed.revision_raw = field("revision");

    let before_revision = match caps.name("revision") {
        // Revision token is the trailing `.Rnn`.
        Some(rev) => &upper[..rev.start() - 2],
        None => upper.as_str(),
    };
    parsed.base_name_key = before_revision.to_lowercase();

    // Post-match checks accumulate; none of them undoes the match itself.
    if !catalog.is_known(&parsed.discipline_code) {
        let reason = format!("unknown discipline '{}'", parsed.discipline_code);
        parsed.reject(reason);
    }

    let expected_year = expected_year.trim();
    if !expected_year.is_empty() {
        let short = last_two(expected_year);
        if parsed.year != short {
            let reason = format!("year '{}' does not match folder year '{short}'", parsed.year);
            parsed.reject(reason);
        }
    }

    let expected_project_code = expected_project_code.trim();
    if !expected_project_code.is_empty() && parsed.project_code != expected_project_code {
        let reason = format!(
            "project code '{}' does not match folder project code '{expected_project_code}'",
            parsed.project_code
        );
        parsed.reject(reason);
    }

    if !parsed.valid {
        log::debug!("{filename}: parsed as variant {} but invalid: {}", variant.number(), parsed.reject_reason);
    }

    parsed
}

fn last_two(s: &str) -> &str {
    let count = s.chars().count();
    match s.char_indices().nth(count.saturating_sub(2)) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}
