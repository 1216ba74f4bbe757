//! Best-effort base name and revision for filenames outside the grammar.
//!
//! Both functions are independent; the engine combines them into a
//! [`ComparisonKey`](crate::model::ComparisonKey) when no grammar variant matched.

use std::sync::OnceLock;

use regex::Regex;

use crate::grammar::split_extension;

fn trailing_revision_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[._-]r\d{2}[a-z]*$").expect("suffix pattern is valid"))
}

fn trailing_revision_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[._-]?(r\d{2}[a-z]*)$").expect("token pattern is valid"))
}

/// Lower-cased stem with a trailing `[._-]Rnn[letters]` removed, if present,
/// and surrounding whitespace trimmed.
pub fn base_name(filename: &str) -> String {
    let (stem, _) = split_extension(filename.trim());
    let lower = stem.to_lowercase();
    let base = match trailing_revision_suffix().find(&lower) {
        Some(m) => &lower[..m.start()],
        None => lower.as_str(),
    };
    base.trim().to_string()
}

/// Trailing `Rnn[letters]` token of a stem, upper-cased and dot-prefixed.
pub fn extract_revision(stem: &str) -> Option<String> {
    trailing_revision_token()
        .captures(stem.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| format!(".{}", m.as_str().to_uppercase()))
}
