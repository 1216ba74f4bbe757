//! Revision notation: canonical `.Rnn[letters]` suffixes and a total sort order.
//!
//! Registers record revisions as `2`, `02`, `R02`, `r2a`, `.R02`, or free-form
//! markers such as `A` or `EMISSAO`. [`canonicalize`] maps all of them onto one
//! suffix form so they can be joined against filenames; [`sort_key`] ranks any
//! revision string, canonical or not, on a single total order.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Canonical key
// ---------------------------------------------------------------------------

/// Canonical revision suffix (e.g. `.R02`, `.R02A`, `.A`), or empty for "no revision".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RevisionKey(String);

impl RevisionKey {
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Wrap a best-effort revision (fallback extraction) without re-normalizing it.
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ordinal(&self) -> SortOrdinal {
        sort_key(&self.0)
    }
}

impl fmt::Display for RevisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for RevisionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl PartialOrd for RevisionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Normalize a register revision into its canonical suffix.
///
/// Rules, first match wins, on the trimmed upper-cased input:
/// - empty → empty
/// - `.R<digits><letters>` → `.R` + digits padded to two + letters (an
///   already-dotted `.R2` is re-padded to `.R02`, not passed through, so every
///   numeric revision has one spelling)
/// - any other dotted token → unchanged
/// - `R<digits><letters>` → `.R` + padded digits + letters
/// - `R<alphanumeric>` → `.` + input
/// - `<digits>` → `.R` + padded digits
/// - anything else → `.` + input
pub fn canonicalize(raw: &str) -> RevisionKey {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return RevisionKey::empty();
    }

    if let Some(rest) = upper.strip_prefix('.') {
        if let Some((digits, letters)) = rest.strip_prefix('R').and_then(split_digits_letters) {
            return RevisionKey(format!(".R{}{}", pad_two(digits), letters));
        }
        return RevisionKey(upper);
    }

    if let Some(rest) = upper.strip_prefix('R') {
        if let Some((digits, letters)) = split_digits_letters(rest) {
            return RevisionKey(format!(".R{}{}", pad_two(digits), letters));
        }
        if !rest.is_empty() && rest.chars().all(char::is_alphanumeric) {
            return RevisionKey(format!(".{upper}"));
        }
    }

    if upper.chars().all(|c| c.is_ascii_digit()) {
        return RevisionKey(format!(".R{}", pad_two(&upper)));
    }

    RevisionKey(format!(".{upper}"))
}

/// Split `s` into a non-empty ASCII digit run followed by an ASCII upper-case letter run
/// that reaches the end of the string.
fn split_digits_letters(s: &str) -> Option<(&str, &str)> {
    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digit_end == 0 {
        return None;
    }
    let (digits, letters) = s.split_at(digit_end);
    if letters.chars().all(|c| c.is_ascii_uppercase()) {
        Some((digits, letters))
    } else {
        None
    }
}

/// Left-pad a digit string to two characters. Longer strings are kept as-is.
fn pad_two(digits: &str) -> String {
    format!("{digits:0>2}")
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Revision notation families, lowest rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionClass {
    /// No revision at all.
    Empty,
    /// Contains punctuation or spaces.
    Unranked,
    /// Letters (optionally mixed with digits) that fit no numeric shape, e.g. `A`, `EMISSAO`.
    Alphanumeric,
    /// Bare digits, e.g. `5`.
    Digits,
    /// Digits then letters, e.g. `02A`.
    DigitsWithLetters,
    /// `R` + digits + optional letters, e.g. `R02`, `R02A`.
    RPrefixed,
}

/// Tuple-wise comparable rank of a revision string.
///
/// Field order is the comparison order: class, then numeric magnitude, then the
/// letter suffix, then the original string as a final deterministic tiebreak.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SortOrdinal {
    pub class: RevisionClass,
    pub number: u64,
    pub letters: String,
    pub original: String,
}

/// Rank a revision string. Accepts canonical (`.R02A`) and raw (`r2a`, `5`, `A`) forms.
pub fn sort_key(revision: &str) -> SortOrdinal {
    let original = revision.to_string();
    let upper = revision.trim().to_uppercase();
    let clean = upper.trim_start_matches('.');

    if clean.is_empty() {
        return SortOrdinal { class: RevisionClass::Empty, number: 0, letters: String::new(), original };
    }

    if let Some(rest) = clean.strip_prefix('R') {
        let (digits, letters) = leading_digits_letters(rest);
        if !digits.is_empty() {
            return SortOrdinal {
                class: RevisionClass::RPrefixed,
                number: parse_magnitude(digits),
                letters: letters.to_string(),
                original,
            };
        }
    }

    let (digits, letters) = leading_digits_letters(clean);
    if !digits.is_empty() && !letters.is_empty() {
        return SortOrdinal {
            class: RevisionClass::DigitsWithLetters,
            number: parse_magnitude(digits),
            letters: letters.to_string(),
            original,
        };
    }
    if !digits.is_empty() && digits.len() == clean.len() {
        return SortOrdinal {
            class: RevisionClass::Digits,
            number: parse_magnitude(digits),
            letters: String::new(),
            original,
        };
    }

    let class = if clean.chars().all(char::is_alphanumeric) {
        RevisionClass::Alphanumeric
    } else {
        RevisionClass::Unranked
    };
    SortOrdinal { class, number: 0, letters: clean.to_string(), original }
}

/// Leading ASCII digit run and the upper-case letter run right after it.
fn leading_digits_letters(s: &str) -> (&str, &str) {
    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, rest) = s.split_at(digit_end);
    let letter_end = rest.find(|c: char| !c.is_ascii_uppercase()).unwrap_or(rest.len());
    (digits, &rest[..letter_end])
}

fn parse_magnitude(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}
