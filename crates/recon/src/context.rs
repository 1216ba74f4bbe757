use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Expected year and project code for filename validation, usually derived
/// from the project folder name. Empty fields disable the matching check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectContext {
    pub year: String,
    pub project_code: String,
}

fn project_code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i:[LM])?(\d{2,4})[_.](\d+)").expect("project code pattern is valid")
    })
}

impl ProjectContext {
    pub fn new(year: &str, project_code: &str) -> Self {
        Self {
            year: year.trim().to_string(),
            project_code: project_code.trim().to_string(),
        }
    }

    /// Derive the context from a folder name like `L25_2016 - Warehouse` or
    /// `2025.2016 Warehouse`. Unrecognised names give an empty context.
    pub fn from_project_name(name: &str) -> Self {
        let code_part = name.split(" - ").next().unwrap_or("").trim();
        let Some(caps) = project_code_pattern().captures(code_part) else {
            log::debug!("project name '{name}' carries no year/project code");
            return Self::default();
        };

        let year = &caps[1];
        let year = if year.len() == 2 {
            format!("20{year}")
        } else {
            year.to_string()
        };

        Self {
            year,
            project_code: caps[2].to_string(),
        }
    }

    /// Replace fields with non-empty overrides.
    pub fn with_overrides(mut self, year: Option<&str>, project_code: Option<&str>) -> Self {
        if let Some(year) = year.map(str::trim).filter(|y| !y.is_empty()) {
            self.year = year.to_string();
        }
        if let Some(code) = project_code.map(str::trim).filter(|c| !c.is_empty()) {
            self.project_code = code.to_string();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_empty() && self.project_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_prefixed_name() {
        let ctx = ProjectContext::from_project_name("L25_2016 - Warehouse");
        assert_eq!(ctx, ProjectContext::new("2025", "2016"));
    }

    #[test]
    fn derives_from_four_digit_year() {
        let ctx = ProjectContext::from_project_name("2025.2016 Warehouse");
        assert_eq!(ctx.year, "2025");
        assert_eq!(ctx.project_code, "2016");

        let ctx = ProjectContext::from_project_name("M24_0311 - Galpao - Fase 2");
        assert_eq!(ctx, ProjectContext::new("2024", "0311"));
    }

    #[test]
    fn unrecognised_name_is_empty() {
        let ctx = ProjectContext::from_project_name("Warehouse project");
        assert!(ctx.is_empty());
    }

    #[test]
    fn overrides_win_field_by_field() {
        let ctx = ProjectContext::from_project_name("L25_2016 - Warehouse")
            .with_overrides(None, Some("2017"));
        assert_eq!(ctx, ProjectContext::new("2025", "2017"));

        let ctx = ProjectContext::default().with_overrides(Some(" 2026 "), Some(""));
        assert_eq!(ctx, ProjectContext::new("2026", ""));
    }
}
