//! Worksheet naming: sanitization and a uniqueness registry

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Longest worksheet name spreadsheet applications accept
pub const MAX_SHEET_NAME_LEN: usize = 31;

fn invalid_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r"[\[\]:*?/\\]").unwrap())
}

/// Whether a name can be used as-is for a worksheet
pub fn is_valid_sheet_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_SHEET_NAME_LEN
        && !invalid_chars().is_match(name)
        && !name.starts_with('\'')
        && !name.ends_with('\'')
        && !name.eq_ignore_ascii_case("history")
}

/// Replace forbidden characters, strip edge apostrophes and cap the length
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced = invalid_chars().replace_all(name, "_");
    let trimmed = replaced.trim_matches('\'');
    let mut result = truncate_chars(trimmed, MAX_SHEET_NAME_LEN);
    if result.is_empty() {
        result = "Sheet".to_string();
    }
    if result.eq_ignore_ascii_case("history") {
        result.push('_');
    }
    result
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Sheet name derived from an unmatched file: the first 30 characters of the
/// file name with any `.csv` extension removed
pub fn catch_all_base_name(file_name: &str) -> String {
    let truncated = truncate_chars(file_name, 30);
    match truncated.rfind('.') {
        Some(idx) if idx > 0 => truncated[..idx].to_string(),
        _ => truncated,
    }
}

/// Hands out unique worksheet names.
///
/// Names are compared case-insensitively. Each base remembers the next suffix
/// to try, so repeated collisions on the same base do not rescan from 1.
#[derive(Debug, Default)]
pub struct SheetNameRegistry {
    taken: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl SheetNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fixed name (e.g. the search sheet) so data sheets avoid it
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(&name.to_lowercase())
    }

    /// Claim a unique name for `base`: the sanitized base itself, or
    /// `<base>_1`, `<base>_2`, ... in first-seen order
    pub fn claim(&mut self, base: &str) -> String {
        let base = sanitize_sheet_name(base);
        let key = base.to_lowercase();

        if !self.taken.contains(&key) {
            self.taken.insert(key.clone());
            self.next_suffix.entry(key).or_insert(1);
            return base;
        }

        let suffix = self.next_suffix.entry(key.clone()).or_insert(1);
        loop {
            let tail = format!("_{}", suffix);
            *suffix += 1;
            let room = MAX_SHEET_NAME_LEN - tail.len();
            let candidate = format!("{}{}", truncate_chars(&base, room), tail);
            let candidate_key = candidate.to_lowercase();
            if !self.taken.contains(&candidate_key) {
                self.taken.insert(candidate_key);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_suffixes_in_order() {
        let mut registry = SheetNameRegistry::new();
        assert_eq!(registry.claim("license_25-11-03"), "license_25-11-03");
        assert_eq!(registry.claim("license_25-11-03"), "license_25-11-03_1");
        assert_eq!(registry.claim("license_25-11-03"), "license_25-11-03_2");
        assert_eq!(registry.claim("npi_25-11-03"), "npi_25-11-03");
    }

    #[test]
    fn test_case_insensitive_and_reserved() {
        let mut registry = SheetNameRegistry::new();
        registry.reserve("Search_Tab");
        assert!(registry.contains("search_tab"));
        assert_eq!(registry.claim("SEARCH_TAB"), "SEARCH_TAB_1");
        assert_eq!(registry.claim("Data"), "Data");
        assert_eq!(registry.claim("data"), "data_1");
    }

    #[test]
    fn test_suffix_skips_existing_literal_name() {
        let mut registry = SheetNameRegistry::new();
        assert_eq!(registry.claim("npi_1"), "npi_1");
        assert_eq!(registry.claim("npi"), "npi");
        assert_eq!(registry.claim("npi"), "npi_2");
    }

    #[test]
    fn test_long_names_keep_suffix_within_limit() {
        let mut registry = SheetNameRegistry::new();
        let base = "a_really_long_export_name_that_keeps_going";
        let first = registry.claim(base);
        let second = registry.claim(base);
        assert_eq!(first.chars().count(), MAX_SHEET_NAME_LEN);
        assert_eq!(second.chars().count(), MAX_SHEET_NAME_LEN);
        assert!(second.ends_with("_1"));
        assert_ne!(first, second);
        assert!(is_valid_sheet_name(&second));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_sheet_name("a[b]:c*d?e/f\\g"), "a_b__c_d_e_f_g");
        assert_eq!(sanitize_sheet_name("'quoted'"), "quoted");
        assert_eq!(sanitize_sheet_name("''"), "Sheet");
        assert_eq!(sanitize_sheet_name("History"), "History_");
        assert_eq!(sanitize_sheet_name("it's"), "it's");
        assert!(is_valid_sheet_name(&sanitize_sheet_name("x/y")));
    }

    #[test]
    fn test_catch_all_base_name() {
        assert_eq!(catch_all_base_name("extra.csv"), "extra");
        assert_eq!(
            catch_all_base_name("dnpi_unknown_export_bcbs_sc_2025-10-23.csv"),
            "dnpi_unknown_export_bcbs_sc_20"
        );
        assert_eq!(catch_all_base_name("report_2025.v2.csv"), "report_2025.v2");
    }

    #[test]
    fn test_valid_sheet_names() {
        assert!(is_valid_sheet_name("Search_Tab"));
        assert!(!is_valid_sheet_name(""));
        assert!(!is_valid_sheet_name("a:b"));
        assert!(!is_valid_sheet_name(&"x".repeat(32)));
        assert!(!is_valid_sheet_name("'lead"));
    }
}
