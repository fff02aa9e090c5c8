//! Issuer dropdown values and where the validation reads them from

use crate::loader::Table;
use crate::search::ALL_ISSUERS;
use std::collections::BTreeSet;

/// Longest comma-joined list a spreadsheet accepts as an inline validation source
pub const INLINE_LIST_LIMIT: usize = 255;

/// `All` followed by the sorted, distinct, non-blank issuers of a table column
pub fn issuer_list(table: &Table, column: u16) -> Vec<String> {
    let issuers: BTreeSet<&str> = table
        .column(column)
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != ALL_ISSUERS)
        .collect();

    std::iter::once(ALL_ISSUERS)
        .chain(issuers)
        .map(str::to_string)
        .collect()
}

/// Characters the list takes once joined with commas, with every `"`
/// doubled the way the validation formula escapes it
pub fn encoded_len(values: &[String]) -> usize {
    let chars: usize = values
        .iter()
        .map(|v| v.chars().map(|c| if c == '"' { 2 } else { 1 }).sum::<usize>())
        .sum();
    chars + values.len().saturating_sub(1)
}

/// Whether the values can be embedded in the validation itself.
///
/// A `,` would split a value into several entries, so such lists always go
/// through the hidden sheet, as do lists with quotes.
pub fn fits_inline(values: &[String]) -> bool {
    let has_separator = values.iter().any(|v| v.contains([',', '"']));
    !has_separator && encoded_len(values) <= INLINE_LIST_LIMIT
}

/// Validation source for the dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownSource {
    /// Values embedded in the validation itself
    Inline(Vec<String>),
    /// Values written one per row in column A of a hidden sheet
    Sheet { name: String, values: Vec<String> },
}

impl DropdownSource {
    pub fn choose(values: Vec<String>, sheet_name: &str) -> Self {
        if fits_inline(&values) {
            DropdownSource::Inline(values)
        } else {
            DropdownSource::Sheet {
                name: sheet_name.to_string(),
                values,
            }
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            DropdownSource::Inline(values) | DropdownSource::Sheet { values, .. } => values,
        }
    }

    /// Range formula for the hidden-sheet variant, e.g. `=IssuerList!$A$1:$A$40`
    pub fn range_formula(&self) -> Option<String> {
        match self {
            DropdownSource::Inline(_) => None,
            DropdownSource::Sheet { name, values } => {
                let is_plain = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                let sheet = if is_plain {
                    name.clone()
                } else {
                    crate::search::quote_sheet_name(name)
                };
                Some(format!("={}!$A$1:$A${}", sheet, values.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license_table(issuers: &[&str]) -> Table {
        let headers = (1..=7).map(|c| format!("c{}", c)).collect();
        let rows = issuers
            .iter()
            .enumerate()
            .map(|(i, issuer)| {
                let mut row: Vec<String> = (1..=6).map(|c| format!("{}-{}", i, c)).collect();
                row.push(issuer.to_string());
                row
            })
            .collect();
        Table::new(headers, rows)
    }

    #[test]
    fn test_issuer_list_dedup_sorted_with_all_first() {
        let table = license_table(&["StateB", "StateA", " StateA ", "", "   ", "StateB"]);
        assert_eq!(issuer_list(&table, 7), vec!["All", "StateA", "StateB"]);
    }

    #[test]
    fn test_literal_all_is_not_duplicated() {
        let table = license_table(&["All", "TX"]);
        assert_eq!(issuer_list(&table, 7), vec!["All", "TX"]);
    }

    #[test]
    fn test_empty_column_gives_only_all() {
        let table = license_table(&[]);
        assert_eq!(issuer_list(&table, 7), vec!["All"]);
        // Column beyond the table width
        assert_eq!(issuer_list(&license_table(&["TX"]), 9), vec!["All"]);
    }

    #[test]
    fn test_inline_when_short() {
        let values: Vec<String> = ["All", "StateA", "StateB"].iter().map(|s| s.to_string()).collect();
        assert_eq!(encoded_len(&values), 3 + 6 + 6 + 2);
        let source = DropdownSource::choose(values.clone(), "IssuerList");
        assert_eq!(source, DropdownSource::Inline(values));
        assert_eq!(source.range_formula(), None);
    }

    #[test]
    fn test_limit_is_inclusive() {
        // 1 value of 255 characters fits, 256 does not
        let fits = vec!["x".repeat(255)];
        assert!(matches!(
            DropdownSource::choose(fits, "IssuerList"),
            DropdownSource::Inline(_)
        ));
        let too_long = vec!["x".repeat(128), "y".repeat(127)];
        assert_eq!(encoded_len(&too_long), 256);
        assert!(matches!(
            DropdownSource::choose(too_long, "IssuerList"),
            DropdownSource::Sheet { .. }
        ));
    }

    #[test]
    fn test_quotes_count_twice() {
        let values = vec!["All".to_string(), "B\"x".to_string()];
        assert_eq!(encoded_len(&values), 3 + 4 + 1);

        // 255 raw characters but 256 once the quote is escaped
        let values = vec!["All".to_string(), format!("B\"{}", "x".repeat(249))];
        assert_eq!(encoded_len(&values), 256);
        assert!(matches!(
            DropdownSource::choose(values, "IssuerList"),
            DropdownSource::Sheet { .. }
        ));
    }

    #[test]
    fn test_commas_and_quotes_force_hidden_sheet() {
        let with_comma = vec!["All".to_string(), "Board, Medical".to_string()];
        assert!(!fits_inline(&with_comma));
        assert!(matches!(
            DropdownSource::choose(with_comma, "IssuerList"),
            DropdownSource::Sheet { .. }
        ));

        let with_quote = vec!["All".to_string(), "The \"Board\"".to_string()];
        assert!(!fits_inline(&with_quote));

        let plain = vec!["All".to_string(), "Board of Medicine".to_string()];
        assert!(fits_inline(&plain));
    }

    #[test]
    fn test_sheet_range_formula() {
        let values: Vec<String> = (0..40).map(|i| format!("Issuer number {:02}", i)).collect();
        let source = DropdownSource::choose(values, "IssuerList");
        assert_eq!(source.range_formula().as_deref(), Some("=IssuerList!$A$1:$A$40"));

        let quoted = DropdownSource::Sheet {
            name: "Issuer List".to_string(),
            values: vec!["All".to_string()],
        };
        assert_eq!(quoted.range_formula().as_deref(), Some("='Issuer List'!$A$1:$A$1"));
    }
}
