//! Run report: what was written and the non-fatal notices raised on the way

use crate::category::Category;
use crate::loader::SheetExtent;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Severity level of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
}

/// What a notice is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoticeScope {
    /// The run as a whole
    Run,
    /// An input file
    File(String),
    /// A category of the search layout
    Category(Category),
    /// A worksheet of the output
    Sheet(String),
}

impl NoticeScope {
    fn rank(&self) -> u8 {
        match self {
            NoticeScope::Run => 0,
            NoticeScope::Category(_) => 1,
            NoticeScope::File(_) => 2,
            NoticeScope::Sheet(_) => 3,
        }
    }
}

impl PartialOrd for NoticeScope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NoticeScope {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (NoticeScope::Category(a), NoticeScope::Category(b)) => a.cmp(b),
            (NoticeScope::File(a), NoticeScope::File(b)) => a.cmp(b),
            (NoticeScope::Sheet(a), NoticeScope::Sheet(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A non-fatal condition raised during a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub scope: NoticeScope,
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(scope: NoticeScope, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            scope,
            message: message.into(),
            severity,
        }
    }

    pub fn warning(scope: NoticeScope, message: impl Into<String>) -> Self {
        Self::new(scope, message, Severity::Warning)
    }

    pub fn info(scope: NoticeScope, message: impl Into<String>) -> Self {
        Self::new(scope, message, Severity::Info)
    }
}

/// One data worksheet of the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub source_file: String,
    /// `None` for catch-all sheets
    pub category: Option<Category>,
    pub data_rows: usize,
    pub extent: SheetExtent,
    /// Whether this sheet is the one its category's formula references
    pub canonical: bool,
}

/// One header/formula block of the search sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub category: Category,
    pub row: u32,
    pub sheet: String,
    pub formula: String,
}

/// Where the issuer dropdown takes its values from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropdownKind {
    Inline,
    HiddenSheet(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownSummary {
    pub cell: String,
    pub values: usize,
    pub kind: DropdownKind,
}

/// Outcome of a build (or of a dry run, in which case `written` is false)
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub output: PathBuf,
    pub written: bool,
    pub search_sheet: String,
    /// Cell the identifier is typed into
    pub id_cell: String,
    pub sheets: Vec<SheetSummary>,
    pub blocks: Vec<BlockSummary>,
    pub dropdown: Option<DropdownSummary>,
    /// CSV files no category claimed and that were not loaded
    pub skipped_files: Vec<String>,
    pub notices: Vec<Notice>,
}

impl BuildReport {
    /// Worksheets in the output: search sheet, data sheets and the hidden
    /// issuer list when the dropdown needs one
    pub fn sheet_count(&self) -> usize {
        let hidden = self
            .dropdown
            .as_ref()
            .is_some_and(|d| matches!(d.kind, DropdownKind::HiddenSheet(_)));
        1 + self.sheets.len() + usize::from(hidden)
    }

    pub fn warning_count(&self) -> usize {
        self.notices
            .iter()
            .filter(|n| n.severity == Severity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(dropdown: Option<DropdownKind>) -> BuildReport {
        BuildReport {
            output: PathBuf::from("out.xlsx"),
            written: false,
            search_sheet: "Search_Tab".into(),
            id_cell: "A1".into(),
            sheets: vec![SheetSummary {
                name: "license_25-11-03".into(),
                source_file: "dnpi_license_bcbs_sc_2025.csv".into(),
                category: Some(Category::License),
                data_rows: 1,
                extent: SheetExtent {
                    last_row: 2,
                    last_col: 7,
                },
                canonical: true,
            }],
            blocks: Vec::new(),
            dropdown: dropdown.map(|kind| DropdownSummary {
                cell: "B1".into(),
                values: 2,
                kind,
            }),
            skipped_files: Vec::new(),
            notices: Vec::new(),
        }
    }

    #[test]
    fn test_sheet_count_includes_hidden_list() {
        assert_eq!(report_with(None).sheet_count(), 2);
        assert_eq!(report_with(Some(DropdownKind::Inline)).sheet_count(), 2);
        assert_eq!(
            report_with(Some(DropdownKind::HiddenSheet("IssuerList".into()))).sheet_count(),
            3
        );
    }

    #[test]
    fn test_notice_ordering() {
        let mut notices = [
            Notice::warning(NoticeScope::Sheet("b".into()), "x"),
            Notice::info(NoticeScope::File("z.csv".into()), "x"),
            Notice::warning(NoticeScope::Category(Category::Ofac), "x"),
            Notice::warning(NoticeScope::Run, "x"),
            Notice::warning(NoticeScope::Category(Category::License), "x"),
        ];
        notices.sort_by(|a, b| a.scope.cmp(&b.scope));

        assert_eq!(notices[0].scope, NoticeScope::Run);
        assert_eq!(notices[1].scope, NoticeScope::Category(Category::License));
        assert_eq!(notices[2].scope, NoticeScope::Category(Category::Ofac));
        assert_eq!(notices[3].scope, NoticeScope::File("z.csv".into()));
        assert_eq!(notices[4].scope, NoticeScope::Sheet("b".into()));
    }
}
