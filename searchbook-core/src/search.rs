//! Search sheet blocks: bold headers plus one FILTER formula per category

use crate::category::{Category, CategoryLayout};
use crate::cell_ref::{CellReference, column_letter};
use crate::loader::SheetExtent;
use crate::plan::BuildPlan;
use crate::report::{Notice, NoticeScope};
use tracing::warn;

/// Value of the issuer cell that disables issuer filtering
pub const ALL_ISSUERS: &str = "All";

/// Extra condition applied to the license block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuerFilter {
    /// 1-based issuer column in the source sheet
    pub column: u16,
    pub cell: CellReference,
}

/// One header row and the formula below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBlock {
    pub category: Category,
    /// 1-based header row; the formula is written at `row + 1`, column A
    pub row: u32,
    pub headers: Vec<String>,
    pub sheet: String,
    pub formula: String,
}

/// Quote a sheet name for use in a cross-sheet reference
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// FILTER over columns B..last of `sheet` where column A equals `id_cell`.
///
/// With an issuer filter, rows must also match the issuer cell unless it
/// holds `All`; the two conditions combine as `(id)*((all)+(issuer))`.
pub fn filter_formula(
    sheet: &str,
    extent: SheetExtent,
    id_cell: CellReference,
    issuer: Option<IssuerFilter>,
) -> String {
    let sheet = quote_sheet_name(sheet);
    let last_row = extent.last_row;
    let data_range = format!("{}!B2:{}{}", sheet, extent.last_col_letter(), last_row);
    let key_range = format!("{}!A2:A{}", sheet, last_row);
    let id = id_cell.to_absolute();

    match issuer {
        None => format!("FILTER({}, {}={}, \"\")", data_range, key_range, id),
        Some(filter) => {
            let col = column_letter(filter.column);
            let issuer_cell = filter.cell.to_absolute();
            format!(
                "FILTER({data}, ({key}={id})*(({cell}=\"{all}\")+({sheet}!{col}2:{col}{row}={cell})), \"\")",
                data = data_range,
                key = key_range,
                id = id,
                cell = issuer_cell,
                all = ALL_ISSUERS,
                sheet = sheet,
                col = col,
                row = last_row,
            )
        }
    }
}

/// Build the blocks for every category that has a canonical sheet.
///
/// Categories without one are reported as warnings and get no block.
pub fn build_blocks(
    layouts: &[CategoryLayout],
    plan: &BuildPlan,
    id_cell: CellReference,
    issuer: IssuerFilter,
) -> (Vec<SearchBlock>, Vec<Notice>) {
    let mut blocks = Vec::new();
    let mut notices = Vec::new();

    for layout in layouts {
        let Some(sheet) = plan.canonical_sheet(layout.category) else {
            warn!(category = %layout.category, "No sheet found for category; skipping search block");
            notices.push(Notice::warning(
                NoticeScope::Category(layout.category),
                "No matching file; search block omitted",
            ));
            continue;
        };

        let issuer_filter = (layout.category == Category::License).then_some(issuer);
        let formula = filter_formula(&sheet.name, sheet.table.extent(), id_cell, issuer_filter);

        blocks.push(SearchBlock {
            category: layout.category,
            row: layout.row,
            headers: layout.headers.clone(),
            sheet: sheet.name.clone(),
            formula,
        });
    }

    (blocks, notices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::default_layouts;
    use crate::loader::Table;
    use crate::plan::PlannedSheet;

    fn a1() -> CellReference {
        CellReference::new(1, 1)
    }

    fn issuer() -> IssuerFilter {
        IssuerFilter {
            column: 7,
            cell: CellReference::new(1, 2),
        }
    }

    fn table(rows: usize, cols: usize) -> Table {
        Table::new(
            (0..cols).map(|c| format!("h{}", c)).collect(),
            (0..rows)
                .map(|r| (0..cols).map(|c| format!("{}-{}", r, c)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_simple_formula() {
        let extent = SheetExtent {
            last_row: 4,
            last_col: 44,
        };
        assert_eq!(
            filter_formula("npi_25-11-03", extent, a1(), None),
            "FILTER('npi_25-11-03'!B2:AR4, 'npi_25-11-03'!A2:A4=$A$1, \"\")"
        );
    }

    #[test]
    fn test_license_formula() {
        let extent = SheetExtent {
            last_row: 6,
            last_col: 29,
        };
        assert_eq!(
            filter_formula("license_25-11-03", extent, a1(), Some(issuer())),
            "FILTER('license_25-11-03'!B2:AC6, ('license_25-11-03'!A2:A6=$A$1)*(($B$1=\"All\")+('license_25-11-03'!G2:G6=$B$1)), \"\")"
        );
    }

    #[test]
    fn test_quotes_in_sheet_name_are_doubled() {
        let extent = SheetExtent {
            last_row: 2,
            last_col: 2,
        };
        assert_eq!(
            filter_formula("it's", extent, a1(), None),
            "FILTER('it''s'!B2:B2, 'it''s'!A2:A2=$A$1, \"\")"
        );
    }

    #[test]
    fn test_formula_bounds_follow_extent() {
        for (rows, cols) in [(0, 1), (5, 3), (99, 26), (1000, 27)] {
            let extent = table(rows, cols).extent();
            let formula = filter_formula("s", extent, a1(), None);
            let expected_range = format!("'s'!B2:{}{}", column_letter(cols as u16), rows + 1);
            assert!(formula.contains(&expected_range), "{}", formula);
            assert!(formula.contains(&format!("'s'!A2:A{}=", rows + 1)));
        }
    }

    #[test]
    fn test_blocks_skip_missing_categories() {
        let mut plan = BuildPlan::default();
        plan.sheets.push(PlannedSheet {
            name: "license_25-11-03".into(),
            source_file: "dnpi_license_bcbs_sc_2025.csv".into(),
            category: Some(Category::License),
            table: table(5, 29),
        });
        plan.sheets.push(PlannedSheet {
            name: "npi_25-11-03".into(),
            source_file: "dnpi_npi_bcbs_sc_2025.csv".into(),
            category: Some(Category::Npi),
            table: table(3, 43),
        });
        plan.canonical.insert(Category::License, 0);
        plan.canonical.insert(Category::Npi, 1);

        let (blocks, notices) = build_blocks(&default_layouts(), &plan, a1(), issuer());
        assert_eq!(blocks.len(), 2);
        assert_eq!(notices.len(), Category::ALL.len() - 2);

        assert_eq!(blocks[0].category, Category::License);
        assert_eq!(blocks[0].row, 3);
        assert!(blocks[0].formula.contains("'license_25-11-03'!B2:AC6"));
        assert!(blocks[0].formula.contains("'license_25-11-03'!G2:G6=$B$1"));

        assert_eq!(blocks[1].category, Category::Npi);
        assert_eq!(blocks[1].row, 101);
        assert_eq!(
            blocks[1].formula,
            "FILTER('npi_25-11-03'!B2:AQ4, 'npi_25-11-03'!A2:A4=$A$1, \"\")"
        );
        assert!(!blocks[1].formula.contains("$B$1"));
    }
}
