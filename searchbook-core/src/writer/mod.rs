//! Workbook assembly with rust_xlsxwriter

use crate::cell_ref::CellReference;
use crate::error::Result;
use crate::issuer::DropdownSource;
use crate::loader::Table;
use crate::plan::BuildPlan;
use crate::search::{ALL_ISSUERS, SearchBlock};
use rust_xlsxwriter::{DataValidation, Format, Formula, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

/// Everything that ends up in the output workbook
#[derive(Debug)]
pub struct WorkbookContent<'a> {
    pub search_sheet: &'a str,
    pub plan: &'a BuildPlan,
    pub blocks: &'a [SearchBlock],
    pub issuer_cell: CellReference,
    pub dropdown: Option<&'a DropdownSource>,
}

/// Assemble the workbook: the search sheet first, then the data sheets in
/// plan order, then the hidden issuer list sheet when one is needed
pub fn build_workbook(content: &WorkbookContent) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    workbook.push_worksheet(search_worksheet(content)?);

    for sheet in &content.plan.sheets {
        workbook.push_worksheet(data_worksheet(&sheet.name, &sheet.table)?);
        debug!(sheet = %sheet.name, rows = sheet.table.data_rows(), "Added data sheet");
    }

    if let Some(DropdownSource::Sheet { name, values }) = content.dropdown {
        let mut list = Worksheet::new();
        list.set_name(name)?;
        for (row, value) in values.iter().enumerate() {
            list.write_string(row as u32, 0, value)?;
        }
        list.set_hidden(true);
        workbook.push_worksheet(list);
    }

    Ok(workbook)
}

/// Build and save the workbook to `path`
pub fn write_workbook(path: &Path, content: &WorkbookContent) -> Result<()> {
    let mut workbook = build_workbook(content)?;
    workbook.save(path)?;
    Ok(())
}

fn data_worksheet(name: &str, table: &Table) -> Result<Worksheet> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(name)?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }
    for (row, values) in table.rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            // Blank CSV fields stay blank cells
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(row as u32 + 1, col as u16, value)?;
        }
    }

    Ok(worksheet)
}

fn search_worksheet(content: &WorkbookContent) -> Result<Worksheet> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(content.search_sheet)?;

    let bold = Format::new().set_bold();

    for block in content.blocks {
        let header_row = block.row - 1;
        for (col, header) in block.headers.iter().enumerate() {
            worksheet.write_string_with_format(header_row, col as u16, header, &bold)?;
        }
        worksheet.write_dynamic_formula(header_row + 1, 0, Formula::new(&block.formula))?;
    }

    if let Some(dropdown) = content.dropdown {
        let (row, col) = content.issuer_cell.zero_based();
        worksheet.write_string(row, col, ALL_ISSUERS)?;

        let validation = match dropdown {
            DropdownSource::Inline(values) => {
                DataValidation::new().allow_list_strings(values.as_slice())?
            }
            DropdownSource::Sheet { .. } => {
                let range = dropdown.range_formula().unwrap_or_default();
                DataValidation::new().allow_list_formula(Formula::new(range))
            }
        }
        .ignore_blank(true);

        worksheet.add_data_validation(row, col, row, col, &validation)?;
    }

    Ok(worksheet)
}
