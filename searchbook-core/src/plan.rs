//! Planning: scan the input directory, classify and load every file, and name its sheet

use crate::category::{Category, CategoryLayout, classify};
use crate::cell_ref::{MAX_COLUMNS, MAX_ROWS};
use crate::config::{BuildConfig, UnmatchedPolicy};
use crate::error::{BuildError, Result};
use crate::loader::{Table, load_table};
use crate::naming::{SheetNameRegistry, catch_all_base_name, sanitize_sheet_name};
use crate::report::{Notice, NoticeScope, Severity, SheetSummary};
use crate::scanner::list_csv_files;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// A loaded table and the worksheet it will be written to
#[derive(Debug, Clone)]
pub struct PlannedSheet {
    pub name: String,
    pub source_file: String,
    /// `None` for catch-all sheets
    pub category: Option<Category>,
    pub table: Table,
}

/// Everything needed to write the workbook, fully loaded in memory
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    /// Data sheets in write order
    pub sheets: Vec<PlannedSheet>,
    /// Index into `sheets` of the first sheet loaded for each category
    pub canonical: BTreeMap<Category, usize>,
    pub skipped_files: Vec<String>,
    pub notices: Vec<Notice>,
}

impl BuildPlan {
    pub fn canonical_sheet(&self, category: Category) -> Option<&PlannedSheet> {
        self.canonical.get(&category).map(|&idx| &self.sheets[idx])
    }

    pub fn sheet_summaries(&self) -> Vec<SheetSummary> {
        self.sheets
            .iter()
            .enumerate()
            .map(|(idx, sheet)| SheetSummary {
                name: sheet.name.clone(),
                source_file: sheet.source_file.clone(),
                category: sheet.category,
                data_rows: sheet.table.data_rows(),
                extent: sheet.table.extent(),
                canonical: sheet
                    .category
                    .and_then(|c| self.canonical.get(&c))
                    .is_some_and(|&canonical| canonical == idx),
            })
            .collect()
    }

    fn push_sheet(&mut self, sheet: PlannedSheet) {
        if sheet.table.data_rows() == 0 {
            self.notices.push(Notice::warning(
                NoticeScope::Sheet(sheet.name.clone()),
                format!("{} has no data rows", sheet.source_file),
            ));
        }
        if let Some(category) = sheet.category {
            self.canonical.entry(category).or_insert(self.sheets.len());
        }
        self.sheets.push(sheet);
    }
}

/// Build the plan: categories in table order, files in name order within
/// each category, then catch-all sheets when that policy is active
pub fn build_plan(config: &BuildConfig, layouts: &[CategoryLayout]) -> Result<BuildPlan> {
    let files = list_csv_files(&config.input_dir)?;
    info!(
        dir = %config.input_dir.display(),
        count = files.len(),
        "Found CSV files"
    );

    let classified: Vec<(String, Option<Category>)> = files
        .into_iter()
        .map(|name| {
            let category = classify(&name, layouts);
            (name, category)
        })
        .collect();

    let mut registry = SheetNameRegistry::new();
    registry.reserve(&config.search_sheet);
    registry.reserve(&config.issuer_sheet);

    let date_stamp = config.date_stamp();
    let mut plan = BuildPlan::default();

    for layout in layouts {
        let base = format!("{}{}", layout.category.sheet_prefix(), date_stamp);
        for (file, _) in classified
            .iter()
            .filter(|(_, category)| *category == Some(layout.category))
        {
            let name = claim_name(&mut registry, &base, &mut plan.notices);
            let table = load_checked(config, file)?;
            plan.push_sheet(PlannedSheet {
                name,
                source_file: file.clone(),
                category: Some(layout.category),
                table,
            });
        }
    }

    for (file, _) in classified.iter().filter(|(_, category)| category.is_none()) {
        match config.unmatched {
            UnmatchedPolicy::Skip => {
                plan.notices.push(Notice::info(
                    NoticeScope::File(file.clone()),
                    "No category matches this file; skipped",
                ));
                plan.skipped_files.push(file.clone());
            }
            UnmatchedPolicy::CatchAll => {
                let base = catch_all_base_name(file);
                let name = claim_name(&mut registry, &base, &mut plan.notices);
                let table = load_checked(config, file)?;
                plan.push_sheet(PlannedSheet {
                    name,
                    source_file: file.clone(),
                    category: None,
                    table,
                });
            }
        }
    }

    for (category, &idx) in &plan.canonical {
        info!(%category, sheet = %plan.sheets[idx].name, "Sheet mapping");
    }
    for notice in &plan.notices {
        warn_or_info(notice);
    }

    Ok(plan)
}

/// Load a file and make sure it fits on one worksheet below its header row
fn load_checked(config: &BuildConfig, file: &str) -> Result<Table> {
    let table = load_table(&config.input_dir.join(file))?;
    if table.data_rows() >= MAX_ROWS as usize || table.column_count() > usize::from(MAX_COLUMNS) {
        return Err(BuildError::TooLarge {
            file: file.to_string(),
            rows: table.data_rows(),
            columns: table.column_count(),
        });
    }
    Ok(table)
}

fn claim_name(registry: &mut SheetNameRegistry, base: &str, notices: &mut Vec<Notice>) -> String {
    let name = registry.claim(base);
    if sanitize_sheet_name(base) != base {
        notices.push(Notice::warning(
            NoticeScope::Sheet(name.clone()),
            format!("Worksheet name '{}' was adjusted to '{}'", base, name),
        ));
    }
    name
}

fn warn_or_info(notice: &Notice) {
    match notice.severity {
        Severity::Warning => warn!(scope = ?notice.scope, "{}", notice.message),
        Severity::Info => info!(scope = ?notice.scope, "{}", notice.message),
    }
}
