//! searchbook-core: merge CSV exports into a searchable Excel workbook
//!
//! Each CSV export in the input directory is classified into a data category,
//! written to its own worksheet, and cross-referenced from a search sheet
//! holding one FILTER formula per category plus an issuer dropdown.

pub mod category;
pub mod cell_ref;
pub mod config;
pub mod error;
pub mod issuer;
pub mod loader;
pub mod naming;
pub mod plan;
pub mod report;
pub mod scanner;
pub mod search;
pub mod writer;

use std::path::Path;
use tracing::{info, warn};

pub use category::{Category, CategoryLayout, MatchRule};
pub use config::{BuildConfig, UnmatchedPolicy};
pub use error::{BuildError, Result};
pub use plan::BuildPlan;
pub use report::{BuildReport, Notice, NoticeScope, Severity};

use issuer::DropdownSource;
use report::{BlockSummary, DropdownKind, DropdownSummary};
use search::{IssuerFilter, SearchBlock};
use writer::WorkbookContent;

/// Main pipeline interface
#[derive(Debug)]
pub struct Searchbook {
    config: BuildConfig,
    layouts: Vec<CategoryLayout>,
}

/// Intermediate result of planning, ready to be written
struct Prepared {
    plan: BuildPlan,
    blocks: Vec<SearchBlock>,
    dropdown: Option<DropdownSource>,
    notices: Vec<Notice>,
}

impl Searchbook {
    /// Create a pipeline; the configuration is validated here
    pub fn new(config: BuildConfig) -> Result<Self> {
        config.validate()?;
        let layouts = config.layouts()?;
        Ok(Self { config, layouts })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn layouts(&self) -> &[CategoryLayout] {
        &self.layouts
    }

    /// Load and lay out everything without writing the workbook
    pub fn dry_run(&self) -> Result<BuildReport> {
        let prepared = self.prepare()?;
        Ok(self.report(prepared, false))
    }

    /// Run the whole pipeline and write the output workbook
    pub fn build(&self) -> Result<BuildReport> {
        let prepared = self.prepare()?;
        self.write(&self.config.output_file, &prepared)?;
        info!(output = %self.config.output_file.display(), "Workbook written");
        Ok(self.report(prepared, true))
    }

    fn prepare(&self) -> Result<Prepared> {
        let plan = plan::build_plan(&self.config, &self.layouts)?;
        let mut notices = plan.notices.clone();

        let issuer_filter = IssuerFilter {
            column: self.config.issuer_column,
            cell: self.config.issuer_cell,
        };
        let (blocks, block_notices) =
            search::build_blocks(&self.layouts, &plan, self.config.id_cell, issuer_filter);
        notices.extend(block_notices);

        let dropdown = match plan.canonical_sheet(Category::License) {
            Some(license) => {
                let values = issuer::issuer_list(&license.table, self.config.issuer_column);
                Some(DropdownSource::choose(values, &self.config.issuer_sheet))
            }
            None if self.config.require_license => return Err(BuildError::MissingLicense),
            None => {
                warn!("License sheet not found; issuer dropdown skipped");
                notices.push(Notice::warning(
                    NoticeScope::Run,
                    "License sheet not found; issuer dropdown skipped",
                ));
                None
            }
        };

        Ok(Prepared {
            plan,
            blocks,
            dropdown,
            notices,
        })
    }

    fn write(&self, path: &Path, prepared: &Prepared) -> Result<()> {
        let content = WorkbookContent {
            search_sheet: &self.config.search_sheet,
            plan: &prepared.plan,
            blocks: &prepared.blocks,
            issuer_cell: self.config.issuer_cell,
            dropdown: prepared.dropdown.as_ref(),
        };
        writer::write_workbook(path, &content)
    }

    fn report(&self, prepared: Prepared, written: bool) -> BuildReport {
        let Prepared {
            plan,
            blocks,
            dropdown,
            mut notices,
        } = prepared;

        // Sort notices by scope for hierarchical reporting
        notices.sort_by(|a, b| a.scope.cmp(&b.scope));

        BuildReport {
            output: self.config.output_file.clone(),
            written,
            search_sheet: self.config.search_sheet.clone(),
            id_cell: self.config.id_cell.to_string(),
            sheets: plan.sheet_summaries(),
            blocks: blocks
                .into_iter()
                .map(|block| BlockSummary {
                    category: block.category,
                    row: block.row,
                    sheet: block.sheet,
                    formula: block.formula,
                })
                .collect(),
            dropdown: dropdown.map(|source| DropdownSummary {
                cell: self.config.issuer_cell.to_string(),
                values: source.values().len(),
                kind: match source {
                    DropdownSource::Inline(_) => DropdownKind::Inline,
                    DropdownSource::Sheet { name, .. } => DropdownKind::HiddenSheet(name),
                },
            }),
            skipped_files: plan.skipped_files,
            notices,
        }
    }
}
