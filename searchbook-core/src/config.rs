//! Build configuration

use crate::category::{Category, CategoryLayout, MatchRule, default_layouts};
use crate::cell_ref::{CellReference, MAX_COLUMNS, MAX_ROWS};
use crate::error::{BuildError, Result};
use crate::naming;
use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SEARCH_SHEET: &str = "Search_Tab";
pub const DEFAULT_ISSUER_SHEET: &str = "IssuerList";

/// What happens to CSV files no category claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Ignore the file
    #[default]
    Skip,
    /// Load the file into a sheet named after its truncated file name
    CatchAll,
}

/// Main build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the CSV exports
    pub input_dir: PathBuf,
    /// Workbook to create
    pub output_file: PathBuf,
    pub search_sheet: String,
    /// Hidden sheet used when the issuer list is too long for an inline dropdown
    pub issuer_sheet: String,
    /// strftime format of the date stamp in data sheet names
    pub date_format: String,
    /// Fixed date for sheet names; today when unset
    pub sheet_date: Option<NaiveDate>,
    pub unmatched: UnmatchedPolicy,
    /// Fail instead of warning when no license file is present
    pub require_license: bool,
    /// 1-based issuer column of the license data
    pub issuer_column: u16,
    /// Cell the user types the identifier into
    pub id_cell: CellReference,
    /// Cell holding the issuer dropdown
    pub issuer_cell: CellReference,
    /// Per-category overrides keyed by category name
    pub categories: BTreeMap<String, CategoryOverride>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_file: PathBuf::from("searchbook.xlsx"),
            search_sheet: DEFAULT_SEARCH_SHEET.to_string(),
            issuer_sheet: DEFAULT_ISSUER_SHEET.to_string(),
            date_format: "%y-%m-%d".to_string(),
            sheet_date: None,
            unmatched: UnmatchedPolicy::Skip,
            require_license: false,
            issuer_column: 7,
            id_cell: CellReference::new(1, 1),
            issuer_cell: CellReference::new(1, 2),
            categories: BTreeMap::new(),
        }
    }
}

/// Override of one row of the category table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryOverride {
    pub prefix: Option<String>,
    pub contains: Option<String>,
    pub row: Option<u32>,
    pub headers: Option<Vec<String>>,
}

impl BuildConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| {
            BuildError::Config(format!("{}: {}", path.as_ref().display(), e.message()))
        })
    }

    /// Category table with the overrides applied, in table order
    pub fn layouts(&self) -> Result<Vec<CategoryLayout>> {
        let mut layouts = default_layouts();

        for (name, over) in &self.categories {
            let category = Category::from_name(name)
                .ok_or_else(|| BuildError::Config(format!("Unknown category '{}'", name)))?;
            let layout = layouts
                .iter_mut()
                .find(|l| l.category == category)
                .ok_or_else(|| BuildError::Config(format!("Unknown category '{}'", name)))?;

            match (&over.prefix, &over.contains) {
                (Some(_), Some(_)) => {
                    return Err(BuildError::Config(format!(
                        "Category '{}' sets both prefix and contains",
                        name
                    )));
                }
                (Some(prefix), None) => layout.rule = MatchRule::Prefix(prefix.clone()),
                (None, Some(pattern)) => layout.rule = MatchRule::Contains(pattern.clone()),
                (None, None) => {}
            }
            if let Some(row) = over.row {
                layout.row = row;
            }
            if let Some(headers) = &over.headers {
                layout.headers = headers.clone();
            }
        }

        Ok(layouts)
    }

    /// Date stamped into data sheet names
    pub fn run_date(&self) -> NaiveDate {
        self.sheet_date.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn date_stamp(&self) -> String {
        self.run_date().format(&self.date_format).to_string()
    }

    /// Validate the configuration before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(config_error("input_dir must not be empty"));
        }
        let is_xlsx = self
            .output_file
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case("xlsx"))
            .unwrap_or(false);
        if !is_xlsx {
            return Err(config_error(format!(
                "output_file must be an .xlsx path, got '{}'",
                self.output_file.display()
            )));
        }

        for (field, name) in [
            ("search_sheet", &self.search_sheet),
            ("issuer_sheet", &self.issuer_sheet),
        ] {
            if !naming::is_valid_sheet_name(name) {
                return Err(config_error(format!(
                    "{} '{}' is not a valid worksheet name",
                    field, name
                )));
            }
        }
        if self.search_sheet.to_lowercase() == self.issuer_sheet.to_lowercase() {
            return Err(config_error("search_sheet and issuer_sheet must differ"));
        }

        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(config_error(format!(
                "date_format '{}' is not a valid strftime format",
                self.date_format
            )));
        }

        if self.issuer_column == 0 || self.issuer_column > MAX_COLUMNS {
            return Err(config_error(format!(
                "issuer_column must be between 1 and {}",
                MAX_COLUMNS
            )));
        }
        if self.id_cell == self.issuer_cell {
            return Err(config_error("id_cell and issuer_cell must differ"));
        }

        self.validate_layouts(&self.layouts()?)
    }

    fn validate_layouts(&self, layouts: &[CategoryLayout]) -> Result<()> {
        for layout in layouts {
            if layout.rule.pattern().is_empty() {
                return Err(config_error(format!(
                    "Category '{}' has an empty match pattern",
                    layout.category
                )));
            }
            if layout.row < 2 || layout.row >= MAX_ROWS {
                return Err(config_error(format!(
                    "Category '{}' row {} is outside 2..{}",
                    layout.category,
                    layout.row,
                    MAX_ROWS - 1
                )));
            }
            if layout.headers.is_empty() || layout.headers.len() > usize::from(MAX_COLUMNS) {
                return Err(config_error(format!(
                    "Category '{}' needs between 1 and {} headers",
                    layout.category, MAX_COLUMNS
                )));
            }

            let (header_row, formula_row) = layout.rows();
            for (field, cell) in [("id_cell", self.id_cell), ("issuer_cell", self.issuer_cell)] {
                if cell.row == header_row || cell.row == formula_row {
                    return Err(config_error(format!(
                        "{} {} overlaps the '{}' block at rows {}-{}",
                        field, cell, layout.category, header_row, formula_row
                    )));
                }
            }
        }

        for (i, a) in layouts.iter().enumerate() {
            for b in &layouts[i + 1..] {
                let (a_start, a_end) = a.rows();
                let (b_start, b_end) = b.rows();
                if a_start <= b_end && b_start <= a_end {
                    return Err(config_error(format!(
                        "Categories '{}' and '{}' overlap on the search sheet (rows {}-{} and {}-{})",
                        a.category, b.category, a_start, a_end, b_start, b_end
                    )));
                }
            }
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> BuildError {
    BuildError::Config(message.into())
}
