//! Error type for the build pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read input directory {}: {source}", path.display())]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV file {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV file {} has no header row", path.display())]
    EmptyCsv { path: PathBuf },

    #[error(
        "Row {line} of {} has {found} fields, expected {expected}",
        path.display()
    )]
    RaggedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(
        "{file} has {rows} rows and {columns} columns, more than a worksheet holds"
    )]
    TooLarge {
        file: String,
        rows: usize,
        columns: usize,
    },

    #[error("License data is required for the issuer dropdown but no license file was found")]
    MissingLicense,

    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
