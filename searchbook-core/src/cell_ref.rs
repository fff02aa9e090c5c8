//! A1-style cell reference helpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest 1-based column number a worksheet accepts (`XFD`)
pub const MAX_COLUMNS: u16 = 16_384;
/// Largest 1-based row number a worksheet accepts
pub const MAX_ROWS: u32 = 1_048_576;

/// Convert a 1-based column number to its letters (1 -> A, 27 -> AA)
pub fn column_letter(col: u16) -> String {
    let mut col = u32::from(col.max(1)) - 1;
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// A single cell position, stored 1-based as written in A1 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellReference {
    pub row: u32,
    pub col: u16,
}

impl CellReference {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse a reference like "B1" or "$B$1"
    pub fn parse(cell_ref: &str) -> Option<Self> {
        let mut col = 0u32;
        let mut row_str = String::new();

        for ch in cell_ref.trim().chars() {
            if ch == '$' {
                continue;
            }
            if ch.is_ascii_alphabetic() {
                if !row_str.is_empty() {
                    return None;
                }
                col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
                if col > u32::from(MAX_COLUMNS) {
                    return None;
                }
            } else if ch.is_ascii_digit() {
                row_str.push(ch);
            } else {
                return None;
            }
        }

        let row = row_str.parse::<u32>().ok()?;
        if col == 0 || row == 0 || row > MAX_ROWS {
            return None;
        }

        Some(Self::new(row, col as u16))
    }

    /// Zero-based (row, col) as the workbook writer expects
    pub fn zero_based(&self) -> (u32, u16) {
        (self.row - 1, self.col - 1)
    }

    /// Absolute form used inside formulas, e.g. `$A$1`
    pub fn to_absolute(&self) -> String {
        format!("${}${}", column_letter(self.col), self.row)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.col), self.row)
    }
}

impl TryFrom<String> for CellReference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid cell reference '{}'", value))
    }
}

impl From<CellReference> for String {
    fn from(value: CellReference) -> Self {
        value.to_string()
    }
}
